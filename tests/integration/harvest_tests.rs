//! Integration tests for the harvest pipeline
//!
//! These tests use wiremock to serve listing and detail endpoints and run
//! the listing walk and the full coordinator end-to-end.

use serde_json::{json, Value};
use subreddit_harvest::config::{Config, PacingConfig};
use subreddit_harvest::scraper::{flatten_text, DetailFetcher, ListingFetcher, Pacer};
use subreddit_harvest::{harvest, Category, ConfigError, Coordinator, TimeWindow, Transport};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at the mock server, with no pacing
fn create_test_config(server: &MockServer, subreddits: &[&str]) -> Config {
    let mut config = Config::new(subreddits.iter().map(|s| s.to_string()).collect());
    config.transport.base_url = server.uri();
    config.transport.timeout_secs = 5;
    config.transport.backoff_base_ms = 1;
    config.pacing = PacingConfig::none();
    config
}

fn post_entry(subreddit: &str, id: &str) -> Value {
    json!({
        "kind": "t3",
        "data": {
            "title": format!("Post {}", id),
            "author": "ferris",
            "subreddit": "SomethingElse",
            "permalink": format!("/r/{}/comments/{}/post/", subreddit, id),
            "score": 10,
            "num_comments": 2,
            "created_utc": 1700000000.0,
            "selftext": "body"
        }
    })
}

fn listing_page(subreddit: &str, ids: &[String], after: Option<&str>) -> Value {
    let children: Vec<Value> = ids.iter().map(|id| post_entry(subreddit, id)).collect();
    json!({
        "kind": "Listing",
        "data": {"after": after, "children": children}
    })
}

fn ids(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{}{}", prefix, i)).collect()
}

fn comment(body: &str, replies: Vec<Value>) -> Value {
    let replies = if replies.is_empty() {
        json!("")
    } else {
        json!({"kind": "Listing", "data": {"children": replies}})
    };
    json!({
        "kind": "t1",
        "data": {"author": "someone", "body": body, "score": 1, "replies": replies}
    })
}

fn detail_page(title: &str, comments: Vec<Value>) -> Value {
    json!([
        {"kind": "Listing", "data": {"children": [
            {"kind": "t3", "data": {"title": title, "selftext": "body"}}
        ]}},
        {"kind": "Listing", "data": {"children": comments}}
    ])
}

/// A detail response whose only thread is a single reply chain `depth` levels
/// below the top comment, serialized without building a nested value
fn deep_thread_body(title: &str, depth: usize) -> String {
    let mut thread = String::new();
    for i in 0..depth {
        thread.push_str(&format!(
            r#"{{"kind":"t1","data":{{"author":"someone","body":"level {}","score":1,"replies":{{"kind":"Listing","data":{{"children":["#,
            i
        ));
    }
    thread.push_str(r#"{"kind":"t1","data":{"author":"someone","body":"leaf","score":1,"replies":""}}"#);
    thread.push_str(&"]}}}}".repeat(depth));

    format!(
        r#"[{{"kind":"Listing","data":{{"children":[{{"kind":"t3","data":{{"title":"{}","selftext":"body"}}}}]}}}},{{"kind":"Listing","data":{{"children":[{}]}}}}]"#,
        title, thread
    )
}

async fn mount_listing(server: &MockServer, subreddit: &str, category: &str, page: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/r/{}/{}.json", subreddit, category)))
        .respond_with(ResponseTemplate::new(200).set_body_json(page))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, subreddit: &str, id: &str, page: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/r/{}/comments/{}/post/.json", subreddit, id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(page))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_listing_paginates_with_cursor() {
    let mock_server = MockServer::start().await;

    // Second page first so it takes precedence when `after` is present
    Mock::given(method("GET"))
        .and(path("/r/rust/new.json"))
        .and(query_param("after", "t3_cursor"))
        .and(query_param("limit", "50"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing_page("rust", &ids("b", 50), Some("t3_more"))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/r/rust/new.json"))
        .and(query_param("limit", "100"))
        .and(query_param("raw_json", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(listing_page("rust", &ids("a", 100), Some("t3_cursor"))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, &["rust"]);
    let transport = Transport::from_config(&config.transport).unwrap();
    let pacer = Pacer::none();
    let fetcher = ListingFetcher::new(&transport, &config.transport.base_url, &pacer);

    let posts = fetcher
        .fetch("rust", Category::New, TimeWindow::Day, 150)
        .await
        .unwrap();

    assert_eq!(posts.len(), 150);
    assert_eq!(posts[0].title, "Post a0");
    assert_eq!(posts[149].title, "Post b49");
    assert!(posts.iter().all(|p| p.subreddit == "rust"));
}

#[tokio::test]
async fn test_listing_stops_when_cursor_absent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/r/rust/hot.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_page("rust", &ids("a", 3), None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, &["rust"]);
    let transport = Transport::from_config(&config.transport).unwrap();
    let pacer = Pacer::none();
    let fetcher = ListingFetcher::new(&transport, &config.transport.base_url, &pacer);

    let posts = fetcher
        .fetch("rust", Category::Hot, TimeWindow::Day, 10)
        .await
        .unwrap();

    assert_eq!(posts.len(), 3);
}

#[tokio::test]
async fn test_listing_keeps_posts_when_later_page_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/r/rust/hot.json"))
        .and(query_param("after", "t3_next"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/r/rust/hot.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing_page("rust", &ids("a", 2), Some("t3_next"))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, &["rust"]);
    let transport = Transport::from_config(&config.transport).unwrap();
    let pacer = Pacer::none();
    let fetcher = ListingFetcher::new(&transport, &config.transport.base_url, &pacer);

    let posts = fetcher
        .fetch("rust", Category::Hot, TimeWindow::Day, 5)
        .await
        .unwrap();

    assert_eq!(posts.len(), 2);
}

#[tokio::test]
async fn test_listing_rejects_invalid_name_without_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, &["rust"]);
    let transport = Transport::from_config(&config.transport).unwrap();
    let pacer = Pacer::none();
    let fetcher = ListingFetcher::new(&transport, &config.transport.base_url, &pacer);

    let result = fetcher
        .fetch("not a subreddit!", Category::Hot, TimeWindow::Day, 5)
        .await;

    assert!(matches!(result, Err(ConfigError::InvalidSubreddit(_))));
}

#[tokio::test]
async fn test_detail_fetch_failure_is_absent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let transport = Transport::from_config(&create_test_config(&mock_server, &["rust"]).transport).unwrap();
    let base_url = mock_server.uri();
    let fetcher = DetailFetcher::new(&transport, &base_url);

    assert!(fetcher.fetch_details("/r/rust/comments/x/post/").await.is_none());
}

#[tokio::test]
async fn test_end_to_end_top_of_day() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/r/rust/top.json"))
        .and(query_param("t", "day"))
        .and(query_param("limit", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(listing_page("rust", &["p1".to_string(), "p2".to_string()], None)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_detail(
        &mock_server,
        "rust",
        "p1",
        detail_page("Post p1", vec![comment("first!", vec![comment("[deleted]", vec![])])]),
    )
    .await;
    mount_detail(
        &mock_server,
        "rust",
        "p2",
        detail_page("Post p2", vec![comment("second", vec![])]),
    )
    .await;

    let mut config = create_test_config(&mock_server, &["rust"]);
    config.harvest.category = Category::Top;
    config.harvest.time_window = TimeWindow::Day;
    config.harvest.posts_per_subreddit = 2;
    config.harvest.max_comments_per_post = 1;

    let result = harvest(config).await.unwrap();

    assert_eq!(result.posts.len(), 2);
    for post in &result.posts {
        assert_eq!(post.subreddit, "rust");
        assert_eq!(post.top_comments.len(), 1);
    }
    let p1 = result.posts.iter().find(|p| p.title == "Post p1").unwrap();
    assert_eq!(p1.top_comments, vec!["first!".to_string()]);
    let p2 = result.posts.iter().find(|p| p.title == "Post p2").unwrap();
    assert_eq!(p2.top_comments, vec!["second".to_string()]);

    assert_eq!(result.stats.total_posts(), 2);
    assert_eq!(result.stats.comments_attached, 2);
    assert_eq!(result.stats.detail_failures, 0);
}

#[tokio::test]
async fn test_failing_sources_are_isolated() {
    let mock_server = MockServer::start().await;

    mount_listing(&mock_server, "alpha", "hot", listing_page("alpha", &ids("a", 2), None)).await;
    mount_listing(&mock_server, "gamma", "hot", listing_page("gamma", &ids("g", 3), None)).await;

    Mock::given(method("GET"))
        .and(path("/r/beta/hot.json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server, &["alpha", "beta", "bad name", "gamma"]);
    config.harvest.include_comments = false;

    let coordinator = Coordinator::new(config).unwrap();
    let result = coordinator.run().await;

    assert_eq!(result.posts.len(), 5);
    assert_eq!(result.posts.iter().filter(|p| p.subreddit == "alpha").count(), 2);
    assert_eq!(result.posts.iter().filter(|p| p.subreddit == "gamma").count(), 3);

    let counts: Vec<(&str, usize)> = result
        .stats
        .sources
        .iter()
        .map(|s| (s.subreddit.as_str(), s.posts))
        .collect();
    assert_eq!(
        counts,
        vec![("alpha", 2), ("beta", 0), ("bad name", 0), ("gamma", 3)]
    );

    let failed: Vec<&str> = result
        .stats
        .failed_sources()
        .map(|s| s.subreddit.as_str())
        .collect();
    assert_eq!(failed, vec!["bad name"]);
}

#[tokio::test]
async fn test_failed_detail_keeps_post_with_empty_comments() {
    let mock_server = MockServer::start().await;

    mount_listing(&mock_server, "rust", "hot", listing_page("rust", &ids("p", 2), None)).await;
    mount_detail(
        &mock_server,
        "rust",
        "p0",
        detail_page("Post p0", vec![comment("hello", vec![])]),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/r/rust/comments/p1/post/.json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = harvest(create_test_config(&mock_server, &["rust"])).await.unwrap();

    assert_eq!(result.posts.len(), 2);
    let p1 = result.posts.iter().find(|p| p.title == "Post p1").unwrap();
    assert!(p1.top_comments.is_empty());
    assert_eq!(result.stats.detail_failures, 1);
    assert_eq!(result.stats.comments_attached, 1);
}

#[tokio::test]
async fn test_comment_cap_applies_after_flattening() {
    let mock_server = MockServer::start().await;

    mount_listing(&mock_server, "rust", "hot", listing_page("rust", &ids("p", 1), None)).await;
    mount_detail(
        &mock_server,
        "rust",
        "p0",
        detail_page(
            "Post p0",
            vec![
                comment("a", vec![comment("a1", vec![comment("a2", vec![])])]),
                comment("b", vec![]),
                comment("c", vec![]),
            ],
        ),
    )
    .await;

    let mut config = create_test_config(&mock_server, &["rust"]);
    config.harvest.max_comments_per_post = 2;

    let result = harvest(config).await.unwrap();

    assert_eq!(result.posts[0].top_comments, vec!["a".to_string(), "a1".to_string()]);
}

#[tokio::test]
async fn test_comments_disabled_issues_no_detail_requests() {
    let mock_server = MockServer::start().await;

    mount_listing(&mock_server, "rust", "hot", listing_page("rust", &ids("p", 3), None)).await;

    Mock::given(method("GET"))
        .and(path("/r/rust/comments/p0/post/.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_page("x", vec![])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server, &["rust"]);
    config.harvest.max_comments_per_post = 0;

    let result = harvest(config).await.unwrap();

    assert_eq!(result.posts.len(), 3);
    assert!(result.posts.iter().all(|p| p.top_comments.is_empty()));
}

#[tokio::test]
async fn test_concurrent_details_attach_to_the_right_post() {
    let mock_server = MockServer::start().await;

    mount_listing(&mock_server, "rust", "hot", listing_page("rust", &ids("p", 4), None)).await;
    for i in 0..4 {
        let id = format!("p{}", i);
        mount_detail(
            &mock_server,
            "rust",
            &id,
            detail_page(&id, vec![comment(&format!("comment on {}", id), vec![])]),
        )
        .await;
    }

    let mut config = create_test_config(&mock_server, &["rust"]);
    config.pacing.max_concurrent_details = 4;

    let result = harvest(config).await.unwrap();

    assert_eq!(result.posts.len(), 4);
    for post in &result.posts {
        let id = post.title.trim_start_matches("Post ");
        assert_eq!(post.top_comments, vec![format!("comment on {}", id)]);
    }
}

#[tokio::test]
async fn test_listing_stops_on_empty_page_despite_cursor() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/r/rust/hot.json"))
        .and(query_param("after", "t3_next"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing_page("rust", &[], Some("t3_again"))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/r/rust/hot.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing_page("rust", &ids("a", 2), Some("t3_next"))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, &["rust"]);
    let transport = Transport::from_config(&config.transport).unwrap();
    let pacer = Pacer::none();
    let fetcher = ListingFetcher::new(&transport, &config.transport.base_url, &pacer);

    let posts = fetcher
        .fetch("rust", Category::Hot, TimeWindow::Day, 10)
        .await
        .unwrap();

    assert_eq!(posts.len(), 2);
}

#[tokio::test]
async fn test_listing_truncates_oversized_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/r/rust/new.json"))
        .and(query_param("limit", "3"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing_page("rust", &ids("a", 5), Some("t3_more"))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, &["rust"]);
    let transport = Transport::from_config(&config.transport).unwrap();
    let pacer = Pacer::none();
    let fetcher = ListingFetcher::new(&transport, &config.transport.base_url, &pacer);

    let posts = fetcher
        .fetch("rust", Category::New, TimeWindow::Day, 3)
        .await
        .unwrap();

    let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Post a0", "Post a1", "Post a2"]);
}

#[tokio::test]
async fn test_deep_reply_chains_are_fetched() {
    let mock_server = MockServer::start().await;

    for depth in [30, 300] {
        Mock::given(method("GET"))
            .and(path(format!("/r/rust/comments/deep{}/post/.json", depth)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(deep_thread_body("Deep", depth), "application/json"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let transport = Transport::from_config(&create_test_config(&mock_server, &["rust"]).transport).unwrap();
    let base_url = mock_server.uri();
    let fetcher = DetailFetcher::new(&transport, &base_url);

    for depth in [30, 300] {
        let details = fetcher
            .fetch_details(&format!("/r/rust/comments/deep{}/post/", depth))
            .await
            .unwrap();

        assert_eq!(details.title, "Deep");
        assert_eq!(details.comments.len(), 1);
        assert_eq!(details.comments[0].subtree_len(), depth + 1);

        let texts = flatten_text(&details.comments);
        assert_eq!(texts.len(), depth + 1);
        assert_eq!(texts[0], "level 0");
        assert_eq!(texts.last().map(String::as_str), Some("leaf"));
    }
}

#[tokio::test]
async fn test_deep_reply_chain_attaches_comments() {
    let mock_server = MockServer::start().await;

    mount_listing(&mock_server, "rust", "hot", listing_page("rust", &ids("p", 1), None)).await;
    Mock::given(method("GET"))
        .and(path("/r/rust/comments/p0/post/.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(deep_thread_body("Post p0", 40), "application/json"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server, &["rust"]);
    config.harvest.max_comments_per_post = 50;

    let result = harvest(config).await.unwrap();

    assert_eq!(result.posts.len(), 1);
    assert_eq!(result.posts[0].top_comments.len(), 41);
    assert_eq!(result.stats.detail_failures, 0);
    assert_eq!(result.stats.comments_attached, 41);
}
