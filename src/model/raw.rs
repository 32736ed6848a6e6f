//! Lenient schema for the platform's JSON responses
//!
//! Responses are decoded once into these types at the fetcher boundary.
//! Missing fields and fields of the wrong type decode to their defaults
//! instead of failing the whole response, so the rest of the pipeline never
//! inspects loosely-typed maps.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Kind marker for a genuine comment node
pub const COMMENT_KIND: &str = "t1";

/// Kind marker for a link/self post
pub const POST_KIND: &str = "t3";

/// Deserializes a field, falling back to `T::default()` when the value is
/// null or has the wrong shape
pub fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Deserializes an integer that may arrive as a float or a numeric string
///
/// `created_utc` is a float on most endpoints, and scores are occasionally
/// serialized as strings by proxies.
pub fn lenient_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or_default(),
        Value::String(s) => s.trim().parse::<f64>().map(|f| f as i64).unwrap_or_default(),
        _ => 0,
    })
}

/// A `{kind, data}` envelope
#[derive(Debug, Default, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned + Default"))]
pub struct Thing<T> {
    #[serde(default, deserialize_with = "lenient")]
    pub kind: String,

    #[serde(default, deserialize_with = "lenient")]
    pub data: T,
}

/// A paginated listing envelope; `C` is the child type
#[derive(Debug, Default, Deserialize)]
#[serde(bound(deserialize = "C: DeserializeOwned"))]
pub struct Listing<C> {
    #[serde(default, deserialize_with = "lenient")]
    pub kind: String,

    #[serde(default, deserialize_with = "lenient_listing_data")]
    pub data: ListingData<C>,
}

/// Listing payload: children plus the cursor for the next page
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "C: DeserializeOwned"))]
pub struct ListingData<C> {
    /// Opaque cursor; `None` (or empty) means end of listing
    #[serde(default, deserialize_with = "lenient")]
    pub after: Option<String>,

    #[serde(default = "Vec::new", deserialize_with = "lenient_vec")]
    pub children: Vec<C>,
}

impl<C> Default for ListingData<C> {
    fn default() -> Self {
        Self {
            after: None,
            children: Vec::new(),
        }
    }
}

impl<C> ListingData<C> {
    /// Returns the next-page cursor, treating an empty string as absent
    pub fn next_cursor(&self) -> Option<&str> {
        self.after.as_deref().filter(|cursor| !cursor.is_empty())
    }
}

fn lenient_listing_data<'de, D, C>(deserializer: D) -> Result<ListingData<C>, D::Error>
where
    D: Deserializer<'de>,
    C: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(ListingData::deserialize(value).unwrap_or_default())
}

fn lenient_vec<'de, D, C>(deserializer: D) -> Result<Vec<C>, D::Error>
where
    D: Deserializer<'de>,
    C: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(Vec::deserialize(value).unwrap_or_default())
}

/// Post fields consumed from a listing entry or the first element of a
/// detail response
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RawPost {
    #[serde(deserialize_with = "lenient")]
    pub title: String,

    #[serde(deserialize_with = "lenient")]
    pub author: String,

    #[serde(deserialize_with = "lenient")]
    pub permalink: String,

    #[serde(deserialize_with = "lenient")]
    pub selftext: String,

    #[serde(deserialize_with = "lenient_int")]
    pub score: i64,

    #[serde(deserialize_with = "lenient_int")]
    pub num_comments: i64,

    #[serde(deserialize_with = "lenient_int")]
    pub created_utc: i64,

    #[serde(deserialize_with = "lenient")]
    pub post_hint: Option<String>,

    #[serde(deserialize_with = "lenient")]
    pub url: Option<String>,

    #[serde(deserialize_with = "lenient")]
    pub thumbnail: Option<String>,

    #[serde(deserialize_with = "lenient")]
    pub preview: Option<RawPreview>,
}

impl RawPost {
    /// URL of the first preview image, if any
    pub fn first_preview_url(&self) -> Option<&str> {
        self.preview
            .as_ref()?
            .images
            .first()?
            .source
            .as_ref()?
            .url
            .as_deref()
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RawPreview {
    #[serde(deserialize_with = "lenient")]
    pub images: Vec<RawPreviewImage>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RawPreviewImage {
    #[serde(deserialize_with = "lenient")]
    pub source: Option<RawImageSource>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RawImageSource {
    #[serde(deserialize_with = "lenient")]
    pub url: Option<String>,
}

/// Comment fields
///
/// `replies` is not a field here: the walker detaches it from the node before
/// decoding, so decoding a comment never touches its subtree.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawComment {
    #[serde(deserialize_with = "lenient")]
    pub author: String,

    #[serde(deserialize_with = "lenient")]
    pub body: String,

    #[serde(deserialize_with = "lenient_int")]
    pub score: i64,
}

/// Takes the children out of a listing envelope without decoding them
///
/// Anything that is not a `{data: {children: [...]}}` object yields no
/// children; this covers the empty-string "no replies" sentinel.
pub fn listing_children(mut listing: Value) -> Vec<Value> {
    let children = listing
        .get_mut("data")
        .and_then(|data| data.get_mut("children"))
        .map(std::mem::take)
        .unwrap_or_default();
    dispose(listing);

    match children {
        Value::Array(children) => children,
        other => {
            dispose(other);
            Vec::new()
        }
    }
}

/// Drops a JSON value of any depth without recursing
pub fn dispose(value: Value) {
    let mut pending = vec![value];
    while let Some(value) = pending.pop() {
        match value {
            Value::Array(items) => pending.extend(items),
            Value::Object(map) => pending.extend(map.into_iter().map(|(_, v)| v)),
            _ => {}
        }
    }
}

/// Request body for the relay-unlock strategy
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RelayRequest<'a> {
    pub zone: &'a str,
    pub url: &'a str,
    pub format: &'a str,
}
