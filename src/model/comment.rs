//! Comment tree nodes

use serde::Serialize;

/// A node in a post's reply tree
///
/// Only genuine comments become nodes; "load more" stubs are dropped while
/// the tree is built. Deleted or removed bodies stay in the tree and are
/// filtered when it is flattened to text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub author: String,
    pub body: String,
    pub score: i64,
    pub replies: Vec<Comment>,
}

impl Comment {
    /// Creates a comment without replies
    pub fn new(author: impl Into<String>, body: impl Into<String>, score: i64) -> Self {
        Self {
            author: author.into(),
            body: body.into(),
            score,
            replies: Vec::new(),
        }
    }

    /// Adds a reply, builder style
    pub fn with_reply(mut self, reply: Comment) -> Self {
        self.replies.push(reply);
        self
    }

    /// Number of nodes in this subtree, including this one
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.replies.iter());
        }
        count
    }
}

impl Drop for Comment {
    // Flattens the subtree first so that dropping a long reply chain does
    // not recurse once per level
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.replies);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.replies);
        }
    }
}
