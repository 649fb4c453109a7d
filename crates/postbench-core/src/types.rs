// SPDX-FileCopyrightText: 2026 Postbench Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the writer and its front-ends.

use serde::{Deserialize, Serialize};

/// A request to append a post for the user identified by `email`,
/// creating the user if it does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub email: String,
    pub content: String,
}

impl NewPost {
    pub fn new(email: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            content: content.into(),
        }
    }
}

/// A committed post row as returned by the insert statement.
///
/// Timestamps are milliseconds since the Unix epoch, set by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Health status reported by a writer front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Accepting and processing mutations.
    Healthy,
    /// Not accepting mutations.
    Unhealthy(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_post_deserializes_from_request_body() {
        let body = r#"{"email":"a@b.com","content":"hi"}"#;
        let np: NewPost = serde_json::from_str(body).unwrap();
        assert_eq!(np, NewPost::new("a@b.com", "hi"));
    }

    #[test]
    fn post_serializes_with_snake_case_fields() {
        let post = Post {
            id: 7,
            user_id: 3,
            content: "hi".into(),
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["user_id"], 3);
        assert_eq!(json["created_at"], 1_700_000_000_000i64);
    }
}
