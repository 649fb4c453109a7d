// SPDX-FileCopyrightText: 2026 Postbench Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request validation performed before a post reaches the writer.

use std::sync::LazyLock;

use postbench_core::NewPost;
use regex::Regex;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]{2,}$").expect("email pattern compiles")
});

/// Check a request, returning every problem found (empty when valid).
pub fn validate(post: &NewPost) -> Vec<String> {
    let mut errors = Vec::new();
    if post.content.is_empty() {
        errors.push("content: must not be empty".to_string());
    }
    if !EMAIL.is_match(&post.email) {
        errors.push(format!("email: invalid: {}", post.email));
    }
    errors
}
