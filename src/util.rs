//! Shared utility functions for the autopr crate.

use std::sync::LazyLock;

use regex::Regex;

static FENCE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[\w-]*\n").expect("valid fence-open regex"));
static FENCE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n```$").expect("valid fence-close regex"));

/// Strip a leading/trailing markdown code fence from a completion response.
///
/// The prompt asks for raw file content with no fences, but models wrap
/// their output anyway often enough that stripping is done unconditionally.
/// Content without fences passes through unchanged, so the function is
/// idempotent.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let without_open = FENCE_OPEN.replace(trimmed, "");
    FENCE_CLOSE.replace(&without_open, "").to_string()
}
