//! Cleanup applied to model output before it is returned

use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\A```(html)?\s*").expect("valid leading fence regex"));
static TRAILING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*```\s*\z").expect("valid trailing fence regex"));

/// Strips a leading Markdown code fence (optionally tagged `html`) and a
/// trailing fence, then trims. Fences inside the content are left alone.
///
/// # Examples
/// ```
/// use landgen::generation::sanitizers::strip_code_fences;
///
/// assert_eq!(strip_code_fences("```html\n<div>x</div>\n```"), "<div>x</div>");
/// assert_eq!(strip_code_fences("<div>x</div>"), "<div>x</div>");
/// ```
pub fn strip_code_fences(input: &str) -> String {
    let without_leading = LEADING_FENCE.replace(input, "");
    let without_trailing = TRAILING_FENCE.replace(&without_leading, "");
    without_trailing.trim().to_string()
}
