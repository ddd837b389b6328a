//! Form field checks shared by the views.

#[cfg(test)]
#[path = "validate_test.rs"]
mod validate_test;

/// Trimmed value, or `message` when blank.
///
/// # Errors
///
/// Returns `message` if `value` is empty after trimming.
pub fn required(value: &str, message: &'static str) -> Result<String, &'static str> {
    let value = value.trim();
    if value.is_empty() { Err(message) } else { Ok(value.to_owned()) }
}

/// Trimmed value, `None` when blank.
#[must_use]
pub fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

/// Clamp a page size into `1..=max`.
#[must_use]
pub fn clamp_page_size(page_size: u32, max: u32) -> u32 {
    page_size.clamp(1, max)
}
