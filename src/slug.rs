// Slug generation
// Lowercase ASCII letters and digits joined by single hyphens

use crate::error::{Result, ToolkitError};

/// Turn free text into a URL-safe slug
///
/// Every run of characters outside `[a-z0-9]` (after lowercasing) collapses
/// into one `-`, and hyphens at either end are dropped. Text with no usable
/// characters, such as a purely non-Latin script, yields `EmptyResult`.
pub fn slugify(input: &str) -> Result<String> {
    let mut slug = String::with_capacity(input.len());
    let mut separator = false;

    for c in input.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if separator && !slug.is_empty() {
                slug.push('-');
            }
            separator = false;
            slug.push(c);
        } else {
            separator = true;
        }
    }

    if slug.is_empty() {
        return Err(ToolkitError::EmptyResult);
    }
    Ok(slug)
}
