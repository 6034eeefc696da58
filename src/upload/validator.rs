// Upload type validation
// Compares the sniffed MIME type with the configured allow-list

/// Accept `sniffed_type` if the allow-list is empty or names it exactly
///
/// The comparison is case-sensitive on the full MIME string, so text types
/// must be listed with their charset (e.g. `text/plain; charset=utf-8`).
pub fn is_allowed(sniffed_type: &str, allowed_types: &[String]) -> bool {
    allowed_types.is_empty() || allowed_types.iter().any(|t| t == sniffed_type)
}
