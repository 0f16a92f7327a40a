//! Path utilities for safe filesystem operations.

/// Sanitize a string for use as a path component
///
/// Removes path traversal sequences and dangerous characters so that archive entry names
/// and snapshot version names can never escape their parent directory.
///
/// # Examples
///
/// ```ignore
/// // This is an internal utility function
/// assert_eq!(sanitize_path_component("caj_esp_072025"), "caj_esp_072025");
/// assert_eq!(sanitize_path_component("../../etc/passwd"), "______etc_passwd");
/// assert_eq!(sanitize_path_component("TRAM:NAL?"), "TRAM_NAL_");
/// ```
#[must_use]
pub fn sanitize_path_component(s: &str) -> String {
    // ".." is replaced but a single "." is kept so names like "TRAM-NAL.F250630" survive
    let s = s.replace("..", "__");
    s.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_")
}

/// Whether `s` is usable as-is as a single path component.
#[must_use]
pub fn is_safe_path_component(s: &str) -> bool {
    !s.is_empty() && s != "." && sanitize_path_component(s) == s
}
