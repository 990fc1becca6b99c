//! Extension-derived content types and caching hints for served media.

use std::path::Path;

/// Lowercase extension of a filename or key, without the dot.
pub fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_lowercase())
}

/// Content type served for a stored key
pub fn content_type_for_key(key: &str) -> &'static str {
    match extension_of(key).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("mp4") => "video/mp4",
        Some("avi") => "video/avi",
        Some("mov") => "video/quicktime",
        Some("wmv") => "video/x-ms-wmv",
        Some("flv") => "video/x-flv",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        _ => "application/octet-stream",
    }
}

pub fn cache_control_for(content_type: &str) -> &'static str {
    if content_type.starts_with("video/") {
        "public, max-age=86400, immutable"
    } else if content_type.starts_with("image/") {
        "public, max-age=3600, immutable"
    } else {
        "public, max-age=1800"
    }
}

/// Formats players can start before the whole file arrives
pub fn supports_streaming(key: &str) -> bool {
    matches!(
        extension_of(key).as_deref(),
        Some("mp4") | Some("webm") | Some("mov") | Some("avi") | Some("mkv")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_table() {
        assert_eq!(content_type_for_key("items/shop-1/item-2-abc.MP4"), "video/mp4");
        assert_eq!(content_type_for_key("a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for_key("a.mov"), "video/quicktime");
        assert_eq!(content_type_for_key("a.bin"), "application/octet-stream");
        assert_eq!(content_type_for_key("no-extension"), "application/octet-stream");
    }

    #[test]
    fn test_cache_control_by_class() {
        assert_eq!(cache_control_for("video/webm"), "public, max-age=86400, immutable");
        assert_eq!(cache_control_for("image/png"), "public, max-age=3600, immutable");
        assert_eq!(cache_control_for("application/octet-stream"), "public, max-age=1800");
    }

    #[test]
    fn test_streaming_formats() {
        assert!(supports_streaming("x.mkv"));
        assert!(!supports_streaming("x.wmv"));
        assert!(!supports_streaming("x.png"));
    }
}
