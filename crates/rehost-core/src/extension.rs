//! File extension inference
//!
//! Used to name rehosted files and randomly named uploads. An extension
//! embedded in the source wins over the declared content type.

use crate::constants::FALLBACK_EXTENSION;

/// Longest suffix accepted as a real extension. Anything longer is more
/// likely a dotted token than an extension.
const MAX_EXTENSION_LEN: usize = 4;

/// Infer a file extension from a URL (or file name) and a content type.
///
/// Never fails: unknown inputs resolve to `"bin"`.
pub fn resolve_extension(source: &str, content_type: &str) -> String {
    if let Some(ext) = extension_from_source(source) {
        return ext;
    }

    extension_for_content_type(content_type)
        .unwrap_or(FALLBACK_EXTENSION)
        .to_string()
}

/// Extension taken from the last path segment, query string removed.
fn extension_from_source(source: &str) -> Option<String> {
    let segment = source.rsplit('/').next().unwrap_or(source);
    let segment = segment.split('?').next().unwrap_or(segment);

    let (_, ext) = segment.rsplit_once('.')?;
    let ext = ext.to_lowercase();

    if ext.is_empty() || ext.chars().count() > MAX_EXTENSION_LEN {
        None
    } else {
        Some(ext)
    }
}

/// Extension for a known media content type.
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let ext = match content_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "video/ogg" => "ogg",
        "video/avi" => "avi",
        "video/mov" => "mov",
        "audio/mp3" => "mp3",
        "audio/wav" => "wav",
        "audio/ogg" => "ogg",
        _ => return None,
    };
    Some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_extension_wins_and_is_lowercased() {
        assert_eq!(
            resolve_extension("https://host/path/photo.JPG?x=1", "image/jpeg"),
            "jpg"
        );
        assert_eq!(
            resolve_extension("https://host/path/clip.webm", "image/png"),
            "webm"
        );
    }

    #[test]
    fn test_falls_back_to_content_type() {
        assert_eq!(resolve_extension("https://host/path/noext", "image/png"), "png");
        assert_eq!(resolve_extension("https://host/path/noext", "image/jpg"), "jpg");
        assert_eq!(resolve_extension("https://host/a/b", "video/mp4"), "mp4");
    }

    #[test]
    fn test_unknown_content_type_is_bin() {
        assert_eq!(
            resolve_extension("https://host/path/noext", "application/unknown"),
            "bin"
        );
        assert_eq!(resolve_extension("", ""), "bin");
    }

    #[test]
    fn test_long_suffix_is_not_an_extension() {
        assert_eq!(
            resolve_extension("https://host/v1/output.dat_final?sig=a.b", "image/webp"),
            "webp"
        );
        assert_eq!(resolve_extension("https://host/file.jpeg", "image/jpeg"), "jpeg");
        assert_eq!(resolve_extension("https://host/file.", "image/gif"), "gif");
    }

    #[test]
    fn test_query_dots_are_ignored() {
        assert_eq!(
            resolve_extension("https://host/render?format=image.png", "image/gif"),
            "gif"
        );
    }

    #[test]
    fn test_plain_file_names() {
        assert_eq!(resolve_extension("cat.PNG", ""), "png");
        assert_eq!(resolve_extension("cat", "image/webp"), "webp");
    }
}
