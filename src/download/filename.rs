//! Best-effort filename guessing for downloads

use url::Url;

use super::types::FilenameHint;
use crate::config::{FALLBACK_FILENAME_EXTENSION, FALLBACK_FILENAME_PREFIX};

const DEFAULT_BASE_NAME: &str = "downloadfile";

const MIME_EXTENSIONS: &[(&str, &str)] = &[
    ("image/jpeg", ".jpg"),
    ("image/jpg", ".jpg"),
    ("image/pjpeg", ".jpg"),
    ("image/jpeg", ".jpeg"),
    ("image/png", ".png"),
    ("image/gif", ".gif"),
    ("image/webp", ".webp"),
    ("image/avif", ".avif"),
    ("image/bmp", ".bmp"),
    ("image/svg+xml", ".svg"),
    ("image/heic", ".heic"),
    ("video/mp4", ".mp4"),
    ("application/pdf", ".pdf"),
    ("application/zip", ".zip"),
    ("text/html", ".html"),
];

/// Guess the name a download should be saved under.
///
/// Order: the hint (disposition `filename*=`, then `filename=`, or a page
/// supplied name), then the last path segment of the URL, then
/// `downloadfile`. A missing extension is derived from `mime_type`.
pub fn guess_file_name(url: &str, hint: &FilenameHint, mime_type: Option<&str>) -> String {
    let from_hint = match hint {
        FilenameHint::ContentDisposition(value) => parse_content_disposition(value),
        FilenameHint::Filename(name) => sanitize_file_name(name),
        FilenameHint::None => None,
    };

    let name = from_hint
        .or_else(|| last_path_segment(url))
        .unwrap_or_else(|| DEFAULT_BASE_NAME.to_string());

    if has_extension(&name) {
        return name;
    }
    let extension = mime_type.map(extension_for_mime).unwrap_or(".bin");
    format!("{name}{extension}")
}

/// `wallpaper_<epoch millis>.jpg`
pub fn fallback_file_name(now_millis: i64) -> String {
    format!("{FALLBACK_FILENAME_PREFIX}{now_millis}{FALLBACK_FILENAME_EXTENSION}")
}

/// Strip directories and reject names that cannot be a file on disk.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.').trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// MIME type for a filename, judged by its extension.
pub fn mime_for_file_name(name: &str) -> Option<&'static str> {
    let (_, ext) = name.rsplit_once('.')?;
    let ext = format!(".{}", ext.to_ascii_lowercase());
    MIME_EXTENSIONS
        .iter()
        .find(|(_, e)| *e == ext)
        .map(|(mime, _)| *mime)
}

fn extension_for_mime(mime: &str) -> &'static str {
    let essence = mime
        .split(';')
        .next()
        .unwrap_or(mime)
        .trim()
        .to_ascii_lowercase();
    if let Some((_, ext)) = MIME_EXTENSIONS.iter().find(|(m, _)| *m == essence) {
        return ext;
    }
    if essence.starts_with("text/") {
        ".txt"
    } else {
        ".bin"
    }
}

fn has_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && !ext.is_empty() && ext.len() <= 5)
}

fn parse_content_disposition(value: &str) -> Option<String> {
    let mut plain = None;
    for param in value.split(';').map(str::trim) {
        let Some((key, raw)) = param.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                // RFC 5987: charset'language'percent-encoded
                let encoded = raw.trim().splitn(3, '\'').nth(2).unwrap_or(raw.trim());
                if let Ok(decoded) = urlencoding::decode(encoded.trim_matches('"')) {
                    if let Some(name) = sanitize_file_name(&decoded) {
                        return Some(name);
                    }
                }
            }
            "filename" if plain.is_none() => {
                plain = sanitize_file_name(raw.trim().trim_matches('"'));
            }
            _ => {}
        }
    }
    plain
}

fn last_path_segment(url: &str) -> Option<String> {
    let segment = match Url::parse(url) {
        Ok(parsed) => parsed.path_segments()?.next_back()?.to_string(),
        Err(_) => {
            let path = url.split(['?', '#']).next().unwrap_or(url);
            path.rsplit('/').next()?.to_string()
        }
    };
    let decoded = urlencoding::decode(&segment)
        .map(|s| s.into_owned())
        .unwrap_or(segment);
    sanitize_file_name(&decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_url_segment_for_image_urls() {
        let name = guess_file_name(
            "https://res.cloudinary.com/x/img.jpg",
            &FilenameHint::None,
            Some("image/jpeg"),
        );
        assert_eq!(name, "img.jpg");
    }

    #[test]
    fn strips_query_and_decodes_segment() {
        let name = guess_file_name(
            "https://res.cloudinary.com/x/my%20wall.png?w=100#top",
            &FilenameHint::None,
            Some("image/png"),
        );
        assert_eq!(name, "my wall.png");
    }

    #[test]
    fn disposition_wins_over_url() {
        let hint = FilenameHint::ContentDisposition("attachment; filename=\"sunset.webp\"".into());
        assert_eq!(
            guess_file_name("https://res.cloudinary.com/x/abc", &hint, Some("image/webp")),
            "sunset.webp"
        );

        let hint = FilenameHint::ContentDisposition(
            "attachment; filename=\"plain.jpg\"; filename*=UTF-8''caf%C3%A9.jpg".into(),
        );
        assert_eq!(
            guess_file_name("https://res.cloudinary.com/x/abc", &hint, None),
            "café.jpg"
        );
    }

    #[test]
    fn appends_extension_from_mime() {
        let url = "https://res.cloudinary.com/image/upload/v123/abcdef";
        assert_eq!(
            guess_file_name(url, &FilenameHint::None, Some("image/jpeg")),
            "abcdef.jpg"
        );
        assert_eq!(
            guess_file_name(url, &FilenameHint::None, Some("text/plain; charset=utf-8")),
            "abcdef.txt"
        );
        assert_eq!(
            guess_file_name(url, &FilenameHint::None, Some("application/x-unknown")),
            "abcdef.bin"
        );
    }

    #[test]
    fn falls_back_to_default_base_name() {
        assert_eq!(
            guess_file_name("https://res.cloudinary.com/", &FilenameHint::None, Some("image/png")),
            "downloadfile.png"
        );
    }

    #[test]
    fn page_names_lose_directories() {
        let hint = FilenameHint::Filename("../../etc/passwd".into());
        assert_eq!(guess_file_name("https://a.test/x.jpg", &hint, None), "passwd.bin");
        assert_eq!(sanitize_file_name(".."), None);
        assert_eq!(sanitize_file_name("  "), None);
        assert_eq!(sanitize_file_name("C:\\tmp\\a.jpg").as_deref(), Some("a.jpg"));
    }

    #[test]
    fn fallback_name_uses_timestamp() {
        assert_eq!(fallback_file_name(1_700_000_000_123), "wallpaper_1700000000123.jpg");
    }

    #[test]
    fn mime_lookup_by_extension() {
        assert_eq!(mime_for_file_name("a.JPG"), Some("image/jpeg"));
        assert_eq!(mime_for_file_name("sunset.jpeg"), Some("image/jpeg"));
        assert_eq!(mime_for_file_name("a.png"), Some("image/png"));
        assert_eq!(mime_for_file_name("noext"), None);
    }
}
