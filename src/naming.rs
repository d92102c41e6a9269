// ABOUTME: Naming and format helpers for image transfers
// ABOUTME: Resolves extensions and MIME types, builds timestamped filenames and image markdown

use chrono::{DateTime, Local};
use lazy_static::lazy_static;
use regex::Regex;

/// Extensions accepted as images, in regex alternation order
pub const IMAGE_EXTENSIONS: [&str; 9] = [
    "jpeg", "jpg", "png", "gif", "tif", "bmp", "ico", "psd", "webp",
];

/// Extension used when neither the URL nor the content type tells us
pub const DEFAULT_EXTENSION: &str = "png";

const MIME_TO_EXTENSION: [(&str, &str); 9] = [
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/tiff", "tif"),
    ("image/bmp", "bmp"),
    ("image/x-icon", "ico"),
    ("image/vnd.adobe.photoshop", "psd"),
    ("image/webp", "webp"),
];

lazy_static! {
    static ref URL_EXTENSION_RE: Regex =
        Regex::new(r"(?i)\.(jpeg|jpg|png|gif|tif|bmp|ico|psd|webp)").unwrap();
    static ref TRAILING_EXTENSION_RE: Regex = Regex::new(r"\.[^/.]+$").unwrap();
}

/// Source of the current time for generated names
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// First image extension found anywhere in the URL, lowercased
pub fn extension_from_url(url: &str) -> Option<String> {
    URL_EXTENSION_RE
        .captures(url)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_lowercase())
}

pub fn extension_from_content_type(content_type: Option<&str>) -> Option<&'static str> {
    let essence = content_type?
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    MIME_TO_EXTENSION
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
}

/// URL pattern first, then content type, then `png`
pub fn resolve_extension(url: &str, content_type: Option<&str>) -> String {
    extension_from_url(url)
        .or_else(|| extension_from_content_type(content_type).map(str::to_string))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

pub fn mime_from_extension(ext: &str) -> &'static str {
    match ext.to_lowercase().as_str() {
        "jpeg" | "jpg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "tif" => "image/tiff",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "psd" => "image/vnd.adobe.photoshop",
        "webp" => "image/webp",
        _ => "image/png",
    }
}

pub fn is_image_extension(ext: &str) -> bool {
    let ext = ext.to_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

/// `YYYYMMDDHHmmssSSS`, always 17 digits
pub fn formatted_image_name(now: DateTime<Local>) -> String {
    now.format("%Y%m%d%H%M%S%3f").to_string()
}

/// Strip the final `.ext` from a file name, if any
pub fn strip_extension(name: &str) -> &str {
    match TRAILING_EXTENSION_RE.find(name) {
        Some(m) => &name[..m.start()],
        None => name,
    }
}

/// Decoded last path segment of a URL without its extension, or `image`
pub fn original_file_name(url: &str) -> String {
    let Ok(parsed) = url::Url::parse(url) else {
        return "image".to_string();
    };

    let segment = parsed
        .path()
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("image");

    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());

    let stem = strip_extension(&decoded);
    if stem.is_empty() {
        "image".to_string()
    } else {
        stem.to_string()
    }
}

pub fn download_file_name(url: &str, unix_millis: i64, ext: &str) -> String {
    format!("{}_{}.{}", original_file_name(url), unix_millis, ext)
}

/// Markdown for an uploaded image; width 0 means no size hint
pub fn image_markdown(url: &str, ext: &str, width: u32) -> String {
    if width == 0 {
        format!("![image.{}]({})", ext, url)
    } else {
        format!("![image.{}|{}]({})", ext, width, url)
    }
}
