// ABOUTME: Image reference extraction and classification
// ABOUTME: Finds link, embed, and bare-URL image references in selected text

use lazy_static::lazy_static;
use regex::{CaptureMatches, Regex};
use std::collections::HashSet;
use std::ops::Range;

lazy_static! {
    /// `![alt](target)` or `![[name]]`
    static ref LINK_OR_EMBED_RE: Regex =
        Regex::new(r"(!\[[^\]]*\]\()([^)]+)(\))|(!\[\[([^\]]+)\]\])").unwrap();

    /// Remote URLs ending in an image extension
    static ref BARE_IMAGE_URL_RE: Regex =
        Regex::new(r"(?i)\bhttps?://[^\s)]+\.(jpeg|jpg|png|gif|tif|bmp|ico|psd|webp)").unwrap();
}

/// How the reference was written in the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceSyntax {
    Link,
    Embed,
    BareUrl,
}

/// What the reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    RemoteUrl,
    LocalPath,
    Attachment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Full matched text, used for literal replacement
    pub raw: String,
    /// Byte span in the text the reference was extracted from
    pub span: Range<usize>,
    pub syntax: ReferenceSyntax,
    pub kind: ReferenceKind,
    /// URL, decoded vault path, or attachment name
    pub payload: String,
}

pub fn is_remote(target: &str) -> bool {
    target.starts_with("http://") || target.starts_with("https://")
}

/// Classify a raw target; never fails
pub fn classify(syntax: ReferenceSyntax, target: &str) -> (ReferenceKind, String) {
    match syntax {
        ReferenceSyntax::Embed => (ReferenceKind::Attachment, target.to_string()),
        ReferenceSyntax::BareUrl => (ReferenceKind::RemoteUrl, target.to_string()),
        ReferenceSyntax::Link if is_remote(target) => (ReferenceKind::RemoteUrl, target.to_string()),
        ReferenceSyntax::Link => {
            let path = urlencoding::decode(target)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| target.to_string());
            (ReferenceKind::LocalPath, path)
        }
    }
}

/// Lazy iterator over `![alt](target)` and `![[name]]` references
pub struct References<'t> {
    inner: CaptureMatches<'static, 't>,
}

impl Iterator for References<'_> {
    type Item = ImageReference;

    fn next(&mut self) -> Option<Self::Item> {
        let cap = self.inner.next()?;
        let whole = cap.get(0)?;

        let (syntax, target) = match (cap.get(2), cap.get(5)) {
            (Some(target), _) => (ReferenceSyntax::Link, target.as_str()),
            (None, Some(name)) => (ReferenceSyntax::Embed, name.as_str()),
            (None, None) => return None,
        };

        let (kind, payload) = classify(syntax, target);
        Some(ImageReference {
            raw: whole.as_str().to_string(),
            span: whole.range(),
            syntax,
            kind,
            payload,
        })
    }
}

/// Link and embed references, left to right. Used by the upload flow.
pub fn extract_references(text: &str) -> References<'_> {
    References {
        inner: LINK_OR_EMBED_RE.captures_iter(text),
    }
}

/// Bare remote image URLs, left to right. Used by delete and download.
pub fn extract_image_urls(text: &str) -> impl Iterator<Item = ImageReference> + '_ {
    BARE_IMAGE_URL_RE.find_iter(text).map(|m| ImageReference {
        raw: m.as_str().to_string(),
        span: m.range(),
        syntax: ReferenceSyntax::BareUrl,
        kind: ReferenceKind::RemoteUrl,
        payload: m.as_str().trim().to_string(),
    })
}

/// Exact host equality against the blacklist
pub fn is_blacklisted(url: &str, blacklist: &HashSet<String>) -> bool {
    if blacklist.is_empty() {
        return false;
    }

    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| blacklist.contains(h)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_and_embed_in_order() {
        let text = "a ![[one.png]] b ![x](https://h.com/2.png) c ![](notes/3.jpg)";
        let refs: Vec<_> = extract_references(text).collect();

        assert_eq!(refs.len(), 3);
        assert_eq!(refs[0].syntax, ReferenceSyntax::Embed);
        assert_eq!(refs[0].kind, ReferenceKind::Attachment);
        assert_eq!(refs[0].payload, "one.png");
        assert_eq!(refs[1].kind, ReferenceKind::RemoteUrl);
        assert_eq!(refs[2].kind, ReferenceKind::LocalPath);
        assert!(refs[0].span.start < refs[1].span.start);
        assert!(refs[1].span.start < refs[2].span.start);
        assert_eq!(&text[refs[1].span.clone()], refs[1].raw);
    }

    #[test]
    fn test_local_path_is_decoded() {
        let (kind, payload) = classify(ReferenceSyntax::Link, "assets/my%20pic.png");
        assert_eq!(kind, ReferenceKind::LocalPath);
        assert_eq!(payload, "assets/my pic.png");
    }

    #[test]
    fn test_undecodable_path_kept_raw() {
        let (_, payload) = classify(ReferenceSyntax::Link, "a%ff.png");
        assert_eq!(payload, "a%ff.png");
    }

    #[test]
    fn test_plain_link_is_not_an_image_reference() {
        assert_eq!(extract_references("[doc](https://h.com/a.png)").count(), 0);
    }

    #[test]
    fn test_bare_urls_require_image_extension() {
        let text = "https://h.com/a.PNG and https://h.com/page.html and (http://h.com/b.webp)";
        let urls: Vec<_> = extract_image_urls(text).map(|r| r.payload).collect();
        assert_eq!(urls, vec!["https://h.com/a.PNG", "http://h.com/b.webp"]);
    }

    #[test]
    fn test_blacklist_is_exact_host() {
        let blacklist: HashSet<String> = ["example.com".to_string()].into_iter().collect();
        assert!(is_blacklisted("https://example.com/a.png", &blacklist));
        assert!(!is_blacklisted("https://sub.example.com/a.png", &blacklist));
        assert!(!is_blacklisted("not a url", &blacklist));
    }
}
