// ABOUTME: Tests for image reference extraction and classification
// ABOUTME: Validates ordering, restartability, and the two extractor syntaxes

use lsky_uploader::naming::image_markdown;
use lsky_uploader::reference::{
    extract_image_urls, extract_references, ReferenceKind, ReferenceSyntax,
};

#[test]
fn test_references_strictly_increasing() {
    let content = "![[a.png]] text ![b](https://h.com/b.png)\n![c](c.jpg) ![[d.gif]] ![e](https://h.com/e.webp)";
    let refs: Vec<_> = extract_references(content).collect();

    assert_eq!(refs.len(), 5);
    for pair in refs.windows(2) {
        assert!(pair[0].span.end <= pair[1].span.start);
    }
    for r in &refs {
        assert!(r.span.end > r.span.start);
        assert_eq!(&content[r.span.clone()], r.raw);
    }
}

#[test]
fn test_extraction_is_idempotent() {
    let content = "![x](https://h.com/1.png) ![[2.png]] https://h.com/3.jpg";

    let first: Vec<_> = extract_references(content).collect();
    let second: Vec<_> = extract_references(content).collect();
    assert_eq!(first, second);

    let urls_first: Vec<_> = extract_image_urls(content).collect();
    let urls_second: Vec<_> = extract_image_urls(content).collect();
    assert_eq!(urls_first, urls_second);
}

#[test]
fn test_upload_extractor_ignores_bare_urls() {
    let content = "plain https://h.com/a.png here";
    assert_eq!(extract_references(content).count(), 0);
    assert_eq!(extract_image_urls(content).count(), 1);
}

#[test]
fn test_bare_url_extractor_sees_urls_inside_links() {
    let content = "![pic](https://h.com/a.png) and ![[local.png]]";
    let urls: Vec<_> = extract_image_urls(content).collect();

    assert_eq!(urls.len(), 1);
    assert_eq!(urls[0].payload, "https://h.com/a.png");
    assert_eq!(urls[0].syntax, ReferenceSyntax::BareUrl);
    assert_eq!(urls[0].kind, ReferenceKind::RemoteUrl);
}

#[test]
fn test_embed_name_captured_verbatim() {
    let refs: Vec<_> = extract_references("![[My Photo 1.PNG]]").collect();
    assert_eq!(refs[0].payload, "My Photo 1.PNG");
    assert_eq!(refs[0].kind, ReferenceKind::Attachment);
}

#[test]
fn test_generated_markdown_round_trips() {
    let url = "https://img.example.com/i/2024/20240305070809000.png";

    for width in [0, 700] {
        let markdown = image_markdown(url, "png", width);
        let refs: Vec<_> = extract_references(&markdown).collect();

        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].kind, ReferenceKind::RemoteUrl);
        assert_eq!(refs[0].payload, url);
    }
}
