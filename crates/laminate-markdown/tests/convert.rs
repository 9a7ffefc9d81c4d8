//! Integration tests for laminate-markdown.
//!
//! These exercise the full extension stack the way the composer configures
//! it: include relative to the document directory, toc at base level 1,
//! extra syntax and header ids.

use std::fs;

use laminate_markdown::{convert, Extension, IncludeConfig, MarkdownConverter, MarkdownError};
use tempfile::TempDir;

fn document_converter(dir: &TempDir) -> MarkdownConverter {
    MarkdownConverter::with_extensions(vec![
        Extension::Include(IncludeConfig::new(dir.path())),
        Extension::toc(1),
        Extension::Extra,
        Extension::HeaderId,
    ])
}

// ============================================================================
// Base syntax
// ============================================================================

#[test]
fn strong_text_converts_exactly() {
    assert_eq!(
        convert("**test**", &[]).unwrap(),
        "<p><strong>test</strong></p>"
    );
}

#[test]
fn fenced_code_is_part_of_base_syntax() {
    let html = convert("```rust\nfn main() {}\n```", &[]).unwrap();
    assert_eq!(
        html,
        "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>"
    );
}

// ============================================================================
// Full stack
// ============================================================================

#[test]
fn included_chapters_appear_in_toc() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("one.md"), "## First chapter\n\nBody one.\n").unwrap();
    fs::write(dir.path().join("two.md"), "## Second chapter\n\nBody two.\n").unwrap();

    let source = "[TOC]\n\n# Report\n\n{!one.md!}\n\n{!two.md!}\n";
    let doc = document_converter(&dir).convert_document(source).unwrap();

    assert_eq!(doc.toc.len(), 1);
    assert_eq!(doc.toc[0].id, "report");
    let children: Vec<_> = doc.toc[0].children.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(children, ["first-chapter", "second-chapter"]);

    assert!(doc.html.contains("<h2 id=\"first-chapter\">First chapter</h2>"));
    assert!(doc.html.contains("<a href=\"#second-chapter\">Second chapter</a>"));
}

#[test]
fn footnotes_and_strikethrough_with_extra() {
    let dir = TempDir::new().unwrap();
    let html = document_converter(&dir)
        .convert("Text[^1] ~~gone~~\n\n[^1]: Note.")
        .unwrap();
    assert!(html.contains("<del>gone</del>"));
    assert!(html.contains("footnote-definition"));
}

#[test]
fn missing_include_propagates() {
    let dir = TempDir::new().unwrap();
    let err = document_converter(&dir).convert("{!absent.md!}").unwrap_err();
    match err {
        MarkdownError::FileNotFound { path } => assert!(path.ends_with("absent.md")),
        other => panic!("expected FileNotFound, got {:?}", other),
    }
}

#[test]
fn fragments_get_independent_tocs() {
    let converter = MarkdownConverter::new().extension(Extension::toc(1));
    let first = converter.convert_document("# Alpha").unwrap();
    let second = converter.convert_document("# Beta").unwrap();

    assert_eq!(first.toc.len(), 1);
    assert_eq!(second.toc.len(), 1);
    assert_eq!(second.toc[0].id, "beta");
}

#[test]
fn extensions_deserialize_from_config() {
    let json = r#"[
        {"name": "toc", "base_level": 2},
        {"name": "header_id"},
        {"name": "include", "base_path": "docs"}
    ]"#;
    let extensions: Vec<Extension> = serde_json::from_str(json).unwrap();
    assert_eq!(extensions.len(), 3);
    assert!(matches!(&extensions[0], Extension::Toc(cfg) if cfg.base_level == 2 && cfg.marker == "[TOC]"));
    assert!(matches!(&extensions[2], Extension::Include(cfg) if cfg.encoding == "iso-8859-1"));
}
