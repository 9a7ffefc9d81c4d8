//! The markdown converter.
//!
//! Conversion happens in three stages:
//!
//! 1. **Source**: include directives are expanded in the raw text.
//! 2. **Events**: `pulldown-cmark` parses the text and the event stream is
//!    rewritten in place. Headings get ids and shifted ranks, and the toc
//!    marker paragraph is swapped for a raw HTML block.
//! 3. **HTML**: the rewritten stream is serialized and trailing newlines are
//!    trimmed, so `**test**` converts to exactly `<p><strong>test</strong></p>`.

use std::borrow::Cow;

use pulldown_cmark::{html, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::error::MarkdownError;
use crate::extension::{Extension, TocConfig};
use crate::heading::{slugify, HeadingIds};
use crate::include::expand_includes;
use crate::toc::{self, TocEntry};

/// Result of converting a whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// The converted HTML.
    pub html: String,
    /// Nested headings, populated when the toc or header-id extension is enabled.
    pub toc: Vec<TocEntry>,
}

/// Converts markdown to HTML with an ordered list of extensions.
///
/// The converter holds no state between calls, so one instance can be shared
/// and reused. Every call sees only the text it is given: a table of contents
/// generated for a fragment covers that fragment's headings only.
///
/// # Example
///
/// ```rust
/// use laminate_markdown::{Extension, MarkdownConverter};
///
/// let converter = MarkdownConverter::new()
///     .extension(Extension::toc(1))
///     .extension(Extension::Extra);
///
/// let html = converter.convert("# Hello\n\n**world**").unwrap();
/// assert_eq!(html, "<h1 id=\"hello\">Hello</h1>\n<p><strong>world</strong></p>");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownConverter {
    extensions: Vec<Extension>,
}

impl MarkdownConverter {
    /// Creates a converter with no extensions (plain CommonMark).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a converter with the given extensions.
    pub fn with_extensions(extensions: Vec<Extension>) -> Self {
        Self { extensions }
    }

    /// Appends an extension.
    pub fn extension(mut self, extension: Extension) -> Self {
        self.extensions.push(extension);
        self
    }

    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    /// Converts `text` to HTML.
    ///
    /// # Errors
    ///
    /// Only the include extension can fail; see [`crate::include::expand_includes`].
    pub fn convert(&self, text: &str) -> Result<String, MarkdownError> {
        Ok(self.convert_document(text)?.html)
    }

    /// Converts `text` and also returns its table of contents.
    pub fn convert_document(&self, text: &str) -> Result<Document, MarkdownError> {
        let mut source = Cow::Borrowed(text);
        for extension in &self.extensions {
            if let Extension::Include(config) = extension {
                source = Cow::Owned(expand_includes(&source, config)?);
            }
        }

        let options = self
            .extensions
            .iter()
            .fold(Options::empty(), |acc, ext| acc | ext.parser_options());
        let mut events: Vec<Event<'_>> = Parser::new_ext(&source, options).collect();

        let toc_config = self.toc_config();
        let wants_ids = toc_config.is_some() || self.extensions.contains(&Extension::HeaderId);

        let toc = if wants_ids {
            let base_level = toc_config.map_or(1, |cfg| cfg.base_level);
            toc::nest(rewrite_headings(&mut events, base_level))
        } else {
            Vec::new()
        };

        if let Some(cfg) = toc_config {
            let rendered = toc::render(&toc, cfg.title.as_deref());
            replace_marker(&mut events, &cfg.marker, &rendered);
        }

        let mut out = String::with_capacity(source.len() + source.len() / 2);
        html::push_html(&mut out, events.into_iter());
        let trimmed = out.trim_end_matches('\n').len();
        out.truncate(trimmed);

        Ok(Document { html: out, toc })
    }

    fn toc_config(&self) -> Option<&TocConfig> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Toc(cfg) => Some(cfg),
            _ => None,
        })
    }
}

/// Assigns heading ids and shifts heading ranks.
///
/// Returns the headings in document order, ready for [`toc::nest`].
fn rewrite_headings(events: &mut [Event<'_>], base_level: u8) -> Vec<TocEntry> {
    let mut ids = HeadingIds::new();
    let mut flat = Vec::new();
    let offset = usize::from(base_level.max(1)) - 1;

    let mut i = 0;
    while i < events.len() {
        if !matches!(events[i], Event::Start(Tag::Heading { .. })) {
            i += 1;
            continue;
        }
        let Some(len) = events[i..]
            .iter()
            .position(|e| matches!(e, Event::End(TagEnd::Heading(_))))
        else {
            break;
        };
        let end = i + len;
        let name = heading_text(&events[i + 1..end]);

        let mut rendered = HeadingLevel::H1;
        let mut assigned = String::new();
        if let Event::Start(Tag::Heading { level, id, .. }) = &mut events[i] {
            rendered = shift_level(*level, offset);
            *level = rendered;
            assigned = match id.as_deref() {
                Some(explicit) => {
                    ids.reserve(explicit);
                    explicit.to_string()
                }
                None => ids.unique(&slugify(&name)),
            };
            *id = Some(CowStr::from(assigned.clone()));
        }
        events[end] = Event::End(TagEnd::Heading(rendered));

        flat.push(TocEntry::new(rendered as u8, assigned, name));
        i = end + 1;
    }

    flat
}

fn shift_level(level: HeadingLevel, offset: usize) -> HeadingLevel {
    let shifted = (level as usize + offset).min(6);
    HeadingLevel::try_from(shifted).unwrap_or(HeadingLevel::H6)
}

fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        if let Event::Text(t) | Event::Code(t) = event {
            text.push_str(t);
        }
    }
    text
}

/// Replaces every paragraph consisting solely of `marker` with `html`.
fn replace_marker(events: &mut Vec<Event<'_>>, marker: &str, html: &str) {
    let mut i = 0;
    while i < events.len() {
        if matches!(events[i], Event::Start(Tag::Paragraph)) {
            if let Some(len) = events[i + 1..]
                .iter()
                .position(|e| matches!(e, Event::End(TagEnd::Paragraph)))
            {
                let end = i + 1 + len;
                if paragraph_is(&events[i + 1..end], marker) {
                    events.splice(i..=end, std::iter::once(Event::Html(CowStr::from(html.to_string()))));
                }
            }
        }
        i += 1;
    }
}

fn paragraph_is(inner: &[Event<'_>], marker: &str) -> bool {
    let mut text = String::new();
    for event in inner {
        match event {
            Event::Text(t) => text.push_str(t),
            _ => return false,
        }
    }
    !inner.is_empty() && text.trim() == marker
}
