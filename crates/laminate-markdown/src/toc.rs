//! Table of contents construction and rendering.

use std::fmt::Write;

use pulldown_cmark_escape::escape_html;

/// One heading in the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// Rendered heading rank (after any base-level offset).
    pub level: u8,
    /// Anchor id of the heading.
    pub id: String,
    /// Plain text of the heading.
    pub name: String,
    /// Headings nested below this one.
    pub children: Vec<TocEntry>,
}

impl TocEntry {
    pub fn new(level: u8, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            level,
            id: id.into(),
            name: name.into(),
            children: Vec::new(),
        }
    }
}

/// Nests a flat, document-ordered heading list by rank.
///
/// A heading deeper than the one before it becomes that heading's child.
/// Skipped ranks (an `h1` followed directly by an `h3`) nest one step, so no
/// empty intermediate lists are produced.
pub fn nest(flat: Vec<TocEntry>) -> Vec<TocEntry> {
    let mut iter = flat.into_iter().peekable();
    collect_level(&mut iter, None)
}

fn collect_level<I>(iter: &mut std::iter::Peekable<I>, parent: Option<u8>) -> Vec<TocEntry>
where
    I: Iterator<Item = TocEntry>,
{
    let mut out = Vec::new();
    while let Some(next) = iter.peek() {
        if parent.is_some_and(|level| next.level <= level) {
            break;
        }
        let Some(mut entry) = iter.next() else {
            break;
        };
        entry.children = collect_level(iter, Some(entry.level));
        out.push(entry);
    }
    out
}

/// Renders a nested table of contents as an HTML block.
pub fn render(entries: &[TocEntry], title: Option<&str>) -> String {
    let mut html = String::from("<div class=\"toc\">\n");
    if let Some(title) = title {
        let _ = writeln!(html, "<span class=\"toctitle\">{}</span>", escape(title));
    }
    render_list(&mut html, entries);
    html.push_str("</div>\n");
    html
}

fn render_list(html: &mut String, entries: &[TocEntry]) {
    html.push_str("<ul>\n");
    for entry in entries {
        let _ = write!(
            html,
            "<li><a href=\"#{}\">{}</a>",
            escape(&entry.id),
            escape(&entry.name)
        );
        if !entry.children.is_empty() {
            html.push('\n');
            render_list(html, &entry.children);
        }
        html.push_str("</li>\n");
    }
    html.push_str("</ul>\n");
}

pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a `String` cannot fail.
    let _ = escape_html(&mut out, text);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(levels: &[u8]) -> Vec<TocEntry> {
        levels
            .iter()
            .enumerate()
            .map(|(i, level)| TocEntry::new(*level, format!("h{}", i), format!("H{}", i)))
            .collect()
    }

    #[test]
    fn test_nest_siblings() {
        let toc = nest(flat(&[1, 1, 1]));
        assert_eq!(toc.len(), 3);
        assert!(toc.iter().all(|e| e.children.is_empty()));
    }

    #[test]
    fn test_nest_children() {
        let toc = nest(flat(&[1, 2, 2, 1, 2]));
        assert_eq!(toc.len(), 2);
        assert_eq!(toc[0].children.len(), 2);
        assert_eq!(toc[1].children.len(), 1);
        assert_eq!(toc[1].children[0].id, "h4");
    }

    #[test]
    fn test_nest_skipped_level() {
        let toc = nest(flat(&[1, 3, 2]));
        assert_eq!(toc.len(), 1);
        assert_eq!(toc[0].children.len(), 2);
        assert_eq!(toc[0].children[0].level, 3);
        assert_eq!(toc[0].children[1].level, 2);
    }

    #[test]
    fn test_nest_shallower_after_deep_start() {
        let toc = nest(flat(&[2, 1]));
        assert_eq!(toc.len(), 2);
    }

    #[test]
    fn test_render_nested_list() {
        let toc = nest(vec![
            TocEntry::new(1, "intro", "Intro"),
            TocEntry::new(2, "a-b", "A & B"),
        ]);
        let html = render(&toc, Some("Contents"));
        assert_eq!(
            html,
            "<div class=\"toc\">\n\
             <span class=\"toctitle\">Contents</span>\n\
             <ul>\n\
             <li><a href=\"#intro\">Intro</a>\n\
             <ul>\n\
             <li><a href=\"#a-b\">A &amp; B</a></li>\n\
             </ul>\n\
             </li>\n\
             </ul>\n\
             </div>\n"
        );
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&[], None), "<div class=\"toc\">\n<ul>\n</ul>\n</div>\n");
    }

    #[test]
    fn test_render_escapes_markup_in_names() {
        let toc = vec![TocEntry::new(1, "x\"y", "<script> & \"q\"")];
        let html = render(&toc, Some("A<B"));
        assert!(html.contains("<span class=\"toctitle\">A&lt;B</span>"));
        assert!(html.contains("<a href=\"#x&quot;y\">&lt;script&gt; &amp; &quot;q&quot;</a>"));
    }
}
