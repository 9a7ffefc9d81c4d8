//! MiniJinja environment setup.
//!
//! The environment loads templates lazily through the [`TemplateSet`], so
//! `{% extends %}` and `{% include %}` follow the same precedence as
//! [`TemplateSet::resolve`]. Auto-escaping uses MiniJinja's default: on for
//! `.html`, `.htm` and `.xml` templates, off for everything else.

use minijinja::{Environment, Error, ErrorKind};

use crate::filter::MarkdownFilter;
use crate::template_set::TemplateSet;

/// Builds an environment that resolves templates through `set` and has
/// `filter` registered.
pub fn build_environment(set: &TemplateSet, filter: &MarkdownFilter) -> Environment<'static> {
    let mut env = Environment::new();

    let loader_set = set.clone();
    env.set_loader(move |name: &str| {
        loader_set.get(name).map_err(|e| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("failed to load template \"{}\"", name),
            )
            .with_source(e)
        })
    });

    filter.register(&mut env);
    env
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template_set::TemplateRoot;
    use laminate_markdown::MarkdownConverter;
    use minijinja::context;

    const BASE: &[(&str, &str)] = &[
        ("base.html", "<h1>{% block title %}{% endblock %}</h1>"),
        ("snippet.txt", "snippet {{ who }}"),
    ];

    fn set() -> TemplateSet {
        TemplateSet::new().with_root(TemplateRoot::Bundled(BASE))
    }

    #[test]
    fn test_extends_through_loader() {
        let mut env = build_environment(&set(), &MarkdownFilter::Disabled);
        env.add_template(
            "page.html",
            "{% extends \"base.html\" %}{% block title %}{{ t }}{% endblock %}",
        )
        .unwrap();
        let out = env
            .get_template("page.html")
            .unwrap()
            .render(context! { t => "A & B" })
            .unwrap();
        assert_eq!(out, "<h1>A &amp; B</h1>");
    }

    #[test]
    fn test_include_through_loader() {
        let env = build_environment(&set(), &MarkdownFilter::Disabled);
        let out = env
            .render_str("{% include \"snippet.txt\" %}", context! { who => "here" })
            .unwrap();
        assert_eq!(out, "snippet here");
    }

    #[test]
    fn test_missing_template_kind() {
        let env = build_environment(&set(), &MarkdownFilter::Disabled);
        let err = env.get_template("absent.html").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TemplateNotFound);
    }

    #[test]
    fn test_filter_is_registered() {
        let filter = MarkdownFilter::builtin(MarkdownConverter::new());
        let env = build_environment(&set(), &filter);
        let out = env
            .render_str("{{ '_x_' | markdown }}", context! {})
            .unwrap();
        assert_eq!(out, "<p><em>x</em></p>");
    }
}
