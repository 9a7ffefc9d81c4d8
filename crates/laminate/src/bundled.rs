//! The bundled default template set.
//!
//! Entries are stored as `(relative_path, content)` pairs and are compiled
//! into the binary, so the default root never depends on where the crate is
//! installed.

/// Value of the `<meta name="template">` tag emitted by the default `index.html`.
pub const DEFAULT_TEMPLATE_MARKER: &str = "laminate-default";

/// Bundled default templates and resources.
pub const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    ("index.html", include_str!("../templates/default/index.html")),
    ("index.css", include_str!("../templates/default/index.css")),
    ("images/laminate.svg", include_str!("../templates/default/images/laminate.svg")),
    ("fonts/fonts.css", include_str!("../templates/default/fonts/fonts.css")),
];
