//! Template stores: where template sources are looked up by key.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::warn;

/// File extension of templates kept on disk.
pub const TEMPLATE_EXTENSION: &str = "tmpl";

/// A source of template texts keyed by `<identifier>_template`.
///
/// A store that has no template for a key returns `None`; the renderer turns
/// that into a non-fatal diagnostic.
pub trait TemplateStore {
    fn template(&self, key: &str) -> Option<Cow<'_, str>>;
}

impl<T: TemplateStore + ?Sized> TemplateStore for &T {
    fn template(&self, key: &str) -> Option<Cow<'_, str>> {
        (**self).template(key)
    }
}

impl<T: TemplateStore + ?Sized> TemplateStore for Box<T> {
    fn template(&self, key: &str) -> Option<Cow<'_, str>> {
        (**self).template(key)
    }
}

/// The templates compiled into the crate, one per question type.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledTemplates;

impl BundledTemplates {
    pub fn new() -> Self {
        Self
    }

    fn source(key: &str) -> Option<&'static str> {
        let source = match key {
            "welcome_screen_template" => include_str!("../templates/welcome_screen_template.tmpl"),
            "thank_you_screen_template" => {
                include_str!("../templates/thank_you_screen_template.tmpl")
            }
            "multiple_choice_template" => {
                include_str!("../templates/multiple_choice_template.tmpl")
            }
            "phone_number_template" => include_str!("../templates/phone_number_template.tmpl"),
            "short_text_template" => include_str!("../templates/short_text_template.tmpl"),
            "long_text_template" => include_str!("../templates/long_text_template.tmpl"),
            "statement_template" => include_str!("../templates/statement_template.tmpl"),
            "yes_no_template" => include_str!("../templates/yes_no_template.tmpl"),
            "email_template" => include_str!("../templates/email_template.tmpl"),
            "opinion_scale_template" => include_str!("../templates/opinion_scale_template.tmpl"),
            "rating_template" => include_str!("../templates/rating_template.tmpl"),
            "date_template" => include_str!("../templates/date_template.tmpl"),
            "number_template" => include_str!("../templates/number_template.tmpl"),
            "dropdown_template" => include_str!("../templates/dropdown_template.tmpl"),
            "legal_template" => include_str!("../templates/legal_template.tmpl"),
            "file_upload_template" => include_str!("../templates/file_upload_template.tmpl"),
            "payment_template" => include_str!("../templates/payment_template.tmpl"),
            "website_template" => include_str!("../templates/website_template.tmpl"),
            _ => return None,
        };
        Some(source)
    }
}

impl TemplateStore for BundledTemplates {
    fn template(&self, key: &str) -> Option<Cow<'_, str>> {
        Self::source(key).map(Cow::Borrowed)
    }
}

/// Templates kept as `<dir>/<key>.tmpl` files.
///
/// Files are read on every lookup so edits show up on the next render.
#[derive(Debug, Clone)]
pub struct DirectoryTemplates {
    root: PathBuf,
}

impl DirectoryTemplates {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Option<PathBuf> {
        // Keys come from the type registry, but never let one escape the directory.
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return None;
        }
        Some(self.root.join(format!("{key}.{TEMPLATE_EXTENSION}")))
    }
}

impl TemplateStore for DirectoryTemplates {
    fn template(&self, key: &str) -> Option<Cow<'_, str>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(source) => Some(Cow::Owned(source)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read template");
                None
            }
        }
    }
}

/// In-memory templates.
#[derive(Debug, Clone, Default)]
pub struct MapTemplates {
    templates: HashMap<String, String>,
}

impl MapTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template under `key`.
    pub fn with_template(mut self, key: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(key, source);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, source: impl Into<String>) {
        self.templates.insert(key.into(), source.into());
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateStore for MapTemplates {
    fn template(&self, key: &str) -> Option<Cow<'_, str>> {
        self.templates.get(key).map(|s| Cow::Borrowed(s.as_str()))
    }
}

/// Looks a key up in `primary` first and falls back to `fallback`.
#[derive(Debug, Clone)]
pub struct LayeredTemplates<P, F> {
    primary: P,
    fallback: F,
}

impl<P: TemplateStore, F: TemplateStore> LayeredTemplates<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: TemplateStore, F: TemplateStore> TemplateStore for LayeredTemplates<P, F> {
    fn template(&self, key: &str) -> Option<Cow<'_, str>> {
        self.primary
            .template(key)
            .or_else(|| self.fallback.template(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry;
    use survey_flow_types::TypeCode;

    #[test]
    fn bundled_store_covers_every_type() {
        let store = BundledTemplates::new();
        for code in TypeCode::ALL {
            let key = registry::template_for(code).key();
            assert!(store.template(&key).is_some(), "missing bundled {key}");
        }
        assert!(store.template("picture_choice_template").is_none());
    }

    #[test]
    fn directory_store_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("yes_no_template.tmpl"), "custom").unwrap();
        let store = DirectoryTemplates::new(dir.path());

        assert_eq!(store.template("yes_no_template").as_deref(), Some("custom"));
        assert!(store.template("rating_template").is_none());
        assert!(store.template("../yes_no_template").is_none());
    }

    #[test]
    fn layered_store_prefers_primary() {
        let primary = MapTemplates::new().with_template("yes_no_template", "mine");
        let store = LayeredTemplates::new(primary, BundledTemplates::new());

        assert_eq!(store.template("yes_no_template").as_deref(), Some("mine"));
        assert!(store.template("rating_template").is_some());
        assert!(store.template("nope").is_none());
    }
}
