//! Collaborator interfaces consumed by the renderer.
//!
//! Each capability is a trait so tests can inject fakes instead of
//! monkey-patching anything global: translation, output escaping, and the
//! options store that carries site-wide settings like the terms URL.

use std::borrow::Cow;
use std::collections::HashMap;

/// Options-store key for the configured terms-and-conditions URL.
pub const TERMS_URL_OPTION: &str = "pixelift_terms_conditions_url";

/// Translation capability for user-visible strings.
pub trait Translate: Send + Sync {
    fn translate<'a>(&self, text: &'a str) -> Cow<'a, str>;
}

/// Pass-through translator for the source locale.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityTranslator;

impl Translate for IdentityTranslator {
    fn translate<'a>(&self, text: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(text)
    }
}

/// Output-context-aware escaping.
///
/// Every interpolation in the markup goes through the method matching where
/// it lands: element text, attribute value, or URL.
pub trait Escape: Send + Sync {
    fn html(&self, text: &str) -> String;
    fn attr(&self, text: &str) -> String;
    fn url(&self, url: &str) -> String;
}

/// Standard HTML escaping.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlEscape;

fn escape_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

impl Escape for HtmlEscape {
    fn html(&self, text: &str) -> String {
        escape_chars(text)
    }

    fn attr(&self, text: &str) -> String {
        escape_chars(text)
    }

    fn url(&self, url: &str) -> String {
        // URLs in attributes: percent-encode the characters that could break
        // out of the attribute or start markup, entity-escape the rest.
        let mut out = String::with_capacity(url.len());
        for ch in url.chars() {
            match ch {
                '"' => out.push_str("%22"),
                '\'' => out.push_str("%27"),
                '<' => out.push_str("%3C"),
                '>' => out.push_str("%3E"),
                ' ' => out.push_str("%20"),
                '&' => out.push_str("&amp;"),
                other => out.push(other),
            }
        }
        out
    }
}

/// Site-wide key/value settings store.
pub trait OptionsStore: Send + Sync {
    /// Fetch a configured option; `None` when unset.
    fn get(&self, key: &str) -> Option<String>;
}

/// In-memory options store (tests, single-process deployments).
#[derive(Debug, Default, Clone)]
pub struct InMemoryOptions {
    values: HashMap<String, String>,
}

impl InMemoryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl OptionsStore for InMemoryOptions {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
