//! Server-rendered markup for the uploader block and purchase modal.
//!
//! The markup is a contract: client logic targets the stable `data-role`
//! hooks emitted here (upload zone, resolution radios, email input, checkout
//! button, loading/error panels). Configuration and the translation/escaping/
//! options collaborators are passed in explicitly, never read from globals, so
//! tests substitute fakes through the same interfaces production uses.

pub mod attributes;
pub mod collaborators;
pub mod markup;

pub use attributes::BlockAttributes;
pub use collaborators::{
    Escape, HtmlEscape, IdentityTranslator, InMemoryOptions, OptionsStore, Translate,
    TERMS_URL_OPTION,
};
pub use markup::BlockRenderer;
