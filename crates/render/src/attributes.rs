use serde::{Deserialize, Serialize};

use pixelift_checkout::DEFAULT_MAX_FILE_SIZE_MB;

/// Editor-supplied configuration for one uploader block instance.
///
/// Unset attributes fall back to the defaults below, so a block dropped into
/// a post with no tweaks still renders a complete surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockAttributes {
    pub title: String,
    pub description: String,
    pub max_file_size_mb: u32,
    pub show_terms_link: bool,
}

impl Default for BlockAttributes {
    fn default() -> Self {
        Self {
            title: "Get a high-resolution version".to_string(),
            description: "Upload an image and buy an upscaled copy, delivered by email."
                .to_string(),
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
            show_terms_link: false,
        }
    }
}
