//! Case directory configuration.

use serde::{Deserialize, Serialize};

fn default_base_dir() -> String {
    "2D_Image".to_string()
}

fn default_reference_file() -> String {
    "text.txt".to_string()
}

fn default_generated_file() -> String {
    "pred.txt".to_string()
}

fn default_image_extensions() -> Vec<String> {
    vec!["png".into(), "jpg".into(), "jpeg".into()]
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Directory holding one sub-directory per case.
    #[serde(default = "default_base_dir")]
    pub base_dir: String,

    /// Reference report file name inside each case directory.
    #[serde(default = "default_reference_file")]
    pub reference_file: String,

    /// Generated report file name inside each case directory.
    #[serde(default = "default_generated_file")]
    pub generated_file: String,

    /// Image slice extensions, matched case-insensitively.
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            reference_file: default_reference_file(),
            generated_file: default_generated_file(),
            image_extensions: default_image_extensions(),
        }
    }
}

impl CatalogConfig {
    /// Whether `file_name` has one of the configured image extensions.
    #[must_use]
    pub fn is_image(&self, file_name: &str) -> bool {
        file_name.rsplit_once('.').is_some_and(|(_, ext)| {
            self.image_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        })
    }
}
