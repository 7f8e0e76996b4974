//! # Configuration
//!
//! Editor configuration is managed by [`confique`], which merges layered
//! sources into one [`EditorConfig`].
//!
//! ## Storage Hierarchy
//!
//! Configuration is resolved in priority order:
//! 1. **Environment variables**: `QUIRE_PAGE_SPACING`, `QUIRE_FILE_EXT`, etc.
//! 2. **Config file**: a `quire.toml` passed to [`EditorConfig::load`]. A
//!    missing file is skipped.
//! 3. **Compiled Defaults**: Built-in fallbacks via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `page_spacing` | `10.0` | Vertical gap around every page in the stack |
//! | `horizontal_padding` | `0.0` | Gap on each side of a page |
//! | `rescale_epsilon` | `1.0` | Width change below which page content is left alone |
//! | `default_page_width` | `768.0` | Width of pages in a new document |
//! | `default_page_height` | `1024.0` | Height of pages in a new document |
//! | `file_ext` | `.quire` | Extension of stored documents |
//! | `documents_dir` | OS data dir | Where the document listing looks |

use std::path::{Path, PathBuf};

use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::Size;
use crate::sync::LayoutMetrics;

/// Configuration for the editor, stored in `quire.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EditorConfig {
    #[config(default = 10.0, env = "QUIRE_PAGE_SPACING")]
    pub page_spacing: f64,

    #[config(default = 0.0, env = "QUIRE_HORIZONTAL_PADDING")]
    pub horizontal_padding: f64,

    /// Pages whose content width is within this many points of the display
    /// width are not rescaled.
    #[config(default = 1.0, env = "QUIRE_RESCALE_EPSILON")]
    pub rescale_epsilon: f64,

    #[config(default = 768.0, env = "QUIRE_DEFAULT_PAGE_WIDTH")]
    pub default_page_width: f64,

    #[config(default = 1024.0, env = "QUIRE_DEFAULT_PAGE_HEIGHT")]
    pub default_page_height: f64,

    /// Extension for stored documents (e.g., ".quire")
    #[config(default = ".quire", env = "QUIRE_FILE_EXT")]
    pub file_ext: String,

    #[config(env = "QUIRE_DOCUMENTS_DIR")]
    pub documents_dir: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            page_spacing: 10.0,
            horizontal_padding: 0.0,
            rescale_epsilon: 1.0,
            default_page_width: 768.0,
            default_page_height: 1024.0,
            file_ext: ".quire".to_string(),
            documents_dir: None,
        }
    }
}

impl EditorConfig {
    /// Load from the environment and, when given, a TOML file.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(path) = file {
            builder = builder.file(path);
        }
        Ok(builder.load()?)
    }

    /// Get the file extension, normalized to start with a dot.
    pub fn file_ext(&self) -> String {
        if self.file_ext.starts_with('.') {
            self.file_ext.clone()
        } else {
            format!(".{}", self.file_ext)
        }
    }

    pub fn default_page_size(&self) -> Size {
        Size::new(self.default_page_width, self.default_page_height)
    }

    /// Configured documents directory, else the OS data directory.
    pub fn documents_dir(&self) -> Option<PathBuf> {
        self.documents_dir.clone().or_else(|| {
            ProjectDirs::from("com", "quire", "quire").map(|dirs| dirs.data_dir().join("documents"))
        })
    }

    pub fn layout_metrics(&self) -> LayoutMetrics {
        LayoutMetrics {
            page_spacing: self.page_spacing,
            horizontal_padding: self.horizontal_padding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = EditorConfig::default();
        assert_eq!(config.file_ext, ".quire");
        assert_eq!(config.default_page_size(), Size::new(768.0, 1024.0));
        assert_eq!(config.layout_metrics(), LayoutMetrics::default());
    }

    #[test]
    fn test_file_ext_normalization_with_dot() {
        let config = EditorConfig {
            file_ext: ".notes".to_string(),
            ..Default::default()
        };
        assert_eq!(config.file_ext(), ".notes");
    }

    #[test]
    fn test_file_ext_normalization_without_dot() {
        let config = EditorConfig {
            file_ext: "notes".to_string(),
            ..Default::default()
        };
        assert_eq!(config.file_ext(), ".notes");
    }

    #[test]
    fn test_documents_dir_override() {
        let config = EditorConfig {
            documents_dir: Some(PathBuf::from("/tmp/docs")),
            ..Default::default()
        };
        assert_eq!(config.documents_dir(), Some(PathBuf::from("/tmp/docs")));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quire.toml");
        fs::write(&path, "page_spacing = 16.0\nfile_ext = \"ink\"\n").unwrap();

        let config = EditorConfig::load(Some(&path)).unwrap();
        assert_eq!(config.page_spacing, 16.0);
        assert_eq!(config.file_ext(), ".ink");
        assert_eq!(config.rescale_epsilon, 1.0);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = EditorConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.default_page_width, 768.0);
        assert_eq!(config.horizontal_padding, 0.0);
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quire.toml");
        fs::write(&path, "page_spacing = \"wide\"\n").unwrap();
        assert!(matches!(
            EditorConfig::load(Some(&path)),
            Err(crate::error::QuireError::Config(_))
        ));
    }
}
