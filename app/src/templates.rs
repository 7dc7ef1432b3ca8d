//! Template loading
//!
//! Templates are HTML fragments the host renders entries and windows with.
//! They live in one directory; every required template must be present and
//! readable or the whole load fails.

use std::path::PathBuf;

use async_trait::async_trait;
use pricelens_core::{PortError, TemplateLoader, TemplateSet};
use tracing::debug;

const TEMPLATE_EXTENSION: &str = "html";

/// Templates the host cannot start without
pub const REQUIRED_TEMPLATES: &[&str] = &["gui", "text-entry", "price-entry"];

/// Environment variable overriding the template directory
pub const TEMPLATE_DIR_ENV: &str = "PRICELENS_TEMPLATE_DIR";

pub fn template_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(TEMPLATE_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pricelens")
        .join("templates")
}

pub struct DirectoryTemplates {
    root: PathBuf,
}

impl DirectoryTemplates {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl TemplateLoader for DirectoryTemplates {
    async fn load(&self) -> Result<TemplateSet, PortError> {
        let mut dir = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| PortError::Io(format!("{}: {e}", self.root.display())))?;

        let mut names = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            // Unreadable templates fail the whole set
            tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| PortError::Io(format!("{}: {e}", path.display())))?;
            debug!(name, "Template found");
            names.push(name.to_string());
        }
        names.sort();

        let missing: Vec<_> = REQUIRED_TEMPLATES
            .iter()
            .filter(|required| !names.iter().any(|n| n == *required))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(PortError::InvalidData(format!(
                "missing templates in {}: {}",
                self.root.display(),
                missing.join(", ")
            )));
        }

        Ok(TemplateSet {
            root: self.root.clone(),
            names,
        })
    }
}
