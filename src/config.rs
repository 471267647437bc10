//! Configuration for extraction and document generation.
//!
//! All behaviour is controlled through [`GenerationConfig`], built via its
//! [`GenerationConfigBuilder`]. The original service this crate replaces
//! kept these knobs as module-level globals (a process-wide template
//! directory, a process-wide OCR language, the interpreter's locale); here
//! every one of them is explicit, so two requests with different settings
//! can run side by side and tests can pin the clock.

use crate::error::ContractError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a render/extraction request.
///
/// Built via [`GenerationConfig::builder()`] or using
/// [`GenerationConfig::default()`].
///
/// # Example
/// ```rust
/// use ficha2contrato::GenerationConfig;
///
/// let config = GenerationConfig::builder()
///     .template_dir("plantillas")
///     .output_dir("generated")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Directory where template documents live. Default: `"plantillas"`.
    ///
    /// Template names in a request are resolved against this directory and
    /// never treated as absolute paths, so a request cannot escape it.
    pub template_dir: PathBuf,

    /// Directory where rendered documents are written. Default: `"generated"`.
    ///
    /// Each request writes into `<output_dir>/<request_id>/`, so concurrent
    /// requests — even for subjects with identical names — never collide.
    pub output_dir: PathBuf,

    /// Language tag passed to the text-recognition collaborator. Default: `"spa"`.
    pub language: String,

    /// Fixed "today" for representative-age derivation. Default: `None`.
    ///
    /// When `None`, the current local date is used. Tests pin this so age
    /// arithmetic is deterministic.
    pub today: Option<NaiveDate>,

    /// Remote path prefix handed to the document-storage collaborator when
    /// the full scan flow uploads a rendered contract.
    /// Default: `"/Documentos_Legales/Contratos"`.
    pub storage_prefix: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from("plantillas"),
            output_dir: PathBuf::from("generated"),
            language: "spa".to_string(),
            today: None,
            storage_prefix: "/Documentos_Legales/Contratos".to_string(),
        }
    }
}

impl GenerationConfig {
    /// Create a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }

    /// The date used for age derivation: the pinned override, or today.
    pub fn effective_today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.template_dir = dir.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.language = lang.into();
        self
    }

    pub fn today(mut self, date: NaiveDate) -> Self {
        self.config.today = Some(date);
        self
    }

    pub fn storage_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.storage_prefix = prefix.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, ContractError> {
        let c = &self.config;
        if c.language.trim().is_empty() {
            return Err(ContractError::InvalidConfig(
                "Recognition language must not be empty".into(),
            ));
        }
        if c.template_dir.as_os_str().is_empty() {
            return Err(ContractError::InvalidConfig(
                "Template directory must not be empty".into(),
            ));
        }
        if c.output_dir.as_os_str().is_empty() {
            return Err(ContractError::InvalidConfig(
                "Output directory must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
