//! Text transformation service
//!
//! Validates a (source, target, scheme) selection against the catalog,
//! resolves it to a transform key and runs the transformation on the backend.
//! Backend failures degrade to empty results and are logged.

use async_trait::async_trait;
use log::{error, warn};
use std::fmt;
use std::sync::Arc;

use crate::api::ScriptProfile;
use crate::catalog::{Scheme, TransformCatalog, TransformKey};

/// Backend operations that act on text
#[async_trait]
pub trait TransformBackend: Send + Sync {
    async fn transform(&self, text: &str, key: &TransformKey) -> anyhow::Result<String>;

    async fn profile_text(&self, text: &str) -> anyhow::Result<ScriptProfile>;
}

/// Why a selection cannot be transformed, checked in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionError {
    NoText,
    NoSource,
    NoTarget,
    NoScheme,
}

impl SelectionError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            SelectionError::NoText => "no_text",
            SelectionError::NoSource => "no_source",
            SelectionError::NoTarget => "no_target",
            SelectionError::NoScheme => "no_scheme",
        }
    }
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::NoText => write!(f, "No text to transform"),
            SelectionError::NoSource => write!(f, "No source selected"),
            SelectionError::NoTarget => write!(f, "No target selected"),
            SelectionError::NoScheme => {
                write!(f, "No transformation exists for the selected scheme")
            }
        }
    }
}

impl std::error::Error for SelectionError {}

/// A user's choice of transformation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub source: Option<String>,
    pub target: Option<String>,
    pub scheme: Option<Scheme>,
}

impl Selection {
    pub fn new(source: Option<&str>, target: Option<&str>, scheme: Option<&str>) -> Self {
        Self {
            source: source.map(str::to_string),
            target: target.map(str::to_string),
            scheme: scheme.map(Scheme::from_text),
        }
    }
}

/// Trimmed text, or None when nothing but whitespace remains
fn input_text(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

pub struct TransformService<'a> {
    catalog: &'a TransformCatalog,
    backend: Arc<dyn TransformBackend>,
}

impl<'a> TransformService<'a> {
    pub fn new(catalog: &'a TransformCatalog, backend: Arc<dyn TransformBackend>) -> Self {
        Self { catalog, backend }
    }

    /// Check that `text` and `selection` name a transformable key
    pub fn check(&self, text: &str, selection: &Selection) -> Result<TransformKey, SelectionError> {
        if input_text(text).is_none() {
            return Err(SelectionError::NoText);
        }
        let source = selection
            .source
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(SelectionError::NoSource)?;
        let target = selection
            .target
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(SelectionError::NoTarget)?;

        self.catalog
            .resolve_key(Some(source), Some(target), selection.scheme.as_ref())
            .ok_or(SelectionError::NoScheme)
    }

    /// Transform `text` with `key`; empty when there is nothing to do or the
    /// backend fails
    pub async fn transform(&self, text: &str, key: Option<&TransformKey>) -> String {
        let (Some(text), Some(key)) = (input_text(text), key) else {
            return String::new();
        };
        match self.backend.transform(text, key).await {
            Ok(result) => result,
            Err(e) => {
                error!("Error transforming text: {:#}", e);
                String::new()
            }
        }
    }

    /// Validate the selection, then transform the trimmed text
    pub async fn transform_selection(
        &self,
        text: &str,
        selection: &Selection,
    ) -> Result<String, SelectionError> {
        let key = self.check(text, selection).inspect_err(|e| {
            warn!("Operation is not valid: {}", e.code());
        })?;
        Ok(self.transform(text, Some(&key)).await)
    }

    /// Script profile of `text`; the empty profile for blank text or failures
    pub async fn profile(&self, text: &str) -> ScriptProfile {
        let Some(text) = input_text(text) else {
            return ScriptProfile::none();
        };
        match self.backend.profile_text(text).await {
            Ok(profile) => profile,
            Err(e) => {
                error!("Error profiling text: {:#}", e);
                ScriptProfile::none()
            }
        }
    }
}
