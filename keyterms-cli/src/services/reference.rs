//! ISO standards and emote lookups
//!
//! Reference data served next to the transforms: ISO country, language and
//! script records, and emoji/emoticon tokenizing. Backend failures are logged
//! and degrade to empty results.

use async_trait::async_trait;
use log::{error, info, warn};
use std::sync::Arc;

use super::transform::SelectionError;
use crate::api::{Emote, EmoteToken, IsoKind, IsoRecord};

/// Backend operations for reference lookups
#[async_trait]
pub trait ReferenceBackend: Send + Sync {
    async fn iso_lookup(&self, kind: IsoKind, query: &str) -> anyhow::Result<Vec<IsoRecord>>;

    async fn emote_tokenize(&self, text: &str) -> anyhow::Result<Vec<EmoteToken>>;

    async fn emote_define(&self, text: &str) -> anyhow::Result<Option<Emote>>;
}

/// Order lookup results for display
///
/// Languages sort by name, then code. Countries and scripts sort by their
/// numeric code. Every record's aliases are sorted as well.
pub fn sort_iso_results(kind: IsoKind, results: &mut [IsoRecord]) {
    match kind {
        IsoKind::Language => results.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.code.cmp(&b.code))
        }),
        IsoKind::Country | IsoKind::Script => results.sort_by_key(|r| r.number),
    }
    for aliases in results.iter_mut().filter_map(|r| r.aliases.as_mut()) {
        aliases.sort();
    }
}

pub struct ReferenceService {
    backend: Arc<dyn ReferenceBackend>,
}

impl ReferenceService {
    pub fn new(backend: Arc<dyn ReferenceBackend>) -> Self {
        Self { backend }
    }

    /// Sorted ISO records of `kind` matching `query`; empty on failure
    pub async fn lookup_iso(&self, kind: IsoKind, query: &str) -> Vec<IsoRecord> {
        match self.backend.iso_lookup(kind, query.trim()).await {
            Ok(mut results) => {
                sort_iso_results(kind, &mut results);
                results
            }
            Err(e) => {
                error!("Error searching {} definitions: {:#}", kind.as_str(), e);
                Vec::new()
            }
        }
    }

    /// Tokens of the trimmed text, numbered in order
    ///
    /// Blank text is rejected; a failed call yields no tokens.
    pub async fn tokenize(&self, text: &str) -> Result<Vec<EmoteToken>, SelectionError> {
        let text = text.trim();
        if text.is_empty() {
            warn!("Operation is not valid: {}", SelectionError::NoText.code());
            return Err(SelectionError::NoText);
        }

        match self.backend.emote_tokenize(text).await {
            Ok(mut tokens) => {
                for (index, token) in tokens.iter_mut().enumerate() {
                    token.index = index;
                }
                info!("Got {} tokens.", tokens.len());
                Ok(tokens)
            }
            Err(e) => {
                error!("Error tokenizing text: {:#}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Definition of an emoji or emoticon; None when unknown, blank or failed
    pub async fn define(&self, text: &str) -> Option<Emote> {
        if text.is_empty() {
            return None;
        }
        match self.backend.emote_define(text).await {
            Ok(emote) => emote,
            Err(e) => {
                error!("Error getting emote definition: {:#}", e);
                None
            }
        }
    }
}
