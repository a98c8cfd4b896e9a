//! keyterms REST service client
//!
//! Thin HTTP layer over the keyterms service: the transformation key list that
//! feeds the catalog, text transformation through a resolved key, script
//! profiling, ISO standard lookups and emote tokenizing.

pub mod client;
pub mod config;
pub mod models;

pub use client::KeytermsClient;
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL};
pub use models::{Emote, EmoteToken, IsoKind, IsoRecord, ProfileEntry, ScriptProfile};
