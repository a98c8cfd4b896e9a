//! Transform key models
//!
//! A transform key names one supported (source, target, scheme) text
//! transformation. Keys arrive from the keyterms service as JSON records and
//! can also be parsed from their `source-target/scheme` identifier.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Full-match pattern for key identifiers: `source-target` or `source-target/scheme`
static KEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^-/]+)-([^/-]+)(/([^-/]+)?)?$").expect("key pattern is valid")
});

/// A named end of a transformation (a script, language, or written language)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndPoint {
    /// Display label, used as the index key
    #[serde(default)]
    pub text: String,
    /// Internal code
    #[serde(default)]
    pub code: String,
}

impl EndPoint {
    pub fn new(text: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: code.into(),
        }
    }
}

/// Transformation scheme variant between a source and a target
///
/// Identity is the scheme's display text exactly as the service reports it.
/// Blank text means "no particular scheme" and is kept as its own variant
/// rather than an empty name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Scheme {
    #[default]
    Default,
    Named(String),
}

impl Scheme {
    /// Build a scheme from display text; blank text is the default scheme
    pub fn from_text(text: &str) -> Self {
        if text.trim().is_empty() {
            Scheme::Default
        } else {
            Scheme::Named(text.to_string())
        }
    }

    /// Display text, empty for the default scheme
    pub fn as_str(&self) -> &str {
        match self {
            Scheme::Default => "",
            Scheme::Named(name) => name,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Scheme::Default)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite lookup path of a key inside an index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    pub source: String,
    pub target: String,
    pub scheme: Scheme,
}

impl KeyPath {
    pub fn new(source: impl Into<String>, target: impl Into<String>, scheme: Scheme) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            scheme,
        }
    }
}

/// One supported text transformation as reported by the keyterms service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireKey", into = "WireKey")]
pub struct TransformKey {
    pub source: EndPoint,
    pub target: EndPoint,
    pub scheme: Scheme,
    /// Service code of the scheme, carried through but never used for lookups
    pub scheme_code: String,
    /// Curated/preferred key, shown in the filtered catalog view
    pub custom: bool,
    /// Stable identifier sent back when invoking the transform
    pub text: String,
}

/// Wire shape of a key, with the scheme as an `{ text, code }` record
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireKey {
    source: EndPoint,
    target: EndPoint,
    #[serde(default)]
    scheme: EndPoint,
    #[serde(default)]
    custom: bool,
    text: String,
}

impl From<WireKey> for TransformKey {
    fn from(wire: WireKey) -> Self {
        Self {
            source: wire.source,
            target: wire.target,
            scheme: Scheme::from_text(&wire.scheme.text),
            scheme_code: wire.scheme.code,
            custom: wire.custom,
            text: wire.text,
        }
    }
}

impl From<TransformKey> for WireKey {
    fn from(key: TransformKey) -> Self {
        Self {
            source: key.source,
            target: key.target,
            scheme: EndPoint::new(key.scheme.as_str(), key.scheme_code),
            custom: key.custom,
            text: key.text,
        }
    }
}

/// Error parsing a key identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    Blank,
    Malformed(String),
}

impl fmt::Display for KeyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyParseError::Blank => write!(f, "Transform key text is blank"),
            KeyParseError::Malformed(text) => {
                write!(
                    f,
                    "Invalid transform key '{}' - expected 'source-target' or 'source-target/scheme'",
                    text
                )
            }
        }
    }
}

impl std::error::Error for KeyParseError {}

impl TransformKey {
    /// Parse a key from its identifier text
    ///
    /// Each component doubles as display text and code, so parsed keys resolve
    /// through the same index paths as fetched keys with matching labels.
    pub fn parse(text: &str, custom: bool) -> Result<Self, KeyParseError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(KeyParseError::Blank);
        }

        let captures = KEY_PATTERN
            .captures(trimmed)
            .ok_or_else(|| KeyParseError::Malformed(trimmed.to_string()))?;

        let source = &captures[1];
        let target = &captures[2];
        let scheme = captures.get(4).map(|m| m.as_str()).unwrap_or_default();

        Ok(Self {
            source: EndPoint::new(source, source),
            target: EndPoint::new(target, target),
            scheme: Scheme::from_text(scheme),
            scheme_code: scheme.to_string(),
            custom,
            text: trimmed.to_string(),
        })
    }

    /// Index path of this key
    pub fn path(&self) -> KeyPath {
        KeyPath::new(&self.source.text, &self.target.text, self.scheme.clone())
    }

    /// Human-readable `source-target/scheme` label built from display texts
    pub fn path_label(&self) -> String {
        if self.scheme.is_default() {
            format!("{}-{}", self.source.text, self.target.text)
        } else {
            format!("{}-{}/{}", self.source.text, self.target.text, self.scheme)
        }
    }
}

impl fmt::Display for TransformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
