//! keyterms service response models

use serde::{Deserialize, Serialize};

/// Breakdown of the writing scripts found in a text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptProfile {
    /// Total code points examined
    #[serde(default)]
    pub code_points: u64,
    #[serde(default)]
    pub entries: Vec<ProfileEntry>,
}

/// Code point count for one script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileEntry {
    /// Script as reported by the service (a name string or a script record)
    #[serde(default)]
    pub script: serde_json::Value,
    #[serde(default)]
    pub code_points: u64,
}

impl ProfileEntry {
    /// Best display label for the script
    pub fn script_label(&self) -> String {
        match &self.script {
            serde_json::Value::String(name) => name.clone(),
            serde_json::Value::Object(fields) => ["name", "text", "code"]
                .iter()
                .find_map(|field| fields.get(*field).and_then(|v| v.as_str()))
                .map(str::to_string)
                .unwrap_or_else(|| self.script.to_string()),
            serde_json::Value::Null => "unknown".to_string(),
            other => other.to_string(),
        }
    }
}

impl ScriptProfile {
    /// Profile used when no text was profiled or the call failed
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.code_points == 0 && self.entries.is_empty()
    }

    /// Rounded share of the profile's code points held by `entry`, 0 when the
    /// profile is empty
    pub fn percent(&self, entry: &ProfileEntry) -> u64 {
        if self.code_points == 0 {
            return 0;
        }
        (entry.code_points as f64 * 100.0 / self.code_points as f64).round() as u64
    }
}

/// Kind of ISO standard record to look up
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum IsoKind {
    /// ISO 3166 countries
    Country,
    /// ISO 639 languages
    Language,
    /// ISO 15924 scripts
    Script,
}

impl IsoKind {
    /// Path segment of the lookup endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            IsoKind::Country => "country",
            IsoKind::Language => "language",
            IsoKind::Script => "script",
        }
    }
}

/// One ISO standard record matching a lookup
///
/// Only the fields used for ordering and display are typed. The rest of the
/// record (ISO alpha codes, scope, member languages, ...) is kept in `details`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IsoRecord {
    /// Numeric code (countries and scripts)
    #[serde(default)]
    pub number: Option<i64>,
    #[serde(default)]
    pub code: Option<String>,
    /// Name; languages report it as `englishName`
    #[serde(default, alias = "englishName")]
    pub name: Option<String>,
    #[serde(default)]
    pub aliases: Option<Vec<String>>,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

/// Emoji or emoticon definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Emote {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

/// One token of text split into emotes and plain text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmoteToken {
    /// `TEXT`, `EMOJI` or `EMOTICON`
    #[serde(rename = "type")]
    pub kind: String,
    /// Offset of the token in the tokenized text
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub text: String,
    /// Emote definition for emote tokens
    #[serde(default)]
    pub data: serde_json::Value,
    /// Position in the token list, assigned after tokenizing
    #[serde(skip)]
    pub index: usize,
}

impl EmoteToken {
    pub fn is_text(&self) -> bool {
        self.kind.eq_ignore_ascii_case("text")
    }

    /// Description of the emote carried by this token, if any
    pub fn description(&self) -> Option<&str> {
        self.data.get("description").and_then(|d| d.as_str())
    }
}
