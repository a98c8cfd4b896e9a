//! Command-line interface definitions

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::api::IsoKind;

#[derive(Parser, Debug)]
#[command(
    name = "keyterms-cli",
    version,
    about = "Browse transformation keys and transform text with the keyterms services"
)]
pub struct Cli {
    /// keyterms service root (overrides config and KEYTERMS_URL)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Path to a config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose logging (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List loaded transformation keys
    Keys {
        /// Only keys flagged as custom
        #[arg(long)]
        custom: bool,
    },
    /// List source scripts
    Sources {
        /// Include every source, not only custom ones
        #[arg(long)]
        all: bool,
    },
    /// List targets available for a source
    Targets {
        source: String,
        #[arg(long)]
        all: bool,
    },
    /// List schemes available between a source and a target
    Schemes {
        source: String,
        target: String,
        #[arg(long)]
        all: bool,
    },
    /// Resolve a selection to its transformation key
    Resolve {
        source: String,
        target: String,
        /// Scheme name; omit for the default scheme
        scheme: Option<String>,
    },
    /// Parse a key identifier such as `cyr-lat/bgn` and look it up
    Describe {
        key: String,
    },
    /// Transform text
    Transform(TransformArgs),
    /// Show which writing scripts a text uses
    Profile(TextInput),
    /// Look up ISO country, language or script records
    Iso {
        #[arg(value_enum)]
        kind: IsoKind,
        /// Name, code or alias to search for
        query: String,
    },
    /// Find and define emoji and emoticons
    Emoji {
        #[command(subcommand)]
        command: EmojiCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum EmojiCommands {
    /// Split text into emoji, emoticon and plain text tokens
    Tokenize(TextInput),
    /// Show the definition of one emoji or emoticon
    Define {
        text: String,
    },
}

#[derive(Args, Debug)]
pub struct TransformArgs {
    pub source: String,
    pub target: String,
    /// Scheme name; omit for the default scheme
    #[arg(long)]
    pub scheme: Option<String>,
    #[command(flatten)]
    pub input: TextInput,
}

/// Text given inline or read from a file
#[derive(Args, Debug)]
pub struct TextInput {
    /// Text to process
    pub text: Option<String>,
    /// Read the text from a file instead
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}
