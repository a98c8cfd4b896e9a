//! Command handlers

pub mod catalog;
pub mod reference;
pub mod transform;

use anyhow::{Context, Result};
use std::fs;

use super::TextInput;

/// Read the text from the inline argument or the `--file` option
pub fn read_text_input(input: &TextInput) -> Result<String> {
    match (&input.text, &input.file) {
        (Some(_), Some(_)) => {
            anyhow::bail!("Cannot specify both text and --file option")
        }
        (None, None) => {
            anyhow::bail!("Either provide the text or use --file to specify a text file")
        }
        (Some(text), None) => Ok(text.clone()),
        (None, Some(file_path)) => {
            if !file_path.exists() {
                anyhow::bail!("Text file does not exist: {}", file_path.display());
            }
            fs::read_to_string(file_path)
                .with_context(|| format!("Failed to read text file: {}", file_path.display()))
        }
    }
}
