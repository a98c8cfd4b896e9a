//! ISO lookup and emoji commands

use anyhow::Result;
use colored::*;

use crate::api::{Emote, EmoteToken, IsoKind, IsoRecord};
use crate::cli::TextInput;
use crate::cli::commands::read_text_input;
use crate::services::ReferenceService;

/// One listing line for an ISO record
pub fn iso_line(record: &IsoRecord) -> String {
    let mut line = match record.number {
        Some(number) => format!("{:>3}  ", number),
        None => String::new(),
    };
    line.push_str(&format!(
        "{:<4} {}",
        record.code.as_deref().unwrap_or("-"),
        record.name.as_deref().unwrap_or("")
    ));
    if let Some(aliases) = record.aliases.as_ref().filter(|a| !a.is_empty()) {
        line.push_str(&format!("  ({})", aliases.join(", ")));
    }
    line
}

/// One listing line for a token
pub fn token_line(token: &EmoteToken) -> String {
    let mut line = format!("{:>3}  {:<9} {:?}", token.index, token.kind, token.text);
    if let Some(description) = token.description() {
        line.push_str(&format!("  {}", description));
    }
    line
}

pub async fn handle_iso(service: &ReferenceService, kind: IsoKind, query: &str) -> Result<()> {
    let results = service.lookup_iso(kind, query).await;
    if results.is_empty() {
        println!("{}", format!("No {} matches '{}'", kind.as_str(), query).dimmed());
        return Ok(());
    }
    for record in &results {
        println!("{}", iso_line(record));
    }
    Ok(())
}

pub async fn handle_emoji_tokenize(service: &ReferenceService, input: TextInput) -> Result<()> {
    let text = read_text_input(&input)?;
    let tokens = service.tokenize(&text).await?;

    for token in &tokens {
        let line = token_line(token);
        if token.is_text() {
            println!("{}", line);
        } else {
            println!("{}", line.bright_yellow());
        }
    }
    Ok(())
}

fn print_emote(emote: &Emote) {
    println!("{}", emote.text.bold());
    if let Some(description) = &emote.description {
        println!("{} {}", format!("{:<13}", "description:").dimmed(), description);
    }
    if !emote.labels.is_empty() {
        println!("{} {}", format!("{:<13}", "labels:").dimmed(), emote.labels.join(", "));
    }
    if !emote.tags.is_empty() {
        println!("{} {}", format!("{:<13}", "tags:").dimmed(), emote.tags.join(", "));
    }
}

pub async fn handle_emoji_define(service: &ReferenceService, text: &str) -> Result<()> {
    match service.define(text).await {
        Some(emote) => {
            print_emote(&emote);
            Ok(())
        }
        None => anyhow::bail!("No emoji or emoticon definition for '{}'", text),
    }
}
