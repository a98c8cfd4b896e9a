//! Catalog listing and lookup commands

use anyhow::Result;
use colored::*;

use crate::catalog::{Scheme, TransformCatalog, TransformKey};

/// Label shown for a scheme in listings
pub fn scheme_label(scheme: &Scheme) -> String {
    match scheme {
        Scheme::Default => "(default)".to_string(),
        Scheme::Named(name) => name.clone(),
    }
}

/// One listing line for a key
pub fn key_line(key: &TransformKey) -> String {
    format!(
        "{}  {} -> {}  [{}]{}",
        key.text,
        key.source.text,
        key.target.text,
        scheme_label(&key.scheme),
        if key.custom { "  custom" } else { "" }
    )
}

/// Load the catalog and warn when nothing is available
async fn ensure_loaded(catalog: &TransformCatalog) -> bool {
    catalog.load(false).await;
    if !catalog.is_loaded() {
        eprintln!(
            "{}",
            "No transformation keys available (see log output for fetch errors)".yellow()
        );
        return false;
    }
    true
}

fn print_list(items: &[String], empty_message: &str) {
    if items.is_empty() {
        println!("{}", empty_message.dimmed());
        return;
    }
    for item in items {
        println!("{}", item);
    }
}

pub async fn handle_keys(catalog: &TransformCatalog, custom_only: bool) -> Result<()> {
    if !ensure_loaded(catalog).await {
        return Ok(());
    }

    let snapshot = catalog.snapshot();
    let keys = snapshot.keys();
    let mut shown = 0;
    for key in keys.iter().filter(|k| !custom_only || k.custom) {
        let line = key_line(key);
        if key.custom {
            println!("{}", line.green());
        } else {
            println!("{}", line);
        }
        shown += 1;
    }
    println!();
    println!(
        "{} of {} keys ({} distinct paths, {} custom)",
        shown.to_string().bold(),
        keys.len(),
        snapshot.full().len(),
        snapshot.custom().len()
    );
    Ok(())
}

pub async fn handle_sources(catalog: &TransformCatalog, all: bool) -> Result<()> {
    if !ensure_loaded(catalog).await {
        return Ok(());
    }
    print_list(&catalog.sources(all), "No sources");
    Ok(())
}

pub async fn handle_targets(catalog: &TransformCatalog, source: &str, all: bool) -> Result<()> {
    if !ensure_loaded(catalog).await {
        return Ok(());
    }
    print_list(
        &catalog.targets(Some(source), all),
        &format!("No targets for source '{}'", source),
    );
    Ok(())
}

pub async fn handle_schemes(
    catalog: &TransformCatalog,
    source: &str,
    target: &str,
    all: bool,
) -> Result<()> {
    if !ensure_loaded(catalog).await {
        return Ok(());
    }
    let labels: Vec<String> = catalog
        .schemes(Some(source), Some(target), all)
        .iter()
        .map(scheme_label)
        .collect();
    print_list(
        &labels,
        &format!("No schemes for '{}' -> '{}'", source, target),
    );
    Ok(())
}

pub async fn handle_resolve(
    catalog: &TransformCatalog,
    source: &str,
    target: &str,
    scheme: Option<&str>,
) -> Result<()> {
    ensure_loaded(catalog).await;

    let scheme = scheme.map(Scheme::from_text);
    match catalog.resolve_key(Some(source), Some(target), scheme.as_ref()) {
        Some(key) => {
            println!("{}", key.text.bright_green().bold());
            Ok(())
        }
        None => anyhow::bail!(
            "No transformation key for '{}' -> '{}' with scheme {}",
            source,
            target,
            scheme.as_ref().map(scheme_label).unwrap_or_else(|| "(default)".to_string())
        ),
    }
}

pub async fn handle_describe(catalog: &TransformCatalog, key_text: &str) -> Result<()> {
    let parsed = TransformKey::parse(key_text, false)?;

    println!("{} {}", format!("{:<8}", "source:").dimmed(), parsed.source.text);
    println!("{} {}", format!("{:<8}", "target:").dimmed(), parsed.target.text);
    println!("{} {}", format!("{:<8}", "scheme:").dimmed(), scheme_label(&parsed.scheme));

    ensure_loaded(catalog).await;

    let keys = catalog.keys();
    if let Some(known) = keys.iter().find(|k| k.text == parsed.text) {
        println!("{}", key_line(known).bright_green());
        return Ok(());
    }
    match catalog.resolve_key(
        Some(parsed.source.text.as_str()),
        Some(parsed.target.text.as_str()),
        Some(&parsed.scheme),
    ) {
        Some(key) => println!("{}", key_line(&key).bright_green()),
        None => println!("{}", "Not offered by the service".yellow()),
    }
    Ok(())
}
