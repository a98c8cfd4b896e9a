//! Transform and profile command handlers

use anyhow::{Context, Result};
use colored::*;
use log::info;
use std::time::Instant;

use crate::api::{ProfileEntry, ScriptProfile};
use crate::catalog::TransformCatalog;
use crate::cli::commands::read_text_input;
use crate::cli::{TextInput, TransformArgs};
use crate::services::{Selection, TransformService};

/// Handle the transform command
pub async fn handle_transform_command(
    args: TransformArgs,
    catalog: &TransformCatalog,
    service: &TransformService<'_>,
) -> Result<()> {
    let text = read_text_input(&args.input)?;

    catalog.load(false).await;

    let selection = Selection::new(
        Some(args.source.as_str()),
        Some(args.target.as_str()),
        args.scheme.as_deref(),
    );

    let start = Instant::now();
    let transformed = service
        .transform_selection(&text, &selection)
        .await
        .context("Cannot transform text")?;
    info!(
        "Transform took {:.2}ms",
        start.elapsed().as_secs_f64() * 1000.0
    );

    if transformed.is_empty() {
        anyhow::bail!("The service returned no transformation (see log output for errors)");
    }

    for line in transformed.trim().lines() {
        println!("{}", line.trim());
    }
    Ok(())
}

/// Render one profile entry line
pub fn profile_line(profile: &ScriptProfile, entry: &ProfileEntry) -> String {
    format!(
        "{:>4}%  {:<12} {} code points",
        profile.percent(entry),
        entry.script_label(),
        entry.code_points
    )
}

/// Handle the profile command
pub async fn handle_profile_command(input: TextInput, service: &TransformService<'_>) -> Result<()> {
    let text = read_text_input(&input)?;
    let profile = service.profile(&text).await;

    if profile.is_empty() {
        println!("{}", "No script profile available".dimmed());
        return Ok(());
    }

    println!(
        "{} code points",
        profile.code_points.to_string().bold()
    );
    for entry in &profile.entries {
        println!("{}", profile_line(&profile, entry));
    }
    Ok(())
}
