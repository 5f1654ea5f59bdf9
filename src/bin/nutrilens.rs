// ABOUTME: nutrilens CLI - analyze meal text, apply slot answers, and adapt shadow DTOs
// ABOUTME: Every command prints JSON on stdout; logs go to stderr
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Analyze a meal description
//! nutrilens analyze "とんかつ定食"
//!
//! # Force the deterministic dictionary and harden the result
//! nutrilens analyze "牛丼 大盛り" --provider dict --harden
//!
//! # Answer a refinement slot
//! nutrilens apply-slot --items '[{"code":"rice_cooked","name":"ごはん","grams":200}]' \
//!     --key rice_size --value 300
//!
//! # Convert a shadow DTO file into the legacy response
//! nutrilens adapt shadow.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use nutrilens::adapters::adapt_shadow_to_legacy;
use nutrilens::config::{NutritionConfig, ProviderMode};
use nutrilens::logging;
use nutrilens::providers::AnalyzeRequest;
use nutrilens::service::NutritionService;
use nutrilens::{AnalyzedItem, SlotSelection, SlotValue};
use nutrilens_core::constants::estimator::DEFAULT_LOCALE;
use serde::Serialize;
use tokio::fs;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "nutrilens",
    about = "Meal nutrition estimation",
    long_about = "Estimate protein, fat, carbohydrate, and calories for free-text meal descriptions."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Analyze a meal description
    Analyze {
        /// Meal text, e.g. "カツカレー"
        text: String,

        /// Locale of the text
        #[arg(long, default_value = DEFAULT_LOCALE)]
        locale: String,

        /// Provider stack override (ai, hybrid, dict)
        #[arg(long)]
        provider: Option<String>,

        /// Print the guardrail-hardened payload instead of the raw result
        #[arg(long)]
        harden: bool,
    },

    /// Apply a slot answer to an item list
    ApplySlot {
        /// Items as a JSON array
        #[arg(long)]
        items: String,

        /// Slot key (portion_size, rice_size, pork_cut)
        #[arg(long)]
        key: String,

        /// Chosen option; numbers are read as grams
        #[arg(long)]
        value: String,

        /// Archetype that produced the items
        #[arg(long)]
        archetype: Option<String>,
    },

    /// Convert a shadow DTO JSON file into the legacy response
    Adapt {
        /// Path to the DTO file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_from_env()?;
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze {
            text,
            locale,
            provider,
            harden,
        } => analyze(&text, locale, provider.as_deref(), harden).await,
        Command::ApplySlot {
            items,
            key,
            value,
            archetype,
        } => apply_slot(&items, key, &value, archetype.as_deref()),
        Command::Adapt { file } => adapt(&file).await,
    }
}

async fn analyze(
    text: &str,
    locale: String,
    provider: Option<&str>,
    harden: bool,
) -> Result<()> {
    let mut config = NutritionConfig::from_env();
    if let Some(raw) = provider {
        let mode: ProviderMode = raw.parse().map_err(|err: String| anyhow!(err))?;
        config = config.with_provider(mode);
    }

    let service = NutritionService::with_env_client(config)?;
    let request = AnalyzeRequest::new(text).with_locale(locale);
    let result = service.analyze(request).await?;
    debug!(dish = %result.dish, "Analysis complete");

    if harden {
        print_json(&service.harden(&result, text))
    } else {
        print_json(&result)
    }
}

fn apply_slot(items: &str, key: String, value: &str, archetype: Option<&str>) -> Result<()> {
    let items: Vec<AnalyzedItem> =
        serde_json::from_str(items).map_err(|err| anyhow!("invalid --items JSON: {err}"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_or_else(|_| SlotValue::Text(value.to_owned()), SlotValue::Number);
    let updated = NutritionService::apply_slot(&items, &SlotSelection::new(key, value), archetype)?;
    print_json(&updated)
}

async fn adapt(file: &Path) -> Result<()> {
    let raw = fs::read_to_string(file)
        .await
        .map_err(|err| anyhow!("cannot read {}: {err}", file.display()))?;
    let dto: serde_json::Value = serde_json::from_str(&raw)?;
    print_json(&adapt_shadow_to_legacy(&dto)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
