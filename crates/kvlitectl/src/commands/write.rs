//! Mutating commands: set, merge and remove.

use anyhow::{Context, Result};
use kvlite::AsyncKvStorage;
use serde::Serialize;

use crate::OutputFormat;

#[derive(Serialize)]
struct WriteOutput {
    key: String,
    value: Option<String>,
}

#[derive(Serialize)]
struct RemoveOutput {
    requested: usize,
    removed: usize,
}

pub async fn set(
    storage: &AsyncKvStorage,
    key: String,
    value: String,
    format: OutputFormat,
) -> Result<()> {
    storage
        .set(key.clone(), value)
        .await
        .with_context(|| format!("failed to write key {key}"))?;
    report_value(storage, key, format).await
}

pub async fn merge(
    storage: &AsyncKvStorage,
    key: String,
    json: String,
    format: OutputFormat,
) -> Result<()> {
    storage
        .merge(key.clone(), json)
        .await
        .with_context(|| format!("failed to merge into key {key}"))?;
    report_value(storage, key, format).await
}

pub async fn remove(storage: &AsyncKvStorage, keys: Vec<String>, format: OutputFormat) -> Result<()> {
    let requested = keys.len();
    let removed = storage.remove(keys).await.context("failed to remove keys")?;

    match format {
        OutputFormat::Text => println!("Removed {removed} of {requested} key(s)"),
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&RemoveOutput { requested, removed })?
            );
        }
    }

    Ok(())
}

/// Print the value now stored under `key`.
async fn report_value(storage: &AsyncKvStorage, key: String, format: OutputFormat) -> Result<()> {
    let value = storage.get(key.clone()).await?;

    match format {
        OutputFormat::Text => println!("{key} = {}", value.as_deref().unwrap_or("(not found)")),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&WriteOutput { key, value })?);
        }
    }

    Ok(())
}
