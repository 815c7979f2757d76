//! Read-only commands: get and keys.

use anyhow::{Context, Result};
use kvlite::AsyncKvStorage;
use serde::Serialize;

use crate::OutputFormat;

#[derive(Serialize)]
struct GetOutput {
    key: String,
    value: Option<String>,
}

#[derive(Serialize)]
struct KeysOutput {
    keys: Vec<String>,
    total: usize,
}

pub async fn get(storage: &AsyncKvStorage, key: String, format: OutputFormat) -> Result<()> {
    let value = storage
        .get(key.clone())
        .await
        .with_context(|| format!("failed to read key {key}"))?;

    match format {
        OutputFormat::Text => match &value {
            Some(value) => println!("{value}"),
            None => println!("(not found)"),
        },
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&GetOutput { key, value })?);
        }
    }

    Ok(())
}

pub async fn keys(storage: &AsyncKvStorage, format: OutputFormat) -> Result<()> {
    let mut keys = storage.list_keys().await.context("failed to list keys")?;
    // Engine order is unspecified; sort for stable output
    keys.sort();

    let output = KeysOutput {
        total: keys.len(),
        keys,
    };

    match format {
        OutputFormat::Text => {
            if output.keys.is_empty() {
                println!("No keys found.");
            } else {
                for key in &output.keys {
                    println!("{key}");
                }
                println!();
                println!("Total: {} key(s)", output.total);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
