//! Store maintenance commands: clear and wipe.

use anyhow::{Context, Result};
use kvlite::AsyncKvStorage;
use serde::Serialize;

use crate::OutputFormat;

#[derive(Serialize)]
struct ClearOutput {
    removed: usize,
}

pub async fn clear(storage: &AsyncKvStorage, format: OutputFormat) -> Result<()> {
    let removed = storage.clear().await.context("failed to clear store")?;

    match format {
        OutputFormat::Text => println!("Cleared {removed} record(s)"),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&ClearOutput { removed })?);
        }
    }

    Ok(())
}

pub async fn wipe(storage: &AsyncKvStorage, format: OutputFormat) -> Result<()> {
    storage
        .clear_and_close()
        .await
        .context("failed to wipe store")?;

    match format {
        OutputFormat::Text => println!("Store wiped"),
        OutputFormat::Json => println!("{}", serde_json::json!({ "wiped": true })),
    }

    Ok(())
}
