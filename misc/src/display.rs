use anyhow::{Context, Result};
use serde::Serialize;

/// Prints a value as pretty json, used by the `--print-config` flags.
pub fn pretty_json<T: Serialize>(value: T) -> Result<()> {
    let json = serde_json::to_string_pretty(&value).context("serialize value to json")?;
    println!("{json}");
    Ok(())
}
