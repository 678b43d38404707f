//! Interactive prompts using dialoguer

use std::path::Path;

use anyhow::Result;
use dialoguer::{Confirm, Select};

use crate::pipeline::Vendor;

/// Prompt user to confirm proceeding with an action
pub fn confirm_step(message: &str) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(message)
        .default(true)
        .interact()?;
    Ok(confirmed)
}

/// Prompt user before replacing an existing output file
pub fn confirm_overwrite(path: &Path) -> Result<bool> {
    let message = format!("{} already exists. Overwrite it?", path.display());
    confirm_step(&message)
}

/// Let the user pick a vendor, with `default` preselected
pub fn select_vendor(default: Vendor) -> Result<Vendor> {
    let items: Vec<String> = Vendor::ALL
        .iter()
        .map(|vendor| {
            if vendor.is_supported() {
                vendor.name().to_string()
            } else {
                format!("{} (no mapping yet)", vendor.name())
            }
        })
        .collect();
    let default_idx = Vendor::ALL
        .iter()
        .position(|&vendor| vendor == default)
        .unwrap_or(0);

    let selected = Select::new()
        .with_prompt("Convert for which vendor?")
        .items(&items)
        .default(default_idx)
        .interact()?;
    Ok(Vendor::ALL[selected])
}
