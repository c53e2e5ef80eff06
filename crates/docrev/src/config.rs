// SPDX-FileCopyrightText: 2026 Docrev Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `docrev config` command implementation.
//!
//! Prints the fully resolved configuration after defaults, files, and
//! environment variables have been merged.

use docrev_config::model::DocrevConfig;
use docrev_core::DocrevError;

/// Run the `docrev config` command.
pub fn run_config(config: &DocrevConfig, json: bool) -> Result<(), DocrevError> {
    let rendered = if json {
        serde_json::to_string_pretty(config)
            .map_err(|e| DocrevError::Internal(format!("failed to render config: {e}")))?
    } else {
        toml::to_string_pretty(config)
            .map_err(|e| DocrevError::Internal(format!("failed to render config: {e}")))?
    };
    println!("{rendered}");
    Ok(())
}
