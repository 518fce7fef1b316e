//! `repoguard config`

use crate::cli::{ConfigCommands, Output};
use crate::config::RepoguardConfig;
use anyhow::Result;

pub fn execute(cmd: ConfigCommands, config: &RepoguardConfig, output: &Output) -> Result<u8> {
    match cmd {
        ConfigCommands::Show => {
            output.print(&config.to_toml()?);
            Ok(0)
        }
        ConfigCommands::Validate => match config.validate() {
            Ok(()) => {
                output.success("Configuration is valid");
                Ok(0)
            }
            Err(err) => {
                output.error(&format!("Configuration is invalid: {err:#}"));
                Ok(2)
            }
        },
    }
}
