//! `docwarden config`: inspect and edit the settings file

use anyhow::Context;
use clap::{Args, Subcommand};

use crate::config::{config_file_path, Config};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print one setting
    Get { key: String },
    /// Change one setting; an empty value clears `data_dir` and `error_log`
    Set { key: String, value: String },
    /// Print every setting, including defaults
    List,
    /// Print where the settings file lives
    Path,
    /// Write a settings file with the default length bounds
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: &ConfigArgs) -> anyhow::Result<()> {
    let path = config_file_path();

    match &args.command {
        ConfigCommands::Get { key } => {
            let value = Config::load().get(key).with_context(|| {
                format!("No setting named '{}' (known: {})", key, Config::keys().join(", "))
            })?;
            println!("{}", value);
        }
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load();
            config.set(key, value)?;
            config.save_to(&path)?;
            tracing::info!("Updated {} in {}", key, path.display());
            println!("{} = {}", key, value);
        }
        ConfigCommands::List => {
            let config = Config::load();
            println!("# {}", path.display());
            for key in Config::keys() {
                match config.get(key).filter(|v| !v.is_empty()) {
                    Some(value) => println!("{} = {}", key, value),
                    None => println!("# {} is unset", key),
                }
            }
        }
        ConfigCommands::Path => println!("{}", path.display()),
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!("{} exists; pass --force to replace it", path.display());
            }
            Config::default().save_to(&path)?;
            println!("Wrote defaults to {}", path.display());
        }
    }
    Ok(())
}
