//! `colist config`: inspect or write the settings file.

use anyhow::{bail, Context, Result};
use clap::Subcommand;

use colist_core::config::{self, config_path, Settings};

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print effective settings (file + environment) as YAML.
    Show,
    /// Print the settings file location.
    Path,
    /// Write a settings file with every default spelled out.
    Init {
        /// Replace an existing file.
        #[arg(long)]
        force: bool,
    },
}

pub fn run(command: ConfigCommand) -> Result<()> {
    let home = dirs::home_dir().context("could not determine home directory")?;

    match command {
        ConfigCommand::Show => {
            let settings = config::load_at(&home).context("failed to load settings")?;
            print!(
                "{}",
                config::to_yaml(&settings).context("failed to render settings")?
            );
        }
        ConfigCommand::Path => println!("{}", config_path(&home).display()),
        ConfigCommand::Init { force } => {
            let path = config_path(&home);
            if path.exists() && !force {
                bail!(
                    "{} already exists; pass --force to overwrite",
                    path.display()
                );
            }
            let written =
                config::save_at(&home, &Settings::default()).context("failed to write settings")?;
            println!("✓ Wrote {}", written.display());
        }
    }
    Ok(())
}
