use std::path::Path;

use anyhow::{bail, Result};

use folio_core::FolioConfig;

pub fn run(config: &FolioConfig, path: Option<&Path>, init: bool, force: bool) -> Result<()> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(FolioConfig::config_path);

    if init {
        if path.exists() && !force {
            bail!(
                "Config file already exists at {}\nUse --force to overwrite it.",
                path.display()
            );
        }
        FolioConfig::default().save_to(&path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    println!("# {}", path.display());
    print!("{}", config.to_toml()?);
    Ok(())
}
