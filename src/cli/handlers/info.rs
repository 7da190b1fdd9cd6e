//! Information display handlers (traditions, config)

use crate::cli::output::*;
use crate::AppConfig;
use crate::Result;

pub fn handle_traditions(config: &AppConfig) -> Result<()> {
    print_traditions(|file_name| config.raw_dir().join(file_name).exists());
    Ok(())
}

pub fn handle_config(config: &AppConfig) -> Result<()> {
    print_config(config);
    Ok(())
}
