//! Config subcommand handlers.

use homedeck_config::{config_path, load_config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = load_config(global.config.as_deref())?;
            let format = global.output.unwrap_or(OutputFormat::Toml);
            output::print_output(&output::render(format, &cfg.redacted())?);
        }
        ConfigCommand::Path => {
            let path = global.config.clone().unwrap_or_else(config_path);
            output::print_output(&path.display().to_string());
        }
    }
    Ok(())
}
