use revu_config::RevuConfig;

use crate::cli::{GlobalFlags, OutputFormat};
use crate::output::output;

/// Handle `revu config`: TOML by default, JSON when `--format raw`.
pub fn handle(config: &RevuConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    if flags.format == OutputFormat::Raw {
        return output(config, flags.format);
    }
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
