//! Effective configuration.

use voucherly_config::Config;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

pub fn handle(settings: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let out = match global.output {
        OutputFormat::Table | OutputFormat::Plain => settings.to_toml()?,
        format => output::render_single(format, settings, |_| String::new(), |_| String::new())?,
    };
    output::print_output(out.trim_end(), global.quiet);

    if settings.auth().is_err() {
        tracing::warn!("no controller credentials configured");
    }
    Ok(())
}
