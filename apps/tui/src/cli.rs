use clap::Parser;
use std::path::PathBuf;

use monsoon_radial_tui::config::{CONFIG_ENV, DATA_DIR_ENV};

#[derive(Debug, Parser)]
#[command(
    name = "monsoon-radial",
    version,
    about = "Radial monsoon precipitation charts"
)]
pub struct CliArgs {
    /// Print dataset stats and exit
    #[arg(long)]
    pub headless: bool,

    /// Print headless stats as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Chart configuration file (JSON)
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Directory CSV files are resolved against
    #[arg(long = "data-dir", value_name = "PATH")]
    pub data_dir: Option<String>,

    /// Write one SVG per chart and year into DIR (implies --headless)
    #[arg(long = "export-svg", value_name = "DIR")]
    pub export_svg: Option<PathBuf>,

    /// Only export this year
    #[arg(long, requires = "export_svg")]
    pub year: Option<i32>,
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        if let Some(config) = &self.config {
            std::env::set_var(CONFIG_ENV, config);
        }
        if let Some(dir) = &self.data_dir {
            std::env::set_var(DATA_DIR_ENV, dir);
        }
    }

    pub const fn is_headless(&self) -> bool {
        self.headless || self.json || self.export_svg.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::CliArgs;
    use clap::{CommandFactory, Parser};

    #[test]
    fn export_implies_headless() {
        let args =
            CliArgs::try_parse_from(["monsoon-radial", "--export-svg", "out", "--year", "1998"])
                .unwrap();
        assert!(args.is_headless());
        assert_eq!(args.year, Some(1998));
    }

    #[test]
    fn year_requires_export() {
        assert!(CliArgs::try_parse_from(["monsoon-radial", "--year", "1998"]).is_err());
    }

    #[test]
    fn help_lists_flags() {
        let help = CliArgs::command().render_help().to_string();
        assert!(help.contains("--export-svg"));
        assert!(help.contains("--data-dir"));
    }
}
