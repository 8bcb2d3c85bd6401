use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use dialkit::prelude::*;

#[derive(Debug, Parser)]
#[command(
    name = "dialkit",
    about = "Inspect dial schemas, preview springs and read stored presets",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the control tree and resolved defaults of a YAML or JSON schema.
    Inspect {
        schema: PathBuf,

        /// Panel name used when registering the schema
        #[arg(long, default_value = "Panel")]
        name: String,
    },

    /// Sample a spring's step response as CSV.
    Curve {
        #[command(flatten)]
        spring: SpringArgs,

        /// Seconds to sample. Defaults to the configured preview duration.
        #[arg(long)]
        duration: Option<f64>,
    },

    /// Re-express a spring in the other parameterization.
    Convert {
        #[command(flatten)]
        spring: SpringArgs,

        #[arg(long, value_enum)]
        to: ModeArg,
    },

    /// List the presets stored for a panel.
    Presets {
        panel_id: String,

        /// Directory holding preset files. Defaults to the configured one.
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

/// Either the simple (`--visual-duration`, `--bounce`) or the advanced
/// (`--stiffness`, `--damping`, `--mass`) fields. Missing fields take the
/// usual defaults.
#[derive(Debug, Args)]
pub struct SpringArgs {
    #[arg(long, conflicts_with_all = ["stiffness", "damping", "mass"])]
    pub visual_duration: Option<f64>,

    #[arg(long, conflicts_with_all = ["stiffness", "damping", "mass"])]
    pub bounce: Option<f64>,

    #[arg(long)]
    pub stiffness: Option<f64>,

    #[arg(long)]
    pub damping: Option<f64>,

    #[arg(long)]
    pub mass: Option<f64>,
}

impl SpringArgs {
    pub fn to_spring(&self) -> SpringConfig {
        SpringConfig {
            visual_duration: self.visual_duration,
            bounce: self.bounce,
            stiffness: self.stiffness,
            damping: self.damping,
            mass: self.mass,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Simple,
    Advanced,
}

impl From<ModeArg> for SpringMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Simple => SpringMode::Simple,
            ModeArg::Advanced => SpringMode::Advanced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_convert() {
        let cli = Cli::try_parse_from([
            "dialkit",
            "convert",
            "--visual-duration",
            "0.3",
            "--bounce",
            "0.2",
            "--to",
            "advanced",
        ])
        .unwrap();
        let Commands::Convert { spring, to } = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(to, ModeArg::Advanced);
        assert_eq!(spring.to_spring(), SpringConfig::simple(0.3, 0.2));
    }

    #[test]
    fn test_mixed_spring_fields_are_rejected() {
        let result = Cli::try_parse_from([
            "dialkit",
            "curve",
            "--bounce",
            "0.2",
            "--stiffness",
            "100",
        ]);
        assert!(result.is_err());
    }
}
