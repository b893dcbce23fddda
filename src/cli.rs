//! Command-line interface definition using clap.
//!
//! [`Args`] maps directly onto a [`TransformConfig`] and the list of inputs:
//!
//! ```rust
//! use clap::Parser;
//! use slackbridge::cli::Args;
//!
//! let args = Args::parse_from([
//!     "slackbridge", "--team", "acme", "--file", "a.json", "--file", "b.json",
//!     "--add-original",
//! ]);
//! assert_eq!(args.files.len(), 2);
//! assert!(args.transform_config().add_original);
//! ```

use std::path::PathBuf;

use clap::Parser;

use crate::config::TransformConfig;

/// Merge Slack exports and transform them into a Mattermost import model.
#[derive(Parser, Debug, Clone)]
#[command(name = "slackbridge")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    slackbridge --team acme --file export.json
    slackbridge -t acme -f alice.json -f bob.json -o acme.json
    slackbridge -t acme -f export.json --archive-dir extracted/ -d data/
    slackbridge -t acme -f export.json --user-overrides users.csv --internal-only")]
pub struct Args {
    /// Mattermost team the data is imported into
    #[arg(short, long)]
    pub team: String,

    /// Slack export snapshot (JSON). Repeat to merge several exports
    #[arg(short, long = "file", value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Path to output file
    #[arg(short, long, default_value = "bulk-export.json")]
    pub output: PathBuf,

    /// Directory receiving copied attachments
    #[arg(short = 'd', long, default_value = "data")]
    pub attachments_dir: PathBuf,

    /// Directory the export archive was extracted into, used to read uploads
    #[arg(long, value_name = "DIR")]
    pub archive_dir: Option<PathBuf>,

    /// CSV of user overrides. `apply_to_username` is required; optional
    /// columns are username, first_name, last_name, position, email, password
    #[arg(long, value_name = "CSV")]
    pub user_overrides: Option<PathBuf>,

    /// CSV of channel overrides. `apply_to_channelname` is required; optional
    /// columns are name, display_name, purpose, header, topic
    #[arg(long, value_name = "CSV")]
    pub channel_overrides: Option<PathBuf>,

    /// Skip copying attachments
    #[arg(short = 'a', long)]
    pub skip_attachments: bool,

    /// Add the raw JSON of every Slack post as a prop
    #[arg(short = 'j', long)]
    pub add_original: bool,

    /// Drop posts whose props are too large instead of dropping the props
    #[arg(short = 'p', long)]
    pub discard_invalid_props: bool,

    /// Import direct and group messages as private channels
    #[arg(long)]
    pub internal_only: bool,

    /// Show debug logs
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Builds the transform configuration from the flags.
    pub fn transform_config(&self) -> TransformConfig {
        TransformConfig::new()
            .with_attachments_dir(self.attachments_dir.clone())
            .with_skip_attachments(self.skip_attachments)
            .with_add_original(self.add_original)
            .with_discard_invalid_props(self.discard_invalid_props)
            .with_team_internal_only(self.internal_only)
    }

    /// Log level for the tracing subscriber.
    pub fn log_level(&self) -> tracing::Level {
        if self.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["slackbridge", "-t", "acme", "-f", "x.json"]).unwrap();
        assert_eq!(args.team, "acme");
        assert_eq!(args.output, PathBuf::from("bulk-export.json"));
        assert_eq!(args.attachments_dir, PathBuf::from("data"));
        assert!(args.archive_dir.is_none());
        assert!(!args.skip_attachments);
        assert_eq!(args.log_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_team_and_file_are_required() {
        assert!(Args::try_parse_from(["slackbridge", "-f", "x.json"]).is_err());
        assert!(Args::try_parse_from(["slackbridge", "-t", "acme"]).is_err());
    }

    #[test]
    fn test_transform_config_from_flags() {
        let args = Args::try_parse_from([
            "slackbridge",
            "-t",
            "acme",
            "-f",
            "x.json",
            "-a",
            "-p",
            "--internal-only",
            "-d",
            "out/data",
        ])
        .unwrap();
        let config = args.transform_config();
        assert!(config.skip_attachments);
        assert!(config.discard_invalid_props);
        assert!(config.team_internal_only);
        assert!(!config.add_original);
        assert_eq!(config.attachments_dir, PathBuf::from("out/data"));
    }

    #[test]
    fn test_debug_level() {
        let args =
            Args::try_parse_from(["slackbridge", "-t", "a", "-f", "x.json", "--debug"]).unwrap();
        assert_eq!(args.log_level(), tracing::Level::DEBUG);
    }
}
