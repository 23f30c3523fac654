//! Command-line interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "yt-collector")]
#[command(about = "YouTube channel collector with quota-aware API key rotation")]
pub struct Cli {
    /// Path to the TOML config file (default: yt-collector.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect the configured channels and their videos
    Update {
        /// Run the collection inside the configured container image
        #[arg(short = 'z', long)]
        remote: bool,

        /// Override the container image tag
        #[arg(long)]
        container_tag: Option<String>,

        /// Name for the launched container
        #[arg(long)]
        container_name: Option<String>,
    },

    /// Look up a single video and print it as JSON
    Video {
        id: String,

        /// Also fetch the related-videos list
        #[arg(long)]
        related: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_flags_parse() {
        let cli = Cli::parse_from([
            "yt-collector",
            "update",
            "-z",
            "--container-tag",
            "v2",
            "--config",
            "custom.toml",
        ]);
        assert_eq!(cli.config.as_deref().unwrap().to_str(), Some("custom.toml"));
        match cli.command {
            Commands::Update {
                remote,
                container_tag,
                container_name,
            } => {
                assert!(remote);
                assert_eq!(container_tag.as_deref(), Some("v2"));
                assert!(container_name.is_none());
            }
            _ => panic!("expected update"),
        }
    }

    #[test]
    fn video_subcommand_parses() {
        let cli = Cli::parse_from(["yt-collector", "video", "abc123", "--related"]);
        match cli.command {
            Commands::Video { id, related } => {
                assert_eq!(id, "abc123");
                assert!(related);
            }
            _ => panic!("expected video"),
        }
    }
}
