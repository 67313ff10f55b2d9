//! Command line definition and configuration layering.

use boltgrant_passbolt::passbolt::{AroKind, PassboltConfig, PassboltError};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Reconcile declared Passbolt folder shares against the server.
#[derive(Parser, Debug)]
#[command(name = "boltgrant")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// YAML config file (overridden by PASSBOLT_* variables and flags)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Passbolt server URL
    #[arg(long, global = true, value_name = "URL")]
    pub url: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Deadline for each grant, in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Converge every grant in a manifest
    Apply {
        /// Grant manifest
        manifest: PathBuf,

        /// Compute actions without changing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the actions `apply` would take
    Plan {
        /// Grant manifest
        manifest: PathBuf,
    },
    /// Print the current level of one grant
    Show {
        /// Folder name
        #[arg(long)]
        folder: String,

        /// Subject kind: user or group
        #[arg(long, value_parser = parse_kind)]
        kind: AroKind,

        /// Group name or username
        #[arg(long)]
        subject: String,
    },
    /// List the users and groups a folder can be shared with
    Targets {
        /// Only targets whose name contains this text
        #[arg(long)]
        search: Option<String>,
    },
}

fn parse_kind(s: &str) -> Result<AroKind, String> {
    s.parse::<AroKind>().map_err(|e| e.to_string())
}

impl Cli {
    /// Config file, then the process environment, then flags.
    pub fn resolve_config(&self) -> Result<PassboltConfig, PassboltError> {
        self.resolve_config_with(|key| std::env::var(key).ok())
    }

    pub fn resolve_config_with<F>(&self, env: F) -> Result<PassboltConfig, PassboltError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match &self.config {
            Some(path) => PassboltConfig::from_yaml_file(path)?,
            None => PassboltConfig::default(),
        };
        config.apply_env(env)?;
        if let Some(url) = &self.url {
            config.server_url = url.clone();
        }
        if let Some(secs) = self.timeout {
            config.operation_timeout_secs = Some(secs);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_apply_with_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "boltgrant",
            "apply",
            "grants.yaml",
            "--dry-run",
            "--verbose",
            "--timeout",
            "20",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.timeout, Some(20));
        assert_eq!(
            cli.command,
            Command::Apply {
                manifest: PathBuf::from("grants.yaml"),
                dry_run: true,
            }
        );
    }

    #[test]
    fn test_parse_show() {
        let cli = Cli::try_parse_from(
            "boltgrant show --folder Finance --kind group --subject Accounting".split_whitespace(),
        )
        .unwrap();
        match cli.command {
            Command::Show { folder, kind, subject } => {
                assert_eq!(folder, "Finance");
                assert_eq!(kind, AroKind::Group);
                assert_eq!(subject, "Accounting");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_show_rejects_unknown_kind() {
        let res = Cli::try_parse_from(
            "boltgrant show --folder F --kind role --subject x".split_whitespace(),
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_parse_targets() {
        let cli = Cli::try_parse_from(["boltgrant", "targets"]).unwrap();
        assert_eq!(cli.command, Command::Targets { search: None });

        let cli = Cli::try_parse_from(["boltgrant", "targets", "--search", "Acc"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Targets {
                search: Some("Acc".into())
            }
        );
    }

    #[test]
    fn test_config_layering() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server_url: https://file.example.com").unwrap();
        writeln!(file, "access_token: file-token").unwrap();
        writeln!(file, "operation_timeout_secs: 60").unwrap();
        let path = file.path().to_string_lossy().into_owned();

        let cli = Cli::try_parse_from([
            "boltgrant",
            "--config",
            path.as_str(),
            "--url",
            "https://flag.example.com",
            "plan",
            "grants.yaml",
        ])
        .unwrap();
        let config = cli
            .resolve_config_with(|key| match key {
                "PASSBOLT_URL" => Some("https://env.example.com".into()),
                "PASSBOLT_ACCESS_TOKEN" => Some("env-token".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.server_url, "https://flag.example.com");
        assert_eq!(config.access_token.as_deref(), Some("env-token"));
        assert_eq!(config.operation_timeout_secs, Some(60));
    }
}
