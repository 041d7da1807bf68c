//! CLI argument parsing using clap.

use anyhow::Result;
use anyhow::anyhow;
use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use log::debug;
use std::env;
use std::path::PathBuf;
use zipvault_core::ArchivePassword;

#[derive(Parser)]
#[command(name = "zipvault")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pack a directory into a ZIP archive
    Compress(CompressArgs),
    /// Unpack a ZIP archive into a directory
    Decompress(DecompressArgs),
    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Commands {
    /// Operation name used in JSON output.
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Compress(_) => "compress",
            Self::Decompress(_) => "decompress",
            Self::Completion { .. } => "completion",
        }
    }
}

#[derive(clap::Args)]
pub struct PasswordArgs {
    /// Password for AES-256 encryption (visible in process listings)
    #[arg(long, value_name = "PASSWORD", conflicts_with = "password_env")]
    pub password: Option<String>,

    /// Read the password from an environment variable
    #[arg(long, value_name = "VAR")]
    pub password_env: Option<String>,
}

impl PasswordArgs {
    /// Resolves the password from the flag or the named environment variable.
    ///
    /// An empty password is treated as no password.
    pub fn resolve(&self) -> Result<Option<ArchivePassword>> {
        let raw = match (&self.password, &self.password_env) {
            (Some(password), _) => password.clone(),
            (None, Some(var)) => {
                debug!("reading password from ${var}");
                env::var(var).map_err(|_| {
                    anyhow!(
                        "Password variable '{var}' is not set\n\
                         HINT: Export it first, e.g. {var}=... zipvault ..."
                    )
                })?
            }
            (None, None) => return Ok(None),
        };

        let password = ArchivePassword::new(raw);
        Ok((!password.is_empty()).then_some(password))
    }
}

#[derive(clap::Args)]
pub struct CompressArgs {
    /// Directory to archive
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Output archive file path
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    #[command(flatten)]
    pub password: PasswordArgs,

    /// Compression level (0 = store, 1-9 = deflate)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u8).range(0..=9))]
    pub level: Option<u8>,

    /// Follow symbolic links
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip files and directories whose names start with '.'
    #[arg(long)]
    pub exclude_hidden: bool,
}

#[derive(clap::Args)]
pub struct DecompressArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Output directory (created if missing)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub password: PasswordArgs,

    /// Fail instead of replacing files that already exist
    #[arg(long)]
    pub no_overwrite: bool,

    /// Restore unix permission bits stored in the archive
    #[arg(long)]
    pub preserve_permissions: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_compress() {
        let cli = Cli::try_parse_from([
            "zipvault",
            "compress",
            "proj",
            "out.zip",
            "--password",
            "secret",
            "--level",
            "0",
        ])
        .unwrap();

        let Commands::Compress(args) = cli.command else {
            panic!("expected compress");
        };
        assert_eq!(args.level, Some(0));
        assert_eq!(args.password.password.as_deref(), Some("secret"));
        assert!(!args.exclude_hidden);
    }

    #[test]
    fn test_level_out_of_range() {
        let result = Cli::try_parse_from(["zipvault", "compress", "a", "b.zip", "--level", "10"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_password_sources_conflict() {
        let result = Cli::try_parse_from([
            "zipvault",
            "decompress",
            "a.zip",
            "out",
            "--password",
            "x",
            "--password-env",
            "VAR",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_empty_password_is_none() {
        let args = PasswordArgs {
            password: Some(String::new()),
            password_env: None,
        };
        assert!(args.resolve().unwrap().is_none());
    }

    #[test]
    fn test_resolve_missing_env_var() {
        let args = PasswordArgs {
            password: None,
            password_env: Some("ZIPVAULT_TEST_SURELY_UNSET_VAR".to_string()),
        };
        let err = args.resolve().unwrap_err();
        assert!(format!("{err}").contains("HINT"));
    }
}
