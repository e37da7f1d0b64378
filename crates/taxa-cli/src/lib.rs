//! Taxa CLI Library
//!
//! Command-line interface for the taxonomy database:
//!
//! - **Create**: build the database from a taxonomy dump (`taxa create`)
//! - **Lineage**: ancestors or descendants of taxa (`taxa lineage`)
//! - **Custom**: graft a custom sub-taxonomy (`taxa custom`)

pub mod commands;
pub mod output;

use std::ffi::OsString;

use clap::{Args, Parser, Subcommand, ValueEnum};
use taxa_common::config::DEFAULT_DRIVERNAME;
use taxa_common::{DatabaseConfig, Result, TaxaError};

/// Taxonomy tool
#[derive(Parser, Debug)]
#[command(name = "taxa")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub db: DbArgs,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Database connection flags
#[derive(Args, Debug, Clone)]
pub struct DbArgs {
    /// The database driver name (sqlite or postgres)
    #[arg(long, env = "TAXA_DRIVERNAME", default_value = DEFAULT_DRIVERNAME, global = true)]
    pub drivername: String,

    /// The taxonomy database
    #[arg(long, env = "TAXA_DATABASE", global = true)]
    pub database: Option<String>,

    /// The database user name
    #[arg(long, env = "TAXA_USERNAME", global = true)]
    pub username: Option<String>,

    /// Prompt for the database user password
    #[arg(long, global = true)]
    pub password: bool,

    /// The database host
    #[arg(long, env = "TAXA_HOST", global = true)]
    pub host: Option<String>,

    /// The database port
    #[arg(long, env = "TAXA_PORT", global = true)]
    pub port: Option<u16>,
}

impl DbArgs {
    /// Turn the flags into a connection configuration, prompting for the
    /// password when requested
    pub fn into_config(self) -> Result<DatabaseConfig> {
        let password = if self.password {
            Some(
                inquire::Password::new("password:")
                    .without_confirmation()
                    .prompt()
                    .map_err(|e| TaxaError::config(format!("password prompt failed: {}", e)))?,
            )
        } else {
            None
        };

        Ok(DatabaseConfig {
            drivername: self.drivername,
            database: self.database,
            username: self.username,
            password,
            host: self.host,
            port: self.port,
        })
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the taxonomy database from a taxonomy dump
    Create {
        /// The path to the taxonomy database dump (.tar or .tar.gz)
        taxdump: String,
    },

    /// Calculate the lineage for each taxon
    Lineage {
        /// The list of taxon identifiers
        #[arg(required = true)]
        taxa: Vec<i64>,

        /// Walk up to the root or down to every descendant
        #[arg(long, value_enum, default_value_t = LineageMode::Ancestors)]
        mode: LineageMode,

        /// The delimiter for the resulting table
        #[arg(long, default_value = "\t")]
        delimiter: String,
    },

    /// Graft a custom taxonomy onto existing taxa
    Custom {
        /// Tab-delimited custom taxonomy table
        file: String,
    },
}

/// Direction of a lineage query
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineageMode {
    Ancestors,
    Descendants,
}

/// Long options that are also accepted with a single dash (`-mode`)
pub const SINGLE_DASH_FLAGS: &[&str] = &[
    "drivername",
    "database",
    "username",
    "password",
    "host",
    "port",
    "mode",
    "delimiter",
    "verbose",
];

/// Rewrite `-name` and `-name=value` into `--name` forms for the options in
/// [`SINGLE_DASH_FLAGS`]. Everything after a bare `--` is left alone.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut end_of_options = false;

    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if end_of_options {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                end_of_options = true;
                return arg;
            }
            match text.strip_prefix('-') {
                Some(rest) if !rest.starts_with('-') => {
                    let name = rest.split('=').next().unwrap_or_default();
                    if SINGLE_DASH_FLAGS.contains(&name) {
                        OsString::from(format!("-{}", text))
                    } else {
                        arg
                    }
                },
                _ => arg,
            }
        })
        .collect()
}
