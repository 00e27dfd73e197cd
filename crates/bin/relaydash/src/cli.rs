//! Command-line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use relaydash_domain::credentials::CredentialDomain;

use crate::config::DEFAULT_PATH;

#[derive(Debug, Parser)]
#[command(name = "relaydash")]
#[command(about = "Admin dashboard for the phone relay")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file.
    #[arg(long, env = "RELAYDASH_CONFIG", default_value = DEFAULT_PATH)]
    pub config: PathBuf,

    /// Override the relay API base from the configuration.
    #[arg(long)]
    pub api_base: Option<String>,

    /// Print `phones` and `clients` as JSON view descriptions.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Live dashboard refreshed in the terminal.
    Watch(FilterArgs),

    /// Print the connected phones once.
    Phones,

    /// Print the client connections once.
    Clients(FilterArgs),

    /// Rotate outbound IPs using the stored rotation token.
    Rotate,

    /// Restart the relay.
    Restart,

    /// Store a panel login and verify it against the relay.
    Login {
        #[arg(long)]
        user: String,

        #[arg(long, env = "RELAYDASH_PASSWORD", hide_env_values = true)]
        pass: String,
    },

    /// Forget the stored panel login.
    Logout,

    /// Inspect or change credentials stored on the relay.
    #[command(subcommand)]
    Creds(CredsCommand),

    /// Manage the rotation token kept in the session file.
    #[command(subcommand)]
    Token(TokenCommand),
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Substring of the client IP.
    #[arg(long, default_value = "")]
    pub ip: String,

    /// Substring of the phone id.
    #[arg(long, default_value = "")]
    pub phone: String,

    /// Substring of the stream id.
    #[arg(long, default_value = "")]
    pub stream: String,
}

#[derive(Debug, Subcommand)]
pub enum CredsCommand {
    /// Print the masked credentials as the relay returns them.
    Show {
        #[arg(value_enum)]
        domain: DomainArg,
    },

    /// Save new credentials; empty fields are sent as empty strings.
    Set {
        #[arg(value_enum)]
        domain: DomainArg,

        #[arg(long, default_value = "")]
        user: String,

        #[arg(long, default_value = "")]
        pass: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Print the stored rotation token.
    Show,

    /// Store a new rotation token.
    Set { token: String },

    /// Remove the stored rotation token.
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DomainArg {
    Proxy,
    Panel,
}

impl From<DomainArg> for CredentialDomain {
    fn from(arg: DomainArg) -> Self {
        match arg {
            DomainArg::Proxy => Self::Proxy,
            DomainArg::Panel => Self::Panel,
        }
    }
}
