use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "plantbio", version, about = "Sign in to the Plantbio portal and inspect access")]
pub struct Cli {
    /// Backend base URL (overrides PLANTBIO_API_URL).
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory holding the persisted session.
    #[arg(long, global = true, env = "PLANTBIO_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in with an account and password.
    Login {
        #[arg(long, short)]
        account: String,
        #[arg(long, env = "PLANTBIO_PASSWORD", hide_env_values = true)]
        password: String,
        /// Do not keep the session across restarts.
        #[arg(long)]
        no_keep: bool,
    },
    /// Sign in with a Google ID token.
    Google {
        #[arg(long)]
        id_token: String,
    },
    /// Sign out and forget the persisted session.
    Logout,
    /// Show who is signed in.
    Status,
    /// Show what the route guard does with a path.
    Guard {
        path: String,
        /// Use the legacy substring gate.
        #[arg(long)]
        legacy_gate: bool,
    },
    /// List the routes the current user may navigate to.
    Routes {
        /// Resolve a path against them instead of listing.
        #[arg(long)]
        resolve: Option<String>,
    },
    /// Create an account.
    Register {
        #[arg(long, short)]
        account: String,
        #[arg(long, env = "PLANTBIO_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        name: String,
        /// Teacher or Student.
        #[arg(long, default_value = "Student")]
        role: String,
    },
    /// Reset a forgotten password.
    ForgotPassword {
        #[command(subcommand)]
        step: ResetStep,
    },
    /// Print the version.
    Version,
}

#[derive(Subcommand, Debug)]
pub enum ResetStep {
    /// Email a verification code.
    Request {
        #[arg(long)]
        email: String,
    },
    /// Set a new password with the emailed code.
    Confirm {
        #[arg(long)]
        email: String,
        #[arg(long)]
        code: String,
        #[arg(long)]
        new_password: String,
    },
}
