use std::path::PathBuf;

use caseprep_core::Side;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "caseprep")]
#[command(about = "Prepare debate cases from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// CLI profile name for hosted backend configuration
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new, untitled case
    New {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List your cases, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a case
    Show {
        /// Case ID or unique ID prefix
        id: String,
        /// Only show one side
        #[arg(long, value_enum)]
        side: Option<SideArg>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the resolution
    Resolved {
        /// Case ID or unique ID prefix
        id: String,
        /// New resolution (editor opens when omitted)
        text: Vec<String>,
    },
    /// Set the framework of one side or round
    Framework {
        #[command(flatten)]
        target: PanelArgs,
        /// New framework text (editor opens when omitted)
        text: Vec<String>,
    },
    /// Add, change or remove definitions
    Definition {
        #[command(subcommand)]
        command: DefinitionCommands,
    },
    /// Add, change or remove contentions
    Contention {
        #[command(subcommand)]
        command: ContentionCommands,
    },
    /// Add, remove or annotate rounds
    Round {
        #[command(subcommand)]
        command: RoundCommands,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Authenticate CLI profile with Supabase
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum SideArg {
    #[default]
    Gov,
    Opp,
}

impl From<SideArg> for Side {
    fn from(value: SideArg) -> Self {
        match value {
            SideArg::Gov => Self::Gov,
            SideArg::Opp => Self::Opp,
        }
    }
}

/// Which panel an edit goes through: one side of the case, or one round
#[derive(Args, Clone, Debug)]
pub struct PanelArgs {
    /// Case ID or unique ID prefix
    pub id: String,
    /// Side of the case to edit
    #[arg(long, value_enum, default_value_t = SideArg::Gov, conflicts_with = "round")]
    pub side: SideArg,
    /// Edit the opponent material of this round instead (1-based)
    #[arg(long, value_name = "N")]
    pub round: Option<usize>,
}

#[derive(Subcommand)]
pub enum DefinitionCommands {
    /// Append a definition
    Add {
        #[command(flatten)]
        target: PanelArgs,
        #[arg(long)]
        term: Option<String>,
        #[arg(long)]
        value: Option<String>,
    },
    /// Change an existing definition
    Set {
        #[command(flatten)]
        target: PanelArgs,
        /// Position in the list (1-based)
        position: usize,
        #[arg(long)]
        term: Option<String>,
        #[arg(long)]
        value: Option<String>,
    },
    /// Remove a definition
    Remove {
        #[command(flatten)]
        target: PanelArgs,
        /// Position in the list (1-based)
        position: usize,
    },
}

#[derive(Subcommand)]
pub enum ContentionCommands {
    /// Append a contention
    Add {
        #[command(flatten)]
        target: PanelArgs,
        #[command(flatten)]
        parts: ContentionArgs,
    },
    /// Change an existing contention
    Set {
        #[command(flatten)]
        target: PanelArgs,
        /// Position in the list (1-based)
        position: usize,
        #[command(flatten)]
        parts: ContentionArgs,
    },
    /// Remove a contention
    Remove {
        #[command(flatten)]
        target: PanelArgs,
        /// Position in the list (1-based)
        position: usize,
    },
}

#[derive(Args, Clone, Debug, Default)]
pub struct ContentionArgs {
    /// The claim
    #[arg(long)]
    pub contention: Option<String>,
    /// Why the claim holds
    #[arg(long)]
    pub warrant: Option<String>,
    /// Why the claim matters
    #[arg(long)]
    pub impact: Option<String>,
}

#[derive(Subcommand)]
pub enum RoundCommands {
    /// Append a round
    Add {
        /// Case ID or unique ID prefix
        id: String,
        /// Your side in the round
        #[arg(long, value_enum, default_value_t = SideArg::Gov)]
        side: SideArg,
    },
    /// Remove a round
    Remove {
        /// Case ID or unique ID prefix
        id: String,
        /// Round position (1-based)
        round: usize,
    },
    /// Change your side in a round
    Side {
        /// Case ID or unique ID prefix
        id: String,
        /// Round position (1-based)
        round: usize,
        #[arg(value_enum)]
        side: SideArg,
    },
    /// Set a round's notes
    Notes {
        /// Case ID or unique ID prefix
        id: String,
        /// Round position (1-based)
        round: usize,
        /// New notes (editor opens when omitted)
        text: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Profile name to initialize
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Supabase project URL
        #[arg(long, value_name = "URL")]
        supabase_url: Option<String>,
        /// Supabase anon/public key
        #[arg(long, value_name = "KEY")]
        supabase_anon_key: Option<String>,
        /// Table holding cases
        #[arg(long, value_name = "NAME")]
        table: Option<String>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Login with Supabase email/password and store session in keychain
    Login {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Supabase account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Supabase account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Show auth status for profile
    Status {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
    },
    /// Logout profile and clear stored session
    Logout {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
    },
}
