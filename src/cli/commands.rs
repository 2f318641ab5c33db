use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "timeai", version, about = "Time AI tool-calling chat server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the config file path globally
    #[arg(short, long, global = true, default_value = "config.yaml")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve,

    /// List the registered tools and their parameter schemas
    Tools,

    /// Inspect or reset per-user daily usage counters
    Usage {
        #[command(subcommand)]
        action: UsageAction,
    },

    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
pub enum UsageAction {
    /// Show today's usage for a user
    Show {
        user_id: String,
    },

    /// Delete today's usage record for a user
    Reset {
        user_id: String,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Set a user's subscription tier (free, pro or max)
    SetPlan {
        user_id: String,
        plan: String,
    },
}
