//! Command-line interface for the reservation service.

use clap::{Parser, Subcommand};

/// Labres - lab computer reservation service
#[derive(Parser)]
#[command(name = "labres")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    #[command(alias = "serve")]
    Daemon,

    /// List reservations in the ledger
    #[command(alias = "ls")]
    Reservations {
        /// Optional status filter (PENDING, APPROVED, REJECTED)
        status: Option<String>,
    },

    /// Show the availability board for a date
    Board {
        /// Date to check (YYYY-MM-DD, defaults to today)
        date: Option<String>,
    },

    /// List the user roster
    Users,

    /// Add a user to the roster
    AddUser {
        username: String,
        password: String,
        /// user | admin
        #[arg(default_value = "user")]
        role: String,
    },

    /// Remove a user from the roster
    DelUser { username: String },

    /// Create a default config file
    #[command(alias = "--init")]
    Init,
}
