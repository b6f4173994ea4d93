// src/cli/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Path to config file (optional)
    #[arg(long, value_name = "CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Path to JSON store file, overrides the config (optional)
    #[arg(short, long, value_name = "STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Act as this user id; omitted means anonymous
    #[arg(short, long, value_name = "USER", global = true)]
    pub user: Option<String>,

    /// Verbosity level (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create a private note, blank or from a JSON content file
    New {
        /// JSON file with `metadata`, `rows` and `summary`
        #[arg(long, value_name = "FILE")]
        from: Option<PathBuf>,
    },

    /// Create a private note from the configured AI generator
    Generate {
        #[arg(value_name = "TOPIC")]
        topic: String,

        /// Course code passed to the generator
        #[arg(long, default_value = "")]
        course: String,
    },

    /// List your notes, newest first
    List,

    /// Replace the content of one of your notes from a JSON content file
    Save {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,

        /// JSON file with `metadata`, `rows` and `summary`
        #[arg(long, value_name = "FILE")]
        from: PathBuf,
    },

    /// Delete one of your notes
    Delete {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,
    },

    /// Render one of your notes to HTML
    Render {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,

        /// Render the read-only preview instead of the editor form
        #[arg(long)]
        preview: bool,

        /// Write to this file instead of opening the browser
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Export one of your notes through the browser print dialog
    Export {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,
    },

    /// Publish one of your notes to the marketplace
    Publish {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,

        /// Price, 0 for free
        #[arg(long, allow_negative_numbers = true)]
        price: f64,

        /// USD or LKR; defaults to the configured currency
        #[arg(long)]
        currency: Option<String>,
    },

    /// Browse marketplace listings
    Market {
        /// Optional search term matched against topic and course code
        #[arg(value_name = "SEARCH")]
        search: Option<String>,

        /// Open the listing grid in the browser instead of printing rows
        #[arg(long)]
        html: bool,
    },

    /// View a marketplace listing with your entitlement applied
    View {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,

        /// Output the gated view as JSON instead of opening in browser
        #[arg(long)]
        json: bool,
    },

    /// Purchase a marketplace listing
    Buy {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,
    },

    /// Copy a purchased listing into your private notes
    Copy {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,
    },

    /// Manage curated listings (admin role required)
    Admin {
        #[command(subcommand)]
        action: AdminCommand,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum AdminCommand {
    /// Create a curated listing from a JSON content file
    Create {
        #[arg(long)]
        topic: String,

        #[arg(long, default_value = "")]
        course: String,

        #[arg(long, value_name = "FILE")]
        from: PathBuf,

        #[arg(long, allow_negative_numbers = true)]
        price: f64,

        #[arg(long)]
        currency: Option<String>,
    },

    /// Update fields of a listing
    Update {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,

        #[arg(long)]
        topic: Option<String>,

        #[arg(long)]
        course: Option<String>,

        #[arg(long, value_name = "FILE")]
        from: Option<PathBuf>,

        #[arg(long, allow_negative_numbers = true)]
        price: Option<f64>,

        #[arg(long)]
        currency: Option<String>,
    },

    /// Delete a listing
    Delete {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,
    },
}
