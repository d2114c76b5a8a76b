//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::book::{self, NewBook};
use super::output::{Output, OutputFormat};
use super::transfer::{self, FileFormat};
use crate::domain::view::Query;
use crate::domain::{BookPatch, Field};
use crate::storage::{Config, Library};

#[derive(Parser)]
#[command(name = "shelf")]
#[command(author, version, about = "A small book inventory kept next to your files")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true, env = "SHELF_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new shelf library
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Add a book
    Add {
        /// Book title
        title: String,

        /// Book ID (generated from the title when omitted)
        #[arg(long)]
        id: Option<String>,

        /// Author
        #[arg(long, short)]
        author: Option<String>,

        /// Category
        #[arg(long, short)]
        category: Option<String>,

        /// Status (defaults to the library's default_status)
        #[arg(long, short)]
        status: Option<String>,
    },

    /// Change fields of an existing book
    Edit {
        /// Book ID
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New author
        #[arg(long)]
        author: Option<String>,

        /// New category
        #[arg(long)]
        category: Option<String>,

        /// New status
        #[arg(long)]
        status: Option<String>,
    },

    /// Remove a book
    Remove {
        /// Book ID
        id: String,
    },

    /// Show a single book
    Show {
        /// Book ID
        id: String,
    },

    /// List books, optionally filtered and sorted
    List {
        /// Only books whose ID contains this text
        #[arg(long)]
        id: Option<String>,

        /// Only books whose title contains this text
        #[arg(long)]
        title: Option<String>,

        /// Only books whose author contains this text
        #[arg(long)]
        author: Option<String>,

        /// Only books whose category contains this text
        #[arg(long)]
        category: Option<String>,

        /// Sort by field
        #[arg(long)]
        sort: Option<Field>,

        /// Sort descending (by --sort or the configured default_sort)
        #[arg(long)]
        desc: bool,
    },

    /// Toggle the sort on a field (ascending, then descending) and list
    Sort {
        /// Field to sort by
        key: Field,
    },

    /// Find books with an exact field value
    By {
        /// Field to match
        field: Field,

        /// Value to match
        value: String,
    },

    /// Show the distinct values of an indexed field
    Index {
        /// Indexed field
        field: Field,
    },

    /// Import books from a CSV, JSONL or JSON file
    Import {
        /// File to import
        path: PathBuf,

        /// File format (guessed from the extension when omitted)
        #[arg(long = "as", value_name = "FORMAT")]
        file_format: Option<FileFormat>,
    },

    /// Export all books in inventory order
    Export {
        /// Output file (stdout when omitted)
        path: Option<PathBuf>,

        /// File format
        #[arg(long = "as", value_name = "FORMAT", default_value = "csv")]
        file_format: FileFormat,
    },

    /// Search a catalog file by title
    Lookup {
        /// Title text to search for
        title: String,

        /// Catalog file (JSON array of books)
        #[arg(long, env = "SHELF_CATALOG")]
        catalog: PathBuf,

        /// Add the matches to the library
        #[arg(long)]
        add: bool,
    },

    /// Show library status overview
    Status,
}

/// Runs the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = match cli.format {
        Some(format) => format,
        None => Config::load_global()?.default_format.into(),
    };
    let output = Output::new(format, cli.verbose);

    output.verbose("shelf starting");

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing library at: {}", path));
            let library = Library::init(&path)?;
            output.verbose_ctx(
                "init",
                &format!("Created .shelf directory at: {}", library.shelf_dir().display()),
            );
            output.success(&format!(
                "Initialized shelf library at {}",
                library.root().display()
            ));
        }

        Commands::Add {
            title,
            id,
            author,
            category,
            status,
        } => book::add(
            &output,
            NewBook {
                title,
                id,
                author,
                category,
                status,
            },
        )?,

        Commands::Edit {
            id,
            title,
            author,
            category,
            status,
        } => book::edit(
            &output,
            &id,
            BookPatch {
                title,
                author,
                category,
                status,
            },
        )?,

        Commands::Remove { id } => book::remove(&output, &id)?,
        Commands::Show { id } => book::show(&output, &id)?,

        Commands::List {
            id,
            title,
            author,
            category,
            sort,
            desc,
        } => {
            let query = Query {
                id,
                title,
                author,
                category,
            };
            book::list(&output, query, sort, desc)?
        }

        Commands::Sort { key } => book::sort(&output, key)?,
        Commands::By { field, value } => book::by(&output, field, &value)?,
        Commands::Index { field } => book::index(&output, field)?,

        Commands::Import { path, file_format } => {
            transfer::import(&output, &path, file_format)?
        }
        Commands::Export { path, file_format } => {
            transfer::export(&output, path.as_deref(), file_format)?
        }
        Commands::Lookup {
            title,
            catalog,
            add,
        } => transfer::lookup(&output, &title, &catalog, add)?,

        Commands::Status => {
            output.verbose("Gathering library status");
            book::status(&output)?
        }
    }

    output.verbose("Command completed successfully");
    Ok(())
}
