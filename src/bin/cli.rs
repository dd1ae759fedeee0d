//! RecipeBox CLI Client
//!
//! Command-line interface for interacting with a RecipeBox server, plus an
//! offline index check against a local data directory.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use recipebox::network::Client;
use recipebox::protocol::Response;
use recipebox::{RecipeError, RecipeStore, Record, Result};

/// RecipeBox CLI
#[derive(Parser, Debug)]
#[command(name = "recipebox-cli")]
#[command(about = "CLI for the RecipeBox recipe store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:3000")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every recipe id and title
    List,

    /// Print one recipe
    Get {
        /// The recipe id
        id: String,
    },

    /// Create a recipe from a JSON document (must contain "title")
    Create {
        /// The recipe document, e.g. '{"title":"Soup","serves":4}'
        json: String,
    },

    /// Replace an existing recipe
    Update {
        /// The recipe id
        id: String,

        /// The new recipe document
        json: String,
    },

    /// Delete a recipe
    Del {
        /// The recipe id
        id: String,
    },

    /// Ping the server
    Ping,

    /// Compare a local data directory's index with its record files
    Check {
        /// Data directory to inspect
        data_dir: String,

        /// Rebuild the index from the record files
        #[arg(long)]
        repair: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the request succeeded
fn run(args: Args) -> Result<bool> {
    let server = args.server;
    let response = match args.command {
        Commands::Check { data_dir, repair } => return check(&data_dir, repair),
        Commands::List => Client::connect(&server)?.list()?,
        Commands::Get { id } => Client::connect(&server)?.read(&id)?,
        Commands::Create { json } => Client::connect(&server)?.create(parse_record(&json)?)?,
        Commands::Update { id, json } => {
            Client::connect(&server)?.update(&id, parse_record(&json)?)?
        }
        Commands::Del { id } => Client::connect(&server)?.delete(&id)?,
        Commands::Ping => Client::connect(&server)?.ping()?,
    };

    Ok(print_response(&response))
}

fn parse_record(json: &str) -> Result<Record> {
    Record::from_slice(json.as_bytes())
        .map_err(|e| RecipeError::Protocol(format!("invalid recipe document: {}", e)))
}

fn print_response(response: &Response) -> bool {
    let code = response.status.http_code();
    match &response.payload {
        Some(payload) => println!("{} {}", code, String::from_utf8_lossy(payload)),
        None => println!("{}", code),
    }
    response.status.is_success()
}

fn check(data_dir: &str, repair: bool) -> Result<bool> {
    // Inspection only: never bootstrap a missing directory
    let store = RecipeStore::new(data_dir);
    store.attach()?;

    let report = if repair { store.repair()? } else { store.reconcile()? };

    println!("{}", report);
    for id in &report.unindexed {
        println!("  unindexed: {}", id);
    }
    for id in &report.missing {
        println!("  missing:   {}", id);
    }
    for id in &report.unreadable {
        println!("  unreadable: {}", id);
    }

    Ok(repair || report.is_consistent())
}
