mod chips;
mod config;
mod contact;
mod logging;
mod search;
mod ui;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use config::{Config, EmptyQuery};
use contact::{Catalog, Chip};
use ui::app::{App, Exit};

#[derive(Parser, Debug)]
#[command(name = "chipdx", about = "Pick contacts as chips from a fixed catalog")]
struct Cli {
    /// Configuration file (defaults to ~/.config/chipdx/config.toml)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Contact catalog (.toml or .json); overrides the configuration
    #[arg(long, value_name = "PATH", global = true)]
    catalog: Option<PathBuf>,

    /// List every remaining contact while the input is empty
    #[arg(long, conflicts_with = "hide_empty")]
    show_all: bool,

    /// Show no suggestions until something is typed
    #[arg(long)]
    hide_empty: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Query contacts for email addresses (abook-compatible output for aerc/mutt)
    Query(QueryArgs),
    /// Print every catalog entry
    List,
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// Search term (matches name or email, case-insensitive)
    query: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init()?;
    let mut config = config::load(cli.config.as_deref())?;

    if let Some(path) = cli.catalog.clone() {
        config.catalog = Some(path);
    }
    if cli.show_all {
        config.empty_query = EmptyQuery::All;
    } else if cli.hide_empty {
        config.empty_query = EmptyQuery::Hidden;
    }

    let catalog = resolve_catalog(&config)?;

    match cli.command {
        Some(Command::Query(args)) => handle_query(args, &catalog),
        Some(Command::List) => {
            handle_list(&catalog);
            Ok(())
        }
        None => handle_pick(&config, catalog),
    }
}

fn resolve_catalog(config: &Config) -> Result<Catalog> {
    match &config.catalog {
        Some(path) => contact::load_catalog(path),
        None => {
            log::info!("using built-in catalog");
            Ok(Catalog::builtin())
        }
    }
}

fn handle_pick(config: &Config, catalog: Catalog) -> Result<()> {
    if let Some(path) = &config.config_path {
        log::info!("loaded configuration from {}", path.display());
    }

    let mut app = App::new(config, catalog);
    match app.run()? {
        Exit::Done(chips) => print_chips(&chips),
        Exit::Aborted => {}
    }
    Ok(())
}

fn print_chips(chips: &[Chip]) {
    for chip in chips {
        println!("{}\t{}", chip.email, chip.name);
    }
}

fn handle_query(args: QueryArgs, catalog: &Catalog) -> Result<()> {
    let results = search::filter(&args.query, catalog.contacts());

    // Header line (abook-compatible, ignored by mutt/aerc)
    if results.is_empty() {
        println!("No matches for \"{}\"", args.query);
    } else {
        println!(
            "Found {} contact(s) matching \"{}\"",
            results.len(),
            args.query
        );
    }

    // Results: email<TAB>name (abook mutt-query format)
    for contact in results {
        println!("{}\t{}", contact.email, contact.name);
    }

    Ok(())
}

fn handle_list(catalog: &Catalog) {
    for contact in catalog.contacts() {
        println!("{}\t{}\t{}", contact.id, contact.name, contact.email);
    }
}
