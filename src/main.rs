use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::builder::FalseyValueParser;
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use tracing::info;
use tracing_subscriber::EnvFilter;

use parlinfo_members::config::{TERM_SOURCE_URL, DEBUG_ENV};
use parlinfo_members::pipeline::print_debug;
use parlinfo_members::{
    refresh_sources, run, run_backlog, save_records, scrape_person, setup_database,
    CachedFetcher, Config, HttpFetcher, RunReport, ScrapeContext, TermSource, TermTable,
};

#[derive(Parser)]
#[command(name = "parlinfo-members", version, about = "House of Commons membership scraper")]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "PARLINFO_DB", default_value = "data.sqlite", global = true)]
    db: PathBuf,

    /// Directory for cached pages
    #[arg(long, env = "PARLINFO_CACHE_DIR", default_value = ".cache", global = true)]
    cache_dir: PathBuf,

    /// Term table: URL or local CSV path
    #[arg(long, env = "PARLINFO_TERMS", default_value = TERM_SOURCE_URL, global = true)]
    terms: String,

    /// Print each record's non-empty fields (any non-falsey env value turns it on)
    #[arg(long, env = DEBUG_ENV, global = true, value_parser = FalseyValueParser::new())]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Discover ids when none are stored yet, otherwise work through the backlog
    Run,
    /// Refresh the list of member ids
    List,
    /// Scrape every id without stored records
    Scrape,
    /// Scrape a single person and print the records
    Person {
        id: String,
        /// Also write the records to the database
        #[arg(long)]
        save: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config {
        db_path: cli.db,
        cache_dir: cli.cache_dir,
        terms: TermSource::parse(&cli.terms),
        debug: cli.debug,
        ..Config::default()
    };
    info!(version = parlinfo_members::VERSION, db = %config.db_path.display(), "starting");

    let fetcher = CachedFetcher::new(HttpFetcher::new()?, config.cache_dir.clone());
    let conn = Connection::open(&config.db_path)
        .with_context(|| format!("Failed to open database: {}", config.db_path.display()))?;
    setup_database(&conn)?;

    let command = cli.command.unwrap_or(Command::Run);

    // Listing does not need the term table
    let terms = match command {
        Command::List => TermTable::default(),
        _ => TermTable::load(&config.terms, &fetcher)?,
    };
    let ctx = ScrapeContext {
        config: &config,
        terms: &terms,
        fetcher: &fetcher,
    };

    match command {
        Command::Run => match run(&ctx, &conn)? {
            RunReport::ListUpdated { sources } => info!(sources, "run again to fetch profiles"),
            RunReport::Backlog(summary) => info!(?summary, "done"),
        },
        Command::List => {
            refresh_sources(&ctx, &conn)?;
        }
        Command::Scrape => {
            run_backlog(&ctx, &conn)?;
        }
        Command::Person { id, save } => {
            let records = scrape_person(&ctx, &id)
                .with_context(|| format!("Failed to scrape person {}", id))?;
            print_debug(&records);
            if save {
                save_records(&conn, &records)?;
            }
            info!(records = records.len(), "person done");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_flag_from_env() {
        // Only test in this binary that touches the variable
        std::env::set_var(DEBUG_ENV, "1");
        let cli = Cli::try_parse_from(["parlinfo-members", "run"]).unwrap();
        assert!(cli.debug);

        std::env::set_var(DEBUG_ENV, "yes");
        assert!(Cli::try_parse_from(["parlinfo-members"]).unwrap().debug);

        std::env::set_var(DEBUG_ENV, "0");
        assert!(!Cli::try_parse_from(["parlinfo-members"]).unwrap().debug);

        std::env::remove_var(DEBUG_ENV);
        assert!(!Cli::try_parse_from(["parlinfo-members"]).unwrap().debug);
        assert!(Cli::try_parse_from(["parlinfo-members", "--debug"]).unwrap().debug);
    }
}
