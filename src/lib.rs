// PARLINFO Members - Core Library
// House of Commons membership timelines: elected terms merged with party
// affiliations, one row per (person, term, party period).

pub mod config;
pub mod error;

pub mod dates;
pub mod terms;

pub mod fetch;
pub mod html;
pub mod listing;
pub mod profile;

pub mod members;
pub mod combine;
pub mod assemble;

pub mod db;
pub mod pipeline;

// Re-export commonly used types
pub use config::{Config, TermSource};
pub use error::ScrapeError;
pub use dates::{parse_date, parse_date_strict};
pub use terms::{ReferenceTerm, TermTable};
pub use fetch::{CachedFetcher, Fetcher, HttpFetcher};
pub use listing::{parse_member_list, SourceEntry};
pub use profile::{CaucusRow, ElectionRow, Person, Profile};
pub use members::{extract_elected, extract_factions, ElectedInterval, FactionInterval};
pub use combine::{combine, CombinedMembership};
pub use assemble::{assemble, OutputRecord};
pub use db::{
    Event, EventKind, setup_database, save_sources, save_records, pending_ids,
    source_count, count_records, get_records_for_person,
    insert_event, events_for,
};
pub use pipeline::{
    BacklogSummary, RunReport, ScrapeContext,
    person_records, scrape_person, refresh_sources, run_backlog, run,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
