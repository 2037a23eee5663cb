// 🚜 Pipeline
//
// fetch -> profile -> elected/factions -> combine -> assemble -> sink,
// one person at a time. A person whose page cannot be understood is logged,
// recorded as an event and skipped; sink failures stop the run.

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;
use tracing::{info, warn};

use crate::assemble::{assemble, OutputRecord};
use crate::combine::combine;
use crate::config::Config;
use crate::db::{self, Event};
use crate::error::ScrapeError;
use crate::fetch::Fetcher;
use crate::listing::parse_member_list;
use crate::members::{extract_elected, extract_factions};
use crate::profile::Profile;
use crate::terms::TermTable;

/// Everything a run reads but never changes
pub struct ScrapeContext<'a> {
    pub config: &'a Config,
    pub terms: &'a TermTable,
    pub fetcher: &'a dyn Fetcher,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BacklogSummary {
    pub attempted: usize,
    pub with_records: usize,
    pub records: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RunReport {
    ListUpdated { sources: usize },
    Backlog(BacklogSummary),
}

// ============================================================================
// ONE PERSON
// ============================================================================

/// Output rows for one profile page. Empty when the person was never elected
/// to a known term.
pub fn person_records(
    id: &str,
    html: &str,
    source_url: &str,
    terms: &TermTable,
) -> Result<Vec<OutputRecord>, ScrapeError> {
    let profile = Profile::parse(id, html, source_url)?;

    let elected = extract_elected(&profile.elections, terms)?;
    if elected.is_empty() {
        return Ok(Vec::new());
    }

    let factions = extract_factions(&profile.caucuses)?;
    let combined = combine(&elected, &factions);
    Ok(assemble(&profile.person, &combined))
}

pub fn scrape_person(ctx: &ScrapeContext, id: &str) -> Result<Vec<OutputRecord>, ScrapeError> {
    let url = ctx.config.person_url(id);
    let html = ctx.fetcher.fetch(&url)?;
    person_records(id, &html, &url, ctx.terms)
}

// ============================================================================
// RUNS
// ============================================================================

/// Fetch the member directory and upsert every id into `sources`
pub fn refresh_sources(ctx: &ScrapeContext, conn: &Connection) -> Result<usize> {
    let url = &ctx.config.member_list_url;
    let html = ctx
        .fetcher
        .fetch(url)
        .with_context(|| format!("Failed to fetch member list: {}", url))?;
    let entries = parse_member_list(&html, url)?;

    db::save_sources(conn, &entries)?;
    db::insert_event(conn, &Event::list_updated(url, entries.len()))?;

    info!(count = entries.len(), "List updated");
    Ok(entries.len())
}

/// Scrape every pending id
pub fn run_backlog(ctx: &ScrapeContext, conn: &Connection) -> Result<BacklogSummary> {
    let wanted = db::pending_ids(conn)?;
    info!("{} to fetch", wanted.len());

    let mut summary = BacklogSummary::default();
    for (i, id) in wanted.iter().enumerate() {
        if ctx.config.progress_every > 0 && i % ctx.config.progress_every == 0 {
            info!(done = i, total = wanted.len(), "progress");
        }
        summary.attempted += 1;

        match scrape_person(ctx, id) {
            Ok(records) => {
                if records.is_empty() {
                    continue;
                }
                if ctx.config.debug {
                    print_debug(&records);
                }
                db::save_records(conn, &records)?;
                summary.with_records += 1;
                summary.records += records.len();
            }
            Err(e) => {
                warn!(id = %id, error = %e, "person skipped");
                summary.failed += 1;
                db::insert_event(conn, &Event::person_failed(id, &e))?;
            }
        }
    }

    info!(
        attempted = summary.attempted,
        records = summary.records,
        failed = summary.failed,
        "backlog done"
    );
    Ok(summary)
}

/// First run fills `sources`; later runs work through what is still pending
pub fn run(ctx: &ScrapeContext, conn: &Connection) -> Result<RunReport> {
    if db::source_count(conn)? == 0 {
        let sources = refresh_sources(ctx, conn)?;
        return Ok(RunReport::ListUpdated { sources });
    }
    Ok(RunReport::Backlog(run_backlog(ctx, conn)?))
}

/// Non-empty fields of each record, sorted by key
pub fn print_debug(records: &[OutputRecord]) {
    for record in records {
        match serde_json::to_string(&record.debug_fields()) {
            Ok(line) => println!("{}", line),
            Err(e) => warn!(error = %e, "could not render debug record"),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::tests::profile_html;
    use std::collections::HashMap;

    const TERMS_CSV: &str = "\
id,name,start_date,end_date
35,35th Parliament,1994-01-17,1997-04-27
36,36th Parliament,1997-09-22,2000-10-22
37,37th Parliament,2001-01-29,2004-05-23
";

    /// Serves canned pages by URL
    struct MapFetcher {
        pages: HashMap<String, String>,
    }

    impl Fetcher for MapFetcher {
        fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
            self.pages.get(url).cloned().ok_or_else(|| ScrapeError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    fn terms() -> TermTable {
        TermTable::from_csv_reader(TERMS_CSV.as_bytes()).unwrap()
    }

    fn list_html(ids: &[&str]) -> String {
        let rows: String = ids
            .iter()
            .map(|id| {
                format!(
                    r#"<tr><td><a href="../Files/Parliamentarian.aspx?Item={id}&amp;Language=E">Member, {id}</a></td></tr>"#
                )
            })
            .collect();
        format!(
            r#"<html><body><table id="ctl00_cphContent_ctl00_grdMembersList">
            <tr><th>Name</th></tr>{rows}</table></body></html>"#
        )
    }

    fn fixture(config: &Config) -> MapFetcher {
        let mut pages = HashMap::new();
        pages.insert(
            config.member_list_url.clone(),
            list_html(&["elected", "defeated", "withdrew"]),
        );
        pages.insert(
            config.person_url("elected"),
            profile_html(
                &[
                    ("Halifax", "1997.06.02", "Elected"),
                    ("Halifax", "2000.11.27", "Elected"),
                    ("Halifax", "1993.10.25", "Defeated"),
                ],
                &[("New Democratic Party", "1995.10.14 - ")],
            ),
        );
        pages.insert(
            config.person_url("defeated"),
            profile_html(&[("Halifax", "1993.10.25", "Defeated")], &[]),
        );
        pages.insert(
            config.person_url("withdrew"),
            profile_html(
                &[
                    ("Halifax", "1997.06.02", "Elected"),
                    ("Halifax", "2000.11.27", "Withdrew"),
                ],
                &[],
            ),
        );
        MapFetcher { pages }
    }

    #[test]
    fn test_person_records_elected() {
        let config = Config::default();
        let fetcher = fixture(&config);
        let terms = terms();
        let ctx = ScrapeContext {
            config: &config,
            terms: &terms,
            fetcher: &fetcher,
        };

        let records = scrape_person(&ctx, "elected").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].term, "36");
        assert_eq!(records[0].faction, "New Democratic Party");
        assert_eq!(records[0].start_date, "1997-06-02");
        assert_eq!(records[0].end_date, "2000-10-22");
        assert_eq!(records[1].term, "37");
        assert_eq!(records[1].end_date, "2004-05-23");
    }

    #[test]
    fn test_defeated_only_person_has_no_records() {
        let config = Config::default();
        let fetcher = fixture(&config);
        let terms = terms();
        let ctx = ScrapeContext {
            config: &config,
            terms: &terms,
            fetcher: &fetcher,
        };

        assert!(scrape_person(&ctx, "defeated").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_result_gives_no_partial_output() {
        let config = Config::default();
        let fetcher = fixture(&config);
        let terms = terms();
        let ctx = ScrapeContext {
            config: &config,
            terms: &terms,
            fetcher: &fetcher,
        };

        let err = scrape_person(&ctx, "withdrew").unwrap_err();
        assert!(matches!(err, ScrapeError::UnknownResult { .. }));
    }

    #[test]
    fn test_full_run_isolates_failures() {
        let config = Config::default();
        let fetcher = fixture(&config);
        let terms = terms();
        let ctx = ScrapeContext {
            config: &config,
            terms: &terms,
            fetcher: &fetcher,
        };
        let conn = Connection::open_in_memory().unwrap();
        db::setup_database(&conn).unwrap();

        // First run only discovers ids
        assert_eq!(run(&ctx, &conn).unwrap(), RunReport::ListUpdated { sources: 3 });
        assert_eq!(db::count_records(&conn).unwrap(), 0);

        let report = run(&ctx, &conn).unwrap();
        assert_eq!(
            report,
            RunReport::Backlog(BacklogSummary {
                attempted: 3,
                with_records: 1,
                records: 2,
                failed: 1,
            })
        );

        assert_eq!(db::count_records(&conn).unwrap(), 2);
        assert!(db::get_records_for_person(&conn, "withdrew").unwrap().is_empty());

        let events = db::events_for(&conn, "withdrew").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, db::EventKind::PersonFailed);

        assert_eq!(
            db::pending_ids(&conn).unwrap(),
            vec!["defeated".to_string(), "withdrew".to_string()]
        );

        println!("✅ Full run test PASSED");
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let config = Config::default();
        let fetcher = fixture(&config);
        let terms = terms();
        let ctx = ScrapeContext {
            config: &config,
            terms: &terms,
            fetcher: &fetcher,
        };

        let first = scrape_person(&ctx, "elected").unwrap();
        let second = scrape_person(&ctx, "elected").unwrap();
        assert_eq!(first, second);

        let conn = Connection::open_in_memory().unwrap();
        db::setup_database(&conn).unwrap();
        db::save_records(&conn, &first).unwrap();
        db::save_records(&conn, &second).unwrap();
        assert_eq!(db::get_records_for_person(&conn, "elected").unwrap(), first);
    }
}
