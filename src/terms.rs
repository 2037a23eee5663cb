// 🏛️ Term Reference Table
//
// Known parliaments, loaded once per run and never mutated afterwards.
// Kept sorted descending by start date; term_for relies on that order.

use std::fs::File;
use std::io::Read;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::TermSource;
use crate::dates::{parse_date, parse_date_strict};
use crate::fetch::Fetcher;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceTerm {
    pub term_id: String,
    pub name: String,
    pub start_date: NaiveDate,
    /// None for the sitting parliament
    pub end_date: Option<NaiveDate>,
}

impl ReferenceTerm {
    /// True when this term is still running after `date`
    pub fn ends_after(&self, date: NaiveDate) -> bool {
        self.end_date.map_or(true, |end| end > date)
    }
}

/// One CSV row as published; dates are still text here
#[derive(Debug, Deserialize)]
struct TermRow {
    id: String,
    #[serde(default)]
    name: String,
    start_date: String,
    #[serde(default)]
    end_date: String,
}

#[derive(Debug, Clone, Default)]
pub struct TermTable {
    terms: Vec<ReferenceTerm>,
}

// ============================================================================
// LOADING
// ============================================================================

impl TermTable {
    pub fn new(mut terms: Vec<ReferenceTerm>) -> Self {
        terms.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        TermTable { terms }
    }

    /// Load from the configured source (remote URL through the fetcher, or a file)
    pub fn load(source: &TermSource, fetcher: &dyn Fetcher) -> Result<Self> {
        let table = match source {
            TermSource::Url(url) => {
                let body = fetcher
                    .fetch(url)
                    .with_context(|| format!("Failed to fetch term table: {}", url))?;
                Self::from_csv_reader(body.as_bytes())?
            }
            TermSource::File(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open term table: {}", path.display()))?;
                Self::from_csv_reader(file)?
            }
        };

        info!(terms = table.len(), "loaded reference terms");
        Ok(table)
    }

    /// Parse CSV with a header row. Headers are matched as symbol-like keys
    /// ("Start Date" and "start_date" are the same column); extra columns are ignored.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: csv::StringRecord = rdr
            .headers()
            .context("Failed to read term table header")?
            .iter()
            .map(symbolize_header)
            .collect();
        rdr.set_headers(headers);

        let mut terms = Vec::new();
        for (line_num, result) in rdr.deserialize().enumerate() {
            let row: TermRow = result.with_context(|| {
                format!("Failed to parse term table line {}", line_num + 2)
            })?;

            let start_date = parse_date(&row.start_date).with_context(|| {
                format!("Term {} has no usable start date: {:?}", row.id, row.start_date)
            })?;

            // Blank means sitting; anything unreadable must not pass for blank
            let end_date = parse_date_strict(&row.end_date).with_context(|| {
                format!("Term {} has a malformed end date: {:?}", row.id, row.end_date)
            })?;

            terms.push(ReferenceTerm {
                term_id: row.id,
                name: row.name,
                start_date,
                end_date,
            });
        }

        Ok(Self::new(terms))
    }

    // ========================================================================
    // LOOKUP
    // ========================================================================

    /// The term enclosing `date`.
    ///
    /// Splits the (descending) table into terms ending after `date` and the rest,
    /// and takes the last of the first group: the oldest term still running.
    /// A date between terms (general election) maps to the following term; a
    /// by-election date maps to the term in progress.
    pub fn term_for(&self, date: NaiveDate) -> Option<&ReferenceTerm> {
        let (ending_after, _ended): (Vec<&ReferenceTerm>, Vec<&ReferenceTerm>) =
            self.terms.iter().partition(|t| t.ends_after(date));
        ending_after.last().copied()
    }

    #[cfg(test)]
    fn get(&self, term_id: &str) -> Option<&ReferenceTerm> {
        self.terms.iter().find(|t| t.term_id == term_id)
    }

    pub fn terms(&self) -> &[ReferenceTerm] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// "Start Date " -> "start_date"
fn symbolize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

// ============================================================================
// TESTS
// ============================================================================
