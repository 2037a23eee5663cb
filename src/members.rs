// 🗳️ Membership Extractor
//
// Turns the raw result and caucus rows of a profile into dated intervals:
// elected terms (placed against the reference table) and party memberships.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dates::{parse_date, parse_date_strict, tidy};
use crate::error::ScrapeError;
use crate::profile::{CaucusRow, ElectionRow};
use crate::terms::TermTable;

pub const ELECTED: &str = "Elected";
pub const DEFEATED: &str = "Defeated";

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectedInterval {
    pub term_id: String,
    pub constituency: String,
    pub start_date: NaiveDate,
    /// End of the matched term; nobody is recorded as leaving early
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionInterval {
    pub group_id: String,
    pub start_date: NaiveDate,
    /// None while the membership is ongoing
    pub end_date: Option<NaiveDate>,
}

/// Closed vocabulary of the "Result" column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElectionResult {
    Elected,
    Defeated,
}

impl ElectionResult {
    pub fn parse(text: &str) -> Result<Self, ScrapeError> {
        match text.trim() {
            ELECTED => Ok(ElectionResult::Elected),
            DEFEATED => Ok(ElectionResult::Defeated),
            other => Err(ScrapeError::UnknownResult {
                result: other.to_string(),
            }),
        }
    }
}

// ============================================================================
// ELECTED TERMS
// ============================================================================

/// Elected rows placed against the term table.
///
/// Defeats, undated rows and dates outside every known term are skipped.
/// Any result other than Elected/Defeated fails the whole person.
pub fn extract_elected(
    rows: &[ElectionRow],
    terms: &TermTable,
) -> Result<Vec<ElectedInterval>, ScrapeError> {
    let mut seen = HashSet::new();
    let mut elected = Vec::new();

    for row in rows {
        if ElectionResult::parse(&row.result)? == ElectionResult::Defeated {
            continue;
        }

        let Some(date) = parse_date(&row.date_text) else {
            debug!(date = %row.date_text, "skipping undated result");
            continue;
        };
        let Some(term) = terms.term_for(date) else {
            debug!(%date, "no term for election date");
            continue;
        };

        let interval = ElectedInterval {
            term_id: term.term_id.clone(),
            constituency: tidy(&row.constituency),
            start_date: date,
            end_date: term.end_date,
        };

        let key = (
            interval.term_id.clone(),
            interval.constituency.clone(),
            interval.start_date,
        );
        if seen.insert(key) {
            elected.push(interval);
        }
    }

    Ok(elected)
}

// ============================================================================
// FACTIONS
// ============================================================================

pub fn extract_factions(rows: &[CaucusRow]) -> Result<Vec<FactionInterval>, ScrapeError> {
    rows.iter().map(parse_faction).collect()
}

fn parse_faction(row: &CaucusRow) -> Result<FactionInterval, ScrapeError> {
    let (start_text, end_text) = split_period(&row.period)?;
    let start_date = parse_date_strict(start_text)?
        .ok_or_else(|| ScrapeError::MalformedPeriod(row.period.clone()))?;

    Ok(FactionInterval {
        group_id: tidy(&row.group),
        start_date,
        end_date: parse_date_strict(end_text)?,
    })
}

/// "1997.09.22 - 2008.09.07" -> ("1997.09.22", "2008.09.07").
/// An ongoing period loses its trailing space when tidied ("1997.09.22 -").
pub fn split_period(period: &str) -> Result<(&str, &str), ScrapeError> {
    let period = period.trim();
    if let Some((start, end)) = period.split_once(" - ") {
        return Ok((start.trim(), end.trim()));
    }
    if let Some(start) = period.strip_suffix('-') {
        return Ok((start.trim(), ""));
    }
    Err(ScrapeError::MalformedPeriod(period.to_string()))
}

// ============================================================================
// TESTS
// ============================================================================
