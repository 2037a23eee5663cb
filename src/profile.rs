// 👤 Profile reader
//
// Reads one PARLINFO parliamentarian page into a Person plus the two raw
// interval tables (House of Commons results, caucus memberships).

use chrono::NaiveDate;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::dates::parse_date;
use crate::error::ScrapeError;
use crate::html::{cells, data_rows, element_text, labelled_text, Document};

const TITLE: &str = "#ctl00_cphContent_lblTitle";
const BIRTH_DATE: &str = "#ctl00_cphContent_DateOfBirthData";
const DEATH_DATE: &str = "#ctl00_cphContent_DeceasedDateData";
const BIRTHPLACE: &str = "#ctl00_cphContent_PlaceOfBirthData";
const PICTURE: &str = "#ctl00_cphContent_imgParliamentarianPicture";
const COMMONS_SECTION: &str = "#ctl00_cphContent_ctl00_pnlSectionHouseOfCommons";
const COMMONS_TABLE_ID: &str = "ctl00_cphContent_ctl00_grdHouseOfCommons";
const CAUCUS_TABLE_ID: &str = "ctl00_cphContent_ctl00_grdCaucus";

// ============================================================================
// TYPES
// ============================================================================

/// Static biographical attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub given_name: String,
    pub family_name: String,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub birthplace: String,
    pub image: Option<String>,
    pub source: String,
}

impl Person {
    /// "Given Family"
    pub fn name(&self) -> String {
        join_nonempty(&[&self.given_name, &self.family_name], " ")
    }

    /// "Family, Given"
    pub fn sort_name(&self) -> String {
        join_nonempty(&[&self.family_name, &self.given_name], ", ")
    }
}

/// One row of the House of Commons results grid, as text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionRow {
    pub constituency: String,
    pub date_text: String,
    pub result: String,
}

/// One row of the caucus grid, as text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaucusRow {
    pub group: String,
    /// "start - end", end possibly blank
    pub period: String,
}

#[derive(Debug, Clone)]
pub struct Profile {
    pub person: Person,
    pub elections: Vec<ElectionRow>,
    pub caucuses: Vec<CaucusRow>,
}

// ============================================================================
// PARSING
// ============================================================================

impl Profile {
    pub fn parse(id: &str, html: &str, source_url: &str) -> Result<Self, ScrapeError> {
        let doc = Document::parse(html);

        let (family_name, given_name) = split_name(&doc.text(TITLE)?);
        let image = match doc.attr(PICTURE, "src")? {
            Some(src) if !src.trim().is_empty() => Some(resolve_url(source_url, src.trim())?),
            _ => None,
        };

        let person = Person {
            id: id.to_string(),
            given_name,
            family_name,
            birth_date: parse_date(&doc.text(BIRTH_DATE)?),
            death_date: parse_date(&doc.text(DEATH_DATE)?),
            birthplace: doc.text(BIRTHPLACE)?,
            image,
            source: source_url.to_string(),
        };

        Ok(Profile {
            person,
            elections: election_rows(&doc)?,
            caucuses: caucus_rows(&doc)?,
        })
    }
}

/// Result rows live inside the Commons section; a Senate-only member has none
fn election_rows(doc: &Document) -> Result<Vec<ElectionRow>, ScrapeError> {
    let mut rows = Vec::new();
    for section in doc.select(COMMONS_SECTION)? {
        for tr in data_rows(section, COMMONS_TABLE_ID)? {
            let tds = cells(tr);
            rows.push(ElectionRow {
                constituency: tds.first().and_then(|td| labelled_text(*td)).unwrap_or_default(),
                date_text: tds.get(2).and_then(|td| labelled_text(*td)).unwrap_or_default(),
                result: tds.last().map(|td| element_text(*td)).unwrap_or_default(),
            });
        }
    }
    Ok(rows)
}

fn caucus_rows(doc: &Document) -> Result<Vec<CaucusRow>, ScrapeError> {
    let mut rows = Vec::new();
    for root in doc.select("html")? {
        for tr in data_rows(root, CAUCUS_TABLE_ID)? {
            let tds = cells(tr);
            rows.push(CaucusRow {
                group: tds.first().map(|td| element_text(*td)).unwrap_or_default(),
                period: tds.last().map(|td| element_text(*td)).unwrap_or_default(),
            });
        }
    }
    Ok(rows)
}

/// "Family, Given" -> (family, given). Only the first comma splits.
pub fn split_name(title: &str) -> (String, String) {
    match title.split_once(',') {
        Some((family, given)) => (family.trim().to_string(), given.trim().to_string()),
        None => (title.trim().to_string(), String::new()),
    }
}

/// Resolve a possibly relative href against the page it appeared on
pub fn resolve_url(base: &str, href: &str) -> Result<String, ScrapeError> {
    let base = Url::parse(base).map_err(|e| ScrapeError::Url(format!("{}: {}", base, e)))?;
    base.join(href)
        .map(|u| u.to_string())
        .map_err(|e| ScrapeError::Url(format!("{}: {}", href, e)))
}

fn join_nonempty(parts: &[&str], sep: &str) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(sep)
}

// ============================================================================
// TESTS
// ============================================================================
