// 📋 Member listing
//
// The directory page links every member to Parliamentarian.aspx?Item=<GUID>.
// The GUID is the person id used everywhere else.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ScrapeError;
use crate::html::{cells, data_rows, element_text, selector, Document};

const MEMBERS_TABLE_ID: &str = "ctl00_cphContent_ctl00_grdMembersList";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub id: String,
    pub name: String,
}

pub fn parse_member_list(html: &str, page_url: &str) -> Result<Vec<SourceEntry>, ScrapeError> {
    let base = Url::parse(page_url).map_err(|e| ScrapeError::Url(format!("{}: {}", page_url, e)))?;
    let doc = Document::parse(html);
    let anchor = selector("a")?;

    let mut entries = Vec::new();
    for root in doc.select("html")? {
        for tr in data_rows(root, MEMBERS_TABLE_ID)? {
            let Some(first) = cells(tr).into_iter().next() else {
                continue;
            };
            for a in first.select(&anchor) {
                let Some(href) = a.value().attr("href") else {
                    continue;
                };
                match item_id(&base, href) {
                    Some(id) => entries.push(SourceEntry {
                        id,
                        name: element_text(a),
                    }),
                    None => warn!(href, "member link without Item id"),
                }
            }
        }
    }

    Ok(entries)
}

/// `Item` query parameter of an href resolved against the listing page
fn item_id(base: &Url, href: &str) -> Option<String> {
    let url = base.join(href).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == "Item")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}
