// ⚙️ Run configuration
//
// Defaults point at the public PARLINFO directory and the EveryPolitician
// term table. The CLI overrides any of them (flags or env vars).

use std::path::PathBuf;

/// Directory of all past and present House of Commons members
pub const MEMBER_LIST_URL: &str =
    "https://lop.parl.ca/parlinfo/Lists/Members.aspx?New=False&Current=False";

/// Profile page; `{id}` is the PARLINFO `Item` GUID
pub const PERSON_URL: &str =
    "https://lop.parl.ca/parlinfo/Files/Parliamentarian.aspx?Item={id}&Language=E";

/// Known parliaments with their start/end dates
pub const TERM_SOURCE_URL: &str = "https://raw.githubusercontent.com/everypolitician/everypolitician-data/master/data/Canada/Commons/sources/manual/terms.csv";

/// Env flag that turns on per-record debug output
pub const DEBUG_ENV: &str = "MORPH_DEBUG";

/// Where the reference term table comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermSource {
    Url(String),
    File(PathBuf),
}

impl TermSource {
    /// Anything that looks like an http(s) URL is fetched, the rest is a path
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            TermSource::Url(raw.to_string())
        } else {
            TermSource::File(PathBuf::from(raw))
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub cache_dir: PathBuf,
    pub member_list_url: String,
    pub person_url: String,
    pub terms: TermSource,
    pub debug: bool,
    /// Log a progress line every N persons
    pub progress_every: usize,
}

impl Config {
    /// Profile URL for a PARLINFO id
    pub fn person_url(&self, id: &str) -> String {
        self.person_url.replace("{id}", id)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from("data.sqlite"),
            cache_dir: PathBuf::from(".cache"),
            member_list_url: MEMBER_LIST_URL.to_string(),
            person_url: PERSON_URL.to_string(),
            terms: TermSource::Url(TERM_SOURCE_URL.to_string()),
            debug: false,
            progress_every: 10,
        }
    }
}
