// 🧾 Record Assembler
//
// One flat row per (person, membership). Dates are ISO strings from here on,
// which is how the sink stores and compares them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::combine::CombinedMembership;
use crate::dates::{iso, iso_opt};
use crate::profile::Person;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    // Person
    pub id: String,
    pub name: String,
    pub sort_name: String,
    pub given_name: String,
    pub family_name: String,
    pub birth_date: String,
    pub death_date: String,
    pub birthplace: String,
    pub image: String,
    pub source: String,

    // Membership
    pub term: String,
    pub constituency: String,
    pub faction: String,
    pub start_date: String,
    pub end_date: String,
}

impl OutputRecord {
    pub fn new(person: &Person, membership: &CombinedMembership) -> Self {
        OutputRecord {
            id: person.id.clone(),
            name: person.name(),
            sort_name: person.sort_name(),
            given_name: person.given_name.clone(),
            family_name: person.family_name.clone(),
            birth_date: iso_opt(person.birth_date),
            death_date: iso_opt(person.death_date),
            birthplace: person.birthplace.clone(),
            image: person.image.clone().unwrap_or_default(),
            source: person.source.clone(),
            term: membership.term_id.clone(),
            constituency: membership.constituency.clone(),
            faction: membership.group_id.clone().unwrap_or_default(),
            start_date: iso(membership.start_date),
            end_date: iso_opt(membership.end_date),
        }
    }

    /// Non-empty fields sorted by key, for manual inspection
    pub fn debug_fields(&self) -> BTreeMap<String, String> {
        let value = serde_json::to_value(self).unwrap_or_default();
        let mut fields = BTreeMap::new();
        if let serde_json::Value::Object(map) = value {
            for (key, v) in map {
                if let serde_json::Value::String(s) = v {
                    if !s.is_empty() {
                        fields.insert(key, s);
                    }
                }
            }
        }
        fields
    }
}

/// No memberships means the person never sat: no rows at all.
pub fn assemble(person: &Person, combined: &[CombinedMembership]) -> Vec<OutputRecord> {
    combined
        .iter()
        .map(|m| OutputRecord::new(person, m))
        .collect()
}
