// 🔗 Interval Combiner
//
// Intersects elected terms with party memberships. A membership that spans
// several terms is split across them; a term with no recorded membership is
// kept as one unaffiliated record (group_id = None).
//
// All ranges are half-open [start, end); a missing end is the unbounded future.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::members::{ElectedInterval, FactionInterval};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedMembership {
    pub term_id: String,
    pub constituency: String,
    pub group_id: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Intersection of [a_start, a_end) and [b_start, b_end), if non-empty
pub fn overlap(
    a: (NaiveDate, Option<NaiveDate>),
    b: (NaiveDate, Option<NaiveDate>),
) -> Option<(NaiveDate, Option<NaiveDate>)> {
    let start = a.0.max(b.0);
    let end = match (a.1, b.1) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    };

    match end {
        Some(end) if end <= start => None,
        _ => Some((start, end)),
    }
}

pub fn combine(terms: &[ElectedInterval], factions: &[FactionInterval]) -> Vec<CombinedMembership> {
    let mut combined = Vec::new();

    for term in terms {
        let span = (term.start_date, term.end_date);
        let before = combined.len();

        for faction in factions {
            if let Some((start_date, end_date)) = overlap(span, (faction.start_date, faction.end_date)) {
                combined.push(CombinedMembership {
                    term_id: term.term_id.clone(),
                    constituency: term.constituency.clone(),
                    group_id: Some(faction.group_id.clone()),
                    start_date,
                    end_date,
                });
            }
        }

        if combined.len() == before {
            combined.push(CombinedMembership {
                term_id: term.term_id.clone(),
                constituency: term.constituency.clone(),
                group_id: None,
                start_date: term.start_date,
                end_date: term.end_date,
            });
        }
    }

    combined.sort_by(|a, b| {
        (a.start_date, &a.term_id, &a.group_id).cmp(&(b.start_date, &b.term_id, &b.group_id))
    });
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn term(id: &str, start: NaiveDate, end: Option<NaiveDate>) -> ElectedInterval {
        ElectedInterval {
            term_id: id.to_string(),
            constituency: "Halifax".to_string(),
            start_date: start,
            end_date: end,
        }
    }

    fn faction(group: &str, start: NaiveDate, end: Option<NaiveDate>) -> FactionInterval {
        FactionInterval {
            group_id: group.to_string(),
            start_date: start,
            end_date: end,
        }
    }

    #[test]
    fn test_no_terms_no_output() {
        let factions = vec![faction("NDP", ymd(2000, 1, 1), None)];
        assert!(combine(&[], &factions).is_empty());
        assert!(combine(&[], &[]).is_empty());
    }

    #[test]
    fn test_term_without_faction_is_kept_unaffiliated() {
        let terms = vec![term("36", ymd(1997, 6, 2), Some(ymd(2000, 10, 22)))];
        let combined = combine(&terms, &[]);

        assert_eq!(
            combined,
            vec![CombinedMembership {
                term_id: "36".to_string(),
                constituency: "Halifax".to_string(),
                group_id: None,
                start_date: ymd(1997, 6, 2),
                end_date: Some(ymd(2000, 10, 22)),
            }]
        );
    }

    #[test]
    fn test_open_faction_clipped_to_term() {
        let terms = vec![term("1", ymd(2000, 1, 1), Some(ymd(2004, 1, 1)))];
        let factions = vec![faction("Reform", ymd(2002, 1, 1), None)];
        let combined = combine(&terms, &factions);

        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].group_id.as_deref(), Some("Reform"));
        assert_eq!(combined[0].start_date, ymd(2002, 1, 1));
        assert_eq!(combined[0].end_date, Some(ymd(2004, 1, 1)));
    }

    #[test]
    fn test_faction_split_across_back_to_back_terms() {
        let terms = vec![
            term("1", ymd(2000, 1, 1), Some(ymd(2004, 1, 1))),
            term("2", ymd(2004, 1, 1), Some(ymd(2008, 1, 1))),
        ];
        let factions = vec![faction("Liberal", ymd(2000, 1, 1), Some(ymd(2008, 1, 1)))];
        let combined = combine(&terms, &factions);

        assert_eq!(combined.len(), 2);
        assert_eq!(combined[0].term_id, "1");
        assert_eq!((combined[0].start_date, combined[0].end_date), (ymd(2000, 1, 1), Some(ymd(2004, 1, 1))));
        assert_eq!(combined[1].term_id, "2");
        assert_eq!((combined[1].start_date, combined[1].end_date), (ymd(2004, 1, 1), Some(ymd(2008, 1, 1))));
    }

    #[test]
    fn test_party_switch_mid_term() {
        let terms = vec![term("35", ymd(1993, 10, 25), Some(ymd(1997, 4, 27)))];
        let factions = vec![
            faction("Bloc Québécois", ymd(1993, 10, 25), Some(ymd(1995, 6, 1))),
            faction("Independent", ymd(1995, 6, 1), None),
        ];
        let combined = combine(&terms, &factions);

        assert_eq!(combined.len(), 2);
        assert_eq!(combined[0].group_id.as_deref(), Some("Bloc Québécois"));
        assert_eq!(combined[0].end_date, Some(ymd(1995, 6, 1)));
        assert_eq!(combined[1].group_id.as_deref(), Some("Independent"));
        assert_eq!(combined[1].start_date, ymd(1995, 6, 1));
        assert_eq!(combined[1].end_date, Some(ymd(1997, 4, 27)));
    }

    #[test]
    fn test_touching_ranges_do_not_overlap() {
        assert!(overlap((ymd(2000, 1, 1), Some(ymd(2004, 1, 1))), (ymd(2004, 1, 1), None)).is_none());
        assert_eq!(
            overlap((ymd(2000, 1, 1), None), (ymd(1990, 1, 1), None)),
            Some((ymd(2000, 1, 1), None))
        );
    }

    #[test]
    fn test_faction_outside_term_leaves_term_unaffiliated() {
        let terms = vec![term("1", ymd(2000, 1, 1), Some(ymd(2004, 1, 1)))];
        let factions = vec![faction("Liberal", ymd(2010, 1, 1), None)];
        let combined = combine(&terms, &factions);

        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].group_id, None);
    }
}
