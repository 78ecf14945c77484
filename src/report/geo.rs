//! Geographic Dominance Module
//! Which sales method dominates each state, as choropleth-ready rows.

use crate::data::schema::methods;
use crate::stats::MethodStateSummary;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// US state name -> two-letter abbreviation.
const STATE_ABBREVIATIONS: [(&str, &str); 50] = [
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("Delaware", "DE"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Hawaii", "HI"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Iowa", "IA"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Maine", "ME"),
    ("Maryland", "MD"),
    ("Massachusetts", "MA"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Mississippi", "MS"),
    ("Missouri", "MO"),
    ("Montana", "MT"),
    ("Nebraska", "NE"),
    ("Nevada", "NV"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("New York", "NY"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Vermont", "VT"),
    ("Virginia", "VA"),
    ("Washington", "WA"),
    ("West Virginia", "WV"),
    ("Wisconsin", "WI"),
    ("Wyoming", "WY"),
];

pub fn state_abbreviation(state: &str) -> Option<&'static str> {
    STATE_ABBREVIATIONS
        .iter()
        .find(|(name, _)| *name == state)
        .map(|(_, abbrev)| *abbrev)
}

/// Method share breakdown for one state.
#[derive(Debug, Clone, Serialize)]
pub struct StateDominance {
    pub state: String,
    pub abbreviation: &'static str,
    pub email_pct: f64,
    pub call_pct: f64,
    pub email_and_call_pct: f64,
    pub dominant_method: String,
    pub dominance_pct: f64,
}

/// Per-state percentage share of interactions by method, with the dominant
/// method and its strength. States outside the 50-state table are logged and
/// omitted so every emitted row can carry an abbreviation.
pub fn dominance_by_state(summaries: &[MethodStateSummary]) -> Vec<StateDominance> {
    let mut counts: BTreeMap<&str, BTreeMap<&str, usize>> = BTreeMap::new();
    for s in summaries {
        *counts
            .entry(s.state.as_str())
            .or_default()
            .entry(s.sales_method.as_str())
            .or_default() += s.count;
    }

    let mut rows = Vec::with_capacity(counts.len());
    for (state, by_method) in counts {
        let Some(abbreviation) = state_abbreviation(state) else {
            warn!(state, "state not in the 50-state table, omitted from dominance output");
            continue;
        };

        let total: usize = by_method.values().sum();
        if total == 0 {
            continue;
        }

        let pct = |method: &str| -> f64 {
            100.0 * by_method.get(method).copied().unwrap_or(0) as f64 / total as f64
        };
        let email_pct = pct(methods::EMAIL);
        let call_pct = pct(methods::CALL);
        let email_and_call_pct = pct(methods::EMAIL_AND_CALL);

        // First canonical method wins percentage ties, deterministically.
        let mut dominant_method = "";
        let mut dominance_pct = f64::MIN;
        for method in methods::ALL {
            let share = pct(method);
            if share > dominance_pct {
                dominant_method = method;
                dominance_pct = share;
            }
        }

        rows.push(StateDominance {
            state: state.to_string(),
            abbreviation,
            email_pct,
            call_pct,
            email_and_call_pct,
            dominant_method: dominant_method.to_string(),
            dominance_pct,
        });
    }
    rows
}
