/// Column-name and category constants for the sales interaction table.
/// Single source of truth for the loader, cleaner and aggregation stages.

// ── Input columns ───────────────────────────────────────────────────────────
pub mod columns {
    pub const WEEK: &str = "week";
    pub const SALES_METHOD: &str = "sales_method";
    pub const CUSTOMER_ID: &str = "customer_id";
    pub const NB_SOLD: &str = "nb_sold";
    pub const REVENUE: &str = "revenue";
    pub const YEARS_AS_CUSTOMER: &str = "years_as_customer";
    pub const NB_SITE_VISITS: &str = "nb_site_visits";
    pub const STATE: &str = "state";

    pub const ALL: [&str; 8] = [
        WEEK,
        SALES_METHOD,
        CUSTOMER_ID,
        NB_SOLD,
        REVENUE,
        YEARS_AS_CUSTOMER,
        NB_SITE_VISITS,
        STATE,
    ];
}

// ── Canonical sales methods ─────────────────────────────────────────────────
pub mod methods {
    pub const EMAIL: &str = "email";
    pub const CALL: &str = "call";
    pub const EMAIL_AND_CALL: &str = "email_and_call";

    pub const ALL: [&str; 3] = [EMAIL, CALL, EMAIL_AND_CALL];
}

// ── Campaign week bounds ────────────────────────────────────────────────────
pub mod weeks {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 6;
}

/// Map a raw `sales_method` cell onto its canonical category.
///
/// Matching is whitespace-trimmed and case-insensitive; the variant set is
/// the one observed in the source data. Returns `None` for anything else so
/// the caller can fail loudly instead of coercing unknown categories.
pub fn canonical_method(raw: &str) -> Option<&'static str> {
    match raw.trim().to_lowercase().as_str() {
        "email" => Some(methods::EMAIL),
        "call" => Some(methods::CALL),
        "email + call" | "em + call" | "email and call" | "email_and_call" => {
            Some(methods::EMAIL_AND_CALL)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_observed_variants_to_canonical_values() {
        assert_eq!(canonical_method("Email"), Some(methods::EMAIL));
        assert_eq!(canonical_method(" Email "), Some(methods::EMAIL));
        assert_eq!(canonical_method("CALL"), Some(methods::CALL));
        assert_eq!(canonical_method("Email + Call"), Some(methods::EMAIL_AND_CALL));
        assert_eq!(canonical_method("em + call"), Some(methods::EMAIL_AND_CALL));
    }

    #[test]
    fn canonical_values_map_to_themselves() {
        for method in methods::ALL {
            assert_eq!(canonical_method(method), Some(method));
        }
    }

    #[test]
    fn unknown_variants_are_rejected() {
        assert_eq!(canonical_method("fax"), None);
        assert_eq!(canonical_method(""), None);
    }
}
