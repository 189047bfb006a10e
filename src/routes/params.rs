use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Prefix typed so far; empty returns the first entries alphabetically.
    pub q: Option<String>,
}

impl SearchQuery {
    /// Case-insensitive prefix pattern with LIKE metacharacters escaped.
    pub fn prefix_pattern(&self) -> String {
        let mut pattern = self.escaped_term();
        pattern.push('%');
        pattern
    }

    /// Matches the term anywhere in the value.
    pub fn contains_pattern(&self) -> String {
        format!("%{}%", self.escaped_term())
    }

    fn escaped_term(&self) -> String {
        let term = self.q.as_deref().unwrap_or("").trim();
        let mut escaped = String::with_capacity(term.len());
        for c in term.chars() {
            if matches!(c, '%' | '_' | '\\') {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SalesQuery {
    // Not flattened: serde_urlencoded cannot parse numbers through `flatten`.
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Inclusive start date (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Inclusive end date (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
    /// Fragment of the client name, or an exact invoice id.
    pub q: Option<String>,
}

impl SalesQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_is_clamped() {
        let p = Pagination {
            page: Some(0),
            per_page: Some(500),
        };
        assert_eq!(p.normalize(), (1, 100, 0));

        let p = Pagination {
            page: Some(3),
            per_page: None,
        };
        assert_eq!(p.normalize(), (3, 20, 40));
    }

    #[test]
    fn prefix_pattern_escapes_wildcards() {
        let q = SearchQuery {
            q: Some(" 50%_off ".into()),
        };
        assert_eq!(q.prefix_pattern(), "50\\%\\_off%");
        assert_eq!(SearchQuery { q: None }.prefix_pattern(), "%");
    }

    #[test]
    fn contains_pattern_wraps_both_sides() {
        let q = SearchQuery {
            q: Some("pe_rez".into()),
        };
        assert_eq!(q.contains_pattern(), "%pe\\_rez%");
        assert_eq!(SearchQuery { q: Some("  ".into()) }.contains_pattern(), "%%");
    }
}
