//! Unified record and query types shared by every source extractor.

use serde::Serialize;

/// Sentinel for a field whose extraction strategies all failed.
///
/// Distinct from an empty string, which means the field is legitimately
/// blank (e.g. email/phone, which no listing page exposes).
pub const NA: &str = "N/A";

/// Sentinel company for post search results; posts carry no structured
/// company field.
pub const NA_POST: &str = "N/A (Post)";

/// One normalized job/internship listing.
///
/// Constructed once per discovered card and never mutated afterwards.
/// All fields are always present; unrecoverable values hold [`NA`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    pub title: String,
    pub company: String,
    pub location: String,
    pub email: String,
    pub phone: String,
    pub source_url: String,
}

impl JobRecord {
    /// Build a record from the four extracted fields. Email and phone
    /// start empty; the primary sources never expose contact details.
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        location: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            location: location.into(),
            email: String::new(),
            phone: String::new(),
            source_url: source_url.into(),
        }
    }
}

/// Error returned when a query is constructed from blank input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("designation must not be empty")]
    EmptyDesignation,

    #[error("city must not be empty")]
    EmptyCity,
}

/// One search, read-only for every extractor in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub designation: String,
    pub city: String,
}

impl SearchQuery {
    /// Validate and build a query. Both parts are required non-empty;
    /// surrounding whitespace is stripped.
    pub fn new(designation: &str, city: &str) -> Result<Self, QueryError> {
        let designation = designation.trim();
        let city = city.trim();

        if designation.is_empty() {
            return Err(QueryError::EmptyDesignation);
        }
        if city.is_empty() {
            return Err(QueryError::EmptyCity);
        }

        Ok(Self {
            designation: designation.to_string(),
            city: city.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_has_empty_contact_fields() {
        let record = JobRecord::new("Engineer", "Acme", "Berlin", "https://example.com/1");

        assert_eq!(record.email, "");
        assert_eq!(record.phone, "");
        assert_eq!(record.title, "Engineer");
    }

    #[test]
    fn query_rejects_blank_input() {
        assert_eq!(
            SearchQuery::new("", "Berlin"),
            Err(QueryError::EmptyDesignation)
        );
        assert_eq!(
            SearchQuery::new("Engineer", "   "),
            Err(QueryError::EmptyCity)
        );
    }

    #[test]
    fn query_trims_whitespace() {
        let query = SearchQuery::new("  Engineer ", " Berlin ").unwrap();

        assert_eq!(query.designation, "Engineer");
        assert_eq!(query.city, "Berlin");
    }
}
