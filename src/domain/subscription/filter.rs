//! Price aggregation filter.

use chrono::NaiveDate;

use crate::domain::foundation::{add_months, Username, ValidationError};

use super::parse_start_date;

/// Query-only projection used to total prices over a window of months.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSum {
    pub username: Username,
    pub service_name: Option<String>,
    pub start_date: NaiveDate,
    pub counter_months: u32,
}

impl FilterSum {
    /// Builds a filter from raw query values.
    ///
    /// A blank service name means "all services".
    pub fn parse(
        username: Username,
        service_name: Option<&str>,
        start_date: &str,
        counter_months: u32,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            username,
            service_name: service_name
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            start_date: parse_start_date(start_date)?,
            counter_months,
        })
    }

    /// Same filter narrowed to one service.
    pub fn for_service(&self, service_name: impl Into<String>) -> Self {
        Self {
            service_name: Some(service_name.into()),
            ..self.clone()
        }
    }

    /// Window of start dates the aggregate covers.
    pub fn window(&self) -> Result<SumWindow, ValidationError> {
        Ok(SumWindow {
            from: self.start_date,
            to: add_months(self.start_date, self.counter_months)?,
        })
    }

    /// Resolves the filter into what the repository executes.
    pub fn to_query(&self) -> Result<SumQuery, ValidationError> {
        Ok(SumQuery {
            username: self.username.clone(),
            service_name: self.service_name.clone(),
            window: self.window()?,
        })
    }
}

/// Inclusive range of subscription start dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SumWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl SumWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// Aggregate query handed to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumQuery {
    pub username: Username,
    pub service_name: Option<String>,
    pub window: SumWindow,
}

impl SumQuery {
    /// Whether an entry's service passes the optional service filter.
    pub fn matches_service(&self, service_name: &str) -> bool {
        self.service_name
            .as_deref()
            .map_or(true, |wanted| wanted == service_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bob() -> Username {
        Username::new("bob").unwrap()
    }

    #[test]
    fn window_spans_counter_months_inclusive() {
        let filter = FilterSum::parse(bob(), None, "01-2025", 3).unwrap();
        let window = filter.window().unwrap();

        assert_eq!(window.from, date(2025, 1, 1));
        assert_eq!(window.to, date(2025, 4, 1));
        assert!(window.contains(date(2025, 1, 1)));
        assert!(window.contains(date(2025, 4, 1)));
        assert!(!window.contains(date(2025, 4, 2)));
        assert!(!window.contains(date(2024, 12, 31)));
    }

    #[test]
    fn blank_service_name_means_no_filter() {
        let filter = FilterSum::parse(bob(), Some("  "), "01-2025", 1).unwrap();
        assert_eq!(filter.service_name, None);
        assert!(filter.to_query().unwrap().matches_service("anything"));
    }

    #[test]
    fn service_filter_matches_exactly() {
        let filter = FilterSum::parse(bob(), Some("Netflix"), "01-2025", 1).unwrap();
        let query = filter.to_query().unwrap();
        assert!(query.matches_service("Netflix"));
        assert!(!query.matches_service("netflix"));
    }

    #[test]
    fn for_service_narrows_without_touching_window() {
        let filter = FilterSum::parse(bob(), None, "2025-02-10", 2).unwrap();
        let narrowed = filter.for_service("Spotify");
        assert_eq!(narrowed.service_name.as_deref(), Some("Spotify"));
        assert_eq!(narrowed.window().unwrap(), filter.window().unwrap());
    }

    #[test]
    fn bad_start_date_is_rejected() {
        assert!(FilterSum::parse(bob(), None, "someday", 2).is_err());
    }
}
