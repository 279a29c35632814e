//! Tournament list with free-text, city, format and level filters.

use crate::models::{Format, Level, Tournament};
use crate::store::Database;

#[derive(Clone, Debug, Default)]
pub struct TournamentFilter {
    /// Case-insensitive match on name or location.
    pub q: Option<String>,
    /// Case-insensitive location substring.
    pub city: Option<String>,
    /// Empty means any format.
    pub formats: Vec<Format>,
    /// A tournament matches if any of these levels is allowed by its range. Empty means any.
    pub levels: Vec<Level>,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl TournamentFilter {
    pub fn matches(&self, t: &Tournament) -> bool {
        if let Some(q) = non_blank(&self.q) {
            if !contains_ci(&t.name, q) && !contains_ci(&t.location, q) {
                return false;
            }
        }
        if let Some(city) = non_blank(&self.city) {
            if !contains_ci(&t.location, city) {
                return false;
            }
        }
        if !self.formats.is_empty() && !self.formats.contains(&t.format) {
            return false;
        }
        self.levels.is_empty() || self.levels.iter().any(|&level| t.admits_level(level))
    }
}

/// Matching tournaments ordered by date, then time.
pub fn list_tournaments(db: &Database, filter: &TournamentFilter) -> Vec<Tournament> {
    let mut found: Vec<Tournament> = db
        .tournaments()
        .filter(|t| filter.matches(t))
        .cloned()
        .collect();
    found.sort_by(|a, b| (a.date, a.time, &a.name).cmp(&(b.date, b.time, &b.name)));
    found
}
