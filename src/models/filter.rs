use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Smart,
    Title,
    Author,
    Subject,
    Isbn,
}

impl SearchMode {
    pub const ALL: [SearchMode; 5] = [
        SearchMode::Smart,
        SearchMode::Title,
        SearchMode::Author,
        SearchMode::Subject,
        SearchMode::Isbn,
    ];

    /// Upstream query parameter carrying the search text in this mode.
    pub fn param(self) -> &'static str {
        match self {
            SearchMode::Smart => "q",
            other => other.as_str(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SearchMode::Smart => "smart",
            SearchMode::Title => "title",
            SearchMode::Author => "author",
            SearchMode::Subject => "subject",
            SearchMode::Isbn => "isbn",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            SearchMode::Smart => "Try: murakami kafka on the shore",
            SearchMode::Title => "Title e.g. The Pragmatic Programmer",
            SearchMode::Author => "Author e.g. Ursula K. Le Guin",
            SearchMode::Subject => "Subject e.g. fantasy, history",
            SearchMode::Isbn => "ISBN e.g. 9780135957059",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown search mode '{0}'")]
pub struct UnknownMode(pub String);

impl FromStr for SearchMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        SearchMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == wanted)
            .ok_or_else(|| UnknownMode(s.to_string()))
    }
}

pub const DEFAULT_QUERY: &str = "harry potter";

/// Everything the user can change about a search.
///
/// Fields are only reachable through setters so the page rule holds: any
/// change to a field other than the page puts the page back to 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    mode: SearchMode,
    query: String,
    year_start: Option<u32>,
    year_end: Option<u32>,
    language: Option<String>,
    ebooks_only: bool,
    page: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            mode: SearchMode::Smart,
            query: DEFAULT_QUERY.to_string(),
            year_start: None,
            year_end: None,
            language: None,
            ebooks_only: false,
            page: 1,
        }
    }
}

impl FilterState {
    /// A blank state: smart mode, empty query, page 1.
    pub fn empty() -> Self {
        Self {
            query: String::new(),
            ..Self::default()
        }
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn year_start(&self) -> Option<u32> {
        self.year_start
    }

    pub fn year_end(&self) -> Option<u32> {
        self.year_end
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn ebooks_only(&self) -> bool {
        self.ebooks_only
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn set_mode(&mut self, mode: SearchMode) -> bool {
        let changed = self.mode != mode;
        self.mode = mode;
        self.touched(changed)
    }

    pub fn set_query(&mut self, query: impl Into<String>) -> bool {
        let query = query.into();
        let changed = self.query != query;
        self.query = query;
        self.touched(changed)
    }

    pub fn set_year_start(&mut self, year: Option<u32>) -> bool {
        let changed = self.year_start != year;
        self.year_start = year;
        self.touched(changed)
    }

    pub fn set_year_end(&mut self, year: Option<u32>) -> bool {
        let changed = self.year_end != year;
        self.year_end = year;
        self.touched(changed)
    }

    pub fn set_language(&mut self, language: Option<String>) -> bool {
        let changed = self.language != language;
        self.language = language;
        self.touched(changed)
    }

    pub fn set_ebooks_only(&mut self, ebooks_only: bool) -> bool {
        let changed = self.ebooks_only != ebooks_only;
        self.ebooks_only = ebooks_only;
        self.touched(changed)
    }

    /// Moves to `page` (at least 1) without touching any other field.
    pub fn set_page(&mut self, page: u32) -> bool {
        let page = page.max(1);
        let changed = self.page != page;
        self.page = page;
        changed
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> bool {
        self.set_page(self.page.saturating_sub(1))
    }

    fn touched(&mut self, changed: bool) -> bool {
        if changed {
            self.page = 1;
        }
        changed
    }
}
