use crate::models::book::{BookSummary, ResultPage};
use crate::utils::cover::{cover_url, work_url};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug)]
pub struct HealthResponse {
    pub service: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct BookTile {
    #[serde(flatten)]
    pub book: BookSummary,
    pub author_line: String,
    pub cover_url: String,
    pub work_url: Option<String>,
}

impl BookTile {
    pub fn new(book: BookSummary, covers_base: &str, site_base: &str) -> Self {
        Self {
            author_line: book.author_line(),
            cover_url: cover_url(covers_base, book.cover_id),
            work_url: book.work_id.as_deref().map(|key| work_url(site_base, key)),
            book,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageView {
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
    pub total_count: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl From<&ResultPage> for PageView {
    fn from(page: &ResultPage) -> Self {
        Self {
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages(),
            total_count: page.total_count,
            has_previous: page.has_previous(),
            has_next: page.has_next(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub request: String,
    pub status: String,
    pub error: Option<String>,
    pub pagination: PageView,
    pub results: Vec<BookTile>,
}
