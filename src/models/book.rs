use serde::{Deserialize, Serialize};

/// Body of an upstream search response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchDocument {
    pub docs: Option<Vec<Doc>>,
    #[serde(rename = "numFound")]
    pub num_found: Option<u64>,
}

/// One raw result object as the upstream service returns it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Doc {
    pub title: Option<String>,
    pub author_name: Option<Vec<String>>,
    pub first_publish_year: Option<i32>,
    pub language: Option<Vec<String>>,
    pub number_of_pages_median: Option<u32>,
    pub ebook_access: Option<String>,
    pub has_fulltext: Option<bool>,
    pub edition_count: Option<u32>,
    pub key: Option<String>,
    pub cover_i: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookSummary {
    pub title: String,
    pub authors: Vec<String>,
    pub first_publish_year: Option<i32>,
    pub primary_language: Option<String>,
    pub median_page_count: Option<u32>,
    pub has_ebook: bool,
    pub edition_count: Option<u32>,
    pub work_id: Option<String>,
    pub cover_id: Option<u64>,
}

impl BookSummary {
    pub fn author_line(&self) -> String {
        if self.authors.is_empty() {
            "Unknown author".to_string()
        } else {
            self.authors.join(", ")
        }
    }

    pub fn language_tag(&self) -> Option<String> {
        self.primary_language.as_ref().map(|lang| lang.to_uppercase())
    }
}

impl From<Doc> for BookSummary {
    fn from(doc: Doc) -> Self {
        // upstream reports books without any digital copy as "no_ebook"
        let has_ebook = doc
            .ebook_access
            .as_deref()
            .map(|access| !access.is_empty() && access != "no_ebook")
            .unwrap_or(false)
            || doc.has_fulltext.unwrap_or(false);

        BookSummary {
            title: doc
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Untitled".to_string()),
            authors: doc
                .author_name
                .unwrap_or_default()
                .into_iter()
                .filter(|a| !a.trim().is_empty())
                .collect(),
            first_publish_year: doc.first_publish_year,
            primary_language: doc.language.and_then(|langs| langs.into_iter().next()),
            median_page_count: doc.number_of_pages_median,
            has_ebook,
            edition_count: doc.edition_count,
            work_id: doc.key.filter(|k| !k.is_empty()),
            cover_id: doc.cover_i,
        }
    }
}

pub const PAGE_SIZE: u32 = 20;

/// One page of results, replaced wholesale on every completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPage {
    pub items: Vec<BookSummary>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
}

impl ResultPage {
    pub fn empty(page: u32) -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            page: page.max(1),
            page_size: PAGE_SIZE,
        }
    }

    pub fn from_document(document: SearchDocument, page: u32) -> Self {
        Self {
            items: document
                .docs
                .unwrap_or_default()
                .into_iter()
                .map(BookSummary::from)
                .collect(),
            total_count: document.num_found.unwrap_or(0),
            page: page.max(1),
            page_size: PAGE_SIZE,
        }
    }

    pub fn total_pages(&self) -> u64 {
        let size = u64::from(self.page_size.max(1));
        self.total_count.div_ceil(size).max(1)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }
}
