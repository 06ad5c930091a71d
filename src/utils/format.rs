use crate::models::book::{BookSummary, ResultPage};
use crate::services::controller::ViewState;
use crate::utils::cover::{cover_url, work_url};
use std::fmt::Write;

pub const LOADING_NOTICE: &str = "Loading…";
pub const EMPTY_NOTICE: &str = "No results. Try a broader query or different filters.";

pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn pager_line(page: &ResultPage) -> String {
    format!(
        "{} Page {} / {} • {} results {}",
        if page.has_previous() { "← Prev" } else { "      " },
        page.page,
        page.total_pages(),
        group_thousands(page.total_count),
        if page.has_next() { "Next →" } else { "" },
    )
    .trim_end()
    .to_string()
}

pub fn tile(book: &BookSummary, covers_base: &str, site_base: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", book.title);
    let _ = writeln!(out, "  {}", book.author_line());

    let mut tags = Vec::new();
    if let Some(year) = book.first_publish_year {
        tags.push(year.to_string());
    }
    if let Some(lang) = book.language_tag() {
        tags.push(lang);
    }
    if let Some(pages) = book.median_page_count {
        tags.push(format!("{}p", pages));
    }
    if book.has_ebook {
        tags.push("ebook".to_string());
    }
    if !tags.is_empty() {
        let tags: Vec<String> = tags.into_iter().map(|t| format!("[{}]", t)).collect();
        let _ = writeln!(out, "  {}", tags.join(" "));
    }

    if let Some(editions) = book.edition_count {
        let _ = writeln!(out, "  {} editions", editions);
    }
    let _ = writeln!(out, "  cover: {}", cover_url(covers_base, book.cover_id));
    if let Some(key) = &book.work_id {
        let _ = writeln!(out, "  {}", work_url(site_base, key));
    }
    out
}

/// Full text rendering of what the controller currently shows.
pub fn render(view: &ViewState, page: &ResultPage, covers_base: &str, site_base: &str) -> String {
    match view {
        ViewState::Idle => String::new(),
        ViewState::Loading => format!("{}\n", LOADING_NOTICE),
        ViewState::Error(message) => format!("Error: {}\n", message),
        ViewState::Empty => format!("{}\n", EMPTY_NOTICE),
        ViewState::Populated => {
            let mut out = String::new();
            let _ = writeln!(out, "{}", pager_line(page));
            for book in &page.items {
                let _ = writeln!(out);
                out.push_str(&tile(book, covers_base, site_base));
            }
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", pager_line(page));
            out
        }
    }
}
