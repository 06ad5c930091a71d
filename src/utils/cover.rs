pub const PLACEHOLDER_COVER_ID: u64 = 240727;

/// Medium-size cover image for `cover_id`, or the shared placeholder.
pub fn cover_url(covers_base: &str, cover_id: Option<u64>) -> String {
    let id = cover_id.unwrap_or(PLACEHOLDER_COVER_ID);
    format!("{}/b/id/{}-M.jpg", covers_base.trim_end_matches('/'), id)
}

/// Link to the work page, e.g. `https://openlibrary.org/works/OL45804W`.
pub fn work_url(site_base: &str, work_key: &str) -> String {
    let base = site_base.trim_end_matches('/');
    if work_key.starts_with('/') {
        format!("{}{}", base, work_key)
    } else {
        format!("{}/{}", base, work_key)
    }
}
