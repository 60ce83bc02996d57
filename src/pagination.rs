use serde::Serialize;

pub const PUBLIC_PAGE_SIZE: i64 = 10;
pub const ADMIN_PAGE_SIZE: i64 = 20;

#[derive(Debug, Clone, Serialize)]
pub struct PageMeta {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// Clamps an out-of-range page request to the nearest valid page instead of
/// failing, and yields the row offset for the query. An empty result set
/// still has one (empty) page.
pub fn paginate(requested_page: Option<i64>, total: i64, page_size: i64) -> (PageMeta, i64) {
    let total_pages = ((total + page_size - 1) / page_size).max(1);
    let page = requested_page.unwrap_or(1).clamp(1, total_pages);
    let offset = (page - 1) * page_size;

    (
        PageMeta {
            page,
            page_size,
            total,
            total_pages,
        },
        offset,
    )
}
