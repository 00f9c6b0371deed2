use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub per_page: i64,
}

impl PageParams {
    pub fn resolve(self) -> Page {
        Page {
            page: self.page.unwrap_or(1).max(1),
            per_page: self
                .per_page
                .unwrap_or(DEFAULT_PER_PAGE)
                .clamp(1, MAX_PER_PAGE),
        }
    }
}

impl Page {
    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, page: Page) -> Self {
        Self {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
            total_pages: (total + page.per_page - 1) / page.per_page,
        }
    }
}

/// `%term%` for ILIKE, or `None` when the term is blank.
pub fn like_pattern(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            let escaped = s
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{escaped}%")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamping() {
        let p = PageParams::default().resolve();
        assert_eq!(p, Page { page: 1, per_page: 20 });
        let p = PageParams { page: Some(-3), per_page: Some(1000) }.resolve();
        assert_eq!(p, Page { page: 1, per_page: 100 });
        let p = PageParams { page: Some(3), per_page: Some(0) }.resolve();
        assert_eq!(p.per_page, 1);
        assert_eq!(p.offset(), 2);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Page { page: 1, per_page: 20 };
        assert_eq!(Paginated::new(Vec::<()>::new(), 0, page).total_pages, 0);
        assert_eq!(Paginated::new(Vec::<()>::new(), 20, page).total_pages, 1);
        assert_eq!(Paginated::new(Vec::<()>::new(), 41, page).total_pages, 3);
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(Some("  ")), None);
        assert_eq!(like_pattern(None), None);
        assert_eq!(like_pattern(Some("50%_off")).unwrap(), "%50\\%\\_off%");
    }
}
