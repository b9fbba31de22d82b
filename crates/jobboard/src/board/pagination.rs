use serde::Serialize;

/// Listing page size.
pub const JOBS_PER_PAGE: u64 = 9;

/// One-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Unparsable or non-positive values fall back to the first page.
    pub fn from_param(raw: Option<&str>, per_page: u64) -> Self {
        let page = raw
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(1);
        Self::new(page, per_page)
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// Length-aware page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub current_page: u64,
    pub per_page: u64,
    pub total: u64,
    pub last_page: u64,
    pub from: Option<u64>,
    pub to: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        let last_page = total.div_ceil(request.per_page).max(1);
        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            let from = request.offset().saturating_add(1);
            (Some(from), Some(from + data.len() as u64 - 1))
        };

        Self {
            data,
            current_page: request.page,
            per_page: request.per_page,
            total,
            last_page,
            from,
            to,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            current_page: self.current_page,
            per_page: self.per_page,
            total: self.total,
            last_page: self.last_page,
            from: self.from,
            to: self.to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_bounds_reflect_offset() {
        let request = PageRequest::new(2, JOBS_PER_PAGE);
        let page = Page::new(vec![1, 2, 3], request, 12);
        assert_eq!(page.last_page, 2);
        assert_eq!(page.from, Some(10));
        assert_eq!(page.to, Some(12));
    }

    #[test]
    fn empty_page_has_no_bounds() {
        let page: Page<u8> = Page::new(Vec::new(), PageRequest::new(1, JOBS_PER_PAGE), 0);
        assert_eq!(page.last_page, 1);
        assert_eq!(page.from, None);
        assert_eq!(page.to, None);
    }

    #[test]
    fn invalid_page_param_defaults_to_first_page() {
        assert_eq!(PageRequest::from_param(Some("abc"), 9).page, 1);
        assert_eq!(PageRequest::from_param(Some("0"), 9).page, 1);
        assert_eq!(PageRequest::from_param(None, 9).page, 1);
        assert_eq!(PageRequest::from_param(Some(" 3 "), 9).offset(), 18);
    }
}
