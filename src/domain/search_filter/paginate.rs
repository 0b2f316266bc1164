use serde_derive::Serialize;

/// One page of results plus the counters a client needs to walk the rest.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub current_page: i64,
    pub data: Vec<T>,
    pub from: Option<i64>,
    pub last_page: i64,
    pub per_page: i64,
    pub to: Option<i64>,
    pub total: i64,
}

impl<T> Page<T> {
    /// `(limit, offset)` for a 1-based page.
    pub fn window(current_page: i64, per_page: i64) -> (i64, i64) {
        let per_page = per_page.max(1);
        let offset = (current_page.max(1) - 1).saturating_mul(per_page);
        (per_page, offset)
    }

    pub fn new(data: Vec<T>, current_page: i64, per_page: i64, total: i64) -> Self {
        let per_page = per_page.max(1);
        let (_, offset) = Self::window(current_page, per_page);
        let last_page = ((total + per_page - 1) / per_page).max(1);

        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            (Some(offset + 1), Some(offset + data.len() as i64))
        };

        Page {
            current_page,
            data,
            from,
            last_page,
            per_page,
            to,
            total,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            current_page: self.current_page,
            data: self.data.into_iter().map(f).collect(),
            from: self.from,
            last_page: self.last_page,
            per_page: self.per_page,
            to: self.to,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window() {
        assert_eq!(Page::<()>::window(1, 20), (20, 0));
        assert_eq!(Page::<()>::window(3, 20), (20, 40));
        assert_eq!(Page::<()>::window(0, 20), (20, 0));
    }

    #[test]
    fn test_page_counters() {
        let page = Page::new(vec![1, 2, 3, 4, 5], 2, 5, 12);
        assert_eq!(page.last_page, 3);
        assert_eq!(page.from, Some(6));
        assert_eq!(page.to, Some(10));

        let last = Page::new(vec![11, 12], 3, 5, 12);
        assert_eq!(last.from, Some(11));
        assert_eq!(last.to, Some(12));
    }

    #[test]
    fn test_empty_result_still_has_one_page() {
        let page: Page<i32> = Page::new(vec![], 1, 20, 0);
        assert_eq!(page.last_page, 1);
        assert_eq!(page.from, None);
        assert_eq!(page.to, None);

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["total"], 0);
        assert_eq!(json["data"], serde_json::json!([]));
    }

    #[test]
    fn test_map_keeps_counters() {
        let page = Page::new(vec![1, 2], 1, 20, 2).map(|n| n * 10);
        assert_eq!(page.data, vec![10, 20]);
        assert_eq!(page.total, 2);
    }
}
