use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaginatedMeta {
    pub page: i32,
    pub per_page: i32,
    pub total_records: i64,
    pub total_pages: i64,
}

impl PaginatedMeta {
    pub fn new(page: i32, per_page: i32, total_records: i64) -> Self {
        let total_pages = (total_records as f64 / per_page as f64).ceil() as i64;
        Self {
            page,
            per_page,
            total_records,
            total_pages,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub meta: PaginatedMeta,
    pub data: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(records: Vec<T>, page: i32, per_page: i32, total_records: i64) -> Self {
        Self {
            meta: PaginatedMeta::new(page, per_page, total_records),
            data: records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_meta() {
        let meta = PaginatedMeta::new(1, 10, 0);
        assert_eq!(meta.total_pages, 0);
    }

    #[test]
    fn test_exact_pages() {
        let meta = PaginatedMeta::new(1, 10, 30);
        assert_eq!(meta.total_pages, 3);
    }

    #[test]
    fn test_partial_last_page() {
        let meta = PaginatedMeta::new(2, 10, 31);
        assert_eq!(meta.total_pages, 4);
        assert_eq!(meta.page, 2);
    }
}
