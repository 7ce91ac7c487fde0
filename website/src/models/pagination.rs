use roster::pagination::PaginatedMeta;

#[derive(Clone)]
pub struct PaginationLinks {
    pub prev: Option<PaginationLink>,
    pub next: Option<PaginationLink>,
    pub items: Vec<Option<PaginationLink>>,
}

#[derive(Clone)]
pub struct PaginationLink {
    pub page: i64,
    pub url: String,
    pub active: bool,
}

impl PaginationLinks {
    /// Windowed pager: first and last page, one page around the current
    /// one, `None` entries mark the gaps.
    pub fn new(meta: &PaginatedMeta, base_url: &str, suffix: &str) -> Self {
        let page = meta.page as i64;
        let total_pages = meta.total_pages;

        let link = |p: i64| PaginationLink {
            page: p,
            url: format!(
                "{}?page={}&perpage={}{}",
                base_url, p, meta.per_page, suffix
            ),
            active: p == page,
        };

        let mut items: Vec<Option<PaginationLink>> = Vec::new();
        if total_pages > 1 {
            let window: Vec<i64> = (1..=total_pages)
                .filter(|p| *p == 1 || *p == total_pages || (*p >= page - 1 && *p <= page + 1))
                .collect();

            let mut last_rendered = 0;
            for p in window {
                if p > last_rendered + 1 {
                    items.push(None);
                }
                items.push(Some(link(p)));
                last_rendered = p;
            }
        }

        let prev = if page > 1 { Some(link(page - 1)) } else { None };
        let next = if page < total_pages {
            Some(link(page + 1))
        } else {
            None
        };

        PaginationLinks { prev, next, items }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(page: i32, total_records: i64) -> PaginationLinks {
        let meta = PaginatedMeta::new(page, 10, total_records);
        PaginationLinks::new(&meta, "/org/users/search", "")
    }

    #[test]
    fn test_empty() {
        let links = links(1, 0);
        assert!(links.prev.is_none());
        assert!(links.next.is_none());
        assert_eq!(links.items.len(), 0);
    }

    #[test]
    fn test_one_page() {
        let links = links(1, 5);
        assert!(links.prev.is_none());
        assert!(links.next.is_none());
        assert_eq!(links.items.len(), 0);
    }

    #[test]
    fn test_two_pages() {
        let links = links(1, 20);
        assert!(links.prev.is_none());
        assert!(links.next.is_some());
        assert_eq!(links.items.len(), 2);
        assert!(links.items.iter().all(|x| x.is_some()));
    }

    #[test]
    fn test_first_of_many_has_one_gap() {
        let links = links(1, 100);
        // 1, 2, gap, 10
        assert_eq!(links.items.len(), 4);
        assert!(links.items.get(2).unwrap().is_none());
        assert!(links.items.first().unwrap().as_ref().unwrap().active);
    }

    #[test]
    fn test_middle_page_has_two_gaps() {
        let links = links(5, 100);
        // 1, gap, 4, 5, 6, gap, 10
        assert_eq!(links.items.len(), 7);
        assert!(links.items.get(1).unwrap().is_none());
        assert!(links.items.get(5).unwrap().is_none());
        assert!(links.prev.is_some());
        assert!(links.next.is_some());
    }

    #[test]
    fn test_last_page() {
        let links = links(10, 100);
        assert!(links.prev.is_some());
        assert!(links.next.is_none());
        let last = links.items.last().unwrap().as_ref().unwrap();
        assert!(last.active);
        assert_eq!(last.page, 10);
    }

    #[test]
    fn test_urls_carry_paging_params() {
        let links = links(2, 100);
        let prev = links.prev.unwrap();
        assert_eq!(prev.url, "/org/users/search?page=1&perpage=10");
    }
}
