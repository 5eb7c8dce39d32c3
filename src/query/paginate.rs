use std::num::NonZeroUsize;

/// One page of a paginated result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a, T> {
    /// 1-based page number.
    pub number: usize,
    pub total: usize,
    pub items: &'a [T],
}

/// Split `items` into contiguous pages of at most `page_size` entries.
///
/// An empty input still yields one (empty) page, so there is always
/// something to render.
pub fn paginate<T>(items: &[T], page_size: NonZeroUsize) -> Vec<Page<'_, T>> {
    if items.is_empty() {
        return vec![Page {
            number: 1,
            total: 1,
            items,
        }];
    }

    let total = items.len().div_ceil(page_size.get());
    items
        .chunks(page_size.get())
        .enumerate()
        .map(|(index, chunk)| Page {
            number: index + 1,
            total,
            items: chunk,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_empty_yields_one_empty_page() {
        let items: Vec<u32> = Vec::new();
        let pages = paginate(&items, size(15));
        assert_eq!(pages.len(), 1);
        assert!(pages[0].items.is_empty());
        assert_eq!((pages[0].number, pages[0].total), (1, 1));
    }

    #[test]
    fn test_page_count_and_short_last_page() {
        let items: Vec<u32> = (0..32).collect();
        let pages = paginate(&items, size(15));

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].items.len(), 15);
        assert_eq!(pages[2].items, &[30, 31]);
        assert!(pages.iter().all(|p| p.total == 3));
        assert_eq!(pages.iter().map(|p| p.number).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_exact_multiple() {
        let items: Vec<u32> = (0..30).collect();
        let pages = paginate(&items, size(15));
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].items.len(), 15);
    }

    #[test]
    fn test_concatenation_reproduces_input() {
        let items: Vec<u32> = (0..47).collect();
        for page_size in 1..=50 {
            let joined: Vec<u32> = paginate(&items, size(page_size))
                .iter()
                .flat_map(|p| p.items.iter().copied())
                .collect();
            assert_eq!(joined, items, "page size {page_size}");
        }
    }
}
