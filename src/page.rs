/// Clamps an `(offset, limit)` window against `total`.
///
/// `offset` defaults to 0 and is clamped to `[0, total]`; a missing `limit` means the
/// remainder and a negative one means zero. The result always satisfies `lower <= upper <= total`.
#[must_use]
pub fn calc_lower_upper(offset: Option<i64>, limit: Option<i64>, total: usize) -> (usize, usize) {
    let lower = offset.map_or(0, |o| usize::try_from(o.max(0)).unwrap_or(usize::MAX)).min(total);
    let upper = match limit {
        None => total,
        Some(l) => lower.saturating_add(usize::try_from(l.max(0)).unwrap_or(usize::MAX)).min(total),
    };
    (lower, upper)
}

/// Applies [`calc_lower_upper`] to a slice.
#[must_use]
pub fn page<T>(items: &[T], offset: Option<i64>, limit: Option<i64>) -> &[T] {
    let (lower, upper) = calc_lower_upper(offset, limit, items.len());
    &items[lower..upper]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_everything() {
        assert_eq!(calc_lower_upper(None, None, 5), (0, 5));
    }

    #[test]
    fn window_clamped_to_total() {
        assert_eq!(calc_lower_upper(Some(3), Some(10), 5), (3, 5));
        assert_eq!(calc_lower_upper(Some(9), Some(2), 5), (5, 5));
        assert_eq!(calc_lower_upper(Some(1), Some(2), 5), (1, 3));
    }

    #[test]
    fn negatives_clamp_to_zero() {
        assert_eq!(calc_lower_upper(Some(-4), Some(2), 5), (0, 2));
        assert_eq!(calc_lower_upper(Some(2), Some(-1), 5), (2, 2));
    }

    #[test]
    fn huge_values_do_not_overflow() {
        assert_eq!(calc_lower_upper(Some(i64::MAX), Some(i64::MAX), 3), (3, 3));
        assert_eq!(calc_lower_upper(Some(1), Some(i64::MAX), 3), (1, 3));
    }

    #[test]
    fn empty_total() {
        assert_eq!(calc_lower_upper(Some(2), None, 0), (0, 0));
        assert!(page::<u8>(&[], None, Some(3)).is_empty());
    }

    #[test]
    fn page_slices_the_window() {
        let items = [1, 2, 3, 4, 5];
        assert_eq!(page(&items, Some(1), Some(2)), &[2, 3]);
        assert_eq!(page(&items, Some(4), None), &[5]);
        assert_eq!(page(&items, None, Some(-1)), &[] as &[i32]);
    }
}
