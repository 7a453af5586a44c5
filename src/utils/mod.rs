pub mod datetime;

/// Number of pages for a paginated listing, `ceil(total / per_page)`.
pub fn page_count(total: i64, per_page: u32) -> i64 {
    if per_page == 0 {
        return 0;
    }
    (total + per_page as i64 - 1) / per_page as i64
}

/// Rounds to 2 decimal digits, ties to even (bankers' rounding). All
/// reported hour totals go through this.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 20), 0);
        assert_eq!(page_count(1, 20), 1);
        assert_eq!(page_count(20, 20), 1);
        assert_eq!(page_count(21, 20), 2);
        assert_eq!(page_count(100, 20), 5);
    }

    #[test]
    fn round2_truncates_to_cents_of_an_hour() {
        assert_eq!(round2(8.5), 8.5);
        assert_eq!(round2(8.0), 8.0);
        // 3661 seconds = 1.01694... hours
        assert_eq!(round2(3661.0 / 3600.0), 1.02);
        assert_eq!(round2(0.333_333_333), 0.33);
    }

    #[test]
    fn round2_matches_bankers_rounding() {
        // 2.675 is stored as 2.67499... so both halves of the tie rule agree
        // with the reference runtime here.
        assert_eq!(round2(2.675), 2.67);
        assert_eq!(round2(7.9999), 8.0);
    }
}
