use chrono::{Duration, NaiveDateTime, Utc};

/// Offset of business-local time from UTC, in hours.
///
/// The backend treats local time as UTC+3 year-round: plain fixed-offset
/// arithmetic, no DST and no timezone database. Report boundaries and the
/// stored `check_in`/`check_out` values all live in this local time.
pub const LOCAL_OFFSET_HOURS: i64 = 3;

/// Current instant in business-local time.
pub fn local_now() -> NaiveDateTime {
    utc_to_local(Utc::now().naive_utc())
}

pub fn utc_to_local(utc: NaiveDateTime) -> NaiveDateTime {
    utc + Duration::hours(LOCAL_OFFSET_HOURS)
}

pub fn local_to_utc(local: NaiveDateTime) -> NaiveDateTime {
    local - Duration::hours(LOCAL_OFFSET_HOURS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn offset_is_three_hours() {
        let utc = dt(2024, 1, 1, 6, 0, 0);
        assert_eq!(utc_to_local(utc), dt(2024, 1, 1, 9, 0, 0));
    }

    #[test]
    fn conversion_round_trips() {
        let utc = dt(2024, 6, 15, 23, 30, 0);
        assert_eq!(local_to_utc(utc_to_local(utc)), utc);
    }

    #[test]
    fn offset_crosses_midnight() {
        let utc = dt(2024, 1, 1, 22, 0, 0);
        assert_eq!(utc_to_local(utc), dt(2024, 1, 2, 1, 0, 0));
    }

    #[test]
    fn local_now_is_ahead_of_utc() {
        let before = Utc::now().naive_utc();
        let local = local_now();
        let after = Utc::now().naive_utc();
        assert!(local >= before + Duration::hours(3));
        assert!(local <= after + Duration::hours(3));
    }
}
