use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::round2;

/// One check-in/check-out interval. `check_out` is NULL while the employee
/// is still checked in; a record closes exactly once and is never reopened
/// or deleted (only its description stays editable afterwards).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct TimeRecord {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1)]
    pub employee_id: u64,

    #[schema(value_type = String, format = "date-time", example = "2024-01-01T09:00:00")]
    pub check_in: NaiveDateTime,

    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub check_out: Option<NaiveDateTime>,

    #[schema(example = "Sprint planning", nullable = true)]
    pub description: Option<String>,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: NaiveDateTime,

    #[schema(value_type = String, format = "date-time")]
    pub updated_at: NaiveDateTime,
}

impl TimeRecord {
    /// Elapsed seconds, 0 while the record is still open.
    pub fn duration_seconds(&self) -> i64 {
        match self.check_out {
            Some(check_out) => (check_out - self.check_in).num_seconds(),
            None => 0,
        }
    }

    pub fn duration_hours(&self) -> f64 {
        round2(self.duration_seconds() as f64 / 3600.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(check_out: Option<(u32, u32)>) -> TimeRecord {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let check_in = day.and_hms_opt(9, 0, 0).unwrap();
        TimeRecord {
            id: 1,
            employee_id: 7,
            check_in,
            check_out: check_out.map(|(h, m)| day.and_hms_opt(h, m, 0).unwrap()),
            description: None,
            created_at: check_in,
            updated_at: check_in,
        }
    }

    #[test]
    fn open_record_has_zero_duration() {
        let r = record(None);
        assert_eq!(r.duration_seconds(), 0);
        assert_eq!(r.duration_hours(), 0.0);
    }

    #[test]
    fn closed_record_duration() {
        let r = record(Some((17, 30)));
        assert_eq!(r.duration_seconds(), 8 * 3600 + 30 * 60);
        assert_eq!(r.duration_hours(), 8.5);
    }

    #[test]
    fn short_interval_rounds_to_two_decimals() {
        // 10 minutes = 0.1666... hours
        let r = record(Some((9, 10)));
        assert_eq!(r.duration_hours(), 0.17);
    }
}
