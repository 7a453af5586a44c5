pub mod csv;

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::round2;

/// One time record joined with its employee and (optional) department, the
/// row shape the reporting queries materialize. Aggregation happens here in
/// Rust over these rows, not in SQL.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorkSlice {
    pub record_id: u64,
    pub employee_id: u64,
    pub first_name: String,
    pub last_name: String,
    pub department_id: Option<u64>,
    pub department_name: Option<String>,
    pub check_in: NaiveDateTime,
    pub check_out: Option<NaiveDateTime>,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl WorkSlice {
    pub fn employee_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

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

/// Summary grouping dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Employee,
    Department,
    /// One row per employee per calendar day of `check_in`.
    Date,
}

/// CSV export flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    #[default]
    Summary,
    Detailed,
}

impl ReportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportKind::Summary => "summary",
            ReportKind::Detailed => "detailed",
        }
    }
}

/// One aggregated bucket of the summary report.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SummaryRow {
    /// Null when grouped by department.
    pub employee_id: Option<u64>,
    pub employee_name: Option<String>,

    /// Split name parts feed the CSV export's separate columns; the JSON
    /// shape only carries the combined `employee_name`.
    #[serde(skip)]
    pub first_name: Option<String>,
    #[serde(skip)]
    pub last_name: Option<String>,

    pub department_id: Option<u64>,
    pub department_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = "date", nullable = true)]
    pub date: Option<NaiveDate>,

    #[schema(example = 8.5)]
    pub total_hours: f64,

    #[schema(example = 1)]
    pub record_count: i64,
}

// Bucket ordering key; rows come out sorted by it. Departmentless rows sort
// after real departments.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum GroupKey {
    Employee(u64),
    Department(u8, u64),
    Date(NaiveDate, u64),
}

struct Bucket {
    employee_id: Option<u64>,
    first_name: Option<String>,
    last_name: Option<String>,
    department_id: Option<u64>,
    department_name: Option<String>,
    date: Option<NaiveDate>,
    seconds: i64,
    count: i64,
}

impl Bucket {
    fn seed(row: &WorkSlice, group_by: GroupBy) -> Self {
        let with_employee = !matches!(group_by, GroupBy::Department);
        Bucket {
            employee_id: with_employee.then_some(row.employee_id),
            first_name: with_employee.then(|| row.first_name.clone()),
            last_name: with_employee.then(|| row.last_name.clone()),
            department_id: row.department_id,
            department_name: row.department_name.clone(),
            date: matches!(group_by, GroupBy::Date).then(|| row.check_in.date()),
            seconds: 0,
            count: 0,
        }
    }

    fn into_row(self) -> SummaryRow {
        let employee_name = match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            _ => None,
        };
        SummaryRow {
            employee_id: self.employee_id,
            employee_name,
            first_name: self.first_name,
            last_name: self.last_name,
            department_id: self.department_id,
            department_name: self.department_name,
            date: self.date,
            total_hours: round2(self.seconds as f64 / 3600.0),
            record_count: self.count,
        }
    }
}

/// Folds closed records into per-group totals. Open intervals (`check_out`
/// NULL) contribute nothing and are not counted. Hours are rounded to two
/// decimals once per bucket, after summation.
pub fn summarize(rows: &[WorkSlice], group_by: GroupBy) -> Vec<SummaryRow> {
    let mut buckets: BTreeMap<GroupKey, Bucket> = BTreeMap::new();

    for row in rows {
        let Some(check_out) = row.check_out else {
            continue;
        };
        let seconds = (check_out - row.check_in).num_seconds();

        let key = match group_by {
            GroupBy::Employee => GroupKey::Employee(row.employee_id),
            GroupBy::Department => match row.department_id {
                Some(id) => GroupKey::Department(0, id),
                None => GroupKey::Department(1, 0),
            },
            GroupBy::Date => GroupKey::Date(row.check_in.date(), row.employee_id),
        };

        let bucket = buckets
            .entry(key)
            .or_insert_with(|| Bucket::seed(row, group_by));
        bucket.seconds += seconds;
        bucket.count += 1;
    }

    buckets.into_values().map(Bucket::into_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn slice(
        record_id: u64,
        employee_id: u64,
        name: (&str, &str),
        department: Option<(u64, &str)>,
        check_in: NaiveDateTime,
        check_out: Option<NaiveDateTime>,
    ) -> WorkSlice {
        WorkSlice {
            record_id,
            employee_id,
            first_name: name.0.to_string(),
            last_name: name.1.to_string(),
            department_id: department.map(|(id, _)| id),
            department_name: department.map(|(_, n)| n.to_string()),
            check_in,
            check_out,
            description: None,
            created_at: check_in,
            updated_at: check_in,
        }
    }

    #[test]
    fn single_closed_record_per_employee() {
        let rows = vec![slice(
            1,
            10,
            ("Ivan", "Ivanov"),
            Some((1, "Engineering")),
            dt(1, 9, 0),
            Some(dt(1, 17, 30)),
        )];

        let summary = summarize(&rows, GroupBy::Employee);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].employee_id, Some(10));
        assert_eq!(summary[0].employee_name.as_deref(), Some("Ivan Ivanov"));
        assert_eq!(summary[0].department_name.as_deref(), Some("Engineering"));
        assert_eq!(summary[0].total_hours, 8.5);
        assert_eq!(summary[0].record_count, 1);
        assert_eq!(summary[0].date, None);
    }

    #[test]
    fn open_records_are_skipped() {
        let rows = vec![
            slice(1, 10, ("Ivan", "Ivanov"), None, dt(1, 9, 0), Some(dt(1, 17, 0))),
            slice(2, 10, ("Ivan", "Ivanov"), None, dt(2, 9, 0), None),
        ];

        let summary = summarize(&rows, GroupBy::Employee);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].total_hours, 8.0);
        assert_eq!(summary[0].record_count, 1);
    }

    #[test]
    fn only_open_records_yield_no_rows() {
        let rows = vec![slice(1, 10, ("Ivan", "Ivanov"), None, dt(1, 9, 0), None)];
        assert!(summarize(&rows, GroupBy::Employee).is_empty());
    }

    #[test]
    fn department_grouping_merges_employees() {
        let eng = Some((1, "Engineering"));
        let rows = vec![
            slice(1, 10, ("Ivan", "Ivanov"), eng, dt(1, 9, 0), Some(dt(1, 17, 0))),
            slice(2, 11, ("Petr", "Petrov"), eng, dt(1, 10, 0), Some(dt(1, 16, 0))),
            slice(3, 12, ("Anna", "Kuznetsova"), None, dt(1, 9, 0), Some(dt(1, 10, 0))),
        ];

        let summary = summarize(&rows, GroupBy::Department);
        assert_eq!(summary.len(), 2);

        assert_eq!(summary[0].department_id, Some(1));
        assert_eq!(summary[0].department_name.as_deref(), Some("Engineering"));
        assert_eq!(summary[0].employee_id, None);
        assert_eq!(summary[0].employee_name, None);
        assert_eq!(summary[0].total_hours, 14.0);
        assert_eq!(summary[0].record_count, 2);

        // the departmentless bucket sorts last
        assert_eq!(summary[1].department_id, None);
        assert_eq!(summary[1].total_hours, 1.0);
    }

    #[test]
    fn date_grouping_splits_days_per_employee() {
        let rows = vec![
            slice(1, 10, ("Ivan", "Ivanov"), None, dt(1, 9, 0), Some(dt(1, 17, 0))),
            slice(2, 10, ("Ivan", "Ivanov"), None, dt(2, 9, 0), Some(dt(2, 13, 0))),
            slice(3, 11, ("Petr", "Petrov"), None, dt(1, 9, 0), Some(dt(1, 12, 0))),
        ];

        let summary = summarize(&rows, GroupBy::Date);
        assert_eq!(summary.len(), 3);

        // ordered by (date, employee_id)
        assert_eq!(summary[0].date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(summary[0].employee_id, Some(10));
        assert_eq!(summary[0].total_hours, 8.0);
        assert_eq!(summary[1].date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(summary[1].employee_id, Some(11));
        assert_eq!(summary[2].date, NaiveDate::from_ymd_opt(2024, 1, 2));
        assert_eq!(summary[2].employee_id, Some(10));
        assert_eq!(summary[2].total_hours, 4.0);
    }

    #[test]
    fn rounding_happens_after_summation() {
        // three 20-minute intervals: 0.33h each if rounded early, 1.0h total
        let rows = vec![
            slice(1, 10, ("Ivan", "Ivanov"), None, dt(1, 9, 0), Some(dt(1, 9, 20))),
            slice(2, 10, ("Ivan", "Ivanov"), None, dt(1, 10, 0), Some(dt(1, 10, 20))),
            slice(3, 10, ("Ivan", "Ivanov"), None, dt(1, 11, 0), Some(dt(1, 11, 20))),
        ];

        let summary = summarize(&rows, GroupBy::Employee);
        assert_eq!(summary[0].total_hours, 1.0);
        assert_eq!(summary[0].record_count, 3);
    }

    #[test]
    fn employee_rows_come_out_in_id_order() {
        let rows = vec![
            slice(1, 12, ("Anna", "Kuznetsova"), None, dt(1, 9, 0), Some(dt(1, 10, 0))),
            slice(2, 10, ("Ivan", "Ivanov"), None, dt(1, 9, 0), Some(dt(1, 10, 0))),
        ];

        let summary = summarize(&rows, GroupBy::Employee);
        assert_eq!(summary[0].employee_id, Some(10));
        assert_eq!(summary[1].employee_id, Some(12));
    }
}
