use chrono::NaiveDate;

use super::{ReportKind, SummaryRow, WorkSlice};

/// Rendered in place of a missing department in exports.
pub const MISSING_DEPARTMENT: &str = "Not specified";

const SUMMARY_HEADER: &str = "Employee ID,First name,Last name,Department,Total hours,Record count";
const DETAILED_HEADER: &str = "Record ID,Employee,Department,Check-in,Check-out,Hours,Description";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Fields with commas, quotes or newlines get quoted, inner quotes doubled.
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn push_row(out: &mut String, fields: &[String]) {
    let line = fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&line);
    out.push_str("\r\n");
}

/// One row per employee: id, name parts, department, rounded total, count.
pub fn summary_csv(rows: &[SummaryRow]) -> String {
    let mut out = String::new();
    out.push_str(SUMMARY_HEADER);
    out.push_str("\r\n");

    for row in rows {
        push_row(
            &mut out,
            &[
                row.employee_id.map(|id| id.to_string()).unwrap_or_default(),
                row.first_name.clone().unwrap_or_default(),
                row.last_name.clone().unwrap_or_default(),
                row.department_name
                    .clone()
                    .unwrap_or_else(|| MISSING_DEPARTMENT.to_string()),
                row.total_hours.to_string(),
                row.record_count.to_string(),
            ],
        );
    }

    out
}

/// Incremental writer for the per-record export; rows are appended as they
/// stream out of the database.
pub struct DetailedCsvWriter {
    out: String,
}

impl DetailedCsvWriter {
    pub fn new() -> Self {
        let mut out = String::new();
        out.push_str(DETAILED_HEADER);
        out.push_str("\r\n");
        Self { out }
    }

    pub fn write_slice(&mut self, slice: &WorkSlice) {
        push_row(
            &mut self.out,
            &[
                slice.record_id.to_string(),
                slice.employee_name(),
                slice
                    .department_name
                    .clone()
                    .unwrap_or_else(|| MISSING_DEPARTMENT.to_string()),
                slice.check_in.format(DATETIME_FORMAT).to_string(),
                slice
                    .check_out
                    .map(|t| t.format(DATETIME_FORMAT).to_string())
                    .unwrap_or_default(),
                slice.duration_hours().to_string(),
                slice.description.clone().unwrap_or_default(),
            ],
        );
    }

    pub fn finish(self) -> String {
        self.out
    }
}

impl Default for DetailedCsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Suggested download name, embedding the export flavor and date range.
pub fn export_filename(kind: ReportKind, start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "time_tracking_{}_{}-{}.csv",
        kind.as_str(),
        start.format("%Y%m%d"),
        end.format("%Y%m%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn dt(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn summary_row(department: Option<&str>) -> SummaryRow {
        SummaryRow {
            employee_id: Some(10),
            employee_name: Some("Ivan Ivanov".to_string()),
            first_name: Some("Ivan".to_string()),
            last_name: Some("Ivanov".to_string()),
            department_id: department.map(|_| 1),
            department_name: department.map(|d| d.to_string()),
            date: None,
            total_hours: 8.5,
            record_count: 1,
        }
    }

    #[test]
    fn summary_layout() {
        let csv = summary_csv(&[summary_row(Some("Engineering"))]);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Employee ID,First name,Last name,Department,Total hours,Record count")
        );
        assert_eq!(lines.next(), Some("10,Ivan,Ivanov,Engineering,8.5,1"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn missing_department_uses_placeholder() {
        let csv = summary_csv(&[summary_row(None)]);
        assert!(csv.contains("10,Ivan,Ivanov,Not specified,8.5,1"));
    }

    #[test]
    fn detailed_layout_and_escaping() {
        let slice = WorkSlice {
            record_id: 3,
            employee_id: 10,
            first_name: "Ivan".to_string(),
            last_name: "Ivanov".to_string(),
            department_id: None,
            department_name: None,
            check_in: dt(9, 0),
            check_out: Some(dt(17, 30)),
            description: Some("planning, review and \"retro\"".to_string()),
            created_at: dt(9, 0),
            updated_at: dt(17, 30),
        };

        let mut writer = DetailedCsvWriter::new();
        writer.write_slice(&slice);
        let csv = writer.finish();

        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Record ID,Employee,Department,Check-in,Check-out,Hours,Description")
        );
        assert_eq!(
            lines.next(),
            Some(
                "3,Ivan Ivanov,Not specified,2024-01-01 09:00:00,2024-01-01 17:30:00,8.5,\
                 \"planning, review and \"\"retro\"\"\""
            )
        );
    }

    #[test]
    fn rows_end_with_crlf() {
        let csv = summary_csv(&[]);
        assert!(csv.ends_with("\r\n"));
    }

    #[test]
    fn filename_embeds_kind_and_range() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(
            export_filename(ReportKind::Summary, start, end),
            "time_tracking_summary_20240101-20240131.csv"
        );
        assert_eq!(
            export_filename(ReportKind::Detailed, start, end),
            "time_tracking_detailed_20240101-20240131.csv"
        );
    }
}
