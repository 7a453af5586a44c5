use actix_web::{HttpResponse, web};
use chrono::NaiveDateTime;
use futures_util::TryStreamExt;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::debug;
use utoipa::IntoParams;

use crate::api::time_record::TimeRecordResponse;
use crate::api::{INVALID_DATE_MSG, INVALID_DATETIME_MSG};
use crate::clock;
use crate::error::ApiError;
use crate::report::csv::{DetailedCsvWriter, export_filename, summary_csv};
use crate::report::{GroupBy, ReportKind, WorkSlice, summarize};
use crate::utils::datetime::{day_bounds, parse_date, parse_range_end, parse_range_start};

#[derive(Debug, Deserialize, IntoParams)]
pub struct SummaryQuery {
    /// Required. Bare dates cover the whole day.
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub department_id: Option<u64>,
    pub group_by: Option<GroupBy>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DailyQuery {
    /// Defaults to today (local clock).
    pub date: Option<String>,
    pub employee_id: Option<u64>,
    pub department_id: Option<u64>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ExportQuery {
    #[serde(rename = "type")]
    pub kind: Option<ReportKind>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub department_id: Option<u64>,
}

fn work_slice_sql(by_employee: bool, by_department: bool, closed_only: bool) -> String {
    let mut sql = String::from(
        "SELECT tr.id AS record_id, tr.employee_id, e.first_name, e.last_name, \
         e.department_id, d.name AS department_name, tr.check_in, tr.check_out, \
         tr.description, tr.created_at, tr.updated_at \
         FROM time_records tr \
         INNER JOIN employees e ON tr.employee_id = e.id \
         LEFT JOIN departments d ON e.department_id = d.id \
         WHERE tr.check_in >= ? AND tr.check_in <= ?",
    );
    if closed_only {
        sql.push_str(" AND tr.check_out IS NOT NULL");
    }
    if by_employee {
        sql.push_str(" AND tr.employee_id = ?");
    }
    if by_department {
        sql.push_str(" AND e.department_id = ?");
    }
    sql.push_str(" ORDER BY tr.check_in");
    sql
}

/// Materializes the joined rows the aggregation runs over.
pub(crate) async fn fetch_work_slices(
    pool: &MySqlPool,
    start: NaiveDateTime,
    end: NaiveDateTime,
    employee_id: Option<u64>,
    department_id: Option<u64>,
    closed_only: bool,
) -> Result<Vec<WorkSlice>, sqlx::Error> {
    let sql = work_slice_sql(employee_id.is_some(), department_id.is_some(), closed_only);
    debug!(sql = %sql, %start, %end, "Fetching work slices");

    let mut query = sqlx::query_as::<_, WorkSlice>(&sql).bind(start).bind(end);
    if let Some(id) = employee_id {
        query = query.bind(id);
    }
    if let Some(id) = department_id {
        query = query.bind(id);
    }
    query.fetch_all(pool).await
}

fn record_response(slice: WorkSlice) -> TimeRecordResponse {
    TimeRecordResponse {
        id: slice.record_id,
        employee_id: slice.employee_id,
        employee_name: slice.employee_name(),
        duration_hours: slice.duration_hours(),
        check_in: slice.check_in,
        check_out: slice.check_out,
        description: slice.description,
        created_at: slice.created_at,
        updated_at: slice.updated_at,
    }
}

fn required_range(
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<(NaiveDateTime, NaiveDateTime), ApiError> {
    let (Some(start_raw), Some(end_raw)) = (start_date, end_date) else {
        return Err(ApiError::validation("Start date and end date are required"));
    };
    let start =
        parse_range_start(start_raw).ok_or_else(|| ApiError::validation(INVALID_DATETIME_MSG))?;
    let end = parse_range_end(end_raw).ok_or_else(|| ApiError::validation(INVALID_DATETIME_MSG))?;
    Ok((start, end))
}

/// Summary report
///
/// Totals per employee, department or employee-day over the closed records
/// whose check-in falls in the inclusive range.
#[utoipa::path(
    get,
    path = "/api/reports/summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Aggregated totals", body = Object, example = json!({
            "period": {"start_date": "2024-01-01T00:00:00", "end_date": "2024-01-31T23:59:59.999999"},
            "group_by": "employee",
            "data": [{
                "employee_id": 1,
                "employee_name": "Ivan Ivanov",
                "department_id": 1,
                "department_name": "Engineering",
                "total_hours": 8.5,
                "record_count": 1
            }]
        })),
        (status = 400, description = "Missing or malformed date range")
    ),
    tag = "Report"
)]
pub async fn summary_report(
    pool: web::Data<MySqlPool>,
    query: web::Query<SummaryQuery>,
) -> Result<HttpResponse, ApiError> {
    let (start, end) = required_range(query.start_date.as_deref(), query.end_date.as_deref())?;
    let group_by = query.group_by.unwrap_or_default();

    let slices =
        fetch_work_slices(pool.get_ref(), start, end, None, query.department_id, true).await?;
    let data = summarize(&slices, group_by);

    Ok(HttpResponse::Ok().json(json!({
        "period": { "start_date": start, "end_date": end },
        "group_by": group_by,
        "data": data,
    })))
}

/// Daily report
///
/// Every record of one calendar day, open ones included, check-in ascending.
#[utoipa::path(
    get,
    path = "/api/reports/daily",
    params(DailyQuery),
    responses(
        (status = 200, description = "Records of the day", body = Object, example = json!({
            "date": "2024-01-01",
            "records": []
        })),
        (status = 400, description = "Malformed date")
    ),
    tag = "Report"
)]
pub async fn daily_report(
    pool: web::Data<MySqlPool>,
    query: web::Query<DailyQuery>,
) -> Result<HttpResponse, ApiError> {
    let date = match query.date.as_deref() {
        Some(s) => parse_date(s).ok_or_else(|| ApiError::validation(INVALID_DATE_MSG))?,
        None => clock::local_now().date(),
    };
    let (start, end) = day_bounds(date);

    let slices = fetch_work_slices(
        pool.get_ref(),
        start,
        end,
        query.employee_id,
        query.department_id,
        false,
    )
    .await?;
    let records: Vec<TimeRecordResponse> = slices.into_iter().map(record_response).collect();

    Ok(HttpResponse::Ok().json(json!({
        "date": date,
        "records": records,
    })))
}

/// CSV export
///
/// Builds the blob in memory and returns it with a suggested filename; the
/// detailed flavor streams rows straight into the writer.
#[utoipa::path(
    get,
    path = "/api/reports/export/csv",
    params(ExportQuery),
    responses(
        (status = 200, description = "CSV blob and filename", body = Object, example = json!({
            "csv_data": "Employee ID,First name,Last name,Department,Total hours,Record count\r\n",
            "filename": "time_tracking_summary_20240101-20240131.csv"
        })),
        (status = 400, description = "Missing or malformed date range")
    ),
    tag = "Report"
)]
pub async fn export_csv(
    pool: web::Data<MySqlPool>,
    query: web::Query<ExportQuery>,
) -> Result<HttpResponse, ApiError> {
    let (start, end) = required_range(query.start_date.as_deref(), query.end_date.as_deref())?;
    let kind = query.kind.unwrap_or_default();

    let csv_data = match kind {
        ReportKind::Summary => {
            let slices =
                fetch_work_slices(pool.get_ref(), start, end, None, query.department_id, true)
                    .await?;
            summary_csv(&summarize(&slices, GroupBy::Employee))
        }
        ReportKind::Detailed => {
            let sql = work_slice_sql(false, query.department_id.is_some(), true);
            let mut q = sqlx::query_as::<_, WorkSlice>(&sql).bind(start).bind(end);
            if let Some(id) = query.department_id {
                q = q.bind(id);
            }

            let mut rows = q.fetch(pool.get_ref());
            let mut writer = DetailedCsvWriter::new();
            while let Some(slice) = rows.try_next().await? {
                writer.write_slice(&slice);
            }
            writer.finish()
        }
    };

    Ok(HttpResponse::Ok().json(json!({
        "csv_data": csv_data,
        "filename": export_filename(kind, start.date(), end.date()),
    })))
}
