use actix_web::{HttpResponse, web};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

use crate::api::INVALID_DATETIME_MSG;
use crate::clock;
use crate::error::ApiError;
use crate::model::time_record::TimeRecord;
use crate::utils::datetime::{parse_datetime, parse_range_end, parse_range_start};
use crate::utils::page_count;

/// Base SELECT for a record joined with its employee's name. Column names
/// line up with `TimeRecord` plus the two name fields.
pub(crate) const RECORD_SELECT: &str = "SELECT tr.id, tr.employee_id, tr.check_in, tr.check_out, \
     tr.description, tr.created_at, tr.updated_at, e.first_name, e.last_name \
     FROM time_records tr \
     INNER JOIN employees e ON tr.employee_id = e.id";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct RecordWithEmployee {
    #[sqlx(flatten)]
    pub record: TimeRecord,
    pub first_name: String,
    pub last_name: String,
}

impl RecordWithEmployee {
    pub fn into_response(self) -> TimeRecordResponse {
        let duration_hours = self.record.duration_hours();
        TimeRecordResponse {
            id: self.record.id,
            employee_id: self.record.employee_id,
            employee_name: format!("{} {}", self.first_name, self.last_name),
            check_in: self.record.check_in,
            check_out: self.record.check_out,
            duration_hours,
            description: self.record.description,
            created_at: self.record.created_at,
            updated_at: self.record.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TimeRecordResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = "Ivan Ivanov")]
    pub employee_name: String,
    #[schema(value_type = String, format = "date-time", example = "2024-01-01T09:00:00")]
    pub check_in: NaiveDateTime,
    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub check_out: Option<NaiveDateTime>,
    #[schema(example = 8.5)]
    pub duration_hours: f64,
    #[schema(nullable = true)]
    pub description: Option<String>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: NaiveDateTime,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: NaiveDateTime,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateTimeRecord {
    #[schema(example = 1)]
    pub employee_id: u64,
    /// Explicit check-in timestamp; current local time when absent.
    #[schema(example = "2024-01-01T09:00:00", nullable = true)]
    pub check_in: Option<String>,
    #[schema(example = "Sprint planning", nullable = true)]
    pub description: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateTimeRecord {
    /// ISO timestamp or the literal "now".
    #[schema(example = "now", nullable = true)]
    pub check_out: Option<String>,
    #[schema(nullable = true)]
    pub description: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CheckOutRequest {
    #[schema(example = 1)]
    pub employee_id: u64,
    /// ISO timestamp or the literal "now"; current local time when absent.
    #[schema(example = "now", nullable = true)]
    pub check_out: Option<String>,
    #[schema(nullable = true)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TimeRecordQuery {
    pub employee_id: Option<u64>,
    /// Inclusive lower bound on check-in; bare dates cover the whole day.
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct TimeRecordListResponse {
    pub items: Vec<TimeRecordResponse>,
    #[schema(example = 42)]
    pub total: i64,
    #[schema(example = 3)]
    pub pages: i64,
    #[schema(example = 1)]
    pub page: u32,
}

/// Resolves a requested check-out value: absent or the literal "now" means
/// the supplied current time, anything else must parse as an ISO timestamp.
pub fn resolve_check_out(
    requested: Option<&str>,
    now: NaiveDateTime,
) -> Result<NaiveDateTime, ApiError> {
    match requested {
        None | Some("now") => Ok(now),
        Some(s) => parse_datetime(s).ok_or_else(|| ApiError::validation(INVALID_DATETIME_MSG)),
    }
}

pub(crate) async fn fetch_record(
    pool: &MySqlPool,
    id: u64,
) -> Result<Option<RecordWithEmployee>, sqlx::Error> {
    let sql = format!("{RECORD_SELECT} WHERE tr.id = ?");
    sqlx::query_as::<_, RecordWithEmployee>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_open_record(
    pool: &MySqlPool,
    employee_id: u64,
) -> Result<Option<RecordWithEmployee>, sqlx::Error> {
    let sql = format!("{RECORD_SELECT} WHERE tr.employee_id = ? AND tr.check_out IS NULL");
    sqlx::query_as::<_, RecordWithEmployee>(&sql)
        .bind(employee_id)
        .fetch_optional(pool)
        .await
}

/// List time records
#[utoipa::path(
    get,
    path = "/api/time-records",
    params(TimeRecordQuery),
    responses(
        (status = 200, description = "Paginated time record list", body = TimeRecordListResponse),
        (status = 400, description = "Malformed date filter")
    ),
    tag = "TimeRecord"
)]
pub async fn list_time_records(
    pool: web::Data<MySqlPool>,
    query: web::Query<TimeRecordQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let start = match query.start_date.as_deref() {
        Some(s) => {
            Some(parse_range_start(s).ok_or_else(|| ApiError::validation(INVALID_DATETIME_MSG))?)
        }
        None => None,
    };
    let end = match query.end_date.as_deref() {
        Some(s) => {
            Some(parse_range_end(s).ok_or_else(|| ApiError::validation(INVALID_DATETIME_MSG))?)
        }
        None => None,
    };

    let mut conditions: Vec<&str> = Vec::new();
    if query.employee_id.is_some() {
        conditions.push("tr.employee_id = ?");
    }
    if start.is_some() {
        conditions.push("tr.check_in >= ?");
    }
    if end.is_some() {
        conditions.push("tr.check_in <= ?");
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM time_records tr {}", where_clause);
    debug!(sql = %count_sql, "Counting time records");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(id) = query.employee_id {
        count_query = count_query.bind(id);
    }
    if let Some(start) = start {
        count_query = count_query.bind(start);
    }
    if let Some(end) = end {
        count_query = count_query.bind(end);
    }
    let total = count_query.fetch_one(pool.get_ref()).await?;

    let data_sql = format!(
        "{RECORD_SELECT} {} ORDER BY tr.check_in DESC LIMIT ? OFFSET ?",
        where_clause
    );
    debug!(sql = %data_sql, page, per_page, "Fetching time records");

    let mut data_query = sqlx::query_as::<_, RecordWithEmployee>(&data_sql);
    if let Some(id) = query.employee_id {
        data_query = data_query.bind(id);
    }
    if let Some(start) = start {
        data_query = data_query.bind(start);
    }
    if let Some(end) = end {
        data_query = data_query.bind(end);
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let rows = data_query.fetch_all(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(TimeRecordListResponse {
        items: rows
            .into_iter()
            .map(RecordWithEmployee::into_response)
            .collect(),
        total,
        pages: page_count(total, per_page),
        page,
    }))
}

/// Get a time record by ID
#[utoipa::path(
    get,
    path = "/api/time-records/{id}",
    params(("id", description = "Time record ID")),
    responses(
        (status = 200, description = "Time record found", body = TimeRecordResponse),
        (status = 404, description = "Time record not found")
    ),
    tag = "TimeRecord"
)]
pub async fn get_time_record(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let record_id = path.into_inner();

    let record = fetch_record(pool.get_ref(), record_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Time record not found"))?;

    Ok(HttpResponse::Ok().json(record.into_response()))
}

/// Check in: opens a new time record
///
/// Serves both `POST /time-records` and the `/time-records/check-in`
/// convenience route.
#[utoipa::path(
    post,
    path = "/api/time-records/check-in",
    request_body = CreateTimeRecord,
    responses(
        (status = 201, description = "Record opened", body = TimeRecordResponse),
        (status = 400, description = "Employee already has an open record", body = Object, example = json!({
            "error": "Employee already has an open time record",
            "record": {"id": 5, "employee_id": 1, "check_out": null}
        })),
        (status = 404, description = "Employee not found")
    ),
    tag = "TimeRecord"
)]
pub async fn check_in(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateTimeRecord>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();

    let employee: Option<u64> = sqlx::query_scalar("SELECT id FROM employees WHERE id = ?")
        .bind(payload.employee_id)
        .fetch_optional(pool.get_ref())
        .await?;
    if employee.is_none() {
        return Err(ApiError::not_found("Employee not found"));
    }

    if let Some(open) = find_open_record(pool.get_ref(), payload.employee_id).await? {
        return Err(ApiError::Conflict {
            message: "Employee already has an open time record".to_string(),
            record: serde_json::to_value(open.into_response()).unwrap_or_default(),
        });
    }

    let check_in = match payload.check_in.as_deref() {
        Some(s) => parse_datetime(s).ok_or_else(|| ApiError::validation(INVALID_DATETIME_MSG))?,
        None => clock::local_now(),
    };

    let result =
        sqlx::query("INSERT INTO time_records (employee_id, check_in, description) VALUES (?, ?, ?)")
            .bind(payload.employee_id)
            .bind(check_in)
            .bind(payload.description.as_deref())
            .execute(pool.get_ref())
            .await?;

    let record = fetch_record(pool.get_ref(), result.last_insert_id())
        .await?
        .ok_or_else(|| ApiError::not_found("Time record not found"))?;

    info!(
        employee_id = payload.employee_id,
        record_id = record.record.id,
        "Employee checked in"
    );
    Ok(HttpResponse::Created().json(record.into_response()))
}

/// Check out: closes the employee's open record
#[utoipa::path(
    post,
    path = "/api/time-records/check-out",
    request_body = CheckOutRequest,
    responses(
        (status = 200, description = "Record closed", body = TimeRecordResponse),
        (status = 400, description = "Check-out before check-in"),
        (status = 404, description = "No open record for this employee")
    ),
    tag = "TimeRecord"
)]
pub async fn check_out(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CheckOutRequest>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();

    let open = find_open_record(pool.get_ref(), payload.employee_id)
        .await?
        .ok_or_else(|| ApiError::not_found("No open time record found for this employee"))?;

    let check_out = resolve_check_out(payload.check_out.as_deref(), clock::local_now())?;
    if check_out < open.record.check_in {
        return Err(ApiError::validation(
            "Check-out time cannot be before check-in time",
        ));
    }

    let description = payload.description.or(open.record.description);
    sqlx::query("UPDATE time_records SET check_out = ?, description = ? WHERE id = ?")
        .bind(check_out)
        .bind(description.as_deref())
        .bind(open.record.id)
        .execute(pool.get_ref())
        .await?;

    let record = fetch_record(pool.get_ref(), open.record.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Time record not found"))?;

    info!(
        employee_id = payload.employee_id,
        record_id = record.record.id,
        "Employee checked out"
    );
    Ok(HttpResponse::Ok().json(record.into_response()))
}

/// Update a time record
///
/// Partial update: a supplied `check_out` ("now" or an explicit timestamp)
/// must not precede the record's check-in; the description can always be
/// edited, including on closed records.
#[utoipa::path(
    put,
    path = "/api/time-records/{id}",
    params(("id", description = "Time record ID")),
    request_body = UpdateTimeRecord,
    responses(
        (status = 200, description = "Record updated", body = TimeRecordResponse),
        (status = 400, description = "Check-out before check-in"),
        (status = 404, description = "Time record not found")
    ),
    tag = "TimeRecord"
)]
pub async fn update_time_record(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdateTimeRecord>,
) -> Result<HttpResponse, ApiError> {
    let record_id = path.into_inner();
    let body = body.into_inner();

    let current = fetch_record(pool.get_ref(), record_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Time record not found"))?;

    let mut check_out = current.record.check_out;
    if let Some(requested) = body.check_out.as_deref() {
        let resolved = resolve_check_out(Some(requested), clock::local_now())?;
        if resolved < current.record.check_in {
            return Err(ApiError::validation(
                "Check-out time cannot be before check-in time",
            ));
        }
        check_out = Some(resolved);
    }
    let description = body.description.or(current.record.description);

    sqlx::query("UPDATE time_records SET check_out = ?, description = ? WHERE id = ?")
        .bind(check_out)
        .bind(description.as_deref())
        .bind(record_id)
        .execute(pool.get_ref())
        .await?;

    let record = fetch_record(pool.get_ref(), record_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Time record not found"))?;

    Ok(HttpResponse::Ok().json(record.into_response()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap()
    }

    #[test]
    fn absent_check_out_means_now() {
        assert_eq!(resolve_check_out(None, now()).unwrap(), now());
    }

    #[test]
    fn now_literal_means_now() {
        assert_eq!(resolve_check_out(Some("now"), now()).unwrap(), now());
    }

    #[test]
    fn explicit_check_out_is_parsed() {
        let resolved = resolve_check_out(Some("2024-01-01T17:30:00"), now()).unwrap();
        assert_eq!(resolved.to_string(), "2024-01-01 17:30:00");
    }

    #[test]
    fn malformed_check_out_is_a_validation_error() {
        let err = resolve_check_out(Some("yesterday"), now()).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
