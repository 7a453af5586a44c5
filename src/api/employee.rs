use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

use crate::api::INVALID_DATETIME_MSG;
use crate::api::time_record::{RECORD_SELECT, RecordWithEmployee, TimeRecordListResponse};
use crate::error::ApiError;
use crate::model::employee::Employee;
use crate::utils::datetime::{parse_range_end, parse_range_start};
use crate::utils::page_count;

/// Base SELECT resolving the department name; every employee response goes
/// through this shape.
pub(crate) const EMPLOYEE_SELECT: &str = "SELECT e.id, e.first_name, e.last_name, e.email, e.position, \
     e.department_id, d.name AS department_name, e.is_active, e.created_at, e.updated_at \
     FROM employees e \
     LEFT JOIN departments d ON e.department_id = d.id";

#[derive(Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "Ivan")]
    pub first_name: String,
    #[schema(example = "Ivanov")]
    pub last_name: String,
    #[schema(example = "ivan@example.com", format = "email")]
    pub email: String,
    #[schema(example = "Developer")]
    pub position: String,
    #[schema(example = 1, nullable = true)]
    pub department_id: Option<u64>,
    #[schema(example = true, nullable = true)]
    pub is_active: Option<bool>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateEmployee {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[schema(format = "email", nullable = true)]
    pub email: Option<String>,
    pub position: Option<String>,
    pub department_id: Option<u64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub department_id: Option<u64>,
    pub is_active: Option<bool>,
    /// Substring match over name, email and position.
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EmployeeRecordsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub items: Vec<Employee>,
    #[schema(example = 42)]
    pub total: i64,
    #[schema(example = 3)]
    pub pages: i64,
    #[schema(example = 1)]
    pub page: u32,
}

#[derive(Serialize, ToSchema)]
pub struct OpenRecordEmployeesResponse {
    pub items: Vec<Employee>,
    #[schema(example = 2)]
    pub total: i64,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeTimeRecordsResponse {
    pub employee: Employee,
    pub time_records: TimeRecordListResponse,
}

pub(crate) async fn fetch_employee(
    pool: &MySqlPool,
    id: u64,
) -> Result<Option<Employee>, sqlx::Error> {
    let sql = format!("{EMPLOYEE_SELECT} WHERE e.id = ?");
    sqlx::query_as::<_, Employee>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

async fn email_taken(pool: &MySqlPool, email: &str) -> Result<bool, sqlx::Error> {
    let existing: Option<u64> = sqlx::query_scalar("SELECT id FROM employees WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(existing.is_some())
}

async fn department_exists(pool: &MySqlPool, id: u64) -> Result<bool, sqlx::Error> {
    let existing: Option<u64> = sqlx::query_scalar("SELECT id FROM departments WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(existing.is_some())
}

/// List employees
#[utoipa::path(
    get,
    path = "/api/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse)
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut conditions: Vec<&str> = Vec::new();
    if query.department_id.is_some() {
        conditions.push("e.department_id = ?");
    }
    if query.is_active.is_some() {
        conditions.push("e.is_active = ?");
    }
    let like = query
        .search
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s));
    if like.is_some() {
        conditions
            .push("(e.first_name LIKE ? OR e.last_name LIKE ? OR e.email LIKE ? OR e.position LIKE ?)");
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM employees e {}", where_clause);
    debug!(sql = %count_sql, "Counting employees");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(id) = query.department_id {
        count_query = count_query.bind(id);
    }
    if let Some(active) = query.is_active {
        count_query = count_query.bind(active);
    }
    if let Some(like) = &like {
        count_query = count_query
            .bind(like.as_str())
            .bind(like.as_str())
            .bind(like.as_str())
            .bind(like.as_str());
    }
    let total = count_query.fetch_one(pool.get_ref()).await?;

    let data_sql = format!(
        "{EMPLOYEE_SELECT} {} ORDER BY e.last_name, e.first_name LIMIT ? OFFSET ?",
        where_clause
    );
    debug!(sql = %data_sql, page, per_page, "Fetching employees");

    let mut data_query = sqlx::query_as::<_, Employee>(&data_sql);
    if let Some(id) = query.department_id {
        data_query = data_query.bind(id);
    }
    if let Some(active) = query.is_active {
        data_query = data_query.bind(active);
    }
    if let Some(like) = &like {
        data_query = data_query
            .bind(like.as_str())
            .bind(like.as_str())
            .bind(like.as_str())
            .bind(like.as_str());
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let items = data_query.fetch_all(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        items,
        total,
        pages: page_count(total, per_page),
        page,
    }))
}

/// Create an employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Duplicate email or unknown department", body = Object, example = json!({
            "error": "Email already exists"
        }))
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();

    if email_taken(pool.get_ref(), &payload.email).await? {
        return Err(ApiError::validation("Email already exists"));
    }
    if let Some(department_id) = payload.department_id {
        if !department_exists(pool.get_ref(), department_id).await? {
            return Err(ApiError::validation("Department not found"));
        }
    }

    let result = sqlx::query(
        "INSERT INTO employees (first_name, last_name, email, position, department_id, is_active) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.email)
    .bind(&payload.position)
    .bind(payload.department_id)
    .bind(payload.is_active.unwrap_or(true))
    .execute(pool.get_ref())
    .await;

    let result = match result {
        Ok(r) => r,
        Err(e) => {
            // Unique index on email; the pre-check can lose a race.
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Err(ApiError::validation("Email already exists"));
                }
            }
            return Err(e.into());
        }
    };

    let employee = fetch_employee(pool.get_ref(), result.last_insert_id())
        .await?
        .ok_or_else(|| ApiError::not_found("Employee not found"))?;

    info!(employee_id = employee.id, "Employee created");
    Ok(HttpResponse::Created().json(employee))
}

/// Get an employee by ID
#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    params(("id", description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = path.into_inner();

    let employee = fetch_employee(pool.get_ref(), employee_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee not found"))?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Update an employee
#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    params(("id", description = "Employee ID")),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, description = "Duplicate email or unknown department"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdateEmployee>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = path.into_inner();
    let body = body.into_inner();

    let current = fetch_employee(pool.get_ref(), employee_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee not found"))?;

    if let Some(email) = &body.email {
        if *email != current.email && email_taken(pool.get_ref(), email).await? {
            return Err(ApiError::validation("Email already exists"));
        }
    }
    if let Some(department_id) = body.department_id {
        if !department_exists(pool.get_ref(), department_id).await? {
            return Err(ApiError::validation("Department not found"));
        }
    }

    let first_name = body.first_name.unwrap_or(current.first_name);
    let last_name = body.last_name.unwrap_or(current.last_name);
    let email = body.email.unwrap_or(current.email);
    let position = body.position.unwrap_or(current.position);
    let department_id = body.department_id.or(current.department_id);
    let is_active = body.is_active.unwrap_or(current.is_active);

    sqlx::query(
        "UPDATE employees SET first_name = ?, last_name = ?, email = ?, position = ?, \
         department_id = ?, is_active = ? WHERE id = ?",
    )
    .bind(&first_name)
    .bind(&last_name)
    .bind(&email)
    .bind(&position)
    .bind(department_id)
    .bind(is_active)
    .bind(employee_id)
    .execute(pool.get_ref())
    .await?;

    let employee = fetch_employee(pool.get_ref(), employee_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee not found"))?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Deactivate an employee
///
/// Soft delete: flips `is_active` and keeps the row, so historical time
/// records stay retrievable through lists and reports.
#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    params(("id", description = "Employee ID")),
    responses(
        (status = 200, description = "Employee deactivated", body = Object, example = json!({
            "message": "Employee deactivated successfully"
        })),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = path.into_inner();

    let result = sqlx::query("UPDATE employees SET is_active = FALSE WHERE id = ?")
        .bind(employee_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        // either unknown or already inactive; distinguish them
        let exists = fetch_employee(pool.get_ref(), employee_id).await?;
        if exists.is_none() {
            return Err(ApiError::not_found("Employee not found"));
        }
    }

    info!(employee_id, "Employee deactivated");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Employee deactivated successfully"
    })))
}

/// Time records of one employee
#[utoipa::path(
    get,
    path = "/api/employees/{id}/time-records",
    params(("id", description = "Employee ID"), EmployeeRecordsQuery),
    responses(
        (status = 200, description = "Employee with their time records", body = EmployeeTimeRecordsResponse),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn employee_time_records(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    query: web::Query<EmployeeRecordsQuery>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = path.into_inner();

    let employee = fetch_employee(pool.get_ref(), employee_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee not found"))?;

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

    let mut conditions = vec!["tr.employee_id = ?"];
    if start.is_some() {
        conditions.push("tr.check_in >= ?");
    }
    if end.is_some() {
        conditions.push("tr.check_in <= ?");
    }
    let where_clause = format!("WHERE {}", conditions.join(" AND "));

    let count_sql = format!("SELECT COUNT(*) FROM time_records tr {}", where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(employee_id);
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
    let mut data_query = sqlx::query_as::<_, RecordWithEmployee>(&data_sql).bind(employee_id);
    if let Some(start) = start {
        data_query = data_query.bind(start);
    }
    if let Some(end) = end {
        data_query = data_query.bind(end);
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let rows = data_query.fetch_all(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(EmployeeTimeRecordsResponse {
        employee,
        time_records: TimeRecordListResponse {
            items: rows
                .into_iter()
                .map(RecordWithEmployee::into_response)
                .collect(),
            total,
            pages: page_count(total, per_page),
            page,
        },
    }))
}

/// Employees with an open time record
#[utoipa::path(
    get,
    path = "/api/employees/with-open-records",
    responses(
        (status = 200, description = "Currently checked-in employees", body = OpenRecordEmployeesResponse)
    ),
    tag = "Employee"
)]
pub async fn employees_with_open_records(
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let sql = format!(
        "{EMPLOYEE_SELECT} WHERE e.id IN \
         (SELECT DISTINCT employee_id FROM time_records WHERE check_out IS NULL) \
         ORDER BY e.last_name, e.first_name"
    );

    let items = sqlx::query_as::<_, Employee>(&sql)
        .fetch_all(pool.get_ref())
        .await?;
    let total = items.len() as i64;

    Ok(HttpResponse::Ok().json(OpenRecordEmployeesResponse { items, total }))
}
