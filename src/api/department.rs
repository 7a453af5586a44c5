use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::model::department::Department;

#[derive(Deserialize, ToSchema)]
pub struct CreateDepartment {
    #[schema(example = "Engineering")]
    pub name: String,
}

#[derive(Serialize, ToSchema)]
pub struct DepartmentListResponse {
    pub items: Vec<Department>,
    #[schema(example = 4)]
    pub total: i64,
}

/// List departments
#[utoipa::path(
    get,
    path = "/api/departments",
    responses(
        (status = 200, description = "All departments", body = DepartmentListResponse)
    ),
    tag = "Department"
)]
pub async fn list_departments(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let items = sqlx::query_as::<_, Department>(
        "SELECT id, name, created_at, updated_at FROM departments ORDER BY id",
    )
    .fetch_all(pool.get_ref())
    .await?;
    let total = items.len() as i64;

    Ok(HttpResponse::Ok().json(DepartmentListResponse { items, total }))
}

/// Create a department
///
/// Names are not checked for uniqueness; duplicates are possible and can be
/// collapsed later with the dedupe-departments binary.
#[utoipa::path(
    post,
    path = "/api/departments",
    request_body = CreateDepartment,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 400, description = "Missing name")
    ),
    tag = "Department"
)]
pub async fn create_department(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateDepartment>,
) -> Result<HttpResponse, ApiError> {
    let name = payload.into_inner().name;
    if name.trim().is_empty() {
        return Err(ApiError::validation("Field name is required"));
    }

    let result = sqlx::query("INSERT INTO departments (name) VALUES (?)")
        .bind(&name)
        .execute(pool.get_ref())
        .await?;

    let department = sqlx::query_as::<_, Department>(
        "SELECT id, name, created_at, updated_at FROM departments WHERE id = ?",
    )
    .bind(result.last_insert_id())
    .fetch_one(pool.get_ref())
    .await?;

    info!(department_id = department.id, name = %department.name, "Department created");
    Ok(HttpResponse::Created().json(department))
}
