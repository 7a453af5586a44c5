use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An employee row joined with its department name. `department_id` is a
/// weak reference: departments can disappear without cascading here, and
/// `department_name` is then null.
///
/// Employees are never deleted; deactivation flips `is_active` and keeps
/// the row (and all of its time records) queryable.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "first_name": "Ivan",
        "last_name": "Ivanov",
        "email": "ivan@example.com",
        "position": "Developer",
        "department_id": 1,
        "department_name": "Engineering",
        "is_active": true,
        "created_at": "2024-01-01T09:00:00",
        "updated_at": "2024-01-01T09:00:00"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Ivan")]
    pub first_name: String,

    #[schema(example = "Ivanov")]
    pub last_name: String,

    #[schema(example = "ivan@example.com")]
    pub email: String,

    #[schema(example = "Developer")]
    pub position: String,

    #[schema(example = 1, nullable = true)]
    pub department_id: Option<u64>,

    #[schema(example = "Engineering", nullable = true)]
    pub department_name: Option<String>,

    #[schema(example = true)]
    pub is_active: bool,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: NaiveDateTime,

    #[schema(value_type = String, format = "date-time")]
    pub updated_at: NaiveDateTime,
}
