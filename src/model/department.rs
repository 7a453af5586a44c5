use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Department names are not unique at the storage level; duplicates are
/// possible and cleaned up out-of-band (see the dedupe-departments binary).
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Department {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Engineering")]
    pub name: String,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: NaiveDateTime,

    #[schema(value_type = String, format = "date-time")]
    pub updated_at: NaiveDateTime,
}
