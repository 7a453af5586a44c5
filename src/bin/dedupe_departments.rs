use std::collections::HashMap;

use anyhow::Result;
use dotenvy::dotenv;
use sqlx::MySqlPool;

use timetrack::db::init_db;

#[derive(sqlx::FromRow)]
struct DepartmentRow {
    id: u64,
    name: String,
}

/// Collapses duplicate department names: the lowest id per name survives,
/// employees of the duplicates are re-pointed at it, the duplicates are
/// deleted.
#[actix_web::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")?;
    let pool = init_db(&database_url).await;

    dedupe(&pool).await
}

async fn dedupe(pool: &MySqlPool) -> Result<()> {
    let departments =
        sqlx::query_as::<_, DepartmentRow>("SELECT id, name FROM departments ORDER BY id")
            .fetch_all(pool)
            .await?;
    println!("Found {} departments", departments.len());

    let mut keep: HashMap<String, u64> = HashMap::new();
    let mut removed = 0u32;

    for dept in &departments {
        match keep.get(&dept.name).copied() {
            None => {
                keep.insert(dept.name.clone(), dept.id);
            }
            Some(kept_id) => {
                // re-point employees before deleting, the FK forbids dangling rows
                sqlx::query("UPDATE employees SET department_id = ? WHERE department_id = ?")
                    .bind(kept_id)
                    .bind(dept.id)
                    .execute(pool)
                    .await?;
                sqlx::query("DELETE FROM departments WHERE id = ?")
                    .bind(dept.id)
                    .execute(pool)
                    .await?;
                println!(
                    "Removed duplicate of '{}': id {} (kept id {})",
                    dept.name, dept.id, kept_id
                );
                removed += 1;
            }
        }
    }

    if removed == 0 {
        println!("No duplicates found, database unchanged");
    } else {
        println!("Removed {} duplicate departments", removed);
    }
    Ok(())
}
