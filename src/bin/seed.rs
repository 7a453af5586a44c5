use anyhow::Result;
use chrono::{Datelike, Duration, NaiveTime, Weekday};
use dotenvy::dotenv;
use sqlx::MySqlPool;

use timetrack::clock;
use timetrack::db::{init_db, init_schema};

/// Creates the schema and fills it with demo data: four departments, five
/// employees and one closed record per employee per weekday of the trailing
/// week. The data is deterministic, reruns append the same pattern.
#[actix_web::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")?;
    let pool = init_db(&database_url).await;
    init_schema(&pool).await?;

    seed(&pool).await
}

async fn seed(pool: &MySqlPool) -> Result<()> {
    let department_names = ["Engineering", "Marketing", "Sales", "Administration"];
    let mut department_ids = Vec::new();
    for name in department_names {
        let result = sqlx::query("INSERT INTO departments (name) VALUES (?)")
            .bind(name)
            .execute(pool)
            .await?;
        department_ids.push(result.last_insert_id());
    }

    let employees = [
        ("Ivan", "Ivanov", "ivan@example.com", "Developer", 0usize),
        ("Petr", "Petrov", "petr@example.com", "Developer", 0),
        ("Maria", "Sidorova", "maria@example.com", "Marketing Manager", 1),
        ("Anna", "Kuznetsova", "anna@example.com", "Sales Manager", 2),
        ("Alexey", "Smirnov", "alexey@example.com", "Director", 3),
    ];
    let mut employee_ids = Vec::new();
    for (first_name, last_name, email, position, dept) in employees {
        let result = sqlx::query(
            "INSERT INTO employees (first_name, last_name, email, position, department_id) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(position)
        .bind(department_ids[dept])
        .execute(pool)
        .await?;
        employee_ids.push(result.last_insert_id());
    }

    let nine = NaiveTime::from_hms_opt(9, 0, 0).expect("valid clock time");
    let today = clock::local_now().date();
    let mut records = 0u32;

    for day_back in 1..=7i64 {
        let date = today - Duration::days(day_back);
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }
        for (slot, employee_id) in employee_ids.iter().enumerate() {
            // per-day, per-employee stagger of up to 30 minutes
            let stagger = (day_back * 7 + slot as i64 * 11) % 30;
            let check_in = date.and_time(nine) + Duration::minutes(stagger);
            let worked = 9 + (day_back + slot as i64) % 2;
            let check_out = check_in + Duration::hours(worked);

            sqlx::query(
                "INSERT INTO time_records (employee_id, check_in, check_out, description) \
                 VALUES (?, ?, ?, ?)",
            )
            .bind(employee_id)
            .bind(check_in)
            .bind(check_out)
            .bind(format!("Work day {}", date.format("%Y-%m-%d")))
            .execute(pool)
            .await?;
            records += 1;
        }
    }

    println!(
        "Seeded {} departments, {} employees and {} time records",
        department_ids.len(),
        employee_ids.len(),
        records
    );
    Ok(())
}
