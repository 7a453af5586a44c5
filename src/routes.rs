use crate::{
    api::{department, employee, report, time_record},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{HttpResponse, web};

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(build_limiter(config.rate_api_per_min))
            .service(web::resource("/status").route(web::get().to(status)))
            .service(
                web::scope("/departments").service(
                    web::resource("")
                        .route(web::get().to(department::list_departments))
                        .route(web::post().to(department::create_department)),
                ),
            )
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::get().to(employee::list_employees))
                            .route(web::post().to(employee::create_employee)),
                    )
                    // literal path must come before /{id}
                    .service(
                        web::resource("/with-open-records")
                            .route(web::get().to(employee::employees_with_open_records)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    )
                    // /employees/{id}/time-records
                    .service(
                        web::resource("/{id}/time-records")
                            .route(web::get().to(employee::employee_time_records)),
                    ),
            )
            .service(
                web::scope("/time-records")
                    // /time-records
                    .service(
                        web::resource("")
                            .route(web::get().to(time_record::list_time_records))
                            .route(web::post().to(time_record::check_in)),
                    )
                    .service(
                        web::resource("/check-in").route(web::post().to(time_record::check_in)),
                    )
                    .service(
                        web::resource("/check-out").route(web::post().to(time_record::check_out)),
                    )
                    // /time-records/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(time_record::get_time_record))
                            .route(web::put().to(time_record::update_time_record)),
                    ),
            )
            .service(
                web::scope("/reports")
                    .service(web::resource("/summary").route(web::get().to(report::summary_report)))
                    .service(web::resource("/daily").route(web::get().to(report::daily_report)))
                    .service(web::resource("/export/csv").route(web::get().to(report::export_csv))),
            ),
    );
}

async fn status() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
