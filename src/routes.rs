use crate::{
    api::{attendance, employee, location, report},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

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

    // The check endpoints get their own, tighter limiter: fingerprint
    // terminals retry aggressively when a scan fails.
    let check_limiter = Arc::new(build_limiter(config.rate_check_per_min));
    let api_limiter = Arc::new(build_limiter(config.rate_api_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(api_limiter)
            .service(
                web::scope("/employee")
                    // /employee
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employee/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::get().to(employee::get_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/location")
                    // /location
                    .service(
                        web::resource("")
                            .route(web::post().to(location::create_location))
                            .route(web::get().to(location::list_locations)),
                    )
                    // /location/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(location::get_location))
                            .route(web::put().to(location::update_location)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("/check")
                            .wrap(check_limiter.clone())
                            .route(web::post().to(attendance::check_event)),
                    )
                    .service(
                        web::resource("/finger")
                            .wrap(check_limiter.clone())
                            .route(web::post().to(attendance::finger_event)),
                    )
                    .service(
                        web::resource("/today/{employee_id}")
                            .route(web::get().to(attendance::today_status)),
                    )
                    .service(
                        web::resource("/sweep/{kind}")
                            .route(web::post().to(attendance::trigger_sweep)),
                    )
                    // /attendance/{record_id}
                    .service(
                        web::resource("/{id}").route(web::delete().to(attendance::delete_record)),
                    ),
            )
            .service(
                web::scope("/report")
                    .service(web::resource("/daily").route(web::get().to(report::daily)))
                    .service(web::resource("/range").route(web::get().to(report::range)))
                    .service(web::resource("/fix-late").route(web::post().to(report::fix_late))),
            ),
    );
}
