use crate::{
    api::{attendance, chef, notification},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{HttpResponse, error::InternalError, web};
use serde_json::json;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let requests_per_min = requests_per_min.max(1);
        let per_ms = (60_000 / requests_per_min as u64).max(1);
        let cfg = GovernorConfigBuilder::default()
            .milliseconds_per_request(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .expect("period and burst are clamped to non-zero");
        Governor::new(&cfg)
    }

    let submit_limiter = Arc::new(build_limiter(config.rate_submit_per_min));
    let read_limiter = Arc::new(build_limiter(config.rate_read_per_min));

    // Unknown statuses and malformed bodies get the same JSON shape as
    // domain rejections.
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        let resp = HttpResponse::BadRequest().json(json!({ "error": err.to_string() }));
        InternalError::from_response(err, resp).into()
    });

    cfg.service(
        web::scope(&config.api_prefix)
            .app_data(json_config)
            .service(
                web::scope("/attendance")
                    // /attendance/{user_id}
                    .service(
                        web::resource("/{user_id}")
                            .route(
                                web::post()
                                    .to(attendance::mark_attendance)
                                    .wrap(submit_limiter.clone()),
                            )
                            .route(
                                web::get()
                                    .to(attendance::attendance_history)
                                    .wrap(read_limiter.clone()),
                            ),
                    ),
            )
            .service(
                web::scope("/chef")
                    .wrap(read_limiter.clone())
                    // /chef/daily-count
                    .service(web::resource("/daily-count").route(web::get().to(chef::daily_count))),
            )
            .service(
                web::resource("/notifications")
                    .wrap(read_limiter)
                    .route(web::get().to(notification::recent_notifications)),
            ),
    );
}
