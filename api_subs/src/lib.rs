use actix_web::web::{self};
use common::error::AppError;

pub mod routes {
    pub mod subscription;
}

pub mod services {
    pub mod subscription;
}

pub mod dtos {
    pub mod subscription;
}

pub mod docs;

pub fn mount_subscriptions() -> actix_web::Scope {
    web::scope("/subscriptions")
        .app_data(json_config())
        .app_data(query_config())
        .service(routes::subscription::post_subscription)
        .service(routes::subscription::get_subscriptions)
        .service(routes::subscription::get_total_cost)
        .service(routes::subscription::get_subscription)
        .service(routes::subscription::patch_subscription)
        .service(routes::subscription::delete_subscription)
}

// malformed bodies and query strings get the same JSON error shape as the service
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::bad_request(format!("invalid JSON: {}", err)).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::bad_request(format!("invalid query parameters: {}", err)).into()
    })
}
