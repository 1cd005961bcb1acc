use crate::controllers;
use crate::error::ApiError;
use crate::store::ListingStore;
use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{middleware, web, App};
use std::sync::Arc;
use std::time::Instant;

/// Shared per-process state handed to every handler.
pub struct AppState {
    pub store: Arc<dyn ListingStore>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn ListingStore>) -> Self {
        AppState {
            store,
            started_at: Instant::now(),
        }
    }
}

/// Registers the `/health`, `/` and `/roommates` routes. Fixed paths under
/// `/roommates` are registered before `/{id}` so they take precedence.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(controllers::health)
        .service(controllers::banner)
        .service(
            web::scope("/roommates")
                .service(
                    web::resource("")
                        .route(web::get().to(controllers::list_listings))
                        .route(web::post().to(controllers::create_listing)),
                )
                .service(controllers::all_items)
                .service(controllers::trending)
                .service(controllers::my_listings)
                .service(controllers::search_suggestions)
                .service(controllers::like_listing)
                .service(controllers::get_listing)
                .service(controllers::update_listing)
                .service(controllers::delete_listing),
        );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::Validation(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| ApiError::Validation(err.to_string()).into())
}

pub fn build_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let cors = Cors::default()
        .allow_any_origin()
        .allow_any_header()
        .allow_any_method();
    App::new()
        .wrap(middleware::NormalizePath::trim())
        .wrap(middleware::Logger::default())
        .wrap(cors)
        .app_data(state)
        .app_data(json_config())
        .app_data(query_config())
        .configure(routes)
        .default_service(web::to(controllers::not_found))
}
