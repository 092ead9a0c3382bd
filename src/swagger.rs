use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::subscription::create_subscription,
        handlers::subscription::get_subscription,
        handlers::subscription::update_subscription,
        handlers::subscription::delete_subscription,
        handlers::subscription::list_subscriptions,
        handlers::subscription::sum_subscriptions,
        handlers::health::health,
    ),
    components(
        schemas(
            Subscription,
            SubscriptionInput,
            CreateSubscriptionResponse,
            SubscriptionTotalResponse,
            HealthResponse,
            ApiError,
        )
    ),
    tags(
        (name = "subscriptions", description = "Subscription records and spend aggregation"),
        (name = "health", description = "Liveness probe"),
    ),
    info(
        title = "Subscription Service API",
        version = "0.1.0",
        description = "Stores user subscriptions and sums their prices over month ranges"
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
