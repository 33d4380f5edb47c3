use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    dtos::subscription::{
        CreateSubscriptionRequest, ErrorResponse, SubscriptionResponse, TotalCostResponse,
        UpdateSubscriptionRequest,
    },
    routes::subscription,
};

pub const OPENAPI_URL: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(title = "Subscriptions API", description = "Aggregates users' online subscriptions."),
    paths(
        subscription::post_subscription,
        subscription::get_subscriptions,
        subscription::get_total_cost,
        subscription::get_subscription,
        subscription::patch_subscription,
        subscription::delete_subscription,
    ),
    components(schemas(
        CreateSubscriptionRequest,
        UpdateSubscriptionRequest,
        SubscriptionResponse,
        TotalCostResponse,
        ErrorResponse,
    )),
    tags((name = "subscriptions", description = "Subscription records and cost totals"))
)]
pub struct ApiDoc;

/// Swagger UI at `/swagger/`, backed by the generated document at
/// [`OPENAPI_URL`].
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger/{_:.*}").url(OPENAPI_URL, ApiDoc::openapi())
}
