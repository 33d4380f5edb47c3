use actix_web::{HttpResponse, Responder, delete, get, patch, post, web};
use common::{error::Res, http::Success};

use crate::{
    dtos::subscription::{
        CreateSubscriptionRequest, ErrorResponse, ListQuery, SubscriptionResponse,
        TotalCostQuery, TotalCostResponse, UpdateSubscriptionRequest,
    },
    services::subscription::SubscriptionService,
};

/// Creates a subscription record.
///
/// # Input
/// - JSON body with `service_name`, `price`, `user_id`, `start_date` and an
///   optional `end_date`, dates as `MM-YYYY` or `YYYY-MM`
///
/// # Output
/// - 201 with the stored subscription
/// - 400 on invalid input, 409 when the period overlaps an existing
///   subscription of the same user and service
#[utoipa::path(
    post,
    path = "/api/subscriptions",
    tag = "subscriptions",
    request_body = CreateSubscriptionRequest,
    responses(
        (status = 201, description = "Subscription created", body = SubscriptionResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Overlapping subscription", body = ErrorResponse),
    )
)]
#[post("")]
pub async fn post_subscription(
    service: web::Data<SubscriptionService>,
    req: web::Json<CreateSubscriptionRequest>,
) -> Res<impl Responder> {
    let sub = service.create(req.into_inner()).await?;
    Success::created(SubscriptionResponse::from(sub))
}

/// Lists subscriptions, newest first.
///
/// Query parameters: `user_id`, `service_name` (case-insensitive substring),
/// `limit` (default 20, max 100) and `offset`.
#[utoipa::path(
    get,
    path = "/api/subscriptions",
    tag = "subscriptions",
    params(ListQuery),
    responses(
        (status = 200, description = "Page of subscriptions", body = [SubscriptionResponse]),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
    )
)]
#[get("")]
pub async fn get_subscriptions(
    service: web::Data<SubscriptionService>,
    query: web::Query<ListQuery>,
) -> Res<impl Responder> {
    let query = query.into_inner();
    let subs = service
        .list(
            query.user_id.as_deref(),
            query.service_name.as_deref(),
            query.limit.unwrap_or(0),
            query.offset.unwrap_or(0),
        )
        .await?;

    let body: Vec<SubscriptionResponse> = subs.into_iter().map(Into::into).collect();
    Success::ok(body)
}

/// Total prorated cost over `[from, to]`, optionally filtered by `user_id`
/// and `service_name`.
#[utoipa::path(
    get,
    path = "/api/subscriptions/total",
    tag = "subscriptions",
    params(TotalCostQuery),
    responses(
        (status = 200, description = "Prorated total", body = TotalCostResponse),
        (status = 400, description = "Invalid period or filter", body = ErrorResponse),
    )
)]
#[get("/total")]
pub async fn get_total_cost(
    service: web::Data<SubscriptionService>,
    query: web::Query<TotalCostQuery>,
) -> Res<impl Responder> {
    let query = query.into_inner();
    let total = service
        .total_cost(
            &query.from,
            &query.to,
            query.user_id.as_deref(),
            query.service_name.as_deref(),
        )
        .await?;
    Success::ok(TotalCostResponse { total })
}

#[utoipa::path(
    get,
    path = "/api/subscriptions/{id}",
    tag = "subscriptions",
    params(("id" = String, Path, description = "Subscription UUID")),
    responses(
        (status = 200, description = "Subscription found", body = SubscriptionResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "No such subscription", body = ErrorResponse),
    )
)]
#[get("/{id}")]
pub async fn get_subscription(
    service: web::Data<SubscriptionService>,
    path: web::Path<String>,
) -> Res<impl Responder> {
    let sub = service.get_by_id(&path.into_inner()).await?;
    Success::ok(SubscriptionResponse::from(sub))
}

/// Partially updates a subscription. Send `"end_date": ""` to clear the end
/// date.
#[utoipa::path(
    patch,
    path = "/api/subscriptions/{id}",
    tag = "subscriptions",
    params(("id" = String, Path, description = "Subscription UUID")),
    request_body = UpdateSubscriptionRequest,
    responses(
        (status = 200, description = "Updated subscription", body = SubscriptionResponse),
        (status = 400, description = "Invalid input or empty patch", body = ErrorResponse),
        (status = 404, description = "No such subscription", body = ErrorResponse),
        (status = 409, description = "Overlapping subscription", body = ErrorResponse),
    )
)]
#[patch("/{id}")]
pub async fn patch_subscription(
    service: web::Data<SubscriptionService>,
    path: web::Path<String>,
    req: web::Json<UpdateSubscriptionRequest>,
) -> Res<impl Responder> {
    let sub = service.patch(&path.into_inner(), req.into_inner()).await?;
    Success::ok(SubscriptionResponse::from(sub))
}

#[utoipa::path(
    delete,
    path = "/api/subscriptions/{id}",
    tag = "subscriptions",
    params(("id" = String, Path, description = "Subscription UUID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "No such subscription", body = ErrorResponse),
    )
)]
#[delete("/{id}")]
pub async fn delete_subscription(
    service: web::Data<SubscriptionService>,
    path: web::Path<String>,
) -> Res<HttpResponse> {
    service.delete(&path.into_inner()).await?;
    Success::no_content()
}
