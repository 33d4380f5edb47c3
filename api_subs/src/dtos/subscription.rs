use common::period::format_month_year;
use db::models::subscription::Subscription;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Missing fields deserialize to empty values and are rejected by validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateSubscriptionRequest {
    #[schema(example = "Yandex Plus")]
    pub service_name: String,
    #[schema(example = 400)]
    pub price: i64,
    #[schema(example = "60601fee-2bf1-4721-ae6f-7636e79a0cba")]
    pub user_id: String,
    #[schema(example = "07-2025")]
    pub start_date: String,
    #[schema(example = "12-2025")]
    pub end_date: Option<String>,
}

/// Partial update. An `end_date` of `""` clears the end date.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateSubscriptionRequest {
    pub service_name: Option<String>,
    pub price: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    pub user_id: Option<String>,
    /// Case-insensitive substring match.
    pub service_name: Option<String>,
    /// Page size, default 20, capped at 100.
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TotalCostQuery {
    /// First month of the period, `MM-YYYY` or `YYYY-MM`.
    #[serde(default)]
    pub from: String,
    /// Last month of the period, inclusive.
    #[serde(default)]
    pub to: String,
    pub user_id: Option<String>,
    pub service_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct SubscriptionResponse {
    pub id: Uuid,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(sub: Subscription) -> Self {
        SubscriptionResponse {
            id: sub.id,
            service_name: sub.service_name,
            price: sub.price,
            user_id: sub.user_id,
            start_date: format_month_year(sub.start_date),
            end_date: sub.end_date.map(format_month_year),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TotalCostResponse {
    pub total: i64,
}

/// Body of every 4xx/5xx response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "validation error: price must be positive integer")]
    pub error: String,
}
