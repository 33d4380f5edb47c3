use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::error::Res;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dtos::subscription::{ListFilters, SubscriptionFilter, SubscriptionPatch},
    models::subscription::Subscription,
};

/// Persistence operations the subscription service depends on.
///
/// Not-found is reported in-band (`None`, zero rows) so callers decide how to
/// surface it.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn create(&self, subscription: &Subscription) -> Res<Subscription>;

    async fn find_by_id(&self, id: Uuid) -> Res<Option<Subscription>>;

    /// Newest `start_date` first, then newest `created_at`.
    async fn list(&self, filters: &ListFilters) -> Res<Vec<Subscription>>;

    /// Returns the number of rows removed.
    async fn delete(&self, id: Uuid) -> Res<u64>;

    async fn update(&self, id: Uuid, patch: &SubscriptionPatch) -> Res<Option<Subscription>>;

    /// Rows with `start_date <= to` and an end that is open or `>= from`.
    async fn find_active_in_period(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        filter: &SubscriptionFilter,
    ) -> Res<Vec<Subscription>>;

    /// Whether another subscription of the same user and service (compared
    /// case-insensitively) shares at least one month with `[start, end]`.
    async fn exists_overlap(
        &self,
        user_id: Uuid,
        service_name: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
        exclude_id: Option<Uuid>,
    ) -> Res<bool>;
}

#[derive(Clone)]
pub struct PgSubscriptionStore {
    pool: Arc<PgPool>,
}

impl PgSubscriptionStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for PgSubscriptionStore {
    async fn create(&self, subscription: &Subscription) -> Res<Subscription> {
        crate::subscription::insert_subscription(&*self.pool, subscription).await
    }

    async fn find_by_id(&self, id: Uuid) -> Res<Option<Subscription>> {
        crate::subscription::get_subscription_by_id(&*self.pool, id).await
    }

    async fn list(&self, filters: &ListFilters) -> Res<Vec<Subscription>> {
        crate::subscription::list_subscriptions(&*self.pool, filters).await
    }

    async fn delete(&self, id: Uuid) -> Res<u64> {
        crate::subscription::delete_subscription(&*self.pool, id).await
    }

    async fn update(&self, id: Uuid, patch: &SubscriptionPatch) -> Res<Option<Subscription>> {
        crate::subscription::update_subscription(&*self.pool, id, patch).await
    }

    async fn find_active_in_period(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        filter: &SubscriptionFilter,
    ) -> Res<Vec<Subscription>> {
        crate::subscription::get_active_in_period(&*self.pool, from, to, filter).await
    }

    async fn exists_overlap(
        &self,
        user_id: Uuid,
        service_name: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
        exclude_id: Option<Uuid>,
    ) -> Res<bool> {
        crate::subscription::exists_overlap(
            &*self.pool,
            user_id,
            service_name,
            start,
            end,
            exclude_id,
        )
        .await
    }
}
