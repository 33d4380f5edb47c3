//! In-memory [`SubscriptionStore`] for tests.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use common::{
    error::{AppError, Res},
    period::intervals_overlap,
};
use uuid::Uuid;

use crate::{
    dtos::subscription::{ListFilters, SubscriptionFilter, SubscriptionPatch},
    models::subscription::Subscription,
    store::SubscriptionStore,
};

/// Cloning shares the underlying rows.
#[derive(Default, Clone)]
pub struct InMemorySubscriptionStore {
    rows: Arc<RwLock<Vec<Subscription>>>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored row.
    pub fn all(&self) -> Vec<Subscription> {
        self.read().map(|rows| rows.clone()).unwrap_or_default()
    }

    fn read(&self) -> Res<RwLockReadGuard<'_, Vec<Subscription>>> {
        self.rows
            .read()
            .map_err(|_| AppError::Internal("subscription store poisoned".to_string()))
    }

    fn write(&self) -> Res<RwLockWriteGuard<'_, Vec<Subscription>>> {
        self.rows
            .write()
            .map_err(|_| AppError::Internal("subscription store poisoned".to_string()))
    }
}

fn matches_filter(row: &Subscription, filter: &SubscriptionFilter) -> bool {
    if filter.user_id.is_some_and(|user_id| row.user_id != user_id) {
        return false;
    }
    match &filter.service_name {
        Some(needle) => row
            .service_name
            .to_lowercase()
            .contains(&needle.to_lowercase()),
        None => true,
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn create(&self, subscription: &Subscription) -> Res<Subscription> {
        let mut rows = self.write()?;
        if rows.iter().any(|row| row.id == subscription.id) {
            return Err(AppError::Internal(format!(
                "duplicate subscription id {}",
                subscription.id
            )));
        }

        // keep creation order strict so listing ties stay deterministic
        let now = Utc::now();
        let created_at = match rows.iter().map(|row| row.created_at).max() {
            Some(last) if last >= now => last + Duration::microseconds(1),
            _ => now,
        };

        let stored = Subscription {
            created_at,
            updated_at: created_at,
            ..subscription.clone()
        };
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> Res<Option<Subscription>> {
        Ok(self.read()?.iter().find(|row| row.id == id).cloned())
    }

    async fn list(&self, filters: &ListFilters) -> Res<Vec<Subscription>> {
        let mut matched: Vec<Subscription> = self
            .read()?
            .iter()
            .filter(|row| matches_filter(row, &filters.filter))
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            b.start_date
                .cmp(&a.start_date)
                .then(b.created_at.cmp(&a.created_at))
        });

        Ok(matched
            .into_iter()
            .skip(filters.offset.max(0) as usize)
            .take(filters.limit.max(0) as usize)
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Res<u64> {
        let mut rows = self.write()?;
        let before = rows.len();
        rows.retain(|row| row.id != id);
        Ok((before - rows.len()) as u64)
    }

    async fn update(&self, id: Uuid, patch: &SubscriptionPatch) -> Res<Option<Subscription>> {
        let mut rows = self.write()?;
        let Some(row) = rows.iter_mut().find(|row| row.id == id) else {
            return Ok(None);
        };

        if let Some(service_name) = &patch.service_name {
            row.service_name = service_name.clone();
        }
        if let Some(price) = patch.price {
            row.price = price;
        }
        if let Some(start_date) = patch.start_date {
            row.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            row.end_date = end_date;
        }
        row.updated_at = Utc::now().max(row.updated_at);

        Ok(Some(row.clone()))
    }

    async fn find_active_in_period(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        filter: &SubscriptionFilter,
    ) -> Res<Vec<Subscription>> {
        Ok(self
            .read()?
            .iter()
            .filter(|row| matches_filter(row, filter))
            .filter(|row| row.start_date <= to && row.end_date.is_none_or(|end| end >= from))
            .cloned()
            .collect())
    }

    async fn exists_overlap(
        &self,
        user_id: Uuid,
        service_name: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
        exclude_id: Option<Uuid>,
    ) -> Res<bool> {
        let service_name = service_name.to_lowercase();
        Ok(self.read()?.iter().any(|row| {
            row.user_id == user_id
                && row.service_name.to_lowercase() == service_name
                && Some(row.id) != exclude_id
                && intervals_overlap(row.start_date, row.end_date, start, end)
        }))
    }
}
