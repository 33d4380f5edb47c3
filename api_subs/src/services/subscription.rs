use std::sync::Arc;

use chrono::NaiveDate;
use common::{
    error::{AppError, Res},
    period::{max_date, months_inclusive, parse_month_year},
};
use db::{
    dtos::subscription::{ListFilters, SubscriptionFilter, SubscriptionPatch},
    models::subscription::Subscription,
    store::SubscriptionStore,
};
use uuid::Uuid;

use crate::dtos::subscription::{CreateSubscriptionRequest, UpdateSubscriptionRequest};

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

/// Validation, overlap checks, CRUD and cost aggregation for subscriptions.
///
/// Every write is validated and overlap-checked here before it reaches the
/// store.
#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<dyn SubscriptionStore>,
}

impl SubscriptionService {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    /// Creates a subscription after validating the request and checking it
    /// against the user's full history for the same service.
    ///
    /// # Errors
    ///
    /// `BadRequest` for malformed input, `Conflict` when the period overlaps an
    /// existing subscription.
    pub async fn create(&self, req: CreateSubscriptionRequest) -> Res<Subscription> {
        if req.service_name.is_empty() {
            return Err(AppError::bad_request("service_name is required"));
        }
        let price = validate_price(req.price)?;
        let user_id = parse_uuid(&req.user_id, "user_id")?;
        let start_date = parse_month_year(&req.start_date).map_err(|_| {
            AppError::bad_request("start_date format must be MM-YYYY or YYYY-MM")
        })?;

        let end_date = match req.end_date.as_deref() {
            Some(end) if !end.is_empty() => {
                let end = parse_month_year(end).map_err(|_| {
                    AppError::bad_request("end_date format must be MM-YYYY or YYYY-MM")
                })?;
                ensure_ordered(start_date, end)?;
                Some(end)
            }
            _ => None,
        };

        let subscription = Subscription {
            id: Uuid::new_v4(),
            service_name: req.service_name,
            price,
            user_id,
            start_date,
            end_date,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        self.ensure_no_overlap(
            user_id,
            &subscription.service_name,
            start_date,
            end_date,
            None,
        )
        .await?;

        let created = self.store.create(&subscription).await?;
        log::info!(
            "created subscription {} ({}) for user {}",
            created.id,
            created.service_name,
            created.user_id
        );
        Ok(created)
    }

    pub async fn get_by_id(&self, id: &str) -> Res<Subscription> {
        let id = parse_uuid(id, "id")?;
        self.store.find_by_id(id).await?.ok_or_else(not_found)
    }

    /// One page of subscriptions, newest `start_date` first.
    ///
    /// `limit` outside `1..=100` falls back to 20 or clamps to 100, negative
    /// offsets become 0.
    pub async fn list(
        &self,
        user_id: Option<&str>,
        service_name: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Res<Vec<Subscription>> {
        let (limit, offset) = normalize_page(limit, offset);
        let filters = ListFilters {
            filter: build_filter(user_id, service_name)?,
            limit,
            offset,
        };
        self.store.list(&filters).await
    }

    pub async fn delete(&self, id: &str) -> Res<()> {
        let id = parse_uuid(id, "id")?;
        if self.store.delete(id).await? == 0 {
            return Err(not_found());
        }
        log::info!("deleted subscription {}", id);
        Ok(())
    }

    /// Applies the provided fields and re-checks the merged period for
    /// overlaps, excluding the record itself.
    pub async fn patch(&self, id: &str, req: UpdateSubscriptionRequest) -> Res<Subscription> {
        let id = parse_uuid(id, "id")?;
        let patch = build_patch(req)?;
        if patch.is_empty() {
            return Err(AppError::bad_request("no fields to update"));
        }

        let existing = self.store.find_by_id(id).await?.ok_or_else(not_found)?;

        let start_date = patch.start_date.unwrap_or(existing.start_date);
        let end_date = patch.end_date.unwrap_or(existing.end_date);
        if let Some(end) = end_date {
            ensure_ordered(start_date, end)?;
        }
        let service_name = patch
            .service_name
            .as_deref()
            .unwrap_or(&existing.service_name);

        self.ensure_no_overlap(existing.user_id, service_name, start_date, end_date, Some(id))
            .await?;

        let updated = self.store.update(id, &patch).await?.ok_or_else(not_found)?;
        log::debug!("patched subscription {}: {:?}", id, patch);
        Ok(updated)
    }

    /// Sum of `price * active months` over `[from, to]` for every matching
    /// subscription, each clipped to the window.
    pub async fn total_cost(
        &self,
        from: &str,
        to: &str,
        user_id: Option<&str>,
        service_name: Option<&str>,
    ) -> Res<i64> {
        let from = parse_month_year(from)
            .map_err(|_| AppError::bad_request("from must be MM-YYYY or YYYY-MM"))?;
        let to = parse_month_year(to)
            .map_err(|_| AppError::bad_request("to must be MM-YYYY or YYYY-MM"))?;
        if to < from {
            return Err(AppError::bad_request("to must be >= from"));
        }

        let filter = build_filter(user_id, service_name)?;
        let subscriptions = self.store.find_active_in_period(from, to, &filter).await?;

        Ok(subscriptions
            .iter()
            .map(|sub| prorated_cost(sub, from, to))
            .sum())
    }

    async fn ensure_no_overlap(
        &self,
        user_id: Uuid,
        service_name: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
        exclude_id: Option<Uuid>,
    ) -> Res<()> {
        let overlap = self
            .store
            .exists_overlap(user_id, service_name, start, end, exclude_id)
            .await?;
        if overlap {
            log::warn!(
                "rejected overlapping {} period for user {} starting {}",
                service_name,
                user_id,
                start
            );
            return Err(AppError::Conflict(format!(
                "user already has a {} subscription in this period",
                service_name
            )));
        }
        Ok(())
    }
}

pub fn normalize_page(limit: i64, offset: i64) -> (i64, i64) {
    let limit = if limit <= 0 {
        DEFAULT_LIMIT
    } else {
        limit.min(MAX_LIMIT)
    };
    (limit, offset.max(0))
}

/// Cost of `sub` inside `[from, to]`; zero when the clipped period is empty.
pub fn prorated_cost(sub: &Subscription, from: NaiveDate, to: NaiveDate) -> i64 {
    let start = max_date(sub.start_date, from);
    let end = sub.end_date.map_or(to, |end| end.min(to));
    if end < start {
        return 0;
    }
    months_inclusive(start, end) * i64::from(sub.price)
}

fn build_patch(req: UpdateSubscriptionRequest) -> Res<SubscriptionPatch> {
    let mut patch = SubscriptionPatch::default();

    if let Some(service_name) = req.service_name {
        if service_name.is_empty() {
            return Err(AppError::bad_request("service_name cannot be empty"));
        }
        patch.service_name = Some(service_name);
    }

    if let Some(price) = req.price {
        patch.price = Some(validate_price(price)?);
    }

    if let Some(start) = req.start_date.as_deref() {
        let start = parse_month_year(start).map_err(|_| {
            AppError::bad_request("start_date format must be MM-YYYY or YYYY-MM")
        })?;
        patch.start_date = Some(start);
    }

    if let Some(end) = req.end_date.as_deref() {
        if end.is_empty() {
            patch.end_date = Some(None);
        } else {
            let end = parse_month_year(end).map_err(|_| {
                AppError::bad_request("end_date must be MM-YYYY, YYYY-MM or empty to clear")
            })?;
            if let Some(start) = patch.start_date {
                ensure_ordered(start, end)?;
            }
            patch.end_date = Some(Some(end));
        }
    }

    Ok(patch)
}

fn build_filter(user_id: Option<&str>, service_name: Option<&str>) -> Res<SubscriptionFilter> {
    let user_id = match user_id.filter(|s| !s.is_empty()) {
        Some(user_id) => Some(parse_uuid(user_id, "user_id")?),
        None => None,
    };
    Ok(SubscriptionFilter {
        user_id,
        service_name: service_name
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    })
}

fn validate_price(price: i64) -> Res<i32> {
    if price <= 0 {
        return Err(AppError::bad_request("price must be positive integer"));
    }
    i32::try_from(price).map_err(|_| AppError::bad_request("price is too large"))
}

fn parse_uuid(value: &str, field: &str) -> Res<Uuid> {
    Uuid::parse_str(value).map_err(|_| AppError::bad_request(format!("{} must be UUID", field)))
}

fn ensure_ordered(start: NaiveDate, end: NaiveDate) -> Res<()> {
    if end < start {
        return Err(AppError::bad_request(
            "end_date must not be before start_date",
        ));
    }
    Ok(())
}

fn not_found() -> AppError {
    AppError::NotFound("subscription".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use db::memory::InMemorySubscriptionStore;

    fn month(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    fn service() -> (SubscriptionService, InMemorySubscriptionStore) {
        let store = InMemorySubscriptionStore::new();
        (SubscriptionService::new(Arc::new(store.clone())), store)
    }

    fn request(user_id: Uuid, service_name: &str, start: &str, end: Option<&str>) -> CreateSubscriptionRequest {
        CreateSubscriptionRequest {
            service_name: service_name.to_string(),
            price: 500,
            user_id: user_id.to_string(),
            start_date: start.to_string(),
            end_date: end.map(str::to_string),
        }
    }

    #[actix_web::test]
    async fn create_normalizes_dates_and_rejects_overlaps() {
        let (svc, _) = service();
        let user = Uuid::new_v4();

        let created = svc
            .create(request(user, "Netflix", "07-2025", None))
            .await
            .unwrap();
        assert_eq!(created.service_name, "Netflix");
        assert_eq!(created.price, 500);
        assert_eq!(created.start_date, month(2025, 7));
        assert_eq!(created.end_date, None);

        let err = svc
            .create(request(user, "netflix", "2026-01", Some("02-2026")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)), "{err:?}");
    }

    #[actix_web::test]
    async fn create_allows_adjacent_periods_and_other_services() {
        let (svc, store) = service();
        let user = Uuid::new_v4();

        svc.create(request(user, "Netflix", "01-2025", Some("02-2025")))
            .await
            .unwrap();
        svc.create(request(user, "Netflix", "03-2025", Some("05-2025")))
            .await
            .unwrap();
        svc.create(request(user, "Spotify", "01-2025", None))
            .await
            .unwrap();

        let err = svc
            .create(request(user, "Netflix", "05-2025", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.all().len(), 3);
    }

    #[actix_web::test]
    async fn create_validates_every_field() {
        let (svc, store) = service();
        let user = Uuid::new_v4();

        let cases = [
            (request(user, "", "07-2025", None), "service_name is required"),
            (
                CreateSubscriptionRequest { price: 0, ..request(user, "Netflix", "07-2025", None) },
                "price must be positive integer",
            ),
            (
                CreateSubscriptionRequest {
                    user_id: "not-a-uuid".into(),
                    ..request(user, "Netflix", "07-2025", None)
                },
                "user_id must be UUID",
            ),
            (
                request(user, "Netflix", "invalid-date", None),
                "start_date format must be MM-YYYY or YYYY-MM",
            ),
            (
                request(user, "Netflix", "07-2025", Some("13-2025")),
                "end_date format must be MM-YYYY or YYYY-MM",
            ),
            (
                request(user, "Netflix", "07-2025", Some("06-2025")),
                "end_date must not be before start_date",
            ),
        ];

        for (req, message) in cases {
            match svc.create(req).await {
                Err(AppError::BadRequest(msg)) => assert_eq!(msg, message),
                other => panic!("expected validation error {message:?}, got {other:?}"),
            }
        }
        assert!(store.all().is_empty());
    }

    #[actix_web::test]
    async fn create_treats_empty_end_date_as_open_ended() {
        let (svc, _) = service();
        let created = svc
            .create(request(Uuid::new_v4(), "Netflix", "07-2025", Some("")))
            .await
            .unwrap();
        assert_eq!(created.end_date, None);
    }

    #[actix_web::test]
    async fn only_the_empty_service_name_is_rejected() {
        let (svc, _) = service();
        let user = Uuid::new_v4();

        let created = svc.create(request(user, "   ", "07-2025", None)).await.unwrap();
        assert_eq!(created.service_name, "   ");
        assert!(matches!(
            svc.create(request(user, "", "07-2025", None)).await.unwrap_err(),
            AppError::BadRequest(_)
        ));

        let patched = svc
            .patch(
                &created.id.to_string(),
                UpdateSubscriptionRequest { service_name: Some(" ".into()), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(patched.service_name, " ");
    }

    #[actix_web::test]
    async fn get_distinguishes_malformed_and_missing_ids() {
        let (svc, _) = service();
        assert!(matches!(
            svc.get_by_id("nope").await.unwrap_err(),
            AppError::BadRequest(_)
        ));
        assert!(svc
            .get_by_id(&Uuid::new_v4().to_string())
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[actix_web::test]
    async fn delete_is_hard_and_reports_missing_rows() {
        let (svc, _) = service();
        let created = svc
            .create(request(Uuid::new_v4(), "Netflix", "07-2025", None))
            .await
            .unwrap();
        let id = created.id.to_string();

        assert!(svc
            .delete(&Uuid::new_v4().to_string())
            .await
            .unwrap_err()
            .is_not_found());
        svc.delete(&id).await.unwrap();
        assert!(svc.get_by_id(&id).await.unwrap_err().is_not_found());
        assert!(svc.delete(&id).await.unwrap_err().is_not_found());
    }

    #[test]
    fn page_normalization_clamps_limit_and_offset() {
        assert_eq!(normalize_page(0, 0), (20, 0));
        assert_eq!(normalize_page(-3, 4), (20, 4));
        assert_eq!(normalize_page(500, -5), (100, 0));
        assert_eq!(normalize_page(35, 10), (35, 10));
    }

    #[actix_web::test]
    async fn list_filters_and_pages_deterministically() {
        let (svc, _) = service();
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();

        svc.create(request(user, "Netflix", "01-2025", Some("03-2025")))
            .await
            .unwrap();
        svc.create(request(user, "Yandex Plus", "05-2025", None))
            .await
            .unwrap();
        svc.create(request(other, "NETFLIX Premium", "02-2025", None))
            .await
            .unwrap();

        let mine = svc.list(Some(&user.to_string()), None, 0, 0).await.unwrap();
        let names: Vec<&str> = mine.iter().map(|s| s.service_name.as_str()).collect();
        assert_eq!(names, vec!["Yandex Plus", "Netflix"]);

        let netflix = svc.list(None, Some("netflix"), 0, 0).await.unwrap();
        assert_eq!(netflix.len(), 2);
        assert_eq!(netflix[0].service_name, "NETFLIX Premium");

        let page = svc.list(Some(""), Some(""), 1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].service_name, "NETFLIX Premium");

        let clamped = svc.list(None, None, 1, -5).await.unwrap();
        assert_eq!(clamped[0].service_name, "Yandex Plus");

        assert!(matches!(
            svc.list(Some("bad"), None, 0, 0).await.unwrap_err(),
            AppError::BadRequest(_)
        ));
    }

    #[actix_web::test]
    async fn patch_updates_only_provided_fields() {
        let (svc, _) = service();
        let created = svc
            .create(request(Uuid::new_v4(), "Netflix", "07-2025", Some("09-2025")))
            .await
            .unwrap();

        let patched = svc
            .patch(
                &created.id.to_string(),
                UpdateSubscriptionRequest {
                    price: Some(450),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(patched.price, 450);
        assert_eq!(patched.service_name, "Netflix");
        assert_eq!(patched.start_date, month(2025, 7));
        assert_eq!(patched.end_date, Some(month(2025, 9)));
    }

    #[actix_web::test]
    async fn patch_with_empty_end_date_clears_it() {
        let (svc, _) = service();
        let created = svc
            .create(request(Uuid::new_v4(), "Netflix", "07-2025", Some("09-2025")))
            .await
            .unwrap();

        let patched = svc
            .patch(
                &created.id.to_string(),
                UpdateSubscriptionRequest {
                    end_date: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.end_date, None);
    }

    #[actix_web::test]
    async fn patch_rejects_invalid_input() {
        let (svc, _) = service();
        let created = svc
            .create(request(Uuid::new_v4(), "Netflix", "07-2025", Some("09-2025")))
            .await
            .unwrap();
        let id = created.id.to_string();

        let cases = [
            (UpdateSubscriptionRequest::default(), "no fields to update"),
            (
                UpdateSubscriptionRequest { service_name: Some(String::new()), ..Default::default() },
                "service_name cannot be empty",
            ),
            (
                UpdateSubscriptionRequest { price: Some(-1), ..Default::default() },
                "price must be positive integer",
            ),
            (
                UpdateSubscriptionRequest { start_date: Some("2025/08".into()), ..Default::default() },
                "start_date format must be MM-YYYY or YYYY-MM",
            ),
            (
                UpdateSubscriptionRequest {
                    start_date: Some("08-2025".into()),
                    end_date: Some("07-2025".into()),
                    ..Default::default()
                },
                "end_date must not be before start_date",
            ),
            // only end_date: checked against the stored start
            (
                UpdateSubscriptionRequest { end_date: Some("06-2025".into()), ..Default::default() },
                "end_date must not be before start_date",
            ),
            // only start_date: checked against the stored end
            (
                UpdateSubscriptionRequest { start_date: Some("10-2025".into()), ..Default::default() },
                "end_date must not be before start_date",
            ),
        ];

        for (req, message) in cases {
            match svc.patch(&id, req).await {
                Err(AppError::BadRequest(msg)) => assert_eq!(msg, message),
                other => panic!("expected validation error {message:?}, got {other:?}"),
            }
        }
    }

    #[actix_web::test]
    async fn patch_rechecks_overlap_excluding_itself() {
        let (svc, _) = service();
        let user = Uuid::new_v4();
        let first = svc
            .create(request(user, "Netflix", "01-2025", Some("03-2025")))
            .await
            .unwrap();
        svc.create(request(user, "Netflix", "06-2025", None))
            .await
            .unwrap();

        // moving within its own period is fine
        svc.patch(
            &first.id.to_string(),
            UpdateSubscriptionRequest {
                start_date: Some("02-2025".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        // clearing the end runs into the open-ended June subscription
        let err = svc
            .patch(
                &first.id.to_string(),
                UpdateSubscriptionRequest {
                    end_date: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[actix_web::test]
    async fn patch_checks_overlap_under_the_new_service_name() {
        let (svc, _) = service();
        let user = Uuid::new_v4();
        svc.create(request(user, "Spotify", "01-2025", None))
            .await
            .unwrap();
        let netflix = svc
            .create(request(user, "Netflix", "01-2025", None))
            .await
            .unwrap();

        let err = svc
            .patch(
                &netflix.id.to_string(),
                UpdateSubscriptionRequest {
                    service_name: Some("spotify".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[actix_web::test]
    async fn patch_of_missing_record_is_not_found() {
        let (svc, _) = service();
        let err = svc
            .patch(
                &Uuid::new_v4().to_string(),
                UpdateSubscriptionRequest {
                    end_date: Some("09-2025".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[actix_web::test]
    async fn total_cost_prorates_over_the_window() {
        let (svc, _) = service();
        let user = Uuid::new_v4();
        svc.create(CreateSubscriptionRequest {
            price: 100,
            ..request(user, "Netflix", "07-2025", Some("09-2025"))
        })
        .await
        .unwrap();

        assert_eq!(svc.total_cost("07-2025", "09-2025", None, None).await.unwrap(), 300);
        assert_eq!(svc.total_cost("08-2025", "12-2025", None, None).await.unwrap(), 200);
        assert_eq!(svc.total_cost("10-2025", "12-2025", None, None).await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn total_cost_applies_filters_and_open_ends() {
        let (svc, _) = service();
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();
        svc.create(CreateSubscriptionRequest {
            price: 400,
            ..request(user, "Yandex Plus", "2025-05", None)
        })
        .await
        .unwrap();
        svc.create(CreateSubscriptionRequest {
            price: 250,
            ..request(user, "Netflix", "06-2025", Some("07-2025"))
        })
        .await
        .unwrap();
        svc.create(CreateSubscriptionRequest {
            price: 1000,
            ..request(other, "Netflix", "01-2025", None)
        })
        .await
        .unwrap();

        let user_str = user.to_string();
        // yandex: Jul..Sep = 3 * 400, netflix: Jul = 250
        assert_eq!(
            svc.total_cost("07-2025", "09-2025", Some(&user_str), None)
                .await
                .unwrap(),
            1450
        );
        assert_eq!(
            svc.total_cost("07-2025", "09-2025", None, Some("netflix"))
                .await
                .unwrap(),
            250 + 3 * 1000
        );
    }

    #[actix_web::test]
    async fn total_cost_validates_the_window() {
        let (svc, _) = service();
        for (from, to, message) in [
            ("bad", "09-2025", "from must be MM-YYYY or YYYY-MM"),
            ("07-2025", "", "to must be MM-YYYY or YYYY-MM"),
            ("09-2025", "07-2025", "to must be >= from"),
        ] {
            match svc.total_cost(from, to, None, None).await {
                Err(AppError::BadRequest(msg)) => assert_eq!(msg, message),
                other => panic!("expected validation error {message:?}, got {other:?}"),
            }
        }
        assert!(matches!(
            svc.total_cost("07-2025", "09-2025", Some("x"), None)
                .await
                .unwrap_err(),
            AppError::BadRequest(_)
        ));
    }

    #[test]
    fn prorated_cost_is_zero_for_disjoint_periods() {
        let sub = Subscription {
            id: Uuid::new_v4(),
            service_name: "Netflix".into(),
            price: 100,
            user_id: Uuid::new_v4(),
            start_date: month(2025, 10),
            end_date: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        assert_eq!(prorated_cost(&sub, month(2025, 7), month(2025, 9)), 0);
        assert_eq!(prorated_cost(&sub, month(2025, 11), month(2026, 2)), 400);
    }

    struct FailingStore;

    #[async_trait]
    impl SubscriptionStore for FailingStore {
        async fn create(&self, _: &Subscription) -> Res<Subscription> {
            Err(AppError::Internal("create failed".into()))
        }
        async fn find_by_id(&self, _: Uuid) -> Res<Option<Subscription>> {
            Err(AppError::Internal("lookup failed".into()))
        }
        async fn list(&self, _: &ListFilters) -> Res<Vec<Subscription>> {
            Err(AppError::Internal("list failed".into()))
        }
        async fn delete(&self, _: Uuid) -> Res<u64> {
            Err(AppError::Internal("delete failed".into()))
        }
        async fn update(&self, _: Uuid, _: &SubscriptionPatch) -> Res<Option<Subscription>> {
            Err(AppError::Internal("update failed".into()))
        }
        async fn find_active_in_period(
            &self,
            _: NaiveDate,
            _: NaiveDate,
            _: &SubscriptionFilter,
        ) -> Res<Vec<Subscription>> {
            Err(AppError::Internal("period query failed".into()))
        }
        async fn exists_overlap(
            &self,
            _: Uuid,
            _: &str,
            _: NaiveDate,
            _: Option<NaiveDate>,
            _: Option<Uuid>,
        ) -> Res<bool> {
            Err(AppError::Internal("overlap query failed".into()))
        }
    }

    #[actix_web::test]
    async fn storage_errors_propagate_unchanged() {
        let svc = SubscriptionService::new(Arc::new(FailingStore));
        let id = Uuid::new_v4().to_string();

        let err = svc
            .create(request(Uuid::new_v4(), "Netflix", "07-2025", None))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "overlap query failed");
        assert_eq!(svc.get_by_id(&id).await.unwrap_err().to_string(), "lookup failed");
        assert_eq!(svc.delete(&id).await.unwrap_err().to_string(), "delete failed");
        assert_eq!(
            svc.total_cost("07-2025", "09-2025", None, None)
                .await
                .unwrap_err()
                .to_string(),
            "period query failed"
        );
    }
}
