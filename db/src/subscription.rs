use chrono::NaiveDate;
use common::{
    error::{AppError, Res},
    period::open_end,
};
use sqlx::{Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    dtos::subscription::{ListFilters, SubscriptionFilter, SubscriptionPatch, like_pattern},
    models::subscription::Subscription,
};

const EXCLUSION_VIOLATION: &str = "23P01";

pub async fn insert_subscription<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: &Subscription,
) -> Res<Subscription> {
    sqlx::query_as::<_, Subscription>(
        r#"
        INSERT INTO subscriptions (id, service_name, price, user_id, start_date, end_date)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(data.id)
    .bind(&data.service_name)
    .bind(data.price)
    .bind(data.user_id)
    .bind(data.start_date)
    .bind(data.end_date)
    .fetch_one(executor)
    .await
    .map_err(map_write_error)
}

pub async fn get_subscription_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    id: Uuid,
) -> Res<Option<Subscription>> {
    sqlx::query_as::<_, Subscription>("SELECT * FROM subscriptions WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn list_subscriptions<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    filters: &ListFilters,
) -> Res<Vec<Subscription>> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM subscriptions WHERE TRUE");
    push_filter(&mut qb, &filters.filter);

    qb.push(" ORDER BY start_date DESC, created_at DESC");
    qb.push(" LIMIT ").push_bind(filters.limit);
    qb.push(" OFFSET ").push_bind(filters.offset);

    qb.build_query_as::<Subscription>()
        .fetch_all(executor)
        .await
        .map_err(AppError::from)
}

/// Returns the number of deleted rows.
pub async fn delete_subscription<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    id: Uuid,
) -> Res<u64> {
    let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await
        .map_err(AppError::from)?;

    Ok(result.rows_affected())
}

/// Writes only the fields present in `patch`. `None` means no such row.
pub async fn update_subscription<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    id: Uuid,
    patch: &SubscriptionPatch,
) -> Res<Option<Subscription>> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE subscriptions SET ");
    let mut set = qb.separated(", ");

    if let Some(service_name) = &patch.service_name {
        set.push("service_name = ").push_bind_unseparated(service_name.clone());
    }
    if let Some(price) = patch.price {
        set.push("price = ").push_bind_unseparated(price);
    }
    if let Some(start_date) = patch.start_date {
        set.push("start_date = ").push_bind_unseparated(start_date);
    }
    if let Some(end_date) = patch.end_date {
        set.push("end_date = ").push_bind_unseparated(end_date);
    }
    set.push("updated_at = NOW()");

    qb.push(" WHERE id = ").push_bind(id);
    qb.push(" RETURNING *");

    qb.build_query_as::<Subscription>()
        .fetch_optional(executor)
        .await
        .map_err(map_write_error)
}

/// Subscriptions whose interval intersects `[from, to]`.
pub async fn get_active_in_period<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    from: NaiveDate,
    to: NaiveDate,
    filter: &SubscriptionFilter,
) -> Res<Vec<Subscription>> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM subscriptions WHERE TRUE");
    push_filter(&mut qb, filter);

    qb.push(" AND start_date <= ").push_bind(to);
    qb.push(" AND (end_date IS NULL OR end_date >= ").push_bind(from).push(")");

    qb.build_query_as::<Subscription>()
        .fetch_all(executor)
        .await
        .map_err(AppError::from)
}

pub async fn exists_overlap<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    service_name: &str,
    start: NaiveDate,
    end: Option<NaiveDate>,
    exclude_id: Option<Uuid>,
) -> Res<bool> {
    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT EXISTS (SELECT 1 FROM subscriptions WHERE user_id = ");
    qb.push_bind(user_id);
    qb.push(" AND lower(service_name) = lower(")
        .push_bind(service_name.to_string())
        .push(")");
    qb.push(" AND start_date <= ").push_bind(end.unwrap_or_else(open_end));
    qb.push(" AND (end_date IS NULL OR end_date >= ").push_bind(start).push(")");

    if let Some(exclude_id) = exclude_id {
        qb.push(" AND id <> ").push_bind(exclude_id);
    }
    qb.push(")");

    qb.build_query_scalar::<bool>()
        .fetch_one(executor)
        .await
        .map_err(AppError::from)
}

fn push_filter(qb: &mut QueryBuilder<Postgres>, filter: &SubscriptionFilter) {
    if let Some(user_id) = filter.user_id {
        qb.push(" AND user_id = ").push_bind(user_id);
    }

    if let Some(service_name) = &filter.service_name {
        qb.push(" AND service_name ILIKE ")
            .push_bind(like_pattern(service_name));
    }
}

// 23P01 is raised by the subscriptions_no_overlap constraint.
fn map_write_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(EXCLUSION_VIOLATION) {
            return AppError::Conflict(
                "another write claimed this service and period".to_string(),
            );
        }
    }
    AppError::from(err)
}
