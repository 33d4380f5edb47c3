use chrono::NaiveDate;
use uuid::Uuid;

/// Row filters shared by listing and cost aggregation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionFilter {
    pub user_id: Option<Uuid>,
    /// Case-insensitive substring of the service name.
    pub service_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListFilters {
    pub filter: SubscriptionFilter,
    pub limit: i64,
    pub offset: i64,
}

/// Fields to change on an existing subscription; `None` leaves a column alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionPatch {
    pub service_name: Option<String>,
    pub price: Option<i32>,
    pub start_date: Option<NaiveDate>,
    /// `Some(None)` clears the end date.
    pub end_date: Option<Option<NaiveDate>>,
}

impl SubscriptionPatch {
    pub fn is_empty(&self) -> bool {
        self.service_name.is_none()
            && self.price.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}

/// Escapes LIKE wildcards and wraps the needle for a substring match.
pub fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
