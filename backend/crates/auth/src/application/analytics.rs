//! User Analytics
//!
//! Read-only aggregates over identities. Day boundaries are UTC.

use chrono::{DateTime, Duration, Months, Utc};
use kernel::error::field::{FieldError, FieldErrors};
use std::sync::Arc;

use crate::domain::entity::identity::Identity;
use crate::domain::repository::{DailyCount, IdentityPage, IdentityRepository};
use crate::domain::value_object::identity_query::{IdentityQuery, IdentitySort, SortOrder};
use crate::error::{AuthError, AuthResult};

/// Trend window for the overview
const TREND_DAYS: i64 = 30;
const RECENT_LOGINS: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub total_users: u64,
    pub new_users_this_week: u64,
    pub active_today: u64,
    pub active_this_week: u64,
    pub registration_trend: Vec<DailyCount>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub today: u64,
    pub this_week: u64,
    pub this_month: u64,
    pub recent_logins: Vec<Identity>,
}

/// Raw listing parameters as they arrive on the query string
#[derive(Debug, Clone, Default)]
pub struct IdentityQueryInput {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub search: Option<String>,
}

impl IdentityQueryInput {
    pub fn validate(self) -> Result<IdentityQuery, Vec<FieldError>> {
        let mut errors = FieldErrors::new();
        let defaults = IdentityQuery::default();

        let page = parse_positive(&mut errors, "page", self.page, defaults.page, u32::MAX);
        let limit = parse_positive(
            &mut errors,
            "limit",
            self.limit,
            defaults.limit,
            IdentityQuery::MAX_LIMIT,
        );

        let sort_by = match self.sort_by.as_deref().map(str::trim) {
            None | Some("") => defaults.sort_by,
            Some("name") => IdentitySort::Name,
            Some("email") => IdentitySort::Email,
            Some("createdAt") => IdentitySort::CreatedAt,
            Some("lastLogin") => IdentitySort::LastLogin,
            Some(_) => {
                errors.push(FieldError::new(
                    "sortBy",
                    "sortBy must be one of name, email, createdAt, lastLogin",
                ));
                defaults.sort_by
            }
        };

        let order = match self.order.as_deref().map(str::trim) {
            None | Some("") => defaults.order,
            Some("asc") => SortOrder::Asc,
            Some("desc") => SortOrder::Desc,
            Some(_) => {
                errors.push(FieldError::new("order", "order must be asc or desc"));
                defaults.order
            }
        };

        let search = self
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        errors.finish(IdentityQuery {
            page,
            limit,
            sort_by,
            order,
            search,
        })
    }
}

fn parse_positive(
    errors: &mut FieldErrors,
    field: &str,
    raw: Option<String>,
    default: u32,
    max: u32,
) -> u32 {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return default;
    };
    match raw.trim().parse::<u32>() {
        Ok(n) if (1..=max).contains(&n) => n,
        _ => {
            errors.push(FieldError::new(
                field,
                format!("{} must be an integer between 1 and {}", field, max),
            ));
            default
        }
    }
}

pub struct AnalyticsUseCase<R>
where
    R: IdentityRepository,
{
    repo: Arc<R>,
}

impl<R> AnalyticsUseCase<R>
where
    R: IdentityRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn overview(&self, now: DateTime<Utc>) -> AuthResult<Overview> {
        let week_ago = now - Duration::days(7);

        Ok(Overview {
            total_users: self.repo.count_identities().await?,
            new_users_this_week: self.repo.count_created_since(week_ago).await?,
            active_today: self.repo.count_logged_in_since(start_of_day(now)).await?,
            active_this_week: self.repo.count_logged_in_since(week_ago).await?,
            registration_trend: self
                .repo
                .registration_trend(now - Duration::days(TREND_DAYS))
                .await?,
        })
    }

    pub async fn activity(&self, now: DateTime<Utc>) -> AuthResult<Activity> {
        let today = start_of_day(now);
        let month_ago = today
            .checked_sub_months(Months::new(1))
            .ok_or_else(|| AuthError::Internal("date out of range".into()))?;

        Ok(Activity {
            today: self.repo.count_logged_in_since(today).await?,
            this_week: self.repo.count_logged_in_since(today - Duration::days(7)).await?,
            this_month: self.repo.count_logged_in_since(month_ago).await?,
            recent_logins: self.repo.recent_logins(RECENT_LOGINS).await?,
        })
    }

    pub async fn users(&self, query: &IdentityQuery) -> AuthResult<IdentityPage> {
        self.repo.list_identities(query).await
    }
}

/// Midnight UTC of the day containing `now`
fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now)
}
