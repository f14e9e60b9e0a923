//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::analytics::{Activity, IdentityQueryInput, Overview};
use crate::domain::entity::identity::Identity;
use crate::domain::repository::{DailyCount, IdentityPage};
use crate::domain::value_object::identity_query::IdentityQuery;

/// `{ success: true, data }` envelope used by the JSON APIs
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

// ============================================================================
// Session
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
}

impl From<&Identity> for UserSummary {
    fn from(identity: &Identity) -> Self {
        Self {
            name: identity.display_name.clone(),
            email: identity.email.to_string(),
            picture: identity.picture.clone(),
        }
    }
}

/// GET /auth/check. `user` is `null` when signed out.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResponse {
    pub authenticated: bool,
    pub user: Option<UserSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    pub id: String,
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
}

impl From<&Identity> for UserDetail {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.identity_id.to_string(),
            name: identity.display_name.clone(),
            email: identity.email.to_string(),
            picture: identity.picture.clone(),
        }
    }
}

/// GET /auth/user. `user` is omitted when signed out.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Query string the provider sends back to the callback
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set when the user cancelled at the provider
    pub error: Option<String>,
}

// ============================================================================
// Analytics
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    pub total_users: u64,
    pub new_users_this_week: u64,
    pub active_today: u64,
    pub active_this_week: u64,
    pub registration_trend: Vec<DailyCount>,
}

impl From<Overview> for OverviewResponse {
    fn from(o: Overview) -> Self {
        Self {
            total_users: o.total_users,
            new_users_this_week: o.new_users_this_week,
            active_today: o.active_today,
            active_this_week: o.active_this_week,
            registration_trend: o.registration_trend,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub search: Option<String>,
}

impl From<UsersQuery> for IdentityQueryInput {
    fn from(q: UsersQuery) -> Self {
        Self {
            page: q.page,
            limit: q.limit,
            sort_by: q.sort_by,
            order: q.order,
            search: q.search,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

impl From<Identity> for IdentityDto {
    fn from(i: Identity) -> Self {
        Self {
            id: i.identity_id.to_string(),
            name: i.display_name,
            email: i.email.to_string(),
            picture: i.picture,
            created_at: i.created_at,
            last_login: i.last_login_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_users: u64,
    pub users_per_page: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsersResponse {
    pub users: Vec<IdentityDto>,
    pub pagination: Pagination,
}

impl UsersResponse {
    pub fn new(page: IdentityPage, query: &IdentityQuery) -> Self {
        let limit = u64::from(query.limit.max(1));
        Self {
            pagination: Pagination {
                current_page: query.page,
                total_pages: page.total.div_ceil(limit),
                total_users: page.total,
                users_per_page: query.limit,
            },
            users: page.items.into_iter().map(IdentityDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityCounts {
    pub today: u64,
    pub this_week: u64,
    pub this_month: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentLogin {
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
    pub last_login: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    pub activity: ActivityCounts,
    pub recent_logins: Vec<RecentLogin>,
}

impl From<Activity> for ActivityResponse {
    fn from(a: Activity) -> Self {
        Self {
            activity: ActivityCounts {
                today: a.today,
                this_week: a.this_week,
                this_month: a.this_month,
            },
            recent_logins: a
                .recent_logins
                .into_iter()
                .map(|i| RecentLogin {
                    name: i.display_name,
                    email: i.email.to_string(),
                    picture: i.picture,
                    last_login: i.last_login_at,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        let page = IdentityPage {
            items: vec![],
            total: 41,
        };
        let response = UsersResponse::new(page, &IdentityQuery::default());
        assert_eq!(response.pagination.total_pages, 3);
        assert_eq!(response.pagination.users_per_page, 20);
    }

    #[test]
    fn test_signed_out_shapes() {
        let check = serde_json::to_value(CheckResponse {
            authenticated: false,
            user: None,
        })
        .unwrap();
        assert_eq!(check, serde_json::json!({ "authenticated": false, "user": null }));

        let user = serde_json::to_value(UserResponse {
            authenticated: false,
            user: None,
        })
        .unwrap();
        assert_eq!(user, serde_json::json!({ "authenticated": false }));
    }
}
