//! HTTP Handlers

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use chrono::Utc;
use std::sync::Arc;

use platform::cookie::{delete_cookie_header, set_cookie_header};

use crate::application::access_gate::GateDecision;
use crate::application::analytics::{AnalyticsUseCase, IdentityQueryInput};
use crate::application::config::AuthConfig;
use crate::application::federated_login::{FederatedLoginUseCase, LoginOutcome};
use crate::application::session_store::SessionStore;
use crate::domain::entity::identity::Identity;
use crate::domain::provider::IdentityProvider;
use crate::domain::repository::AuthStore;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    ActivityResponse, ApiResponse, CallbackQuery, CheckResponse, LogoutResponse,
    OverviewResponse, UserDetail, UserResponse, UserSummary, UsersQuery, UsersResponse,
};
use crate::presentation::middleware::{GateState, session_cookie_header};

/// Shared state for auth handlers
pub struct AuthAppState<R, P>
where
    R: AuthStore,
    P: IdentityProvider + Sync + 'static,
{
    pub repo: Arc<R>,
    pub provider: Arc<P>,
    pub config: Arc<AuthConfig>,
    pub gate: GateState<R>,
}

impl<R, P> Clone for AuthAppState<R, P>
where
    R: AuthStore,
    P: IdentityProvider + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            provider: self.provider.clone(),
            config: self.config.clone(),
            gate: self.gate.clone(),
        }
    }
}

impl<R, P> AuthAppState<R, P>
where
    R: AuthStore,
    P: IdentityProvider + Sync + 'static,
{
    fn login_use_case(&self) -> FederatedLoginUseCase<R, P> {
        FederatedLoginUseCase::new(
            self.repo.clone(),
            self.provider.clone(),
            self.config.clone(),
        )
    }

    /// Identity behind the request's credential, refreshing the session.
    /// With rolling sessions the refreshed cookie comes back alongside.
    async fn current_identity(
        &self,
        headers: &HeaderMap,
    ) -> AuthResult<(Option<Identity>, Option<HeaderValue>)> {
        let Some(token) = self.gate.extractor.extract(headers) else {
            return Ok((None, None));
        };
        match self.gate.gate.authorize(Some(token.as_str())).await? {
            GateDecision::Allow(principal) => {
                let cookie = self
                    .config
                    .rolling_sessions
                    .then(|| session_cookie_header(&self.config, &token, &principal.session));
                Ok((Some(principal.identity), cookie))
            }
            GateDecision::Deny(_) => Ok((None, None)),
        }
    }
}

/// JSON body plus an optional refreshed session cookie
fn with_session_cookie<T: serde::Serialize>(body: T, cookie: Option<HeaderValue>) -> Response {
    let mut response = Json(body).into_response();
    if let Some(cookie) = cookie {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}

// ============================================================================
// Federated Login
// ============================================================================

/// GET /auth/google
pub async fn google_login<R, P>(State(state): State<AuthAppState<R, P>>) -> AuthResult<Response>
where
    R: AuthStore,
    P: IdentityProvider + Sync + 'static,
{
    let start = state.login_use_case().begin()?;
    let cookie = set_cookie_header(&state.config.state_cookie(), &start.state);

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Redirect::to(&start.authorize_url),
    )
        .into_response())
}

/// GET /auth/google/callback
///
/// Always answers with a redirect: the browser is mid-navigation, so errors
/// become `?error=` on the login page instead of a JSON body.
pub async fn google_callback<R, P>(
    State(state): State<AuthAppState<R, P>>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Response
where
    R: AuthStore,
    P: IdentityProvider + Sync + 'static,
{
    let config = &state.config;
    let clear_state = delete_cookie_header(&config.state_cookie());
    let fail = |reason: &str| {
        (
            AppendHeaders([(header::SET_COOKIE, clear_state.clone())]),
            Redirect::to(&config.login_error_url(reason)),
        )
            .into_response()
    };

    if let Some(error) = &query.error {
        tracing::info!(provider_error = %error, "Login cancelled at provider");
        return fail("access_denied");
    }
    let Some(code) = query.code.as_deref().filter(|c| !c.is_empty()) else {
        return fail("access_denied");
    };

    let expected_state = platform::cookie::extract_cookie(&headers, &config.state_cookie_name);
    let outcome = state
        .login_use_case()
        .complete(
            code,
            query.state.as_deref().unwrap_or_default(),
            expected_state.as_deref(),
        )
        .await;

    match outcome {
        Ok(LoginOutcome::SignedIn { identity, session }) => {
            tracing::info!(identity_id = %identity.identity_id, "Login succeeded");
            let session_cookie = session_cookie_header(config, &session.token, &session.session);
            (
                AppendHeaders([
                    (header::SET_COOKIE, session_cookie),
                    (header::SET_COOKIE, clear_state.clone()),
                ]),
                Redirect::to(&config.post_login_url()),
            )
                .into_response()
        }
        Ok(LoginOutcome::Denied(denial)) => {
            tracing::info!(?denial, "Login denied");
            fail("access_denied")
        }
        Err(e) => {
            e.log();
            match e {
                AuthError::InvalidOAuthState => fail("invalid_state"),
                AuthError::CodeRejected(_) => fail("access_denied"),
                AuthError::ProviderUnavailable(_) => fail("provider_unavailable"),
                _ => fail("server_error"),
            }
        }
    }
}

// ============================================================================
// Session Status
// ============================================================================

/// GET /auth/check
pub async fn check_session<R, P>(
    State(state): State<AuthAppState<R, P>>,
    headers: HeaderMap,
) -> AuthResult<Response>
where
    R: AuthStore,
    P: IdentityProvider + Sync + 'static,
{
    let (identity, cookie) = state.current_identity(&headers).await?;

    let body = CheckResponse {
        authenticated: identity.is_some(),
        user: identity.as_ref().map(UserSummary::from),
    };
    Ok(with_session_cookie(body, cookie))
}

/// GET /auth/user
pub async fn current_user<R, P>(
    State(state): State<AuthAppState<R, P>>,
    headers: HeaderMap,
) -> AuthResult<Response>
where
    R: AuthStore,
    P: IdentityProvider + Sync + 'static,
{
    let (identity, cookie) = state.current_identity(&headers).await?;

    let body = UserResponse {
        authenticated: identity.is_some(),
        user: identity.as_ref().map(UserDetail::from),
    };
    Ok(with_session_cookie(body, cookie))
}

// ============================================================================
// Logout
// ============================================================================

/// GET|POST /auth/logout
pub async fn logout<R, P>(
    State(state): State<AuthAppState<R, P>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    P: IdentityProvider + Sync + 'static,
{
    if let Some(token) = state.gate.extractor.extract(&headers) {
        SessionStore::new(state.repo.clone(), state.config.clone())
            .invalidate(&token)
            .await?;
    }

    let cookie = delete_cookie_header(&state.config.session_cookie());

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LogoutResponse {
            message: "Logged out successfully".to_string(),
        }),
    ))
}

// ============================================================================
// Analytics (member-only)
// ============================================================================

/// Shared state for analytics handlers
pub struct AnalyticsState<R>
where
    R: AuthStore,
{
    pub repo: Arc<R>,
}

impl<R> Clone for AnalyticsState<R>
where
    R: AuthStore,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
        }
    }
}

/// GET /api/analytics/overview
pub async fn analytics_overview<R>(
    State(state): State<AnalyticsState<R>>,
) -> AuthResult<Json<ApiResponse<OverviewResponse>>>
where
    R: AuthStore,
{
    let overview = AnalyticsUseCase::new(state.repo.clone())
        .overview(Utc::now())
        .await?;
    Ok(Json(ApiResponse::ok(overview.into())))
}

/// GET /api/analytics/users
pub async fn analytics_users<R>(
    State(state): State<AnalyticsState<R>>,
    Query(params): Query<UsersQuery>,
) -> AuthResult<Json<ApiResponse<UsersResponse>>>
where
    R: AuthStore,
{
    let query = IdentityQueryInput::from(params)
        .validate()
        .map_err(AuthError::Validation)?;

    let page = AnalyticsUseCase::new(state.repo.clone())
        .users(&query)
        .await?;
    Ok(Json(ApiResponse::ok(UsersResponse::new(page, &query))))
}

/// GET /api/analytics/activity
pub async fn analytics_activity<R>(
    State(state): State<AnalyticsState<R>>,
) -> AuthResult<Json<ApiResponse<ActivityResponse>>>
where
    R: AuthStore,
{
    let activity = AnalyticsUseCase::new(state.repo.clone())
        .activity(Utc::now())
        .await?;
    Ok(Json(ApiResponse::ok(activity.into())))
}
