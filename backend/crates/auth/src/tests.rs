//! Router-level tests over the in-memory repository and a scripted provider

#[cfg(test)]
mod http_tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use axum::routing::get;
    use axum::{Extension, Router, middleware};
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    use crate::application::config::AuthConfig;
    use crate::application::session_store::SessionStore;
    use crate::domain::entity::identity::Identity;
    use crate::domain::provider::IdentityProvider;
    use crate::domain::repository::IdentityRepository;
    use crate::domain::value_object::{email::Email, provider_profile::ProviderProfile};
    use crate::error::{AuthError, AuthResult};
    use crate::infra::memory::MemoryAuthRepository;
    use crate::presentation::middleware::{CurrentIdentity, GateState, require_session};
    use crate::presentation::router::{analytics_router, auth_router};

    /// Provider that answers known codes with fixed profiles
    struct ScriptedProvider {
        profiles: HashMap<&'static str, ProviderProfile>,
    }

    impl IdentityProvider for ScriptedProvider {
        fn authorize_url(&self, state: &str) -> AuthResult<String> {
            Ok(format!("https://idp.test/authorize?state={state}"))
        }

        async fn exchange_code(&self, code: &str) -> AuthResult<ProviderProfile> {
            if code == "stale" {
                return Err(AuthError::CodeRejected("400 Bad Request".into()));
            }
            self.profiles
                .get(code)
                .cloned()
                .ok_or_else(|| AuthError::ProviderUnavailable("connection reset".into()))
        }
    }

    fn profile(subject: &str, email: &str) -> ProviderProfile {
        ProviderProfile {
            subject_id: subject.into(),
            email: email.into(),
            display_name: "Meera".into(),
            picture: Some("https://example.com/m.png".into()),
            email_verified: true,
        }
    }

    struct TestApp {
        router: Router,
        repo: Arc<MemoryAuthRepository>,
        config: Arc<AuthConfig>,
    }

    fn test_app() -> TestApp {
        test_app_with(AuthConfig::development())
    }

    fn test_app_with(config: AuthConfig) -> TestApp {
        let repo = Arc::new(MemoryAuthRepository::new());
        let config = Arc::new(config);
        let unverified = ProviderProfile {
            email_verified: false,
            ..profile("sub-unverified", "imposter@bmsce.ac.in")
        };
        let provider = Arc::new(ScriptedProvider {
            profiles: HashMap::from([
                ("member", profile("sub-member", "meera@bmsce.ac.in")),
                ("outsider", profile("sub-outsider", "meera@gmail.com")),
                ("unverified", unverified),
            ]),
        });

        let gate = GateState::new(repo.clone(), config.clone());
        let protected = Router::new()
            .route(
                "/api/protected",
                get(|Extension(CurrentIdentity(identity)): Extension<CurrentIdentity>| async move {
                    identity.email.to_string()
                }),
            )
            .route_layer(middleware::from_fn_with_state(
                gate.clone(),
                require_session::<MemoryAuthRepository>,
            ));

        let router = Router::new()
            .nest("/auth", auth_router(repo.clone(), provider, config.clone()))
            .nest("/api/analytics", analytics_router(repo.clone(), gate))
            .merge(protected);

        TestApp {
            router,
            repo,
            config,
        }
    }

    impl TestApp {
        async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
            let mut req = Request::get(uri);
            if let Some(cookie) = cookie {
                req = req.header(header::COOKIE, cookie);
            }
            self.router
                .clone()
                .oneshot(req.body(Body::empty()).unwrap())
                .await
                .unwrap()
        }

        async fn callback(&self, code: &str) -> Response {
            self.get(
                &format!("/auth/google/callback?code={code}&state=s1"),
                Some("oauth_state=s1"),
            )
            .await
        }

        /// Full login; returns the `sessionId=...` cookie pair
        async fn sign_in(&self, code: &str) -> String {
            let res = self.callback(code).await;
            let token = session_token(&res).expect("session cookie");
            format!("sessionId={token}")
        }
    }

    fn set_cookies(res: &Response) -> Vec<String> {
        res.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok().map(str::to_string))
            .collect()
    }

    fn session_token(res: &Response) -> Option<String> {
        set_cookies(res).iter().find_map(|c| {
            let token = c.strip_prefix("sessionId=")?.split(';').next()?;
            (!token.is_empty()).then(|| token.to_string())
        })
    }

    fn location(res: &Response) -> &str {
        res.headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    async fn json(res: Response) -> serde_json::Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_login_redirects_with_state_cookie() {
        let app = test_app();
        let res = app.get("/auth/google", None).await;

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let cookie = set_cookies(&res)
            .into_iter()
            .find(|c| c.starts_with("oauth_state="))
            .unwrap();
        let state = cookie
            .trim_start_matches("oauth_state=")
            .split(';')
            .next()
            .unwrap()
            .to_string();
        assert!(!state.is_empty());
        assert_eq!(location(&res), format!("https://idp.test/authorize?state={state}"));
    }

    #[tokio::test]
    async fn test_member_login_sets_session_and_check_reports_user() {
        let app = test_app();
        let res = app.callback("member").await;

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            location(&res),
            "http://localhost:8000/frontend/pages/index.html"
        );
        let cookies = set_cookies(&res);
        let session = cookies.iter().find(|c| c.starts_with("sessionId=")).unwrap();
        assert!(session.contains("HttpOnly"));
        assert!(session.contains("SameSite=Lax"));
        assert!(session.contains("Max-Age=86400"));

        let cookie = format!("sessionId={}", session_token(&res).unwrap());
        let body = json(app.get("/auth/check", Some(&cookie)).await).await;
        assert_eq!(body["authenticated"], true);
        assert_eq!(body["user"]["email"], "meera@bmsce.ac.in");
        assert_eq!(body["user"]["name"], "Meera");

        let body = json(app.get("/auth/user", Some(&cookie)).await).await;
        assert_eq!(body["authenticated"], true);
        assert!(body["user"]["id"].is_string());
    }

    #[tokio::test]
    async fn test_outsider_login_is_denied_without_session() {
        let app = test_app();
        let res = app.callback("outsider").await;

        assert_eq!(location(&res), "http://localhost:8000/login?error=access_denied");
        assert!(session_token(&res).is_none());
        assert_eq!(app.repo.count_identities().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unverified_email_login_is_denied_without_session() {
        let app = test_app();
        let res = app.callback("unverified").await;

        assert_eq!(location(&res), "http://localhost:8000/login?error=access_denied");
        assert!(session_token(&res).is_none());
        assert_eq!(app.repo.count_identities().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rejected_code_is_access_denied_not_outage() {
        let app = test_app();
        let res = app.callback("stale").await;
        assert_eq!(location(&res), "http://localhost:8000/login?error=access_denied");
        assert!(session_token(&res).is_none());
    }

    #[tokio::test]
    async fn test_login_cookie_respects_max_lifetime() {
        let app = test_app_with(AuthConfig {
            session_max_lifetime: Some(Duration::from_secs(3600)),
            ..AuthConfig::development()
        });
        let res = app.callback("member").await;

        let cookies = set_cookies(&res);
        let session = cookies.iter().find(|c| c.starts_with("sessionId=")).unwrap();
        assert!(session.contains("Max-Age=3600"), "{session}");
    }

    #[tokio::test]
    async fn test_check_and_user_reissue_rolled_cookie() {
        let app = test_app();
        let cookie = app.sign_in("member").await;

        for uri in ["/auth/check", "/auth/user"] {
            let res = app.get(uri, Some(&cookie)).await;
            assert_eq!(res.status(), StatusCode::OK);
            let cookies = set_cookies(&res);
            let rolled = cookies
                .iter()
                .find(|c| c.starts_with("sessionId="))
                .unwrap_or_else(|| panic!("{uri} should re-issue the session cookie"));
            assert!(rolled.contains("Max-Age=86400"), "{rolled}");
            assert_eq!(format!("sessionId={}", session_token(&res).unwrap()), cookie);
        }

        // Anonymous checks set nothing
        let res = app.get("/auth/check", None).await;
        assert!(session_token(&res).is_none());
    }

    #[tokio::test]
    async fn test_provider_failure_is_distinct_from_denial() {
        let app = test_app();
        let res = app.callback("unknown-code").await;
        assert_eq!(
            location(&res),
            "http://localhost:8000/login?error=provider_unavailable"
        );
    }

    #[tokio::test]
    async fn test_state_mismatch_is_rejected() {
        let app = test_app();
        let res = app
            .get(
                "/auth/google/callback?code=member&state=forged",
                Some("oauth_state=s1"),
            )
            .await;
        assert_eq!(location(&res), "http://localhost:8000/login?error=invalid_state");
        assert!(session_token(&res).is_none());

        let res = app
            .get("/auth/google/callback?code=member&state=s1", None)
            .await;
        assert_eq!(location(&res), "http://localhost:8000/login?error=invalid_state");
    }

    #[tokio::test]
    async fn test_failed_logins_then_no_cookie_is_login_required() {
        let app = test_app();
        for _ in 0..3 {
            let res = app.callback("outsider").await;
            assert!(location(&res).ends_with("error=access_denied"));
        }

        let res = app.get("/api/protected", None).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.headers().get("X-Auth-Required").unwrap(), "true");
        let body = json(res).await;
        assert_eq!(body["code"], "LOGIN_REQUIRED");
    }

    #[tokio::test]
    async fn test_protected_route_sees_identity_and_rolls_cookie() {
        let app = test_app();
        let cookie = app.sign_in("member").await;

        let res = app.get("/api/protected", Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(session_token(&res).is_some());

        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"meera@bmsce.ac.in");
    }

    #[tokio::test]
    async fn test_tampered_cookie_is_login_required() {
        let app = test_app();
        let cookie = app.sign_in("member").await;
        let tampered = format!("{}x", cookie);

        let res = app.get("/api/protected", Some(&tampered)).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_invalidates_session() {
        let app = test_app();
        let cookie = app.sign_in("member").await;

        let res = app
            .router
            .clone()
            .oneshot(
                Request::post("/auth/logout")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(
            set_cookies(&res)
                .iter()
                .any(|c| c.starts_with("sessionId=;") && c.contains("Max-Age=0"))
        );
        assert_eq!(json(res).await["message"], "Logged out successfully");

        let body = json(app.get("/auth/check", Some(&cookie)).await).await;
        assert_eq!(body["authenticated"], false);
        assert!(body["user"].is_null());

        let res = app.get("/api/protected", Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_analytics_requires_member() {
        let app = test_app();

        let res = app.get("/api/analytics/overview", None).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        // An identity left over from before the allowed domain was tightened
        let legacy = profile("sub-legacy", "old@alumni.example.org");
        let identity = Identity::new(&legacy, Email::new(&legacy.email).unwrap(), Utc::now());
        app.repo.create_identity(&identity).await.unwrap();
        let issued = SessionStore::new(app.repo.clone(), app.config.clone())
            .create(&identity)
            .await
            .unwrap();
        let legacy_cookie = format!("sessionId={}", issued.token);

        // Still signed in as far as the plain gate is concerned
        let res = app.get("/api/protected", Some(&legacy_cookie)).await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = app.get("/api/analytics/overview", Some(&legacy_cookie)).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(json(res).await["code"], "DOMAIN_FORBIDDEN");

        let cookie = app.sign_in("member").await;
        let res = app.get("/api/analytics/overview", Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = json(res).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["totalUsers"], 2);
        assert_eq!(body["data"]["activeToday"], 2);
        assert_eq!(body["data"]["newUsersThisWeek"], 2);
    }

    #[tokio::test]
    async fn test_analytics_users_validates_and_pages() {
        let app = test_app();
        let cookie = app.sign_in("member").await;

        let res = app
            .get("/api/analytics/users?sortBy=password", Some(&cookie))
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = json(res).await;
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert_eq!(body["errors"][0]["field"], "sortBy");

        let res = app
            .get(
                "/api/analytics/users?page=1&limit=5&sortBy=name&order=asc&search=MEERA",
                Some(&cookie),
            )
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = json(res).await;
        assert_eq!(body["data"]["users"][0]["email"], "meera@bmsce.ac.in");
        assert_eq!(body["data"]["pagination"]["totalUsers"], 1);
        assert_eq!(body["data"]["pagination"]["totalPages"], 1);
        assert_eq!(body["data"]["pagination"]["usersPerPage"], 5);
    }

    #[tokio::test]
    async fn test_analytics_activity_shape() {
        let app = test_app();
        let cookie = app.sign_in("member").await;

        let body = json(app.get("/api/analytics/activity", Some(&cookie)).await).await;
        assert_eq!(body["data"]["activity"]["today"], 1);
        assert_eq!(body["data"]["recentLogins"][0]["name"], "Meera");
    }
}
