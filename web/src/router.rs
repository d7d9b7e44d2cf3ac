use crate::{
    controller::{
        api_controller, auth_status_controller, health_check_controller, profile_controller,
        session_policy_controller, system_controller, user_session_controller,
    },
    middleware::{auth::require_auth, security_headers::with_security_headers},
    AppState,
};
use axum::{middleware::from_fn_with_state, routing::get, Router};

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI document. To be a part
// of the rendered document, a path must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Portal Identity API"
        ),
        paths(
            api_controller::info,
            auth_status_controller::status,
            auth_status_controller::me,
            health_check_controller::health_check,
            profile_controller::read,
            session_policy_controller::read,
            system_controller::status,
            system_controller::system_info,
            user_session_controller::sign_in,
            user_session_controller::create_account,
            user_session_controller::sign_out,
        ),
        components(
            schemas(
                domain::AuthStatus,
                domain::Profile,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "portal_auth_rs", description = "Platform identity resolution for the portal")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// The hosting platform authenticates callers and forwards who they are in the
// client principal header; the session cookie is what `/.auth/me` is queried with.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "client_principal",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "x-ms-client-principal",
                    "Base64 JSON principal injected by the platform authentication proxy",
                ))),
            );
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "AppServiceAuthSession",
                    "Platform session cookie forwarded to the identity endpoint",
                ))),
            );
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    let app_routes = Router::new()
        .merge(api_info_routes(app_state.clone()))
        .merge(auth_status_routes(app_state.clone()))
        .merge(health_routes(app_state.clone()))
        .merge(profile_routes(app_state.clone()))
        .merge(session_policy_routes(app_state.clone()))
        .merge(system_routes(app_state.clone()))
        .merge(user_session_routes(app_state))
        .fallback(api_controller::not_found);

    // RapiDoc loads its viewer from a CDN, which the content security policy would block.
    with_security_headers(app_routes)
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn api_info_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/api", get(api_controller::info))
        .with_state(app_state)
}

fn auth_status_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/api/auth/status", get(auth_status_controller::status))
        .route("/api/auth/me", get(auth_status_controller::me))
        .with_state(app_state)
}

fn health_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check_controller::health_check))
        .with_state(app_state)
}

fn profile_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/api/profile", get(profile_controller::read))
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn session_policy_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/api/session/policy", get(session_policy_controller::read))
        .with_state(app_state)
}

fn system_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(system_controller::status))
        .route("/api/system/info", get(system_controller::system_info))
        .with_state(app_state)
}

fn user_session_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/signin", get(user_session_controller::sign_in))
        .route("/create-account", get(user_session_controller::create_account))
        .route("/signout", get(user_session_controller::sign_out))
        .with_state(app_state)
}

#[cfg(test)]
mod router_tests {
    use super::*;
    use crate::middleware::security_headers::CONTENT_SECURITY_POLICY_VALUE;
    use crate::test_support::{header_state, state};
    use axum::body::Body;
    use axum::http::{header::LOCATION, Request, StatusCode};
    use axum::response::Response;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use mockito::Server;
    use serde_json::{json, Value};
    use service::config::{Config, PrincipalSource};
    use tower::ServiceExt;

    const PRINCIPAL: &str = r#"{
        "identityProvider": "aad",
        "userId": "d75b260a64504067bfc5b2905e3b8182",
        "userDetails": "ada@example.com",
        "claims": [
            {"typ": "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress", "val": "ada@example.com"},
            {"typ": "given_name", "val": "Ada"}
        ]
    }"#;

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn principal_request(uri: &str, payload: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("x-ms-client-principal", STANDARD.encode(payload))
            .header("x-ms-client-principal-idp", "github")
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn endpoint_state(server: &Server) -> AppState {
        state(
            Config::from_env()
                .set_principal_source(PrincipalSource::Endpoint)
                .set_identity_endpoint_url(format!("{}/.auth/me", server.url())),
        )
    }

    #[tokio::test]
    async fn auth_status_without_principal_is_unauthenticated() {
        let app = define_routes(header_state());

        let response = app.oneshot(get_request("/api/auth/status")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"authenticated": false, "user": null})
        );
    }

    #[tokio::test]
    async fn auth_status_with_principal_returns_user() {
        let app = define_routes(header_state());

        let response = app
            .oneshot(principal_request("/api/auth/status", PRINCIPAL))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["authenticated"], true);
        assert_eq!(body["user"]["id"], "d75b260a64504067bfc5b2905e3b8182");
        assert_eq!(body["user"]["name"], "ada@example.com");
        assert_eq!(body["user"]["email"], "ada@example.com");
        assert_eq!(body["user"]["givenName"], "Ada");
        assert_eq!(body["user"]["identityProvider"], "github");
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn auth_me_matches_auth_status() {
        let app = define_routes(header_state());

        let status = app
            .clone()
            .oneshot(principal_request("/api/auth/status", PRINCIPAL))
            .await
            .unwrap();
        let me = app
            .oneshot(principal_request("/api/auth/me", PRINCIPAL))
            .await
            .unwrap();
        assert_eq!(json_body(status).await, json_body(me).await);
    }

    #[tokio::test]
    async fn auth_status_with_malformed_principal_is_bad_request() {
        let app = define_routes(header_state());
        let request = Request::builder()
            .uri("/api/auth/status")
            .header("x-ms-client-principal", "bm90IGpzb24=")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert_eq!(body["authenticated"], false);
        assert!(body["user"].is_null());
        assert_eq!(body["error"], "Malformed client principal");
    }

    #[tokio::test]
    async fn auth_status_propagates_identity_endpoint_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/.auth/me")
            .with_status(500)
            .create_async()
            .await;

        let request = Request::builder()
            .uri("/api/auth/status")
            .header("cookie", "AppServiceAuthSession=abc")
            .body(Body::empty())
            .unwrap();
        let response = define_routes(endpoint_state(&server))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["authenticated"], false);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn auth_status_with_expired_session_is_unauthenticated() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/.auth/me")
            .with_status(401)
            .create_async()
            .await;

        let request = Request::builder()
            .uri("/api/auth/status")
            .header("cookie", "AppServiceAuthSession=expired")
            .body(Body::empty())
            .unwrap();
        let response = define_routes(endpoint_state(&server))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"authenticated": false, "user": null})
        );
    }

    #[tokio::test]
    async fn profile_requires_authentication() {
        let app = define_routes(header_state());

        let response = app.oneshot(get_request("/api/profile")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            json_body(response).await,
            json!({"error": "Not authenticated", "authenticated": false})
        );
    }

    #[tokio::test]
    async fn profile_returns_profile_and_claims() {
        let app = define_routes(header_state());

        let response = app
            .oneshot(principal_request("/api/profile", PRINCIPAL))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["authenticated"], true);
        assert_eq!(body["identityProvider"], "github");
        assert_eq!(body["profile"]["email"], "ada@example.com");
        assert!(body["profile"]["surname"].is_null());
        assert_eq!(
            body["claims"][1],
            json!({"type": "given_name", "value": "Ada"})
        );
    }

    #[tokio::test]
    async fn profile_from_identity_endpoint() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/.auth/me")
            .match_header("cookie", "AppServiceAuthSession=abc")
            .with_status(200)
            .with_body(
                r#"[{"user_id":"ada@example.com","identity_provider":"aad","user_claims":[
                    {"typ":"preferred_username","val":"ada@example.com"},
                    {"typ":"tid","val":"tenant-1"}]}]"#,
            )
            .create_async()
            .await;

        let request = Request::builder()
            .uri("/api/profile")
            .header("cookie", "AppServiceAuthSession=abc")
            .body(Body::empty())
            .unwrap();
        let response = define_routes(endpoint_state(&server))
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["profile"]["id"], "ada@example.com");
        assert_eq!(body["profile"]["userPrincipalName"], "ada@example.com");
        assert_eq!(body["profile"]["tenantId"], "tenant-1");
        assert_eq!(body["identityProvider"], "aad");
    }

    #[tokio::test]
    async fn session_policy_reflects_config() {
        let mut config = Config::from_env();
        config.idle_warning_secs = 60;
        config.idle_logout_secs = 120;
        config.idle_countdown_secs = 10;

        let response = define_routes(state(config))
            .oneshot(get_request("/api/session/policy"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"warningAfterSeconds": 60, "logoutAfterSeconds": 120, "countdownSeconds": 10})
        );
    }

    #[tokio::test]
    async fn sign_in_and_out_redirect_to_platform() {
        let app = define_routes(header_state());
        let config = Config::from_env();

        for (uri, location) in [
            ("/signin", config.login_url()),
            ("/create-account", config.login_url()),
            ("/signout", config.logout_url()),
        ] {
            let response = app.clone().oneshot(get_request(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(response.headers()[LOCATION], location, "{uri}");
        }
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let response = define_routes(header_state())
            .oneshot(get_request("/health"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
        assert!(body["uptimeSeconds"].is_u64());
    }

    #[tokio::test]
    async fn api_info_lists_endpoints() {
        let response = define_routes(header_state())
            .oneshot(get_request("/api"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["endpoints"]["health"], "/health");
    }

    #[tokio::test]
    async fn unknown_api_route_is_json_404() {
        let app = define_routes(header_state());

        let response = app
            .clone()
            .oneshot(get_request("/api/does-not-exist"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(response).await,
            json!({"error": "API route not found", "path": "/api/does-not-exist"})
        );

        let response = app.oneshot(get_request("/nowhere")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn api_status_reports_running() {
        let response = define_routes(header_state())
            .oneshot(get_request("/api/status"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "running");
        assert_eq!(body["environment"], Config::from_env().runtime_env().to_string());
        assert!(body["timestamp"].is_string());
        assert!(body["platform"].is_string());
    }

    #[tokio::test]
    async fn system_info_reports_version_and_features() {
        let response = define_routes(header_state())
            .oneshot(get_request("/api/system/info"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["name"], "portal_auth_rs");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["uptime"].is_u64());
        assert!(body["features"]["authentication"]
            .as_str()
            .unwrap()
            .contains("header"));
        assert!(body["features"]["security"].is_string());
    }

    #[tokio::test]
    async fn responses_carry_security_headers() {
        let app = define_routes(header_state());

        for uri in ["/health", "/api/auth/status", "/api/does-not-exist"] {
            let response = app.clone().oneshot(get_request(uri)).await.unwrap();
            let headers = response.headers();
            assert_eq!(
                headers["content-security-policy"],
                CONTENT_SECURITY_POLICY_VALUE,
                "{uri}"
            );
            assert!(headers["content-security-policy"]
                .to_str()
                .unwrap()
                .starts_with("default-src 'self'"));
            assert_eq!(headers["x-content-type-options"], "nosniff", "{uri}");
            assert_eq!(headers["x-frame-options"], "SAMEORIGIN", "{uri}");
            assert_eq!(headers["referrer-policy"], "no-referrer", "{uri}");
        }
    }

    #[tokio::test]
    async fn rapidoc_is_served() {
        let response = define_routes(header_state())
            .oneshot(get_request("/rapidoc"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
