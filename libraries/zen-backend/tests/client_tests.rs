//! Tests for the hosted backend client.
//!
//! These tests use mock servers to verify client behavior without
//! requiring a real backend project.

use zen_backend::{
    AuthBackend, AuthChangeEvent, BackendClient, BackendConfig, BackendError, BackendErrorKind,
    DataBackend, NewProfile, UserMetadata,
};
use zen_core::{MeditationId, UserId};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ANON: &str = "anon-key";

fn session_json(access: &str, user_id: &str) -> serde_json::Value {
    serde_json::json!({
        "access_token": access,
        "refresh_token": format!("{}-refresh", access),
        "expires_in": 3600,
        "token_type": "bearer",
        "user": {
            "id": user_id,
            "email": "ana@example.com",
            "user_metadata": {"name": "Ana"}
        }
    })
}

fn client_for(server: &MockServer) -> BackendClient {
    BackendClient::new(BackendConfig::new(server.uri(), ANON)).unwrap()
}

async fn signed_in_client(server: &MockServer) -> BackendClient {
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json("access-1", "user-1")))
        .mount(server)
        .await;

    let client = client_for(server);
    client.sign_in("ana@example.com", "secret1").await.unwrap();
    client
}

// =============================================================================
// Authentication Tests
// =============================================================================

mod authentication {
    use super::*;

    #[tokio::test]
    async fn test_sign_in_stores_session_and_broadcasts() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(header("apikey", ANON))
            .and(body_json(serde_json::json!({
                "email": "ana@example.com",
                "password": "secret1"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(session_json("access-1", "user-1")))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut changes = client.subscribe();

        let session = client.sign_in("ana@example.com", "secret1").await.unwrap();
        assert_eq!(session.user.id.as_str(), "user-1");
        assert!(client.is_authenticated().await);

        let change = changes.recv().await.unwrap();
        assert_eq!(change.event, AuthChangeEvent::SignedIn);
        assert_eq!(change.session.unwrap().access_token, "access-1");
    }

    #[tokio::test]
    async fn test_sign_in_invalid_credentials_is_classified() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "code": 400,
                "error_code": "invalid_credentials",
                "msg": "Invalid login credentials"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.sign_in("ana@example.com", "wrong1").await.unwrap_err();

        assert_eq!(err.kind(), BackendErrorKind::InvalidCredentials);
        assert!(!client.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_sign_in_unconfirmed_email_is_classified() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Email not confirmed"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .sign_in("ana@example.com", "secret1")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), BackendErrorKind::EmailNotConfirmed);
    }

    #[tokio::test]
    async fn test_sign_up_sends_metadata_and_redirect() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .and(query_param("redirect_to", "https://example.com/confirm/"))
            .and(body_json(serde_json::json!({
                "email": "a@example.com",
                "password": "secret1",
                "data": {"name": "Ana", "full_name": "Ana"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "user-9",
                "email": "a@example.com"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let outcome = client
            .sign_up(
                "a@example.com",
                "secret1",
                &UserMetadata::with_name("Ana"),
                Some("https://example.com/confirm/"),
            )
            .await
            .unwrap();

        assert_eq!(outcome.user.unwrap().id.as_str(), "user-9");
        assert!(outcome.session.is_none());
        // Confirmation pending: no session stored
        assert!(!client.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_sign_out_clears_session_even_if_token_expired() {
        let server = MockServer::start().await;
        let client = signed_in_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error_code": "bad_jwt",
                "msg": "invalid JWT"
            })))
            .mount(&server)
            .await;

        let mut changes = client.subscribe();
        client.sign_out().await.unwrap();

        assert!(!client.is_authenticated().await);
        assert_eq!(changes.recv().await.unwrap().event, AuthChangeEvent::SignedOut);
    }

    #[tokio::test]
    async fn test_set_session_validates_access_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer link-access"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "user-2",
                "email": "b@example.com"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let session = client.set_session("link-access", "link-refresh").await.unwrap();

        assert_eq!(session.user.id.as_str(), "user-2");
        assert_eq!(session.refresh_token, "link-refresh");
        assert!(client.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_set_session_falls_back_to_refresh_grant() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(401).set_body_string(""))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .and(body_json(serde_json::json!({"refresh_token": "link-refresh"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(session_json("fresh", "user-2")))
            .expect(1)
            .mount(&server)
            .await;

        let session = client_for(&server)
            .set_session("stale", "link-refresh")
            .await
            .unwrap();
        assert_eq!(session.access_token, "fresh");
    }

    #[tokio::test]
    async fn test_update_password_requires_session() {
        let server = MockServer::start().await;
        let err = client_for(&server).update_password("newpass1").await.unwrap_err();
        assert!(matches!(err, BackendError::AuthRequired));
    }

    #[tokio::test]
    async fn test_resend_confirmation_uses_signup_type() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/resend"))
            .and(body_json(serde_json::json!({"type": "signup", "email": "a@example.com"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .resend_confirmation("a@example.com", None)
            .await
            .unwrap();
    }
}

// =============================================================================
// Table Tests
// =============================================================================

mod tables {
    use super::*;

    #[tokio::test]
    async fn test_fetch_profile_uses_user_token() {
        let server = MockServer::start().await;
        let client = signed_in_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .and(query_param("id", "eq.user-1"))
            .and(header("authorization", "Bearer access-1"))
            .and(header("apikey", ANON))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "user-1",
                "email": "ana@example.com",
                "name": "Ana",
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z"
            })))
            .mount(&server)
            .await;

        let profile = client.fetch_profile(&UserId::new("user-1")).await.unwrap();
        assert_eq!(profile.name, "Ana");
    }

    #[tokio::test]
    async fn test_missing_profile_is_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(406).set_body_json(serde_json::json!({
                "code": "PGRST116",
                "details": "The result contains 0 rows",
                "hint": null,
                "message": "JSON object requested, multiple (or no) rows returned"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_profile(&UserId::new("ghost"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_create_profile_returns_representation() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/profiles"))
            .and(header("prefer", "return=representation"))
            .and(body_json(serde_json::json!({
                "id": "user-1", "email": "ana@example.com", "name": "ana"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": "user-1", "email": "ana@example.com", "name": "ana"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let row = client_for(&server)
            .create_profile(&NewProfile {
                id: UserId::new("user-1"),
                email: "ana@example.com".into(),
                name: "ana".into(),
            })
            .await
            .unwrap();
        assert_eq!(row.id.as_str(), "user-1");
    }

    #[tokio::test]
    async fn test_favorites_round_trip_requests() {
        let server = MockServer::start().await;
        let client = signed_in_client(&server).await;
        let user = UserId::new("user-1");
        let meditation = MeditationId::new("m-7");

        Mock::given(method("GET"))
            .and(path("/rest/v1/favorites"))
            .and(query_param("select", "meditation_id"))
            .and(query_param("user_id", "eq.user-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"meditation_id": "m-1"},
                {"meditation_id": "m-2"}
            ])))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/favorites"))
            .and(body_json(serde_json::json!({"user_id": "user-1", "meditation_id": "m-7"})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/rest/v1/favorites"))
            .and(query_param("user_id", "eq.user-1"))
            .and(query_param("meditation_id", "eq.m-7"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let ids = client.list_favorites(&user).await.unwrap();
        assert_eq!(ids, vec![MeditationId::new("m-1"), MeditationId::new("m-2")]);

        client.insert_favorite(&user, &meditation).await.unwrap();
        client.delete_favorite(&user, &meditation).await.unwrap();
    }

    #[tokio::test]
    async fn test_catalog_queries_are_ordered() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/categories"))
            .and(query_param("order", "name.asc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": "c1", "name": "Breath", "description": null, "created_at": "2024-01-01T00:00:00Z"}
            ])))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/meditations"))
            .and(query_param("select", "*,categories!inner(id,name)"))
            .and(query_param("order", "created_at.desc"))
            .and(header("authorization", format!("Bearer {}", ANON).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "id": "m1", "title": "Calm", "description": "Breathe",
                "category_id": "c1", "duration_minutes": 15,
                "audio_url": "https://cdn/x.mp3", "image_url": "https://cdn/x.jpg",
                "featured": true, "created_at": "2024-01-01T00:00:00Z",
                "categories": {"id": "c1", "name": "Breath"}
            }])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let categories = client.list_categories().await.unwrap();
        let meditations = client.list_meditations().await.unwrap();

        assert_eq!(categories.len(), 1);
        assert_eq!(meditations[0].duration_minutes, 15);
    }

    #[tokio::test]
    async fn test_expired_token_refreshes_once_and_retries() {
        let server = MockServer::start().await;
        let client = signed_in_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/favorites"))
            .and(header("authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "code": "PGRST301",
                "message": "JWT expired"
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(session_json("access-2", "user-1")))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/favorites"))
            .and(header("authorization", "Bearer access-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let mut changes = client.subscribe();
        let ids = client.list_favorites(&UserId::new("user-1")).await.unwrap();

        assert!(ids.is_empty());
        assert_eq!(changes.recv().await.unwrap().event, AuthChangeEvent::TokenRefreshed);
    }

    #[tokio::test]
    async fn test_server_error_is_transient() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/categories"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_categories().await.unwrap_err();
        assert_eq!(err.kind(), BackendErrorKind::Server);
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/categories"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not valid json"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_categories().await.unwrap_err();
        assert!(matches!(err, BackendError::ParseError(_)));
    }
}
