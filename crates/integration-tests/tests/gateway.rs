//! Gateway tests: envelope handling, error messages, and bearer injection.
//!
//! ## Endpoints Tested
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | POST | `/auth/login` | `bearer_*`, `login_*` |
//! | POST | `/auth/register` | `bearer_*` |
//! | GET | `/auth/profile` | `bearer_*`, `profile_*` |
//! | GET | `/resto` | `bearer_*`, `status_*`, `listing_*` |
//! | POST | `/cart` | `bearer_*`, `cart_*` |

#![allow(clippy::unwrap_used)]

use foody_client::api::{AddToCartRequest, ApiError, LoginRequest, RegisterRequest};
use foody_core::{ApiCategory, Restaurant, RestaurantId};
use foody_integration_tests::{TestContext, auth_payload, bearer, envelope, rejection};
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

fn login_request() -> LoginRequest {
    LoginRequest {
        email: "budi@example.com".to_string(),
        password: SecretString::from("secret1"),
    }
}

// ── Bearer injection ─────────────────────────────────────────────────

#[tokio::test]
async fn bearer_absent_on_login_and_register_present_elsewhere() {
    let ctx = TestContext::start().await;
    let api = ctx.client.api();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_payload(
            "tok-1",
            "budi@example.com",
            "Budi",
        )))
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(auth_payload(
            "tok-2",
            "sari@example.com",
            "Sari",
        )))
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            json!({"id": 1, "email": "budi@example.com"}),
        )))
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/resto/nearby"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({"items": 1}))))
        .mount(&ctx.server)
        .await;

    // A token is already set before every call.
    api.set_token(SecretString::from("tok-0")).await;

    api.login(&login_request()).await.unwrap();
    api.register(&RegisterRequest {
        name: "Sari".to_string(),
        email: "sari@example.com".to_string(),
        phone: "0812".to_string(),
        password: SecretString::from("secret1"),
    })
    .await
    .unwrap();
    api.profile().await.unwrap();
    api.restaurants(ApiCategory::Nearby).await.unwrap();
    api.add_to_cart(&AddToCartRequest {
        restaurant_id: RestaurantId::Number(5),
    })
    .await
    .unwrap();

    for unauthenticated in ["/auth/login", "/auth/register"] {
        let requests = ctx.requests_to(unauthenticated).await;
        assert_eq!(requests.len(), 1);
        assert_eq!(bearer(&requests[0]), None, "{unauthenticated} must not send a token");
    }
    for authenticated in ["/auth/profile", "/resto/nearby", "/cart"] {
        let requests = ctx.requests_to(authenticated).await;
        assert_eq!(requests.len(), 1);
        assert_eq!(
            bearer(&requests[0]).as_deref(),
            Some("Bearer tok-0"),
            "{authenticated} must send the token"
        );
    }
}

#[tokio::test]
async fn bearer_absent_without_token() {
    let ctx = TestContext::start().await;

    Mock::given(method("GET"))
        .and(path("/resto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&ctx.server)
        .await;

    ctx.client.api().restaurants(ApiCategory::All).await.unwrap();

    let requests = ctx.requests_to("/resto").await;
    assert_eq!(bearer(&requests[0]), None);
}

// ── Request bodies ───────────────────────────────────────────────────

#[tokio::test]
async fn login_sends_credentials_as_json() {
    let ctx = TestContext::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": "budi@example.com", "password": "secret1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_payload(
            "tok",
            "budi@example.com",
            "Budi",
        )))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let auth = ctx.client.api().login(&login_request()).await.unwrap();
    assert_eq!(auth.user.name.as_deref(), Some("Budi"));
}

// ── Error messages ───────────────────────────────────────────────────

#[tokio::test]
async fn status_error_carries_body_message() {
    let ctx = TestContext::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(rejection("Invalid credentials")))
        .mount(&ctx.server)
        .await;

    let err = ctx.client.api().login(&login_request()).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.user_message(), "Invalid credentials");
}

#[tokio::test]
async fn status_error_without_message_uses_status_fallback() {
    let ctx = TestContext::start().await;

    Mock::given(method("GET"))
        .and(path("/resto"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&ctx.server)
        .await;

    let err = ctx.client.api().restaurants(ApiCategory::All).await.unwrap_err();
    assert_eq!(err.user_message(), "Request failed with status 503");
}

#[tokio::test]
async fn login_success_false_is_rejected() {
    let ctx = TestContext::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rejection("Account suspended")))
        .mount(&ctx.server)
        .await;

    let err = ctx.client.api().login(&login_request()).await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected(ref m) if m == "Account suspended"));
}

#[tokio::test]
async fn login_without_token_uses_fallback() {
    let ctx = TestContext::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "data": {"user": {"email": "a@b.co"}}})),
        )
        .mount(&ctx.server)
        .await;

    let err = ctx.client.api().login(&login_request()).await.unwrap_err();
    assert_eq!(err.user_message(), "Login failed. Please try again.");
}

#[tokio::test]
async fn non_json_body_is_an_envelope_error() {
    let ctx = TestContext::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&ctx.server)
        .await;

    let err = ctx.client.api().profile().await.unwrap_err();
    assert!(matches!(err, ApiError::Envelope { .. }));
}

// ── Response shapes ──────────────────────────────────────────────────

#[tokio::test]
async fn profile_accepts_bare_user() {
    let ctx = TestContext::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u-9",
            "name": "Budi",
            "email": "budi@example.com",
            "avatar": "https://cdn.example.com/budi.png"
        })))
        .mount(&ctx.server)
        .await;

    let user = ctx.client.api().profile().await.unwrap();
    assert_eq!(user.id.unwrap().as_str(), "u-9");
    assert_eq!(user.avatar.as_deref(), Some("https://cdn.example.com/budi.png"));
}

#[tokio::test]
async fn listing_shapes_are_normalized() {
    let ctx = TestContext::start().await;

    Mock::given(method("GET"))
        .and(path("/resto/best-seller"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "restaurants": [{"id": 1, "name": "Warung A", "place": "Bandung"}]
        }))))
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/resto/recommended"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({"total": 0}))))
        .mount(&ctx.server)
        .await;

    let api = ctx.client.api();
    let best = api.restaurants(ApiCategory::BestSeller).await.unwrap();
    assert_eq!(best.len(), 1);
    assert_eq!(best[0].city.as_deref(), Some("Bandung"));

    assert!(api.restaurants(ApiCategory::Recommended).await.unwrap().is_empty());
}

#[tokio::test]
async fn listing_survives_loose_entries() {
    let ctx = TestContext::start().await;

    Mock::given(method("GET"))
        .and(path("/resto/nearby"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
            {"id": 1, "name": "Warung A", "rating": 4.5},
            {"id": 2, "name": "Bakso B", "rating": "4.7"},
            {"id": 3.0, "name": "Bakmi C", "city": "Jakarta", "place": "Blok M"},
            42
        ]))))
        .mount(&ctx.server)
        .await;

    let list = ctx.client.api().restaurants(ApiCategory::Nearby).await.unwrap();
    let names: Vec<_> = list.iter().map(Restaurant::name_or_empty).collect();
    assert_eq!(names, vec!["Warung A", "Bakso B", "Bakmi C"]);
    assert_eq!(list[1].rating, Some(4.7));
    assert_eq!(list[2].id, Some(RestaurantId::Number(3)));
}

#[tokio::test]
async fn profile_envelope_without_data_uses_body_message() {
    let ctx = TestContext::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Profile is being updated",
            "data": null
        })))
        .mount(&ctx.server)
        .await;

    let err = ctx.client.api().profile().await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected(_)));
    assert_eq!(err.user_message(), "Profile is being updated");
}

#[tokio::test]
async fn cart_envelope_without_data_is_success() {
    let ctx = TestContext::start().await;

    Mock::given(method("POST"))
        .and(path("/cart"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "message": "Added to cart"})),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let data = ctx
        .client
        .api()
        .add_to_cart(&AddToCartRequest {
            restaurant_id: RestaurantId::Number(4),
        })
        .await
        .unwrap();
    assert_eq!(data, serde_json::Value::Null);
}
