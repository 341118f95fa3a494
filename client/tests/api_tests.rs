//! REST client, session and service tests against the mock backend

mod common;

use buen_sabor_client::{AuthSession, ClientError, Services};
use common::{dec, MockBackend, MockState, PASSWORD, TOKEN};
use shared::models::{Credentials, Ingredient, StockAdjustment};

// ============================================================================
// Error normalization
// ============================================================================

#[tokio::test]
async fn test_not_found_maps_to_status_404() {
    let backend = MockBackend::spawn(MockState::seeded()).await;
    let services = backend.services();

    let err = services.ingredients.get_by_id(999).await.unwrap_err();

    assert!(matches!(err, ClientError::NotFound { .. }));
    let api = err.to_api_error();
    assert_eq!(api.status, 404);
    assert_eq!(api.details.unwrap()["message"], "Ingredient not found");
}

#[tokio::test]
async fn test_refused_connection_has_status_zero() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = buen_sabor_client::ApiClient::with_base_url(
        format!("http://{}/api", addr),
        AuthSession::new(),
    );
    let services = Services::new(api);

    let err = services.categories.get_all().await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
    assert_eq!(err.status(), 0);
    assert_eq!(
        err.to_api_error().message,
        "Connection error. Check your network connection."
    );
}

#[tokio::test]
async fn test_server_error_message_is_generic() {
    let mut state = MockState::seeded();
    state.fail_products = true;
    let backend = MockBackend::spawn(state).await;

    let err = backend.services().products.get_all().await.unwrap_err();
    let api = err.to_api_error();
    assert_eq!(api.status, 500);
    assert_eq!(api.message, "Internal server error.");
}

// ============================================================================
// Session
// ============================================================================

#[tokio::test]
async fn test_unauthorized_clears_session() {
    let backend = MockBackend::spawn(MockState::seeded()).await;
    let session = AuthSession::with_token("expired-token");
    let services = Services::new(backend.api(session.clone()));

    let err = services.auth.me().await.unwrap_err();

    assert_eq!(err.status(), 401);
    assert!(!session.is_authenticated());
    assert!(session.requires_login());
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let backend = MockBackend::spawn(MockState::seeded()).await;
    let session = AuthSession::with_token(TOKEN);
    let services = Services::new(backend.api(session.clone()));

    let user = services.auth.me().await.unwrap();

    assert_eq!(user.email, "ana@buensabor.com");
    assert_eq!(session.user(), Some(user));
}

#[tokio::test]
async fn test_login_and_logout() {
    let backend = MockBackend::spawn(MockState::seeded()).await;
    let session = AuthSession::new();
    let services = Services::new(backend.api(session.clone()));

    let credentials = Credentials {
        email: "ana@buensabor.com".to_string(),
        password: PASSWORD.to_string(),
    };
    let user = services.auth.login(&credentials).await.unwrap();

    assert_eq!(user.name, "Ana");
    assert_eq!(session.token().as_deref(), Some(TOKEN));

    services.auth.logout().await.unwrap();
    assert!(!session.is_authenticated());
    assert!(session.user().is_none());
}

#[tokio::test]
async fn test_invalid_credentials_never_reach_the_backend() {
    let backend = MockBackend::spawn(MockState::seeded()).await;
    let services = backend.services();

    let credentials = Credentials {
        email: "not-an-email".to_string(),
        password: String::new(),
    };
    let err = services.auth.login(&credentials).await.unwrap_err();

    assert!(err.is_local());
    assert_eq!(err.status(), 422);
    assert!(backend.hits().is_empty());
}

// ============================================================================
// Services
// ============================================================================

#[tokio::test]
async fn test_stock_endpoints_use_query_parameters() {
    let backend = MockBackend::spawn(MockState::seeded()).await;
    let services = backend.services();

    let updated: Ingredient = services.ingredients.set_stock(1, dec("25")).await.unwrap();
    assert_eq!(updated.current_stock, dec("25"));

    let updated = services
        .ingredients
        .adjust_stock(1, StockAdjustment::Increment(dec("5")))
        .await
        .unwrap();
    assert_eq!(updated.current_stock, dec("30"));

    let hits = backend.hits();
    assert_eq!(
        hits,
        vec![
            "PUT /articulos-insumo/1/stock?nuevoStock=25".to_string(),
            "PUT /articulos-insumo/1/stock/incrementar?cantidad=5".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_delete_with_empty_body() {
    let backend = MockBackend::spawn(MockState::seeded()).await;
    let services = backend.services();

    services.ingredients.delete(3).await.unwrap();

    let remaining = services.ingredients.get_all().await.unwrap();
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|i| i.id != 3));
}

#[tokio::test]
async fn test_critical_and_low_lists() {
    let backend = MockBackend::spawn(MockState::seeded()).await;
    let services = backend.services();

    let (critical, low) = tokio::try_join!(
        services.ingredients.get_critical_stock(),
        services.ingredients.get_low_stock()
    )
    .unwrap();

    assert_eq!(critical.iter().map(|i| i.id).collect::<Vec<_>>(), vec![2]);
    assert_eq!(low.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1]);
}

#[tokio::test]
async fn test_category_checks() {
    let backend = MockBackend::spawn(MockState::seeded()).await;
    let services = backend.services();

    assert!(services.categories.exists_by_name("pizzas").await.unwrap());
    assert!(!services.categories.exists_by_name("Postres").await.unwrap());
    assert!(services.categories.has_subcategories(2).await.unwrap());
    assert!(!services.categories.has_subcategories(3).await.unwrap());
    assert!(services.categories.has_articles(1).await.unwrap());

    let main = services.categories.get_main().await.unwrap();
    assert_eq!(main.len(), 2);
}
