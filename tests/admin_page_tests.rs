use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt; // for `oneshot`
use uuid::Uuid;
use webui_admin::{
    AppError, AppState, McpState, create_router,
    config::{AppConfig, Env},
    mcp::client::{Completion, McpClient},
    models::{McpModel, ParentData, User},
    repository::Repository,
    session::Claims,
};

// --- Stubs ---

/// Repository holding at most one user, optionally failing every lookup.
#[derive(Default)]
struct StubRepository {
    user: Option<User>,
    fail: bool,
}

#[async_trait]
impl Repository for StubRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        if self.fail {
            return Err(AppError::Internal("connection reset".to_string()));
        }
        Ok(self.user.clone().filter(|u| u.id == id))
    }
}

struct NoopMcpClient;

#[async_trait]
impl McpClient for NoopMcpClient {
    async fn verify_connection(&self, _url: &str, _api_key: Option<&str>) -> bool {
        false
    }
    async fn get_models(&self, _url: &str, _api_key: Option<&str>) -> Vec<McpModel> {
        vec![]
    }
    async fn create_chat_completion(
        &self,
        _url: &str,
        _api_key: Option<&str>,
        _body: serde_json::Value,
        _stream: bool,
    ) -> Result<Completion, AppError> {
        Err(AppError::Internal("not used".to_string()))
    }
}

const TEST_JWT_SECRET: &str = "page-guard-test-secret";

fn user_with_role(role: Option<&str>) -> User {
    User {
        id: Uuid::new_v4(),
        email: "someone@example.com".to_string(),
        name: None,
        role: role.map(str::to_string),
    }
}

fn app(env: Env, repo: StubRepository) -> axum::Router {
    let mut config = AppConfig::default();
    config.env = env;
    config.jwt_secret = TEST_JWT_SECRET.to_string();

    let state = AppState {
        repo: Arc::new(repo),
        mcp: McpState::new(Arc::new(NoopMcpClient), &config),
        config,
    };
    create_router(state)
}

fn session_cookie(user_id: Uuid) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;
    let claims = Claims {
        sub: user_id,
        iat: now,
        exp: now + 3600,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap();
    format!("token={}", token)
}

async fn get_costs_page(app: axum::Router, user_id: Option<Uuid>) -> axum::response::Response {
    let mut request = Request::builder().method("GET").uri("/admin/costs");
    if let Some(id) = user_id {
        request = request.header("x-user-id", id.to_string());
    }
    app.oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

fn assert_redirected_home(response: &axum::response::Response) {
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
}

// --- Tests ---

#[tokio::test]
async fn test_anonymous_visitor_is_redirected_home() {
    let response = get_costs_page(app(Env::Local, StubRepository::default()), None).await;
    assert_redirected_home(&response);
}

#[tokio::test]
async fn test_viewer_is_redirected_home() {
    let user = user_with_role(Some("viewer"));
    let id = user.id;
    let repo = StubRepository {
        user: Some(user),
        ..Default::default()
    };

    let response = get_costs_page(app(Env::Local, repo), Some(id)).await;
    assert_redirected_home(&response);
}

#[tokio::test]
async fn test_user_without_role_is_redirected_home() {
    let user = user_with_role(None);
    let id = user.id;
    let repo = StubRepository {
        user: Some(user),
        ..Default::default()
    };

    let response = get_costs_page(app(Env::Local, repo), Some(id)).await;
    assert_redirected_home(&response);
}

#[tokio::test]
async fn test_capitalized_admin_is_redirected_home() {
    let user = user_with_role(Some("Admin"));
    let id = user.id;
    let repo = StubRepository {
        user: Some(user),
        ..Default::default()
    };

    let response = get_costs_page(app(Env::Local, repo), Some(id)).await;
    assert_redirected_home(&response);
}

#[tokio::test]
async fn test_admin_receives_empty_page_data() {
    let user = user_with_role(Some("admin"));
    let id = user.id;
    let repo = StubRepository {
        user: Some(user),
        ..Default::default()
    };

    let response = get_costs_page(app(Env::Local, repo), Some(id)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::LOCATION).is_none());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"{}");
}

#[tokio::test]
async fn test_admin_session_cookie_in_production() {
    let user = user_with_role(Some("admin"));
    let cookie = session_cookie(user.id);
    let repo = StubRepository {
        user: Some(user),
        ..Default::default()
    };

    let response = app(Env::Production, repo)
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/admin/costs")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_parent_loader_failure_is_not_a_redirect() {
    let user = user_with_role(Some("admin"));
    let cookie = session_cookie(user.id);
    let repo = StubRepository {
        user: Some(user),
        fail: true,
    };

    let response = app(Env::Production, repo)
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/admin/costs")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().get(header::LOCATION).is_none());
}

#[tokio::test]
async fn test_redirect_target_serves_layout_data() {
    let response = app(Env::Local, StubRepository::default())
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let data: ParentData = serde_json::from_slice(&body).unwrap();
    assert!(data.user.is_none());
}

#[tokio::test]
async fn test_health_check() {
    let response = app(Env::Local, StubRepository::default())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
