//! 라우터 테스트용 공통 도구

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    response::Response,
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::{
    app::build_router,
    config::Config,
    db::testing::test_pool,
    middleware::auth::{create_session_token, AuthUser},
    state::AppState,
};

pub const ADMIN_EMAIL: &str = "me@example.com";
pub const SECRET: &str = "test-secret";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub token: String,
    /// 업로드 디렉토리. 테스트가 끝나면 지워집니다.
    pub upload_dir: TempDir,
}

impl TestApp {
    pub fn auth(&self) -> Option<&str> {
        Some(self.token.as_str())
    }
}

pub fn test_config(upload_dir: &str) -> Config {
    Config {
        database_url: "sqlite::memory:".into(),
        session_secret: SECRET.into(),
        allowed_email: ADMIN_EMAIL.into(),
        google_client_id: "client-id".into(),
        google_client_secret: "client-secret".into(),
        upload_dir: upload_dir.into(),
        static_dir: "./static".into(),
        site_url: "https://site.test".into(),
        site_name: "Test Site".into(),
        host: "127.0.0.1".into(),
        port: 0,
    }
}

pub fn token_for(email: &str) -> String {
    let user = AuthUser {
        email: email.into(),
        name: Some("Admin".into()),
        image: None,
    };
    create_session_token(&user, SECRET).unwrap()
}

pub async fn test_app() -> TestApp {
    let upload_dir = tempfile::tempdir().unwrap();
    let config = test_config(upload_dir.path().to_str().unwrap());
    let state = AppState::new(test_pool().await, config).unwrap();

    TestApp {
        router: build_router(state.clone()),
        state,
        token: token_for(ADMIN_EMAIL),
        upload_dir,
    }
}

/// JSON 본문(선택)과 Bearer 토큰(선택)을 붙여 요청 하나를 보냅니다.
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    router.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn send_request(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(res: Response) -> Vec<u8> {
    to_bytes(res.into_body(), usize::MAX).await.unwrap().to_vec()
}

pub async fn body_text(res: Response) -> String {
    String::from_utf8(body_bytes(res).await).unwrap()
}

pub async fn body_json(res: Response) -> Value {
    serde_json::from_slice(&body_bytes(res).await).unwrap()
}
