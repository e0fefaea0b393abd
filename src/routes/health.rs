//! # 헬스체크(Health Check) 핸들러
//!
//! - `GET /api/health` → `{ "status": "ok" }` (DB 연결이 살아 있을 때)

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{error::AppError, state::AppState};

/// `GET /api/health`: DB에 간단한 쿼리를 던져 연결 상태까지 확인합니다.
pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    sqlx::query("SELECT 1").execute(&state.pool).await?;
    Ok(Json(json!({ "status": "ok" })))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{body_json, send, test_app};
    use axum::http::Method;
    use serde_json::json;

    #[tokio::test]
    async fn reports_ok() {
        let app = test_app().await;
        let res = send(&app.router, Method::GET, "/api/health", None, None).await;
        assert_eq!(body_json(res).await, json!({ "status": "ok" }));
    }
}
