use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::{db, error::AppError, middleware::auth::AuthUser, state::AppState};

/// 내보내기 파일 이름: `{사이트 이름 slug}-export-YYYY-MM-DD.json`
pub fn export_filename(site_name: &str, date: chrono::NaiveDate) -> String {
    let prefix = slug::slugify(site_name);
    let prefix = if prefix.is_empty() { "site".to_string() } else { prefix };
    format!("{prefix}-export-{}.json", date.format("%Y-%m-%d"))
}

/// `GET /api/admin/export`: 전체 데이터를 보기 좋게 들여쓴 JSON 첨부 파일로 내려줍니다.
pub async fn export_data(State(state): State<AppState>, _user: AuthUser) -> Result<Response, AppError> {
    let document = db::export_all(&state.pool).await?;
    let body = serde_json::to_string_pretty(&document)
        .map_err(|e| AppError::Internal(format!("Export serialization failed: {e}")))?;

    let filename = export_filename(&state.config.site_name, Utc::now().date_naive());
    tracing::info!(posts = document.posts.len(), %filename, "data exported");

    Ok((
        [
            (header::CONTENT_TYPE, "application/json; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        body,
    )
        .into_response())
}
