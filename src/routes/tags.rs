//! # 태그 API 라우트 핸들러
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/tags | `list_tags` | 태그 + 공개 글 수 |
//! | GET | /api/tags/autocomplete?q= | `autocomplete` | 접두사 자동완성 (최대 10개) |
//! | GET | /api/admin/tags | `list_admin_tags` | 태그 + 전체 글 수 |
//! | PUT | /api/admin/tags/{id} | `rename_tag` | 이름 변경 |
//! | DELETE | /api/admin/tags/{id} | `delete_tag` | 사용 중이 아닐 때만 삭제 |
//! | POST | /api/admin/tags/merge | `merge_tags` | source → target 병합 |

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    db::{self, DeleteTagOutcome, RenameOutcome},
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    state::AppState,
};

/// `GET /api/tags`
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<TagWithCount>>, AppError> {
    let tags = db::list_tags_with_counts(&state.pool, true).await?;
    Ok(Json(tags))
}

/// `GET /api/admin/tags`
pub async fn list_admin_tags(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<TagWithCount>>, AppError> {
    let tags = db::list_tags_with_counts(&state.pool, false).await?;
    Ok(Json(tags))
}

#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    pub q: Option<String>,
}

/// `GET /api/tags/autocomplete?q=`
pub async fn autocomplete(
    State(state): State<AppState>,
    Query(query): Query<AutocompleteQuery>,
) -> Result<Json<Vec<TagSuggestion>>, AppError> {
    let prefix = query.q.as_deref().map(normalize_tag_name).unwrap_or_default();
    if prefix.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let tags = db::autocomplete_tags(&state.pool, &prefix).await?;
    Ok(Json(tags))
}

/// `PUT /api/admin/tags/{id}` + `{ "name": "..." }`
pub async fn rename_tag(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<RenameTagRequest>,
) -> Result<Json<Tag>, AppError> {
    let name = req.name.as_deref().map(normalize_tag_name).unwrap_or_default();
    if name.is_empty() {
        return Err(AppError::bad_request("name is required"));
    }

    match db::rename_tag(&state.pool, &id, &name).await? {
        RenameOutcome::Renamed(tag) => {
            tracing::info!(id = %id, name = %tag.name, "tag renamed");
            Ok(Json(tag))
        }
        RenameOutcome::NotFound => Err(AppError::NotFound),
        RenameOutcome::Conflict => Err(AppError::Conflict(format!(
            "Tag \"{name}\" already exists. Use merge instead."
        ))),
    }
}

/// `DELETE /api/admin/tags/{id}` → 204
pub async fn delete_tag(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    match db::delete_tag(&state.pool, &id).await? {
        DeleteTagOutcome::Deleted => {
            tracing::info!(id = %id, "tag deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        DeleteTagOutcome::NotFound => Err(AppError::NotFound),
        DeleteTagOutcome::InUse(count) => Err(AppError::bad_request(format!(
            "Tag is used by {count} post(s). Remove it from those posts or merge it first."
        ))),
    }
}

/// `POST /api/admin/tags/merge` + `{ "sourceId": "...", "targetId": "..." }`
pub async fn merge_tags(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<MergeTagsRequest>,
) -> Result<Json<Value>, AppError> {
    let (Some(source_id), Some(target_id)) = (req.source_id, req.target_id) else {
        return Err(AppError::bad_request("sourceId and targetId are required"));
    };
    if source_id == target_id {
        return Err(AppError::bad_request("Cannot merge a tag into itself"));
    }

    let source = db::get_tag(&state.pool, &source_id).await?.ok_or(AppError::NotFound)?;
    let target = db::get_tag(&state.pool, &target_id).await?.ok_or(AppError::NotFound)?;

    let moved = db::merge_tags(&state.pool, &source.id, &target.id).await?;
    tracing::info!(source = %source.name, target = %target.name, moved, "tags merged");

    Ok(Json(json!({ "merged": true, "moved": moved })))
}
