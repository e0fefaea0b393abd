//! # 이미지 업로드 / 서빙
//!
//! - `POST /api/upload` (multipart): `file` 필드 + 선택 `postId` 필드
//! - `GET /uploads/images/{*path}`: 업로드 디렉토리 밖을 가리키는 경로는 모두 404
//!
//! 파일 이름은 `{uuid}-{정리된 원래 이름}.{확장자}` 형식이라 같은 이름을 올려도 덮어쓰지 않습니다.
//! 확장자는 클라이언트가 보낸 이름이 아니라 검증된 Content-Type에서 정합니다.
//! 서빙할 때의 Content-Type은 확장자로 정해지므로, `evil.svg`를 `image/png`로 올려도
//! `….png`로 저장되어 SVG로 해석되지 않습니다.

use std::path::PathBuf;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::{
    db,
    error::AppError,
    middleware::auth::AuthUser,
    models::NewImage,
    services::text::safe_upload_name,
    state::AppState,
};

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
/// multipart 헤더/경계 문자열을 포함한 요청 본문 상한
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// 허용하는 Content-Type과 저장 확장자
const ALLOWED_TYPES: [(&str, &str); 4] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

fn extension_for(content_type: &str) -> Option<&'static str> {
    ALLOWED_TYPES
        .iter()
        .find(|(mime, _)| *mime == content_type)
        .map(|(_, ext)| *ext)
}

/// `{uuid}-{정리된 이름}.{ext}`. 원래 확장자는 버립니다.
fn stored_filename(original: &str, ext: &str) -> String {
    let stem = std::path::Path::new(original)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(safe_upload_name)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "upload".to_string());
    format!("{}-{stem}.{ext}", uuid::Uuid::new_v4())
}

struct UploadedFile {
    name: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// `POST /api/upload` → 201 `{ "url": "/uploads/images/{filename}", "id": "..." }`
pub async fn upload_image(
    State(state): State<AppState>,
    _user: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let mut file: Option<UploadedFile> = None;
    let mut post_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(e.body_text()))?
    {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("file") => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::bad_request(e.body_text()))?;
                file = Some(UploadedFile {
                    name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some("postId") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::bad_request(e.body_text()))?;
                post_id = Some(value.trim().to_string()).filter(|v| !v.is_empty());
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::bad_request("No file provided"))?;
    let Some(ext) = extension_for(&file.content_type) else {
        return Err(AppError::bad_request(
            "Invalid file type. Allowed: JPEG, PNG, GIF, WebP",
        ));
    };
    if file.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::bad_request("File too large (max 5 MB)"));
    }

    if let Some(id) = &post_id {
        if db::get_post(&state.pool, id).await?.is_none() {
            return Err(AppError::bad_request("postId does not refer to an existing post"));
        }
    }

    tokio::fs::create_dir_all(&state.config.upload_dir).await?;
    let dir = tokio::fs::canonicalize(&state.config.upload_dir).await?;

    let filename = stored_filename(&file.name, ext);
    let path = dir.join(&filename);
    tokio::fs::write(&path, &file.bytes).await?;

    let image = db::create_image(
        &state.pool,
        &NewImage {
            filename: filename.clone(),
            path: path.to_string_lossy().into_owned(),
            mime_type: file.content_type,
            size_bytes: file.bytes.len() as i64,
            post_id,
        },
    )
    .await?;

    tracing::info!(id = %image.id, filename = %filename, size = image.size_bytes, "image uploaded");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "url": format!("/uploads/images/{filename}"), "id": image.id })),
    ))
}

/// 확장자로 Content-Type을 정합니다.
fn mime_for(path: &std::path::Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// 요청 경로를 업로드 루트 아래의 실제 파일로 해석합니다.
///
/// 심볼릭 링크와 `..`를 모두 풀어낸 뒤 루트 밖이면 `None`.
async fn resolve_upload_path(root: &str, requested: &str) -> Option<PathBuf> {
    let root = tokio::fs::canonicalize(root).await.ok()?;
    let target = tokio::fs::canonicalize(root.join(requested)).await.ok()?;
    if !target.starts_with(&root) {
        return None;
    }
    let meta = tokio::fs::metadata(&target).await.ok()?;
    meta.is_file().then_some(target)
}

/// `GET /uploads/images/{*path}`
pub async fn serve_image(
    State(state): State<AppState>,
    Path(requested): Path<String>,
) -> Result<Response, AppError> {
    let Some(target) = resolve_upload_path(&state.config.upload_dir, &requested).await else {
        tracing::debug!(path = %requested, "upload not found or outside root");
        return Err(AppError::NotFound);
    };

    let bytes = tokio::fs::read(&target).await?;
    Ok((
        [
            (header::CONTENT_TYPE, mime_for(&target)),
            (header::CACHE_CONTROL, "public, max-age=86400"),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        bytes,
    )
        .into_response())
}
