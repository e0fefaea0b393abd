use serde::Serialize;

/// 업로드된 이미지 메타데이터 (`images` 테이블 한 행)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: String,
    pub filename: String,
    /// 디스크상의 전체 경로
    pub path: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub post_id: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewImage {
    pub filename: String,
    pub path: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub post_id: Option<String>,
}
