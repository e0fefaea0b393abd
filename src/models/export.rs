//! # 내보내기(Export) 문서 구조
//!
//! `GET /api/admin/export`가 내려주는 JSON 한 덩어리입니다.
//! 태그는 이름 배열로, 이미지는 메타데이터만 포함합니다.

use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub exported_at: String,
    pub posts: Vec<ExportPost>,
    pub tags: Vec<ExportTag>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPost {
    pub id: String,
    #[serde(rename = "type")]
    pub post_type: String,
    pub title: String,
    pub url: Option<String>,
    pub domain: Option<String>,
    pub content: Option<String>,
    pub content_markdown: Option<String>,
    pub status: String,
    pub view_count: i64,
    pub tags: Vec<String>,
    pub images: Vec<ExportImage>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportImage {
    pub id: String,
    pub filename: String,
    pub path: String,
    pub mime_type: String,
    pub size_bytes: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportTag {
    pub id: String,
    pub name: String,
    pub created_at: String,
}
