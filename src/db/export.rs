//! 전체 데이터 내보내기
//!
//! 글(태그 이름 + 이미지 메타데이터 포함)은 최신순, 태그는 이름순입니다.

use std::collections::HashMap;

use chrono::{SecondsFormat, Utc};
use sqlx::SqlitePool;

use crate::db::images::list_images;
use crate::db::tags::{all_post_tags, list_tags};
use crate::error::AppError;
use crate::models::*;

pub async fn export_all(pool: &SqlitePool) -> Result<ExportDocument, AppError> {
    let posts = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, type, title, url, domain, content, content_markdown, status,
               view_count, author_id, created_at, updated_at
        FROM posts
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut tags_by_post = all_post_tags(pool).await?;

    let mut images_by_post: HashMap<String, Vec<ExportImage>> = HashMap::new();
    for image in list_images(pool).await? {
        if let Some(post_id) = image.post_id {
            images_by_post.entry(post_id).or_default().push(ExportImage {
                id: image.id,
                filename: image.filename,
                path: image.path,
                mime_type: image.mime_type,
                size_bytes: image.size_bytes,
            });
        }
    }

    let posts = posts
        .into_iter()
        .map(|post| ExportPost {
            tags: tags_by_post
                .remove(&post.id)
                .unwrap_or_default()
                .into_iter()
                .map(|t| t.name)
                .collect(),
            images: images_by_post.remove(&post.id).unwrap_or_default(),
            id: post.id,
            post_type: post.post_type.as_str().to_string(),
            title: post.title,
            url: post.url,
            domain: post.domain,
            content: post.content,
            content_markdown: post.content_markdown,
            status: post.status.as_str().to_string(),
            view_count: post.view_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
        })
        .collect();

    let tags = list_tags(pool)
        .await?
        .into_iter()
        .map(|t| ExportTag {
            id: t.id,
            name: t.name,
            created_at: t.created_at,
        })
        .collect();

    Ok(ExportDocument {
        exported_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        posts,
        tags,
    })
}
