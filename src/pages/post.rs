//! 글 상세 화면 (`GET /post/{id}`)
//!
//! 공개 글을 열 때마다 조회수가 1 올라갑니다. 초안은 관리자에게만 보이며
//! 관리자가 미리 보는 것은 조회수에 포함하지 않습니다.

use axum::{
    extract::{Path, State},
    response::Html,
};
use maud::{html, PreEscaped};

use super::{components::tag_pills, layout, PageError};
use crate::{
    db,
    error::AppError,
    middleware::auth::Viewer,
    models::PostType,
    services::text::reading_time_minutes,
    state::AppState,
};

pub async fn show_post(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    let entry = db::get_post_with_tags(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    let post = &entry.post;

    if post.is_published() {
        db::increment_view_count(&state.pool, &post.id).await?;
    } else if !viewer.is_admin() {
        return Err(AppError::NotFound.into());
    }

    let body = html! {
        article.post {
            h1 { (post.title) }
            div.entry {
                div.meta {
                    (layout::display_date(&post.created_at))
                    @if post.post_type == PostType::Essay {
                        " · " (reading_time_minutes(post.content.as_deref())) " min read"
                    }
                    @if !post.is_published() { " " span.badge { "draft" } }
                    @if viewer.is_admin() {
                        " · " a href={ "/admin/write/" (post.id) } { "Edit" }
                    }
                }
                @if let Some(url) = &post.url {
                    p { a href=(url) rel="noopener" { (post.domain.as_deref().unwrap_or(url)) " ↗" } }
                }
                (tag_pills(&entry.tags))
            }
            @if let Some(content) = &post.content {
                div.content { (PreEscaped(content)) }
            }
        }
    };

    Ok(Html(layout::page(&state, &viewer, &post.title, body).into_string()))
}
