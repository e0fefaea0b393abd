//! # 관리 화면
//!
//! 모두 `require_admin_page` 뒤에 있습니다. 세션이 없으면 `/login`으로 보냅니다.
//!
//! | 경로 | 화면 |
//! |------|------|
//! | `/admin` | 전체 글 목록(초안 포함) + 조회수 요약 |
//! | `/admin/tags` | 태그 이름 변경 / 합치기 / 삭제 |
//! | `/admin/write` | 새 글 작성 (`?type=ESSAY`로 기본 종류 선택) |
//! | `/admin/write/{id}` | 기존 글 수정 |
//! | `/admin/export` | JSON 내보내기 |
//!
//! 화면은 폼만 그리고, 저장/삭제는 `admin.js`가 JSON API로 처리합니다.

use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use maud::{html, Markup};
use serde::Deserialize;

use super::{layout, layout::display_date, PageError};
use crate::{
    db,
    error::AppError,
    middleware::auth::Viewer,
    models::{PostStatus, PostType, PostWithTags},
    routes::posts::{query_posts, ListPostsQuery},
    state::AppState,
};

pub async fn dashboard(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<ListPostsQuery>,
) -> Result<Html<String>, PageError> {
    let page = query_posts(&state, true, &query).await?;
    let analytics = db::analytics(&state.pool).await?;
    let has_older = page.page.saturating_mul(page.limit) < page.total;

    let body = html! {
        h1 { "Dashboard" }
        div.stats {
            div { strong { (page.total) } " posts" }
            div { strong { (analytics.total_views) } " views" }
        }
        @if !analytics.top_posts.is_empty() {
            h3 { "Most read" }
            ol {
                @for top in &analytics.top_posts {
                    li {
                        a href={ "/post/" (top.id) } { (top.title) }
                        " (" (top.view_count) ")"
                    }
                }
            }
        }
        div.actions {
            a.button href="/admin/write" { "New log entry" }
            a.button href="/admin/write?type=ESSAY" { "New essay" }
            a href="/admin/tags" { "Tags" }
            a href="/admin/export" { "Export" }
        }
        form.search method="get" action="/admin" {
            input type="search" name="search" placeholder="Search all posts" value=[query.search.as_deref()];
        }
        table {
            thead {
                tr { th { "Title" } th { "Type" } th { "Status" } th { "Views" } th { "Created" } th {} }
            }
            tbody {
                @for entry in &page.posts {
                    @let post = &entry.post;
                    tr {
                        td { a href={ "/post/" (post.id) } { (post.title) } }
                        td { (post.post_type.as_str()) }
                        td {
                            @if post.is_published() { "published" } @else { span.badge { "draft" } }
                        }
                        td { (post.view_count) }
                        td { (display_date(&post.created_at)) }
                        td {
                            a href={ "/admin/write/" (post.id) } { "Edit" }
                            " "
                            button.danger type="button" data-delete-post=(post.id) { "Delete" }
                        }
                    }
                }
            }
        }
        nav.pager {
            @if page.page > 1 {
                a href={ "/admin?page=" (page.page - 1) } { "← Newer" }
            } @else { span {} }
            @if has_older {
                a href={ "/admin?page=" (page.page + 1) } { "Older →" }
            }
        }
    };
    Ok(Html(layout::page(&state, &viewer, "Dashboard", body).into_string()))
}

pub async fn tags_page(
    State(state): State<AppState>,
    viewer: Viewer,
) -> Result<Html<String>, PageError> {
    let tags = db::list_tags_with_counts(&state.pool, false).await?;

    let body = html! {
        h1 { "Tags" }
        p.status id="tag-status" {}
        table {
            thead {
                tr { th { "Name" } th { "Posts" } th { "Rename" } th { "Merge into" } th {} }
            }
            tbody {
                @for tag in &tags {
                    tr data-tag-id=(tag.id) {
                        td { (tag.name) }
                        td { (tag.count) }
                        td {
                            form.tag-rename {
                                input type="text" name="name" value=(tag.name) required;
                                button type="submit" { "Rename" }
                            }
                        }
                        td {
                            form.tag-merge {
                                select name="targetId" {
                                    @for other in tags.iter().filter(|t| t.id != tag.id) {
                                        option value=(other.id) { (other.name) }
                                    }
                                }
                                button type="submit" { "Merge" }
                            }
                        }
                        td {
                            // 글에 붙어 있는 태그는 서버가 400으로 거절합니다.
                            button.danger type="button" data-delete-tag=(tag.id) disabled[tag.count > 0] { "Delete" }
                        }
                    }
                }
            }
        }
    };
    Ok(Html(layout::page(&state, &viewer, "Tags", body).into_string()))
}

#[derive(Debug, Default, Deserialize)]
pub struct WriteQuery {
    #[serde(rename = "type")]
    pub post_type: Option<String>,
}

pub async fn write_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<WriteQuery>,
) -> Html<String> {
    let post_type = query
        .post_type
        .as_deref()
        .and_then(|t| t.parse().ok())
        .unwrap_or(PostType::Log);

    let body = html! {
        h1 { "Write" }
        (editor_form(None, post_type, None, None))
    };
    Html(layout::page(&state, &viewer, "Write", body).into_string())
}

pub async fn edit_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    let entry = db::get_post_with_tags(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    let body = html! {
        h1 { "Edit" }
        (editor_form(Some(&entry), entry.post.post_type, None, None))
    };
    Ok(Html(layout::page(&state, &viewer, "Edit", body).into_string()))
}

pub async fn export_page(
    State(state): State<AppState>,
    viewer: Viewer,
) -> Result<Html<String>, PageError> {
    let images = db::list_images(&state.pool).await?;
    let total_bytes: i64 = images.iter().map(|i| i.size_bytes).sum();

    let body = html! {
        h1 { "Export" }
        p { "Download every post, tag and image record as a single JSON file." }
        p { (images.len()) " uploaded images (" (total_bytes / 1024) " KB). Image files themselves stay in the upload directory." }
        div.actions {
            a.button href="/api/admin/export" download { "Download JSON" }
        }
    };
    Ok(Html(layout::page(&state, &viewer, "Export", body).into_string()))
}

/// 글 작성/수정 폼
///
/// `entry`가 있으면 그 값으로 채우고 `data-post-id`를 붙입니다 (저장 시 PUT).
/// 없으면 `post_type`, `title`, `url` 기본값으로 새 글 폼을 만듭니다 (저장 시 POST).
pub fn editor_form(
    entry: Option<&PostWithTags>,
    post_type: PostType,
    title: Option<&str>,
    url: Option<&str>,
) -> Markup {
    let post = entry.map(|e| &e.post);
    let title = post.map(|p| p.title.as_str()).or(title).unwrap_or("");
    let url = post.and_then(|p| p.url.as_deref()).or(url).unwrap_or("");
    let content = post.and_then(|p| p.content.as_deref()).unwrap_or("");
    let status = post.map(|p| p.status).unwrap_or(PostStatus::Draft);
    let tags = entry
        .map(|e| {
            e.tags
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();

    html! {
        form.editor id="post-form" data-post-id=[post.map(|p| p.id.as_str())] {
            label {
                "Type"
                select name="type" {
                    option value="LOG" selected[post_type == PostType::Log] { "Reading log" }
                    option value="ESSAY" selected[post_type == PostType::Essay] { "Essay" }
                }
            }
            label {
                "Title"
                input type="text" name="title" value=(title) required;
            }
            label {
                "URL"
                input type="url" name="url" value=(url) placeholder="https://";
            }
            div.actions {
                button type="button" id="fetch-title" { "Fetch title" }
            }
            label {
                "Tags (comma separated)"
                input type="text" name="tags" value=(tags) list="tag-suggestions" autocomplete="off";
                datalist id="tag-suggestions" {}
            }
            label {
                "Content (HTML)"
                textarea name="content" { (content) }
            }
            label {
                "Image"
                input type="file" id="image-upload" accept="image/jpeg,image/png,image/gif,image/webp";
            }
            label {
                "Status"
                select name="status" {
                    option value="DRAFT" selected[status == PostStatus::Draft] { "Draft" }
                    option value="PUBLISHED" selected[status == PostStatus::Published] { "Published" }
                }
            }
            div.actions {
                button type="submit" { "Save" }
                span.status id="form-status" {}
            }
        }
    }
}
