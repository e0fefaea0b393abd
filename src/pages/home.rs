//! 홈 피드 (`GET /`)
//!
//! 쿼리 파라미터는 `GET /api/posts`와 같습니다 (`type`, `tag`, `search`, `page`).
//! 무한 스크롤 대신 "Older" / "Newer" 링크로 페이지를 넘깁니다.

use axum::{
    extract::{Query, State},
    response::Html,
};
use maud::html;

use super::{
    components::{post_entry, tag_sidebar},
    layout, PageError,
};
use crate::{
    db,
    middleware::auth::Viewer,
    models::{normalize_tag_name, PostType},
    routes::posts::{query_posts, type_filter, ListPostsQuery},
    state::AppState,
};

/// 현재 필터를 유지한 홈 주소
fn home_href(post_type: Option<PostType>, tag: Option<&str>, search: Option<&str>, page: i64) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if let Some(post_type) = post_type {
        query.append_pair("type", post_type.as_str());
    }
    if let Some(tag) = tag {
        query.append_pair("tag", tag);
    }
    if let Some(search) = search {
        query.append_pair("search", search);
    }
    if page > 1 {
        query.append_pair("page", &page.to_string());
    }
    let query = query.finish();
    if query.is_empty() {
        "/".to_string()
    } else {
        format!("/?{query}")
    }
}

pub async fn home(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<ListPostsQuery>,
) -> Result<Html<String>, PageError> {
    let page = query_posts(&state, viewer.is_admin(), &query).await?;
    let tags = db::list_tags_with_counts(&state.pool, true).await?;

    let active_type = type_filter(query.post_type.as_deref())?;
    let tag = query
        .tag
        .as_deref()
        .map(normalize_tag_name)
        .filter(|t| !t.is_empty());
    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let has_older = page.page.saturating_mul(page.limit) < page.total;
    let href = |post_type: Option<PostType>, page: i64| home_href(post_type, tag.as_deref(), search, page);

    let body = html! {
        div.layout {
            section {
                nav.tabs {
                    a.active[active_type.is_none()] href=(href(None, 1)) { "All" }
                    a.active[active_type == Some(PostType::Log)] href=(href(Some(PostType::Log), 1)) { "Reading log" }
                    a.active[active_type == Some(PostType::Essay)] href=(href(Some(PostType::Essay), 1)) { "Essays" }
                }
                form.search method="get" action="/" {
                    @if let Some(post_type) = active_type {
                        input type="hidden" name="type" value=(post_type.as_str());
                    }
                    @if let Some(tag) = &tag {
                        input type="hidden" name="tag" value=(tag);
                    }
                    input type="search" name="search" placeholder="Search" value=[search];
                }
                @if let Some(tag) = &tag {
                    p.status { "Tagged " strong { (tag) } " · " a href=(home_href(active_type, None, search, 1)) { "clear" } }
                }
                @if page.posts.is_empty() {
                    p.status { "Nothing here yet." }
                }
                @for entry in &page.posts {
                    (post_entry(entry, viewer.is_admin()))
                }
                div.pager {
                    span {
                        @if page.page > 1 {
                            a href=(href(active_type, page.page - 1)) { "← Newer" }
                        }
                    }
                    span {
                        @if has_older {
                            a href=(href(active_type, page.page + 1)) { "Older →" }
                        }
                    }
                }
            }
            (tag_sidebar(&tags, tag.as_deref()))
        }
    };

    Ok(Html(layout::page(&state, &viewer, "", body).into_string()))
}
