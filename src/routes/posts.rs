//! # 글 API 라우트 핸들러
//!
//! | 메서드 | 경로 | 핸들러 | 인증 |
//! |--------|------|--------|------|
//! | GET | /api/posts | `list_posts` | 선택 (있으면 초안 포함) |
//! | GET | /api/posts/{id} | `get_post` | 선택 (초안은 관리자만) |
//! | POST | /api/posts | `create_post` | 필수 |
//! | PUT | /api/posts/{id} | `update_post` | 필수 |
//! | DELETE | /api/posts/{id} | `delete_post` | 필수 |

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{
    db,
    error::AppError,
    middleware::auth::{AuthUser, Viewer},
    models::*,
    services::{
        search::fts_match_expression,
        text::{search_text, url_and_domain},
    },
    state::AppState,
};

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 50;
/// `page * limit`가 i64 범위를 넘지 않는 가장 큰 페이지 번호
pub const MAX_PAGE: i64 = i64::MAX / MAX_LIMIT;

/// 목록 쿼리 파라미터
///
/// 숫자도 문자열로 받습니다. `page=abc` 같은 값은 400 대신 기본값으로 처리합니다.
#[derive(Debug, Default, Deserialize)]
pub struct ListPostsQuery {
    #[serde(rename = "type")]
    pub post_type: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// `(page, limit)`: page는 1..=`MAX_PAGE`, limit은 1..=50 (기본 20)
///
/// page 상한이 없으면 OFFSET 계산(`(page - 1) * limit`)이 넘칩니다.
pub fn pagination(page: Option<&str>, limit: Option<&str>) -> (i64, i64) {
    let page = page
        .and_then(|p| p.trim().parse::<i64>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_PAGE);
    let limit = limit
        .and_then(|l| l.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_LIMIT)
        .clamp(1, MAX_LIMIT);
    (page, limit)
}

/// `type` 파라미터: 없음/`all` → 필터 없음, `LOG`/`ESSAY` (대소문자 무관), 그 외 400
pub fn type_filter(value: Option<&str>) -> Result<Option<PostType>, AppError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) if v.eq_ignore_ascii_case("all") => Ok(None),
        Some(v) => v
            .parse::<PostType>()
            .map(Some)
            .map_err(|_| AppError::bad_request("type must be LOG, ESSAY or all")),
    }
}

/// 목록 조회 본체. 홈 화면과 API가 함께 씁니다.
pub async fn query_posts(
    state: &AppState,
    is_admin: bool,
    query: &ListPostsQuery,
) -> Result<PostPage, AppError> {
    let (page, limit) = pagination(query.page.as_deref(), query.limit.as_deref());
    let status = if is_admin {
        None
    } else {
        Some(PostStatus::Published)
    };

    let filter = PostFilter {
        post_type: type_filter(query.post_type.as_deref())?,
        tag: query
            .tag
            .as_deref()
            .map(normalize_tag_name)
            .filter(|t| !t.is_empty()),
        status,
        // 정리 후 단어가 하나도 남지 않으면 검색 조건 없이 목록을 보여줍니다.
        search: query.search.as_deref().and_then(fts_match_expression),
    };

    db::list_posts(&state.pool, &filter, page, limit).await
}

/// `GET /api/posts?type=&tag=&search=&page=&limit=`
pub async fn list_posts(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<PostPage>, AppError> {
    let page = query_posts(&state, viewer.is_admin(), &query).await?;
    Ok(Json(page))
}

/// `GET /api/posts/{id}`
///
/// 초안은 관리자가 아니면 존재하지 않는 것처럼 404로 응답합니다.
pub async fn get_post(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<String>,
) -> Result<Json<PostWithTags>, AppError> {
    let post = db::get_post_with_tags(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !post.post.is_published() && !viewer.is_admin() {
        return Err(AppError::NotFound);
    }

    Ok(Json(post))
}

/// `POST /api/posts` → 201
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostWithTags>), AppError> {
    let post_type = req
        .post_type
        .as_deref()
        .ok_or_else(|| AppError::bad_request("type and title are required"))?
        .parse::<PostType>()
        .map_err(|_| AppError::bad_request("type must be LOG or ESSAY"))?;

    let title = req
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::bad_request("type and title are required"))?;

    let status = match req.status.as_deref() {
        None => PostStatus::Published,
        Some(s) => s
            .parse::<PostStatus>()
            .map_err(|_| AppError::bad_request("status must be DRAFT or PUBLISHED"))?,
    };

    let author = db::upsert_user(
        &state.pool,
        &user.email,
        user.name.as_deref(),
        user.image.as_deref(),
    )
    .await?;

    let (url, domain) = url_and_domain(req.url);
    let new = NewPost {
        post_type,
        title,
        search_text: search_text(req.content.as_deref(), domain.as_deref()),
        url,
        domain,
        content: req.content,
        content_markdown: req.content_markdown,
        status,
        author_id: Some(author.id),
        tags: req.tags.unwrap_or_default(),
    };

    let post = db::create_post(&state.pool, &new).await?;
    tracing::info!(id = %post.post.id, post_type = %post.post.post_type, "post created");

    Ok((StatusCode::CREATED, Json(post)))
}

/// 요청 본문을 검증해 `PostPatch`로 바꿉니다.
fn build_patch(req: UpdatePostRequest) -> Result<PostPatch, AppError> {
    let title = match req.title {
        None => None,
        Some(title) => Some(
            title
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .ok_or_else(|| AppError::bad_request("title cannot be empty"))?,
        ),
    };

    let status = req
        .status
        .as_deref()
        .map(|s| {
            s.parse::<PostStatus>()
                .map_err(|_| AppError::bad_request("status must be DRAFT or PUBLISHED"))
        })
        .transpose()?;

    Ok(PostPatch {
        title,
        url: req.url.map(url_and_domain),
        content: req.content,
        content_markdown: req.content_markdown,
        status,
        // `"tags": null`은 모든 태그 해제
        tags: req.tags.map(Option::unwrap_or_default),
    })
}

/// `PUT /api/posts/{id}`
pub async fn update_post(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdatePostRequest>,
) -> Result<Json<PostWithTags>, AppError> {
    let patch = build_patch(req)?;
    let post = db::update_post(&state.pool, &id, &patch)
        .await?
        .ok_or(AppError::NotFound)?;

    tracing::info!(id = %id, "post updated");
    Ok(Json(post))
}

/// `DELETE /api/posts/{id}` → 204
pub async fn delete_post(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if db::delete_post(&state.pool, &id).await? {
        tracing::info!(id = %id, "post deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{body_json, send, test_app, TestApp};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[test]
    fn pagination_defaults_and_clamps() {
        assert_eq!(pagination(None, None), (1, 20));
        assert_eq!(pagination(Some("0"), Some("500")), (1, 50));
        assert_eq!(pagination(Some("3"), Some("0")), (3, 1));
        assert_eq!(pagination(Some("x"), Some("y")), (1, 20));
        assert_eq!(pagination(Some("9223372036854775807"), Some("50")), (MAX_PAGE, 50));
        assert_eq!(pagination(Some("-9223372036854775808"), None), (1, 20));
    }

    #[test]
    fn type_filter_accepts_all_and_rejects_unknown() {
        assert_eq!(type_filter(None).unwrap(), None);
        assert_eq!(type_filter(Some("ALL")).unwrap(), None);
        assert_eq!(type_filter(Some("essay")).unwrap(), Some(PostType::Essay));
        assert!(matches!(type_filter(Some("note")), Err(AppError::BadRequest(_))));
    }

    async fn create(app: &TestApp, body: serde_json::Value) -> serde_json::Value {
        let res = send(&app.router, Method::POST, "/api/posts", app.auth(), Some(body)).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        body_json(res).await
    }

    #[tokio::test]
    async fn writes_require_a_session() {
        let app = test_app().await;
        let res = send(
            &app.router,
            Method::POST,
            "/api/posts",
            None,
            Some(json!({ "type": "LOG", "title": "x" })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = send(&app.router, Method::DELETE, "/api/posts/any", None, None).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_validates_type_title_and_status() {
        let app = test_app().await;
        for body in [
            json!({ "title": "no type" }),
            json!({ "type": "NOTE", "title": "bad type" }),
            json!({ "type": "LOG", "title": "   " }),
            json!({ "type": "LOG", "title": "x", "status": "ARCHIVED" }),
        ] {
            let res = send(&app.router, Method::POST, "/api/posts", app.auth(), Some(body)).await;
            assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn create_derives_domain_and_defaults_to_published() {
        let app = test_app().await;
        let post = create(
            &app,
            json!({
                "type": "LOG",
                "title": "Attention",
                "url": "https://arxiv.org/abs/1706.03762",
                "tags": ["AI", " ai ", "Papers"]
            }),
        )
        .await;

        assert_eq!(post["domain"], "arxiv.org");
        assert_eq!(post["status"], "PUBLISHED");
        assert_eq!(post["viewCount"], 0);
        assert_eq!(post["tags"].as_array().unwrap().len(), 2);
        assert!(post["authorId"].is_string());
    }

    #[tokio::test]
    async fn drafts_are_hidden_from_anonymous_readers() {
        let app = test_app().await;
        let draft = create(&app, json!({ "type": "ESSAY", "title": "WIP", "status": "DRAFT" })).await;
        create(&app, json!({ "type": "LOG", "title": "Public" })).await;
        let id = draft["id"].as_str().unwrap();

        let res = send(&app.router, Method::GET, &format!("/api/posts/{id}"), None, None).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let res = send(&app.router, Method::GET, &format!("/api/posts/{id}"), app.auth(), None).await;
        assert_eq!(res.status(), StatusCode::OK);

        let anon = body_json(send(&app.router, Method::GET, "/api/posts", None, None).await).await;
        assert_eq!(anon["total"], 1);
        let admin = body_json(send(&app.router, Method::GET, "/api/posts", app.auth(), None).await).await;
        assert_eq!(admin["total"], 2);
    }

    #[tokio::test]
    async fn list_filters_by_type_tag_and_search() {
        let app = test_app().await;
        create(&app, json!({ "type": "LOG", "title": "Neural nets", "tags": ["ml"] })).await;
        create(&app, json!({ "type": "ESSAY", "title": "On gardening", "content": "<p>neural soil</p>" })).await;
        create(&app, json!({ "type": "LOG", "title": "Cooking" })).await;

        let get = |uri: &'static str| {
            let router = app.router.clone();
            async move { body_json(send(&router, Method::GET, uri, None, None).await).await }
        };

        assert_eq!(get("/api/posts?type=log").await["total"], 2);
        assert_eq!(get("/api/posts?type=all").await["total"], 3);
        assert_eq!(get("/api/posts?tag=ML").await["total"], 1);
        assert_eq!(get("/api/posts?search=neural!!").await["total"], 2);
        assert_eq!(get("/api/posts?search=neural&type=ESSAY").await["total"], 1);
        assert_eq!(get("/api/posts?search=zebra").await["total"], 0);
        assert_eq!(get("/api/posts?search=!!!").await["total"], 3);

        let res = send(&app.router, Method::GET, "/api/posts?type=video", None, None).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn huge_page_number_returns_an_empty_page() {
        let app = test_app().await;
        create(&app, json!({ "type": "LOG", "title": "Only" })).await;

        let res = send(
            &app.router,
            Method::GET,
            "/api/posts?page=9223372036854775807&limit=50",
            None,
            None,
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let page = body_json(res).await;
        assert_eq!(page["total"], 1);
        assert_eq!(page["page"], MAX_PAGE);
        assert_eq!(page["posts"], json!([]));
    }

    #[tokio::test]
    async fn update_overwrites_fields_and_replaces_tags() {
        let app = test_app().await;
        let post = create(
            &app,
            json!({ "type": "LOG", "title": "Old", "url": "https://a.test/x", "tags": ["a", "b"] }),
        )
        .await;
        let uri = format!("/api/posts/{}", post["id"].as_str().unwrap());

        let res = send(
            &app.router,
            Method::PUT,
            &uri,
            app.auth(),
            Some(json!({ "title": "New", "url": "https://b.test/y", "tags": ["c"] })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let updated = body_json(res).await;
        assert_eq!(updated["title"], "New");
        assert_eq!(updated["domain"], "b.test");
        assert_eq!(updated["tags"][0]["name"], "c");

        let res = send(&app.router, Method::PUT, &uri, app.auth(), Some(json!({ "url": null, "tags": null }))).await;
        let cleared = body_json(res).await;
        assert!(cleared["url"].is_null());
        assert!(cleared["domain"].is_null());
        assert_eq!(cleared["tags"], json!([]));

        let res = send(&app.router, Method::PUT, &uri, app.auth(), Some(json!({ "title": null }))).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = send(&app.router, Method::PUT, "/api/posts/missing", app.auth(), Some(json!({}))).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_is_hard_and_second_delete_is_404() {
        let app = test_app().await;
        let post = create(&app, json!({ "type": "LOG", "title": "Gone" })).await;
        let uri = format!("/api/posts/{}", post["id"].as_str().unwrap());

        let res = send(&app.router, Method::DELETE, &uri, app.auth(), None).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        let res = send(&app.router, Method::DELETE, &uri, app.auth(), None).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let res = send(&app.router, Method::GET, &uri, app.auth(), None).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
