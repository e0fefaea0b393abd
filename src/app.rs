//! # 라우터 구성
//!
//! `main`과 라우터 테스트가 같은 라우터를 쓰도록 여기서 한 번만 조립합니다.
//!
//! 라우팅 게이트:
//! - 관리 화면(`/admin/*`, `/share`)은 세션이 없으면 `/login`으로 리다이렉트
//! - `/api/upload`는 세션이 없으면 401
//!
//! 나머지 보호 API는 핸들러가 `AuthUser` 추출자로 직접 확인합니다.

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{
    middleware::auth::{require_admin_api, require_admin_page},
    pages,
    routes::{analytics, auth, export, feeds, health, posts, share, tags, title, upload},
    state::AppState,
};

pub fn build_router(state: AppState) -> Router {
    let admin_pages = Router::new()
        .route("/admin", get(pages::admin::dashboard))
        .route("/admin/tags", get(pages::admin::tags_page))
        .route("/admin/write", get(pages::admin::write_page))
        .route("/admin/write/{id}", get(pages::admin::edit_page))
        .route("/admin/export", get(pages::admin::export_page))
        .route("/share", get(pages::share::share_page))
        .route_layer(from_fn_with_state(state.clone(), require_admin_page));

    let public_pages = Router::new()
        .route("/", get(pages::home::home))
        .route("/post/{id}", get(pages::post::show_post))
        .route("/login", get(pages::login::login_page));

    let upload_routes = Router::new()
        .route("/api/upload", post(upload::upload_image))
        .route_layer(from_fn_with_state(state.clone(), require_admin_api))
        // multipart 본문 전체는 10MB까지 받고, 파일 크기(5MB)는 핸들러가 따로 검사합니다.
        .layer(DefaultBodyLimit::max(upload::MAX_BODY_BYTES));

    let api_routes = Router::new()
        .route("/auth/google", get(auth::google_login))
        .route("/auth/google/callback", get(auth::google_callback))
        .route("/auth/logout", post(auth::logout))
        .route("/api/auth/session", get(auth::session))
        .route("/api/health", get(health::health_check))
        .route("/api/posts", get(posts::list_posts).post(posts::create_post))
        .route(
            "/api/posts/{id}",
            get(posts::get_post).put(posts::update_post).delete(posts::delete_post),
        )
        .route("/api/tags", get(tags::list_tags))
        .route("/api/tags/autocomplete", get(tags::autocomplete))
        .route("/api/admin/tags", get(tags::list_admin_tags))
        .route("/api/admin/tags/merge", post(tags::merge_tags))
        .route(
            "/api/admin/tags/{id}",
            put(tags::rename_tag).delete(tags::delete_tag),
        )
        .route("/api/admin/export", get(export::export_data))
        .route("/api/analytics", get(analytics::analytics))
        .route("/api/title", get(title::fetch_page_title))
        .route("/api/share", post(share::share_target))
        .route("/uploads/images/{*path}", get(upload::serve_image))
        .route("/feed/essays", get(feeds::essays_feed))
        .route("/feed/log", get(feeds::log_feed));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(public_pages)
        .merge(admin_pages)
        .merge(upload_routes)
        .merge(api_routes)
        .nest_service("/static", ServeDir::new(&state.config.static_dir))
        .fallback(pages::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
