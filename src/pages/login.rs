use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use maud::html;

use super::layout;
use crate::{middleware::auth::Viewer, state::AppState};

/// `GET /login`: 이미 로그인했으면 관리 화면으로 보냅니다.
pub async fn login_page(State(state): State<AppState>, viewer: Viewer) -> Response {
    if viewer.is_admin() {
        return Redirect::to("/admin").into_response();
    }

    let body = html! {
        div.message {
            h1 { "Sign in" }
            p { "Only the site owner can sign in." }
            p { a.button href="/auth/google" { "Sign in with Google" } }
        }
    };
    Html(layout::page(&state, &viewer, "Sign in", body).into_string()).into_response()
}

#[cfg(test)]
mod tests {
    use crate::test_support::{body_text, send, test_app};
    use axum::http::{header, Method, StatusCode};

    #[tokio::test]
    async fn login_page_offers_google_and_skips_when_signed_in() {
        let app = test_app().await;
        let html = body_text(send(&app.router, Method::GET, "/login", None, None).await).await;
        assert!(html.contains(r#"href="/auth/google""#));

        let res = send(&app.router, Method::GET, "/login", app.auth(), None).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/admin");
    }
}
