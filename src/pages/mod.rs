//! # 서버 렌더링 화면
//!
//! 모든 화면은 [maud](https://maud.lambda.xyz/)로 렌더링합니다.
//! 동적으로 끼워 넣는 값은 자동으로 이스케이프되며, 예외는 저자가 쓴 글 본문(HTML)뿐입니다.
//!
//! - 공개 화면: `home`(피드), `post`(글 하나), `login`, 404
//! - 관리 화면: `admin`(대시보드, 태그 관리, 글쓰기, 내보내기), `share`
//!
//! 관리 화면의 버튼/폼 동작은 `static/admin.js`가 JSON API를 호출해 처리합니다.

pub mod admin;
pub mod components;
pub mod home;
pub mod layout;
pub mod login;
pub mod post;
pub mod share;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::error::AppError;

/// 화면 핸들러용 에러. JSON 대신 HTML 에러 페이지로 응답합니다.
#[derive(Debug)]
pub struct PageError(pub AppError);

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        PageError(err)
    }
}

impl From<sqlx::Error> for PageError {
    fn from(err: sqlx::Error) -> Self {
        PageError(AppError::Database(err))
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let (status, _, message) = self.0.parts();
        let title = match status {
            StatusCode::NOT_FOUND => "Page not found",
            StatusCode::BAD_REQUEST => "Bad request",
            StatusCode::UNAUTHORIZED => "Sign in required",
            _ => "Something went wrong",
        };
        message_page(status, title, &message)
    }
}

/// 제목과 한 줄 설명만 있는 단독 페이지
pub fn message_page(status: StatusCode, title: &str, message: &str) -> Response {
    (status, Html(layout::message(title, message).into_string())).into_response()
}

/// 라우터의 fallback: 어떤 경로에도 맞지 않는 요청
pub async fn not_found() -> Response {
    message_page(
        StatusCode::NOT_FOUND,
        "Page not found",
        "The page you were looking for does not exist.",
    )
}
