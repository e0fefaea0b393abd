//! # 에러 처리 모듈
//!
//! API 핸들러가 반환하는 모든 에러를 `AppError` 하나로 모읍니다.
//!
//! | variant | HTTP | 용도 |
//! |---------|------|------|
//! | `BadRequest` | 400 | 필수 입력 누락, 허용되지 않는 값 |
//! | `Unauthorized` | 401 | 세션 없음 / 허용되지 않은 신원 |
//! | `NotFound` | 404 | 글·태그·이미지 없음, 비공개 초안 |
//! | `Conflict` | 409 | 이미 같은 이름의 태그가 있음 |
//! | `Internal`, `Database`, `Io` | 500 | 예상치 못한 실패 (로그만 남기고 일반 메시지 반환) |

// IntoResponse: 핸들러가 `Result<_, AppError>`를 반환할 수 있게 해 주는 axum 트레이트
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
// thiserror: `#[error(...)]`로 Display 구현을 만들어 주는 derive 매크로
use thiserror::Error;

/// API 에러
///
/// `#[error("...")]`의 문자열이 `to_string()` 결과가 됩니다.
/// 클라이언트 에러(4xx)는 이 문자열을 그대로 메시지로 내보내므로
/// 사용자에게 보여도 되는 문장만 담아야 합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 리소스가 없거나, 있어도 보여줄 수 없는 경우 (비공개 초안)
    #[error("Not found")]
    NotFound,

    /// `{0}`: 튜플 variant의 첫 번째 값을 그대로 출력합니다.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    /// 태그 이름 변경이 다른 태그와 겹칠 때 (합치기를 써야 함)
    #[error("{0}")]
    Conflict(String),

    /// 있어서는 안 되는 상태. 방금 쓴 행을 다시 읽지 못한 경우 등
    #[error("Internal error: {0}")]
    Internal(String),

    /// `?`로 sqlx 에러를 바로 전파할 수 있도록 `#[from]`을 붙입니다.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 업로드 파일 쓰기/읽기 실패. 역시 `#[from]`으로 `?` 전파가 됩니다.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// `impl Into<String>`이라 `&str`과 `String` 모두 받습니다.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn unauthorized() -> Self {
        AppError::Unauthorized("Unauthorized".to_string())
    }

    /// (상태 코드, 에러 코드, 클라이언트에 보여줄 메시지)
    ///
    /// 500 계열은 여기서 서버 로그에 원인을 기록하고,
    /// 클라이언트에는 내부 구현이 드러나지 않는 일반 메시지만 돌려줍니다.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                internal()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                internal()
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {}", e);
                internal()
            }
        }
    }
}

/// 500 응답의 공통 내용. 원인은 호출한 쪽에서 이미 로그로 남겼습니다.
fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "Internal server error".to_string(),
    )
}

impl IntoResponse for AppError {
    /// 결과: `{ "error": { "code": "not_found", "message": "Not found" } }`
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        // json! 매크로로 중첩 객체를 바로 만듭니다.
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        // (상태 코드, 본문) 튜플도 IntoResponse를 구현합니다.
        (status, body).into_response()
    }
}
