//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수(또는 `.env` 파일)에서 서버 설정값을 읽어옵니다.
//! 서버 시작 시 한 번 읽고, 이후에는 `AppState` 안의 `Arc<Config>`로 공유됩니다.
//!
//! 필수 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (예: `sqlite:commonplace.db`)
//! - `SESSION_SECRET`: 세션 JWT 서명 비밀키
//! - `ALLOWED_EMAIL`: 관리자 화면에 로그인할 수 있는 유일한 이메일
//! - `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`: Google OAuth 자격 증명
//!
//! 선택 항목 (기본값 있음):
//! - `UPLOAD_DIR`: 업로드 이미지 저장 디렉토리 (`./uploads/images`)
//! - `STATIC_DIR`: 정적 파일 디렉토리 (`./static`)
//! - `SITE_URL`: 외부에서 보이는 사이트 주소 (`http://localhost:3000`)
//! - `SITE_NAME`: 사이트 이름 (`Commonplace`)
//! - `HOST`, `PORT`: 바인딩 주소 (`0.0.0.0`, `3000`)

// anyhow::Context: Result에 "무엇을 하다가 실패했는지" 메시지를 덧붙이는 트레이트
use anyhow::Context;
use std::env;

/// 애플리케이션 전체 설정
///
/// 값은 모두 소유된 `String`입니다. 요청마다 환경변수를 다시 읽지 않습니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// sqlx 연결 문자열. `sqlite::memory:`도 가능합니다. (테스트)
    pub database_url: String,
    /// 세션 쿠키에 담기는 JWT의 HS256 서명 키
    pub session_secret: String,
    /// 로그인이 허용되는 단 하나의 신원
    ///
    /// 비교할 때 대소문자를 무시하도록 읽을 때 소문자로 바꿔 둡니다.
    pub allowed_email: String,
    pub google_client_id: String,
    pub google_client_secret: String,
    /// 업로드 파일 루트. `/uploads/images/{*path}` 요청은 이 디렉토리 밖으로 나갈 수 없습니다.
    pub upload_dir: String,
    /// `/static` 아래로 서빙되는 디렉토리 (admin.js, 스타일)
    pub static_dir: String,
    /// 끝의 `/`는 제거된 상태로 저장됩니다. RSS 링크, OAuth redirect_uri에 사용
    pub site_url: String,
    /// 페이지 제목, 피드 채널 제목에 쓰입니다.
    pub site_name: String,
    pub host: String,
    /// u16이라 범위를 벗어난 값은 파싱 단계에서 걸러집니다.
    pub port: u16,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// 필수 환경변수가 빠져 있으면 어떤 변수가 없는지 알려주는 에러를 반환합니다.
    /// 선택 항목은 없거나 잘못된 값이면 조용히 기본값을 씁니다.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            // 필수 항목: `?`로 첫 번째 누락에서 바로 멈춥니다.
            database_url: required("DATABASE_URL")?,
            session_secret: required("SESSION_SECRET")?,
            allowed_email: required("ALLOWED_EMAIL")?.trim().to_lowercase(),
            google_client_id: required("GOOGLE_CLIENT_ID")?,
            google_client_secret: required("GOOGLE_CLIENT_SECRET")?,

            // 선택 항목: unwrap_or_else의 클로저는 변수가 없을 때만 실행됩니다.
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads/images".to_string()),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "./static".to_string()),
            // "https://example.com/" → "https://example.com"
            // 경로를 붙일 때 `{site_url}/post/{id}` 형태로 쓰기 위해서입니다.
            site_url: env::var("SITE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .trim_end_matches('/')
                .to_string(),
            site_name: env::var("SITE_NAME").unwrap_or_else(|_| "Commonplace".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            // "abc"나 "70000"처럼 u16으로 파싱되지 않으면 3000
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
        })
    }
}

/// 필수 환경변수를 읽습니다. 없으면 `"{KEY} must be set"` 에러
fn required(key: &str) -> anyhow::Result<String> {
    // with_context는 에러가 났을 때만 클로저를 실행해 메시지를 만듭니다.
    env::var(key).with_context(|| format!("{key} must be set"))
}
