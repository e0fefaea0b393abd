//! # Commonplace 웹 서버 진입점
//!
//! 바이너리가 시작되면 `main()`이 아래 순서로 서버를 준비합니다.
//!
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 연결 풀 생성 + 마이그레이션
//! 4. 업로드 디렉토리 생성
//! 5. 라우터 조립 후 HTTP 서버 시작
//!
//! 라우트 목록은 `app.rs`에 있습니다. 테스트도 같은 `build_router`를 쓰기 때문에
//! 여기에는 "프로세스를 띄우는 일"만 남겨 둡니다.

// ── 모듈 선언 ──
// 파일 하나가 모듈 하나입니다. `mod db;`는 `db/mod.rs`를 가져옵니다.
mod app;
mod config;
mod db;
mod error;
mod middleware;
mod models;
mod pages;
mod routes;
mod services;
mod state;
// 라우터 테스트용 헬퍼는 `cargo test`로 빌드할 때만 포함됩니다.
#[cfg(test)]
mod test_support;

use std::path::Path;
use std::str::FromStr; // SqliteConnectOptions::from_str

use anyhow::Result; // 에러 종류와 상관없이 `?`로 올릴 수 있는 Result
use config::Config;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// #[tokio::main]은 tokio 런타임을 만들고 그 안에서 async main을 실행합니다.
#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 ──
    // .env가 없어도 실제 환경변수로 실행할 수 있습니다. (배포 환경)
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅 ──
    // RUST_LOG가 있으면 그 값을, 없으면 이 크레이트와 tower_http를 debug로 봅니다.
    // tower_http의 로그는 TraceLayer가 남기는 요청/응답 한 줄씩입니다.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "commonplace=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer()) // 터미널 출력
        .init();

    // ── 3단계: 설정 ──
    // 필수 값(DATABASE_URL, SESSION_SECRET, ALLOWED_EMAIL, Google 자격 증명)이 없으면
    // 어떤 키가 빠졌는지 담은 에러로 바로 종료합니다.
    let config = Config::from_env()?;
    tracing::info!("Starting Commonplace on {}:{}", config.host, config.port);

    // ── 4단계: SQLite 연결 풀 ──
    // create_if_missing: DB 파일이 없으면 새로 만듭니다. (첫 실행)
    // foreign_keys: SQLite는 연결마다 외래 키 검사를 켜야 합니다.
    //   post_tags의 CASCADE(글 삭제 시 연결 삭제)와 RESTRICT(사용 중인 태그 삭제 거부)가
    //   이 설정에 기대고 있습니다.
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5) // 1인 사이트라 동시 연결은 많지 않습니다.
        .connect_with(options)
        .await?;

    // ── 5단계: 마이그레이션 ──
    // migrate!는 컴파일 시점에 ./migrations의 SQL을 바이너리에 넣습니다.
    // 이미 적용된 파일은 건너뛰므로 매번 실행해도 안전합니다.
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    // ── 6단계: 업로드 디렉토리 ──
    // 업로드 핸들러도 쓰기 전에 만들지만, 서빙(GET)이 먼저 오면
    // canonicalize가 실패해 404만 나므로 시작할 때 만들어 둡니다.
    let upload_dir = Path::new(&config.upload_dir);
    if !upload_dir.exists() {
        tokio::fs::create_dir_all(upload_dir).await?; // mkdir -p
        tracing::info!("Created upload directory: {}", config.upload_dir);
    }

    // ── 7단계: 상태 + 라우터 ──
    // AppState는 풀, 설정, 제목 가져오기용 HTTP 클라이언트를 담습니다.
    // 모두 내부가 Arc라서 핸들러마다 clone해도 실제 자원은 하나입니다.
    // config가 AppState로 옮겨가기 전에 바인딩 주소를 먼저 만들어 둡니다.
    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(pool, config)?;
    let app = app::build_router(state);

    // ── 8단계: 서버 시작 ──
    // serve는 프로세스가 종료될 때까지 돌아오지 않습니다.
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
