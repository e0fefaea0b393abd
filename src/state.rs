//! 모든 핸들러가 공유하는 애플리케이션 상태

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀 (내부적으로 Arc로 공유)
    pub pool: SqlitePool,
    pub config: Arc<Config>,
    /// OAuth 토큰 교환과 링크 제목 가져오기에 쓰는 HTTP 클라이언트
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("Mozilla/5.0 (compatible; CommonplaceBot/", env!("CARGO_PKG_VERSION"), ")"))
            .timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            pool,
            config: Arc::new(config),
            http,
        })
    }
}
