//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 라우트 핸들러(routes/)와 화면(pages/)은 이 모듈의 함수만 호출합니다.
//! 모든 함수는 `&SqlitePool`을 받고 `Result<_, AppError>`를 돌려줍니다.
//!
//! 각 하위 모듈:
//! - `posts`: 글 목록/조회/생성/수정/삭제, 조회수, 통계
//! - `tags`: 태그 목록, 이름 변경, 삭제, 병합, 자동완성
//! - `search`: FTS5 전문검색 조건 (목록 쿼리에 붙는 MATCH 서브쿼리)
//! - `users`: 관리자 사용자 upsert
//! - `images`: 업로드 이미지 메타데이터
//! - `export`: 전체 데이터 내보내기

pub mod export;
pub mod images;
pub mod posts;
pub mod search;
pub mod tags;
pub mod users;

pub use export::*;
pub use images::*;
pub use posts::*;
pub use tags::*;
pub use users::*;

#[cfg(test)]
pub(crate) mod testing {
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    /// 마이그레이션이 적용된 인메모리 DB
    ///
    /// `sqlite::memory:`는 연결마다 별도의 DB이므로 연결 수를 1로 고정합니다.
    pub async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }
}
