//! # FTS5 전문검색(Full-Text Search) 모듈
//!
//! `posts_fts`는 `content='posts'` 외부 콘텐츠 테이블입니다.
//! 인덱스에는 제목(`title`)과 HTML을 제거한 본문 + 도메인(`search_text`)이 들어가고,
//! 마이그레이션의 트리거가 INSERT/UPDATE/DELETE 때마다 인덱스를 맞춥니다.
//!
//! 검색은 별도 쿼리로 id를 모으지 않고, 목록 쿼리의 WHERE 절에 서브쿼리로 붙습니다.
//! 일치하는 글이 아무리 많아도 바인드 변수는 MATCH 식 하나뿐입니다.
//! 정렬은 관련도가 아니라 목록과 같은 최신순입니다.

use sqlx::{QueryBuilder, Sqlite};

/// `posts p`를 대상으로 하는 쿼리에 MATCH 조건을 붙입니다.
///
/// `expression`은 `services::search::fts_match_expression`이 만든 식이어야 합니다.
/// 사용자 입력을 그대로 넘기면 FTS5 문법 오류가 날 수 있습니다.
pub fn push_match<'a>(qb: &mut QueryBuilder<'a, Sqlite>, expression: &'a str) {
    qb.push(" AND p.rowid IN (SELECT rowid FROM posts_fts WHERE posts_fts MATCH ")
        .push_bind(expression)
        .push(")");
}
