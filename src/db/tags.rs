//! # 태그 데이터베이스 쿼리 모듈
//!
//! 태그 목록/이름 변경/삭제/합치기/자동완성, 그리고 글-태그 연결을 다룹니다.
//! 태그는 따로 만드는 API가 없고, 글을 저장할 때 이름으로 upsert 됩니다.
//!
//! ## 테이블 구조
//! - `tags`: 태그 엔티티 (id, name). `name`은 UNIQUE이며 항상 정규화된 소문자
//! - `post_tags`: 글과 태그의 다대다(N:M) 관계. 태그 쪽은 `ON DELETE RESTRICT`
//!
//! 글 저장 시 태그 연결(`set_post_tags`)은 글 쓰기와 같은 트랜잭션에서 실행되어야 하므로
//! 풀이 아닌 `&mut SqliteConnection`을 받습니다.

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use crate::error::AppError;
use crate::models::*;

/// 자동완성 결과 최대 개수
pub const AUTOCOMPLETE_LIMIT: i64 = 10;

/// 태그 목록과 각 태그에 연결된 글 수
///
/// `published_only`가 true면 공개된 글만 셉니다. (공개 태그 목록)
/// 연결된 글이 없는 태그도 count 0으로 포함됩니다.
///
/// 두 쿼리 모두 LEFT JOIN이라 연결이 없는 태그도 한 행으로 남습니다.
/// `COUNT(column)`은 NULL을 세지 않으므로 그런 태그는 0이 됩니다.
pub async fn list_tags_with_counts(
    pool: &SqlitePool,
    published_only: bool,
) -> Result<Vec<TagWithCount>, AppError> {
    let sql = if published_only {
        r#"
        SELECT t.id, t.name, COUNT(p.id) AS count
        FROM tags t
        LEFT JOIN post_tags pt ON pt.tag_id = t.id
        -- 상태 조건을 WHERE가 아니라 ON에 두어야 초안만 있는 태그가 사라지지 않습니다.
        LEFT JOIN posts p ON p.id = pt.post_id AND p.status = 'PUBLISHED'
        GROUP BY t.id, t.name
        ORDER BY t.name
        "#
    } else {
        r#"
        SELECT t.id, t.name, COUNT(pt.post_id) AS count
        FROM tags t
        LEFT JOIN post_tags pt ON pt.tag_id = t.id
        GROUP BY t.id, t.name
        ORDER BY t.name
        "#
    };

    // query_as는 결과 행을 FromRow를 구현한 구조체로 바로 옮깁니다.
    let tags = sqlx::query_as::<_, TagWithCount>(sql).fetch_all(pool).await?;
    Ok(tags)
}

/// 모든 태그를 이름순으로 (내보내기용)
pub async fn list_tags(pool: &SqlitePool) -> Result<Vec<Tag>, AppError> {
    let tags = sqlx::query_as::<_, Tag>(
        "SELECT id, name, created_at, updated_at FROM tags ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(tags)
}

/// id로 태그 하나를 조회합니다.
///
/// 없을 수 있는 행이라 `fetch_one` 대신 `fetch_optional`을 씁니다. (0행이면 `None`)
pub async fn get_tag(pool: &SqlitePool, id: &str) -> Result<Option<Tag>, AppError> {
    let tag = sqlx::query_as::<_, Tag>(
        "SELECT id, name, created_at, updated_at FROM tags WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(tag)
}

/// 태그 이름 변경 결과
///
/// 라우트 핸들러가 이 값을 200 / 404 / 409로 바꿉니다.
#[derive(Debug)]
pub enum RenameOutcome {
    Renamed(Tag),
    NotFound,
    /// 다른 태그가 이미 그 이름을 쓰고 있음 (병합을 써야 함)
    Conflict,
}

/// 태그 이름을 바꿉니다. `name`은 이미 정규화되어 있어야 합니다.
///
/// 같은 태그에 같은 이름을 다시 주는 것은 충돌이 아닙니다.
///
/// 이름 중복은 미리 조회하지 않고 `tags.name`의 UNIQUE 제약으로 판단합니다.
/// 두 요청이 동시에 같은 이름으로 바꿔도 늦은 쪽은 500이 아니라 `Conflict`가 됩니다.
pub async fn rename_tag(pool: &SqlitePool, id: &str, name: &str) -> Result<RenameOutcome, AppError> {
    let result = sqlx::query(
        "UPDATE tags SET name = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?",
    )
    .bind(name)
    .bind(id)
    .execute(pool)
    .await;

    // 매치 가드(`if ...`)로 성공/실패 안에서 한 번 더 나눕니다.
    // 같은 이름을 다시 줘도 SQLite는 그 행을 "변경된 행"으로 셉니다.
    match result {
        Ok(done) if done.rows_affected() == 0 => return Ok(RenameOutcome::NotFound),
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => return Ok(RenameOutcome::Conflict),
        Err(e) => return Err(e.into()),
    }

    let tag = get_tag(pool, id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve renamed tag".to_string()))?;
    Ok(RenameOutcome::Renamed(tag))
}

/// UNIQUE 제약 위반인지 확인합니다.
///
/// `as_database_error`는 DB가 돌려준 에러일 때만 `Some`입니다.
/// 연결 끊김 같은 다른 에러는 그대로 500으로 올라갑니다.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|d| d.is_unique_violation())
}

/// 태그 삭제 결과
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteTagOutcome {
    Deleted,
    NotFound,
    /// 아직 연결된 글이 있음. 연결 수를 함께 돌려줍니다.
    InUse(i64),
}

/// 연결된 글이 하나도 없는 태그만 삭제합니다.
///
/// 연결이 남아 있으면 `post_tags`의 RESTRICT 때문에 어차피 DELETE가 실패하지만,
/// 먼저 세어 보면 몇 개의 글이 쓰고 있는지 에러 메시지에 담을 수 있습니다.
pub async fn delete_tag(pool: &SqlitePool, id: &str) -> Result<DeleteTagOutcome, AppError> {
    if get_tag(pool, id).await?.is_none() {
        return Ok(DeleteTagOutcome::NotFound);
    }

    let usage: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM post_tags WHERE tag_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if usage > 0 {
        return Ok(DeleteTagOutcome::InUse(usage));
    }

    sqlx::query("DELETE FROM tags WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(DeleteTagOutcome::Deleted)
}

/// source 태그를 target 태그로 합칩니다.
///
/// 1. source가 붙은 글 중 target이 아직 없는 글에 target 연결 추가
/// 2. source 연결 전부 삭제
/// 3. source 태그 삭제
///
/// 세 단계를 하나의 트랜잭션으로 실행하므로 중간에 실패하면 아무것도 바뀌지 않습니다.
/// 반환값은 target으로 새로 옮겨진 글 수입니다.
pub async fn merge_tags(pool: &SqlitePool, source_id: &str, target_id: &str) -> Result<u64, AppError> {
    // begin()으로 트랜잭션을 열고, 아래 쿼리는 모두 `&mut *tx`로 실행합니다.
    // commit 전에 `?`로 빠져나가면 tx가 drop되면서 자동으로 롤백됩니다.
    let mut tx = pool.begin().await?;

    // (post_id, tag_id)가 기본 키라서 이미 target이 붙은 글은 INSERT OR IGNORE가 건너뜁니다.
    let moved = sqlx::query(
        r#"
        INSERT OR IGNORE INTO post_tags (post_id, tag_id)
        SELECT post_id, ? FROM post_tags WHERE tag_id = ?
        "#,
    )
    .bind(target_id)
    .bind(source_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    sqlx::query("DELETE FROM post_tags WHERE tag_id = ?")
        .bind(source_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM tags WHERE id = ?")
        .bind(source_id)
        .execute(&mut *tx)
        .await?;

    // target의 updated_at도 갱신
    sqlx::query("UPDATE tags SET updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?")
        .bind(target_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(moved)
}

/// 접두사로 태그 이름을 찾습니다. `prefix`는 정규화된 값이어야 합니다.
///
/// LIKE 와일드카드(`%`, `_`)와 이스케이프 문자(`\`)는 글자 그대로 비교됩니다.
pub async fn autocomplete_tags(pool: &SqlitePool, prefix: &str) -> Result<Vec<TagSuggestion>, AppError> {
    let pattern = format!("{}%", escape_like(prefix));

    let tags = sqlx::query_as::<_, TagSuggestion>(
        r"SELECT id, name FROM tags WHERE name LIKE ? ESCAPE '\' ORDER BY name LIMIT ?",
    )
    .bind(pattern)
    .bind(AUTOCOMPLETE_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(tags)
}

/// `50%_off` → `50\%\_off`
fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// 이름으로 태그를 찾고, 없으면 만듭니다.
///
/// `&mut SqliteConnection`을 받으므로 트랜잭션(`&mut *tx`) 안에서도,
/// 풀에서 빌린 연결로도 호출할 수 있습니다.
pub async fn upsert_tag(conn: &mut SqliteConnection, name: &str) -> Result<Tag, AppError> {
    // UUIDv7: 앞부분이 타임스탬프라 생성 순서대로 정렬됩니다.
    let id = uuid::Uuid::now_v7().to_string();

    // 이미 있으면 아무것도 하지 않고, 아래 SELECT가 기존 행을 읽습니다.
    sqlx::query("INSERT INTO tags (id, name) VALUES (?, ?) ON CONFLICT(name) DO NOTHING")
        .bind(&id)
        .bind(name)
        .execute(&mut *conn)
        .await?;

    let tag = sqlx::query_as::<_, Tag>(
        "SELECT id, name, created_at, updated_at FROM tags WHERE name = ?",
    )
    .bind(name)
    .fetch_one(&mut *conn)
    .await?;

    Ok(tag)
}

/// 글의 태그 연결을 `names`로 통째로 교체합니다. (빈 목록이면 모두 해제)
pub async fn set_post_tags(
    conn: &mut SqliteConnection,
    post_id: &str,
    names: &[String],
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
        .bind(post_id)
        .execute(&mut *conn)
        .await?;

    // 정규화(trim + 소문자) 후 중복과 빈 이름을 걸러낸 목록
    for name in normalize_tag_names(names) {
        let tag = upsert_tag(conn, &name).await?;
        sqlx::query("INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)")
            .bind(post_id)
            .bind(&tag.id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// 글 하나의 태그 (이름순)
pub async fn tags_for_post(pool: &SqlitePool, post_id: &str) -> Result<Vec<Tag>, AppError> {
    let tags = sqlx::query_as::<_, Tag>(
        r#"
        SELECT t.id, t.name, t.created_at, t.updated_at
        FROM tags t
        JOIN post_tags pt ON pt.tag_id = t.id
        WHERE pt.post_id = ?
        ORDER BY t.name
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await?;

    Ok(tags)
}

/// JOIN 결과 한 행. `#[sqlx(flatten)]`은 나머지 컬럼을 `Tag`의 FromRow로 읽습니다.
#[derive(sqlx::FromRow)]
struct PostTagRow {
    post_id: String,
    #[sqlx(flatten)]
    tag: Tag,
}

/// 모든 글의 태그 연결 (내보내기용)
///
/// 글 수만큼 바인드 변수를 쓰는 `tags_for_posts`와 달리 글이 아무리 많아도 쿼리 하나입니다.
pub async fn all_post_tags(pool: &SqlitePool) -> Result<HashMap<String, Vec<Tag>>, AppError> {
    let rows = sqlx::query_as::<_, PostTagRow>(
        r#"
        SELECT pt.post_id, t.id, t.name, t.created_at, t.updated_at
        FROM post_tags pt
        JOIN tags t ON t.id = pt.tag_id
        ORDER BY t.name
        "#,
    )
    .fetch_all(pool)
    .await?;

    // entry().or_default(): 키가 없으면 빈 Vec을 넣고 그 Vec에 push
    let mut map: HashMap<String, Vec<Tag>> = HashMap::new();
    for row in rows {
        map.entry(row.post_id).or_default().push(row.tag);
    }
    Ok(map)
}

/// 한 페이지 분량 글의 태그를 한 번의 쿼리로 가져옵니다. (목록 화면의 N+1 쿼리 방지)
pub async fn tags_for_posts(
    pool: &SqlitePool,
    post_ids: &[String],
) -> Result<HashMap<String, Vec<Tag>>, AppError> {
    let mut map: HashMap<String, Vec<Tag>> = HashMap::new();
    if post_ids.is_empty() {
        return Ok(map);
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        r#"
        SELECT pt.post_id, t.id, t.name, t.created_at, t.updated_at
        FROM post_tags pt
        JOIN tags t ON t.id = pt.tag_id
        WHERE pt.post_id IN (
        "#,
    );
    // separated(): push_bind 사이에 ", "를 넣어 `IN (?, ?, ?)`를 만듭니다.
    // post_ids는 목록 한 페이지(최대 50개)라 바인드 변수 상한에 닿지 않습니다.
    let mut separated = qb.separated(", ");
    for id in post_ids {
        separated.push_bind(id.as_str());
    }
    separated.push_unseparated(") ORDER BY t.name");

    let rows = qb.build_query_as::<PostTagRow>().fetch_all(pool).await?;
    for row in rows {
        map.entry(row.post_id).or_default().push(row.tag);
    }

    Ok(map)
}
