use crate::error::AppError;
use crate::models::User;
use sqlx::SqlitePool;

/// 이메일로 사용자를 찾아 이름/프로필 이미지를 갱신하거나 새로 만듭니다.
///
/// 세션은 서명된 토큰뿐이라 로그인만으로는 DB 행이 생기지 않습니다.
/// 글을 처음 쓸 때 이 함수로 작성자 행을 확보합니다.
pub async fn upsert_user(
    pool: &SqlitePool,
    email: &str,
    name: Option<&str>,
    image: Option<&str>,
) -> Result<User, AppError> {
    let id = uuid::Uuid::now_v7().to_string();

    sqlx::query(
        r#"
        INSERT INTO users (id, email, name, image)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(email) DO UPDATE SET
            name = excluded.name,
            image = excluded.image,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        "#,
    )
    .bind(&id)
    .bind(email)
    .bind(name)
    .bind(image)
    .execute(pool)
    .await?;

    get_user_by_email(pool, email)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve upserted user".to_string()))
}

pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, name, image, created_at, updated_at FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::test_pool;

    #[tokio::test]
    async fn upsert_keeps_one_row_per_email() {
        let pool = test_pool().await;
        let first = upsert_user(&pool, "me@example.com", Some("Me"), None).await.unwrap();
        let second = upsert_user(&pool, "me@example.com", Some("New name"), Some("pic.png"))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.name.as_deref(), Some("New name"));
        assert_eq!(second.image.as_deref(), Some("pic.png"));
    }
}
