use crate::error::AppError;
use crate::models::{Image, NewImage};
use sqlx::SqlitePool;

const IMAGE_COLUMNS: &str = "id, filename, path, mime_type, size_bytes, post_id, created_at";

/// 업로드 메타데이터 저장
///
/// `post_id`가 없는 글을 가리키면 외래키 제약 때문에 실패하므로,
/// 호출 쪽에서 미리 존재를 확인합니다.
pub async fn create_image(pool: &SqlitePool, image: &NewImage) -> Result<Image, AppError> {
    let id = uuid::Uuid::now_v7().to_string();

    sqlx::query(
        "INSERT INTO images (id, filename, path, mime_type, size_bytes, post_id) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&image.filename)
    .bind(&image.path)
    .bind(&image.mime_type)
    .bind(image.size_bytes)
    .bind(&image.post_id)
    .execute(pool)
    .await?;

    get_image(pool, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created image".to_string()))
}

pub async fn get_image(pool: &SqlitePool, id: &str) -> Result<Option<Image>, AppError> {
    let image = sqlx::query_as::<_, Image>(&format!("SELECT {IMAGE_COLUMNS} FROM images WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(image)
}

pub async fn list_images(pool: &SqlitePool) -> Result<Vec<Image>, AppError> {
    let images = sqlx::query_as::<_, Image>(&format!(
        "SELECT {IMAGE_COLUMNS} FROM images ORDER BY created_at"
    ))
    .fetch_all(pool)
    .await?;

    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::test_pool;

    #[tokio::test]
    async fn stores_unattached_image() {
        let pool = test_pool().await;
        let image = create_image(
            &pool,
            &NewImage {
                filename: "abc-photo.png".into(),
                path: "/tmp/uploads/abc-photo.png".into(),
                mime_type: "image/png".into(),
                size_bytes: 1024,
                post_id: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(image.mime_type, "image/png");
        assert!(image.post_id.is_none());
        assert_eq!(list_images(&pool).await.unwrap().len(), 1);
    }
}
