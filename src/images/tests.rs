//! Tests for the images module
//!
//! These tests verify:
//! - Store create/list/purge semantics over an in-memory database
//! - Per-user isolation and newest-first ordering
//! - Generation request validation and defaults
//! - The camelCase wire format of records

#[cfg(test)]
mod tests {
    use super::super::models::{
        GenerateRequest, Image, NewImage, DEFAULT_CFG_SCALE, DEFAULT_DIMENSION, DEFAULT_STEPS,
    };
    use super::super::store::ImageStore;
    use super::super::validators::GenerateRequestValidator;
    use crate::common::{generate_image_id, generate_user_id, migrations, Validator};
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    async fn setup_test_db() -> SqlitePool {
        // Single connection so every query sees the same in-memory database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        migrations::create_tables(&pool).await.unwrap();
        pool
    }

    async fn insert_user(pool: &SqlitePool, email: &str) -> String {
        let id = generate_user_id();
        sqlx::query("INSERT INTO users (id, email) VALUES (?, ?)")
            .bind(&id)
            .bind(email)
            .execute(pool)
            .await
            .unwrap();
        id
    }

    fn new_image(user_id: &str, prompt: &str, seed: Option<i64>) -> NewImage {
        let id = generate_image_id();
        let file_name = format!("img_{}.png", id);
        NewImage {
            id,
            user_id: user_id.to_string(),
            prompt: prompt.to_string(),
            steps: DEFAULT_STEPS,
            cfg_scale: DEFAULT_CFG_SCALE,
            seed,
            width: DEFAULT_DIMENSION,
            height: DEFAULT_DIMENSION,
            url: format!("/uploads/{}", file_name),
            file_name,
        }
    }

    // ---- Store ----

    #[tokio::test]
    async fn test_create_returns_full_record() {
        let pool = setup_test_db().await;
        let store = ImageStore::new(pool.clone());
        let user_id = insert_user(&pool, "alice@example.com").await;

        let record = store
            .create(new_image(&user_id, "a red bicycle", None))
            .await
            .unwrap();

        assert_eq!(record.prompt, "a red bicycle");
        assert_eq!(record.user_id, user_id);
        assert_eq!(record.steps, 30);
        assert_eq!(record.cfg_scale, 7.0);
        assert_eq!(record.width, 1024);
        assert_eq!(record.height, 1024);
        assert_eq!(record.seed, None);
        assert!(record.url.starts_with("/uploads/"));
        assert!(record.created_at.is_some(), "created_at must be stamped");
    }

    #[tokio::test]
    async fn test_seed_round_trip() {
        let pool = setup_test_db().await;
        let store = ImageStore::new(pool.clone());
        let user_id = insert_user(&pool, "alice@example.com").await;

        let record = store
            .create(new_image(&user_id, "dunes at dusk", Some(42)))
            .await
            .unwrap();

        assert_eq!(record.seed, Some(42));
    }

    #[tokio::test]
    async fn test_list_by_user_excludes_other_users() {
        let pool = setup_test_db().await;
        let store = ImageStore::new(pool.clone());
        let alice = insert_user(&pool, "alice@example.com").await;
        let bob = insert_user(&pool, "bob@example.com").await;

        store.create(new_image(&alice, "alice one", None)).await.unwrap();
        store.create(new_image(&bob, "bob one", None)).await.unwrap();
        store.create(new_image(&alice, "alice two", None)).await.unwrap();

        let alice_images = store.list_by_user(&alice).await.unwrap();
        assert_eq!(alice_images.len(), 2);
        assert!(alice_images.iter().all(|i| i.user_id == alice));

        let bob_images = store.list_by_user(&bob).await.unwrap();
        assert_eq!(bob_images.len(), 1);
        assert_eq!(bob_images[0].prompt, "bob one");
    }

    #[tokio::test]
    async fn test_list_by_user_newest_first() {
        let pool = setup_test_db().await;
        let store = ImageStore::new(pool.clone());
        let user_id = insert_user(&pool, "alice@example.com").await;

        // All three rows usually land in the same clock second; the rowid
        // tiebreak must still put the latest insert first.
        for prompt in ["first", "second", "third"] {
            store.create(new_image(&user_id, prompt, None)).await.unwrap();
        }

        let images = store.list_by_user(&user_id).await.unwrap();
        let prompts: Vec<&str> = images.iter().map(|i| i.prompt.as_str()).collect();
        assert_eq!(prompts, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_purge_all_counts_and_empties() {
        let pool = setup_test_db().await;
        let store = ImageStore::new(pool.clone());
        let user_id = insert_user(&pool, "alice@example.com").await;

        for prompt in ["one", "two", "three"] {
            store.create(new_image(&user_id, prompt, None)).await.unwrap();
        }

        assert_eq!(store.purge_all().await.unwrap(), 3);
        assert!(store.list_by_user(&user_id).await.unwrap().is_empty());
        assert_eq!(store.purge_all().await.unwrap(), 0);
    }

    // ---- Validation ----

    #[test]
    fn test_empty_prompt_rejected() {
        let request = GenerateRequest {
            prompt: Some("".to_string()),
            cfg_scale: None,
            steps: None,
            seed: None,
            width: None,
            height: None,
        };

        let result = GenerateRequestValidator.validate(&request);
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].field, "prompt");
    }

    #[test]
    fn test_missing_prompt_rejected() {
        let request = GenerateRequest {
            prompt: None,
            cfg_scale: None,
            steps: None,
            seed: None,
            width: None,
            height: None,
        };

        assert!(!GenerateRequestValidator.validate(&request).is_valid);
    }

    #[test]
    fn test_default_parameters_pass_validation() {
        let request = GenerateRequest {
            prompt: Some("a red bicycle".to_string()),
            cfg_scale: None,
            steps: None,
            seed: None,
            width: None,
            height: None,
        };

        assert!(GenerateRequestValidator.validate(&request).is_valid);
    }

    #[test]
    fn test_unsupported_resolution_rejected() {
        let request = GenerateRequest {
            prompt: Some("a red bicycle".to_string()),
            cfg_scale: None,
            steps: None,
            seed: None,
            width: Some(640),
            height: Some(640),
        };

        assert!(!GenerateRequestValidator.validate(&request).is_valid);
    }

    #[test]
    fn test_non_square_resolution_rejected() {
        let request = GenerateRequest {
            prompt: Some("a red bicycle".to_string()),
            cfg_scale: None,
            steps: None,
            seed: None,
            width: Some(512),
            height: Some(768),
        };

        assert!(!GenerateRequestValidator.validate(&request).is_valid);
    }

    #[test]
    fn test_supported_resolutions_pass() {
        for edge in [512, 768, 1024] {
            let request = GenerateRequest {
                prompt: Some("a red bicycle".to_string()),
                cfg_scale: None,
                steps: None,
                seed: None,
                width: Some(edge),
                height: Some(edge),
            };

            assert!(
                GenerateRequestValidator.validate(&request).is_valid,
                "{}x{} should be accepted",
                edge,
                edge
            );
        }
    }

    // ---- Wire format ----

    #[test]
    fn test_generate_request_camel_case_wire_format() {
        let request: GenerateRequest =
            serde_json::from_str(r#"{"prompt":"a red bicycle","cfgScale":9.5,"seed":42}"#).unwrap();

        assert_eq!(request.prompt.as_deref(), Some("a red bicycle"));
        assert_eq!(request.cfg_scale, Some(9.5));
        assert_eq!(request.seed, Some(42));
        assert_eq!(request.steps, None);

        // A null seed decodes the same as an absent one
        let request: GenerateRequest =
            serde_json::from_str(r#"{"prompt":"x","seed":null}"#).unwrap();
        assert_eq!(request.seed, None);
    }

    #[test]
    fn test_image_serializes_camel_case() {
        let image = Image {
            id: "I_K7NP3X".to_string(),
            user_id: "U_8MWQT2".to_string(),
            prompt: "a red bicycle".to_string(),
            steps: 30,
            cfg_scale: 7.0,
            seed: None,
            width: 1024,
            height: 1024,
            file_name: "img_1700000000000000.png".to_string(),
            url: "/uploads/img_1700000000000000.png".to_string(),
            created_at: Some("2024-01-01 00:00:00".to_string()),
        };

        let json = serde_json::to_value(&image).unwrap();

        assert_eq!(json["userId"], "U_8MWQT2");
        assert_eq!(json["cfgScale"], 7.0);
        assert_eq!(json["fileName"], "img_1700000000000000.png");
        assert_eq!(json["createdAt"], "2024-01-01 00:00:00");
        assert_eq!(json["prompt"], "a red bicycle");
    }
}
