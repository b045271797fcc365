use std::time::Duration;

use sqlx::mysql::MySqlPoolOptions;
use tinyurl_core::ShortCode;
use tinyurl_storage::{MySqlRepository, ReadRepository, Repository, StorageError};
use tinyurl_test_infra::mysql::{MySqlServer, MysqlConfig};

struct Fixture {
    _mysql: MySqlServer,
    repo: MySqlRepository,
}

impl Fixture {
    async fn start() -> Self {
        let mysql = MySqlServer::new(MysqlConfig::builder().build())
            .await
            .expect("start mysql");
        let url = mysql.database_url().await.expect("mysql url");
        let pool = connect_with_retry(&url).await;

        let repo = MySqlRepository::new(pool);
        repo.ensure_schema().await.expect("create schema");

        Self {
            _mysql: mysql,
            repo,
        }
    }
}

async fn connect_with_retry(url: &str) -> sqlx::MySqlPool {
    let mut last_error = None;

    for _ in 0..20 {
        match MySqlPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
        {
            Ok(pool) => return pool,
            Err(err) => {
                last_error = Some(err);
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    }

    panic!("failed to connect mysql: {last_error:?}");
}

fn code(value: &str) -> ShortCode {
    ShortCode::new_unchecked(value)
}

#[tokio::test]
async fn insert_assign_and_find_record() {
    let fixture = Fixture::start().await;

    let id = fixture
        .repo
        .insert_pending("https://example.com")
        .await
        .unwrap();
    assert_eq!(id, 1);

    let short_code = ShortCode::from_id(id).unwrap();
    fixture.repo.set_short_code(id, &short_code).await.unwrap();

    let got = fixture
        .repo
        .find_by_short_code(&short_code)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(got.id, id);
    assert_eq!(got.original_url, "https://example.com");
    assert_eq!(got.short_code, Some(short_code));
    assert_eq!(got.visit_count, 0);
}

#[tokio::test]
async fn pending_record_is_only_visible_by_url() {
    let fixture = Fixture::start().await;

    let id = fixture
        .repo
        .insert_pending("https://pending.example")
        .await
        .unwrap();

    let by_url = fixture
        .repo
        .find_by_original_url("https://pending.example")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_url.id, id);
    assert!(by_url.is_pending());

    let by_code = fixture
        .repo
        .find_by_short_code(&ShortCode::from_id(id).unwrap())
        .await
        .unwrap();
    assert!(by_code.is_none());
}

#[tokio::test]
async fn insert_conflicts_when_url_already_exists() {
    let fixture = Fixture::start().await;

    fixture
        .repo
        .insert_pending("https://one.example")
        .await
        .unwrap();

    let err = fixture
        .repo
        .insert_pending("https://one.example")
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::DuplicateUrl(_)));
}

#[tokio::test]
async fn codes_differing_in_case_are_distinct() {
    let fixture = Fixture::start().await;

    let lower = fixture.repo.insert_pending("https://lower.example").await.unwrap();
    let upper = fixture.repo.insert_pending("https://upper.example").await.unwrap();

    fixture.repo.set_short_code(lower, &code("a")).await.unwrap();
    fixture.repo.set_short_code(upper, &code("A")).await.unwrap();

    let got = fixture.repo.find_by_short_code(&code("A")).await.unwrap().unwrap();
    assert_eq!(got.original_url, "https://upper.example");
}

#[tokio::test]
async fn set_short_code_rules() {
    let fixture = Fixture::start().await;

    let first = fixture.repo.insert_pending("https://one.example").await.unwrap();
    let second = fixture.repo.insert_pending("https://two.example").await.unwrap();

    fixture.repo.set_short_code(first, &code("x1")).await.unwrap();
    // same code again is a no-op
    fixture.repo.set_short_code(first, &code("x1")).await.unwrap();

    let err = fixture
        .repo
        .set_short_code(second, &code("x1"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::DuplicateCode(_)));

    let err = fixture
        .repo
        .set_short_code(first, &code("x2"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::ShortCodeImmutable { .. }));

    let err = fixture
        .repo
        .set_short_code(9_999, &code("x3"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::RecordNotFound(_)));
}

#[tokio::test]
async fn increment_visit_count() {
    let fixture = Fixture::start().await;

    let id = fixture
        .repo
        .insert_pending("https://example.com")
        .await
        .unwrap();
    let short_code = ShortCode::from_id(id).unwrap();
    fixture.repo.set_short_code(id, &short_code).await.unwrap();

    for _ in 0..3 {
        fixture.repo.increment_visit_count(&short_code).await.unwrap();
    }

    let got = fixture
        .repo
        .find_by_short_code(&short_code)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(got.visit_count, 3);

    let err = fixture
        .repo
        .increment_visit_count(&code("unknown"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::RecordNotFound(_)));
}
