//! Integration tests against a real Postgres instance, started on demand via
//! testcontainers. Ignored by default since they require a Docker daemon;
//! run with `cargo test -- --ignored`.

use catalog::{Catalog, JobUpdate, PostgresCatalog};
use sqlx::PgPool;
use testcontainers::runners::AsyncRunner;
use testcontainers::{core::WaitFor, GenericImage};

async fn postgres_catalog() -> (PostgresCatalog, testcontainers::ContainerAsync<GenericImage>) {
    let container = GenericImage::new("postgres", "16")
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_env_var("POSTGRES_PASSWORD", "postgres")
        .with_env_var("POSTGRES_USER", "postgres")
        .with_env_var("POSTGRES_DB", "postgres")
        .start()
        .await
        .expect("failed to start postgres container");

    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();
    let db_url = format!("postgresql://postgres:postgres@{host}:{port}/postgres");

    let pool = PgPool::connect(&db_url)
        .await
        .expect("failed to connect to test postgres");
    catalog::MIGRATOR
        .run(&pool)
        .await
        .expect("failed to run migrations");

    (PostgresCatalog::new(pool), container)
}

#[tokio::test]
#[ignore]
async fn create_job_then_list_active_round_trips_through_postgres() {
    let (catalog, _container) = postgres_catalog().await;

    let job = catalog
        .create("0 * * * * *", "http://example.com/hook", "AT_LEAST_ONCE")
        .await
        .unwrap();

    let active = catalog.list_active().await.unwrap();
    assert!(active.iter().any(|j| j.job_id == job.job_id));
}

#[tokio::test]
#[ignore]
async fn update_then_delete_job_persists_across_connections() {
    let (catalog, _container) = postgres_catalog().await;

    let job = catalog
        .create("0 * * * * *", "http://example.com/hook", "AT_LEAST_ONCE")
        .await
        .unwrap();

    let updated = catalog
        .update(
            job.job_id,
            JobUpdate {
                api_url: Some("http://example.com/new-hook".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.api_url, "http://example.com/new-hook");

    assert!(catalog.delete(job.job_id).await.unwrap());
    let fetched = catalog.get(job.job_id).await.unwrap().unwrap();
    assert!(!fetched.active);
}

#[tokio::test]
#[ignore]
async fn invalid_schedule_on_create_is_rejected_before_any_insert() {
    let (catalog, _container) = postgres_catalog().await;

    let result = catalog
        .create("not a cron expression", "http://example.com", "AT_LEAST_ONCE")
        .await;
    assert!(result.is_err());

    let active = catalog.list_active().await.unwrap();
    assert!(active.is_empty());
}
