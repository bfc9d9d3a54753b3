//! Store behaviour against PostgreSQL
//!
//! Runs only when `DATABASE_URL` is set. Scenarios run one after another in
//! a single test so they never race each other on the shared database.

mod scenarios;

use common::database::{DatabaseConfig, init_pool};
use std::time::Duration;
use store::{PgStore, Store};

#[tokio::test]
async fn test_postgres_store() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set, skipping PostgreSQL store test");
        return Ok(());
    }

    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Installing twice must be harmless
    PgStore::new(pool.clone()).await?;
    let store = PgStore::new(pool)
        .await?
        .with_operation_timeout(Duration::from_secs(10));
    let store: &dyn Store = &store;

    scenarios::pages_partition_sorted_set(store).await;
    scenarios::invalid_pagination_is_rejected(store).await;
    scenarios::duplicate_author_name_conflicts(store).await;
    scenarios::duplicate_email_conflicts(store).await;
    scenarios::delete_absent_and_referenced(store).await;
    scenarios::recipe_patch_changes_only_name(store).await;
    scenarios::prep_steps_are_ranked_on_create(store).await;
    scenarios::explicit_zero_values_overwrite(store).await;
    scenarios::modified_at_advances_on_empty_patch(store).await;
    scenarios::update_absent_returns_zero(store).await;
    scenarios::update_absent_with_taken_key_returns_zero(store).await;
    scenarios::malformed_ids_are_validation_errors(store).await;
    scenarios::missing_records_are_not_found(store).await;
    scenarios::author_embeds_owner_snapshot(store).await;
    scenarios::recipe_embeds_author_and_owner(store).await;
    scenarios::dangling_references_have_no_snapshot(store).await;
    scenarios::session_embeds_user(store).await;
    scenarios::reference_lifecycle(store).await;

    Ok(())
}
