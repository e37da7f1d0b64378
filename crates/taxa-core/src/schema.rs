//! Relational schema of the taxonomy store

use sqlx::AnyPool;
use taxa_common::Result;
use tracing::debug;

/// DDL statements, executed in order. All are idempotent.
pub const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS tax_merged (
        old_tax_id BIGINT PRIMARY KEY,
        new_tax_id BIGINT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tax_node (
        tax_id BIGINT PRIMARY KEY,
        parent_tax_id BIGINT NOT NULL,
        rank TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tax_name (
        id BIGINT PRIMARY KEY,
        tax_id BIGINT NOT NULL,
        name_txt TEXT NOT NULL,
        unique_name TEXT,
        name_class TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ix_tax_name_tax_id ON tax_name (tax_id)",
    "CREATE INDEX IF NOT EXISTS ix_tax_node_parent_tax_id ON tax_node (parent_tax_id)",
];

/// Create the taxonomy tables and indexes if they do not exist yet
pub async fn create_schema(pool: &AnyPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    debug!(statements = SCHEMA.len(), "Schema ensured");

    Ok(())
}
