//! Taxonomy store
//!
//! Persists merged ids, nodes and names in a relational database reached
//! through a sqlx `Any` pool (SQLite or PostgreSQL). Every interaction runs
//! inside a [`Session`], a transaction that is committed explicitly and rolled
//! back when dropped without a commit.

use sqlx::any::AnyPoolOptions;
use sqlx::{Any, AnyPool, Row, Transaction};
use taxa_common::{DatabaseConfig, Result, TaxaError};
use tracing::{debug, info};

use crate::models::{LineageRecord, MergedRedirect, TaxonName, TaxonNode, SCIENTIFIC_NAME};
use crate::schema;

/// Rows written per INSERT statement by the bulk writers
pub const BATCH_SIZE: usize = 1000;

/// Handle on a taxonomy database
#[derive(Clone)]
pub struct TaxonomyStore {
    pool: AnyPool,
}

impl TaxonomyStore {
    /// Connect using a database configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let url = config.url()?;
        Self::connect_url(&url).await
    }

    /// Connect to a sqlx connection URL
    ///
    /// SQLite is limited to a single connection so that an in-memory database
    /// survives for the lifetime of the store.
    pub async fn connect_url(url: &str) -> Result<Self> {
        sqlx::any::install_default_drivers();

        let options = if url.starts_with("sqlite:") {
            AnyPoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            AnyPoolOptions::new().max_connections(2)
        };

        let pool = options.connect(url).await?;
        debug!(backend = url.split(':').next().unwrap_or_default(), "Connected to taxonomy store");

        Ok(Self { pool })
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Create the taxonomy tables if needed
    pub async fn create_schema(&self) -> Result<()> {
        schema::create_schema(&self.pool).await
    }

    /// Open a transactional session
    pub async fn begin(&self) -> Result<Session> {
        let tx = self.pool.begin().await?;
        Ok(Session { tx })
    }

    /// Close all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// A unit of work against the store
///
/// Dropping a session without calling [`Session::commit`] rolls back every
/// write made through it.
pub struct Session {
    tx: Transaction<'static, Any>,
}

impl Session {
    /// Commit all writes and release the connection
    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    /// Discard all writes and release the connection
    pub async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }

    /// Map a possibly merged id to its surviving id
    pub async fn resolve(&mut self, tax_id: i64) -> Result<i64> {
        let row = sqlx::query("SELECT new_tax_id FROM tax_merged WHERE old_tax_id = $1")
            .bind(tax_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        match row {
            Some(row) => Ok(row.try_get("new_tax_id")?),
            None => Ok(tax_id),
        }
    }

    /// Fetch a node joined with its scientific name, after merged-id resolution
    pub async fn node_and_name(&mut self, tax_id: i64) -> Result<Option<LineageRecord>> {
        let tax_id = self.resolve(tax_id).await?;

        let row = sqlx::query(
            r#"
            SELECT tax_name.tax_id, tax_name.name_txt, tax_name.unique_name,
                   tax_node.parent_tax_id, tax_node.rank
            FROM tax_name
            JOIN tax_node ON tax_node.tax_id = tax_name.tax_id
            WHERE tax_name.name_class = $1 AND tax_name.tax_id = $2
            ORDER BY tax_name.id
            LIMIT 1
            "#,
        )
        .bind(SCIENTIFIC_NAME.to_string())
        .bind(tax_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(LineageRecord {
            tax_id: row.try_get("tax_id")?,
            name_txt: row.try_get("name_txt")?,
            unique_name: row.try_get("unique_name")?,
            parent_tax_id: row.try_get("parent_tax_id")?,
            rank: row.try_get("rank")?,
        }))
    }

    /// Ids of all nodes whose parent is `tax_id`, ascending
    pub async fn children_of(&mut self, tax_id: i64) -> Result<Vec<i64>> {
        let rows = sqlx::query("SELECT tax_id FROM tax_node WHERE parent_tax_id = $1 ORDER BY tax_id")
            .bind(tax_id)
            .fetch_all(&mut *self.tx)
            .await?;

        rows.iter()
            .map(|row| row.try_get::<i64, _>("tax_id").map_err(Into::into))
            .collect()
    }

    /// Number of node rows carrying `tax_id`
    pub async fn count_nodes(&mut self, tax_id: i64) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM tax_node WHERE tax_id = $1")
            .bind(tax_id)
            .fetch_one(&mut *self.tx)
            .await?;

        Ok(row.try_get("n")?)
    }

    /// One more than the largest id used as either a node or a parent
    pub async fn next_free_tax_id(&mut self) -> Result<i64> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(MAX(CASE WHEN tax_id > parent_tax_id THEN tax_id ELSE parent_tax_id END), 0) AS max_id
            FROM tax_node
            "#,
        )
        .fetch_one(&mut *self.tx)
        .await?;

        let max_id: i64 = row.try_get("max_id")?;
        max_id.checked_add(1).ok_or_else(|| ids_exhausted("tax_node"))
    }

    /// One more than the largest name row id
    pub async fn next_free_name_id(&mut self) -> Result<i64> {
        let row = sqlx::query("SELECT COALESCE(MAX(id), 0) AS max_id FROM tax_name")
            .fetch_one(&mut *self.tx)
            .await?;

        let max_id: i64 = row.try_get("max_id")?;
        max_id.checked_add(1).ok_or_else(|| ids_exhausted("tax_name"))
    }

    /// Append node rows
    pub async fn bulk_insert_nodes(&mut self, nodes: &[TaxonNode]) -> Result<()> {
        for chunk in nodes.chunks(BATCH_SIZE) {
            let sql = format!(
                "INSERT INTO tax_node (tax_id, parent_tax_id, rank) VALUES {}",
                values_clause(chunk.len(), &["{}", "{}", "{}"])
            );
            let mut query = sqlx::query(&sql);
            for node in chunk {
                query = query
                    .bind(node.tax_id)
                    .bind(node.parent_tax_id)
                    .bind(node.rank.clone());
            }
            query.execute(&mut *self.tx).await?;
        }
        debug!(rows = nodes.len(), "Inserted tax_node rows");

        Ok(())
    }

    /// Append name rows
    pub async fn bulk_insert_names(&mut self, names: &[TaxonName]) -> Result<()> {
        for chunk in names.chunks(BATCH_SIZE) {
            let sql = format!(
                "INSERT INTO tax_name (id, tax_id, name_txt, unique_name, name_class) VALUES {}",
                values_clause(chunk.len(), &["{}", "{}", "{}", "NULLIF({}, '')", "{}"])
            );
            let mut query = sqlx::query(&sql);
            for name in chunk {
                query = query
                    .bind(name.id)
                    .bind(name.tax_id)
                    .bind(name.name_txt.clone())
                    .bind(name.unique_name.clone().unwrap_or_default())
                    .bind(name.name_class.clone());
            }
            query.execute(&mut *self.tx).await?;
        }
        debug!(rows = names.len(), "Inserted tax_name rows");

        Ok(())
    }

    /// Append merged-id redirects
    pub async fn bulk_insert_merged(&mut self, merged: &[MergedRedirect]) -> Result<()> {
        for chunk in merged.chunks(BATCH_SIZE) {
            let sql = format!(
                "INSERT INTO tax_merged (old_tax_id, new_tax_id) VALUES {}",
                values_clause(chunk.len(), &["{}", "{}"])
            );
            let mut query = sqlx::query(&sql);
            for redirect in chunk {
                query = query.bind(redirect.old_tax_id).bind(redirect.new_tax_id);
            }
            query.execute(&mut *self.tx).await?;
        }
        info!(rows = merged.len(), "Inserted tax_merged rows");

        Ok(())
    }
}

/// Error for a table whose largest id is already `i64::MAX`
pub(crate) fn ids_exhausted(table: &str) -> TaxaError {
    TaxaError::parse(format!("no free identifier left in {}", table))
}

/// `($1, $2), ($3, $4)` style placeholder list for a multi-row insert.
///
/// Each column template has its `{}` replaced by the placeholder. NULLs are
/// bound as empty strings and converted in SQL, the `Any` driver has no
/// portable way to bind an untyped NULL.
fn values_clause(rows: usize, templates: &[&str]) -> String {
    let columns = templates.len();
    (0..rows)
        .map(|row| {
            let placeholders: Vec<String> = templates
                .iter()
                .enumerate()
                .map(|(column, template)| {
                    template.replace("{}", &format!("${}", row * columns + column + 1))
                })
                .collect();
            format!("({})", placeholders.join(", "))
        })
        .collect::<Vec<_>>()
        .join(", ")
}
