//! `taxa create` command implementation

use taxa_common::Result;
use taxa_core::{ingest, IngestStats, TaxdumpFiles, TaxonomyStore};
use tracing::info;

/// Create the schema and load a taxonomy dump archive
pub async fn run(store: &TaxonomyStore, taxdump: &str) -> Result<IngestStats> {
    store.create_schema().await?;

    let files = TaxdumpFiles::from_archive(taxdump)?;
    let stats = ingest(store, &files).await?;
    info!(taxdump, "Taxonomy database created");

    Ok(stats)
}
