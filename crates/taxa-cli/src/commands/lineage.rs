//! `taxa lineage` command implementation

use std::io::Write;

use taxa_common::Result;
use taxa_core::{ancestors, descendants, TaxonomyStore};
use tracing::debug;

use crate::output;

/// Print the ancestors of every taxon, all in one session
pub async fn run_ancestors(
    store: &TaxonomyStore,
    taxa: &[i64],
    delimiter: &str,
    out: &mut impl Write,
) -> Result<()> {
    let mut session = store.begin().await?;

    output::write_ancestors_header(out, delimiter)?;
    for &taxon in taxa {
        let lineage = ancestors(&mut session, taxon).await?;
        debug!(taxon, depth = lineage.len(), "Resolved lineage");
        output::write_ancestors(out, taxon, &lineage, delimiter)?;
    }

    session.commit().await
}

/// Print the descendants of every taxon, one session per taxon
pub async fn run_descendants(
    store: &TaxonomyStore,
    taxa: &[i64],
    out: &mut impl Write,
) -> Result<()> {
    for &taxon in taxa {
        let mut session = store.begin().await?;
        let ids = descendants(&mut session, taxon).await?;
        session.commit().await?;

        output::write_descendants(out, taxon, &ids)?;
    }

    Ok(())
}
