//! `taxa custom` command implementation

use std::io::Write;

use taxa_common::Result;
use taxa_core::custom::read_custom_taxonomy_file;
use taxa_core::{graft, TaxonomyStore};

use crate::output;

/// Graft a custom taxonomy table and print the minted ids
///
/// Nothing is printed or committed unless every component validates.
pub async fn run(store: &TaxonomyStore, file: &str, out: &mut impl Write) -> Result<()> {
    let rows = read_custom_taxonomy_file(file)?;

    let mut session = store.begin().await?;
    let mapping = graft(&mut session, &rows).await?;
    session.commit().await?;

    output::write_mapping(out, &mapping)?;

    Ok(())
}
