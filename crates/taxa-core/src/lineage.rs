//! Ancestor chains
//!
//! Walks parent pointers from a taxon up to [`ROOT`] with one point query per
//! step. A missing record ends the walk early; that is not an error, the
//! caller receives the chain as far as it could be resolved.

use std::collections::{HashSet, VecDeque};

use taxa_common::Result;
use tracing::{debug, warn};

use crate::models::{LineageRecord, ROOT};
use crate::store::Session;

/// Lineage of `taxon`, root first.
///
/// The start id is resolved through the merged-id table first, so a retired
/// id yields the same chain as its surviving id. Unknown taxa give an empty
/// chain and `ROOT` itself gives a single record. When the walk breaks before
/// reaching the root, the root record is still prepended as long as at least
/// one record was collected.
pub async fn ancestors(session: &mut Session, taxon: i64) -> Result<Vec<LineageRecord>> {
    let mut lineage = VecDeque::new();
    let mut visited = HashSet::new();
    let mut current = session.resolve(taxon).await?;

    if current == ROOT {
        return Ok(session.node_and_name(ROOT).await?.into_iter().collect());
    }

    while current != ROOT {
        if !visited.insert(current) {
            warn!(taxon, tax_id = current, "Parent chain loops back on itself, stopping");
            break;
        }

        match session.node_and_name(current).await? {
            Some(record) => {
                current = record.parent_tax_id;
                lineage.push_front(record);
            },
            None => {
                debug!(taxon, tax_id = current, "No record for ancestor, chain ends here");
                break;
            },
        }
    }

    if !lineage.is_empty() {
        if let Some(root) = session.node_and_name(ROOT).await? {
            lineage.push_front(root);
        }
    }

    Ok(lineage.into())
}
