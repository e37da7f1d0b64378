//! Descendant enumeration

use std::collections::HashSet;

use taxa_common::Result;
use tracing::{debug, warn};

use crate::store::Session;

/// All ids transitively below `taxon`, excluding `taxon` itself.
///
/// Children of a node are emitted together in ascending id order, followed
/// by the descendants of each child in turn. The expansion uses an explicit
/// stack, so arbitrarily deep taxonomies are fine. No merged-id resolution
/// is applied: pass surviving ids.
pub async fn descendants(session: &mut Session, taxon: i64) -> Result<Vec<i64>> {
    let mut result = Vec::new();
    let mut seen = HashSet::from([taxon]);
    let mut stack = vec![taxon];

    while let Some(current) = stack.pop() {
        let children: Vec<i64> = session
            .children_of(current)
            .await?
            .into_iter()
            .filter(|child| {
                // the root is its own parent
                if *child == current {
                    return false;
                }
                if !seen.insert(*child) {
                    warn!(tax_id = *child, parent = current, "Node reached twice, skipping");
                    return false;
                }
                true
            })
            .collect();

        result.extend_from_slice(&children);
        stack.extend(children.into_iter().rev());
    }

    debug!(taxon, count = result.len(), "Enumerated descendants");

    Ok(result)
}
