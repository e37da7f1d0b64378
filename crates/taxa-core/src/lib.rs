//! Taxa Core Library
//!
//! Taxonomy graph model on top of a relational store.
//!
//! - **Store**: merged-id redirects, nodes and names with point lookups,
//!   children-of lookups and bulk inserts ([`store`])
//! - **Lineage**: ancestor chains from the root down to a taxon ([`lineage`])
//! - **Subtree**: all descendants of a taxon ([`subtree`])
//! - **Graft**: validated insertion of custom sub-taxonomies ([`graft`])
//! - **Ingestion**: taxonomy dump archives ([`taxdump`]) and custom
//!   taxonomy tables ([`custom`])
//!
//! # Example
//!
//! ```no_run
//! use taxa_common::DatabaseConfig;
//! use taxa_core::{lineage::ancestors, store::TaxonomyStore};
//!
//! # async fn example() -> taxa_common::Result<()> {
//! let store = TaxonomyStore::connect(&DatabaseConfig::sqlite("taxonomy.db")).await?;
//! let mut session = store.begin().await?;
//! for record in ancestors(&mut session, 9606).await? {
//!     println!("{}\t{}", record.tax_id, record.name_txt);
//! }
//! session.commit().await?;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod custom;
pub mod graft;
pub mod lineage;
pub mod models;
pub mod schema;
pub mod store;
pub mod subtree;
pub mod taxdump;

// Re-export commonly used types
pub use graft::graft;
pub use lineage::ancestors;
pub use models::{CustomTaxon, LineageRecord, MergedRedirect, TaxonName, TaxonNode, ROOT};
pub use store::{Session, TaxonomyStore};
pub use subtree::descendants;
pub use taxdump::{ingest, IngestStats, TaxdumpFiles};
