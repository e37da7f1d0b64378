//! Taxonomy data models

use serde::{Deserialize, Serialize};

/// Identifier of the taxonomy root. Ancestor walks stop here.
pub const ROOT: i64 = 1;

/// Name class selected for lineage display
pub const SCIENTIFIC_NAME: &str = "scientific name";

/// A retired taxon id redirected to the surviving id
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MergedRedirect {
    /// Retired taxonomy ID
    pub old_tax_id: i64,
    /// Surviving taxonomy ID
    pub new_tax_id: i64,
}

impl MergedRedirect {
    pub fn new(old_tax_id: i64, new_tax_id: i64) -> Self {
        Self {
            old_tax_id,
            new_tax_id,
        }
    }
}

/// A node of the taxonomy tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaxonNode {
    pub tax_id: i64,
    pub parent_tax_id: i64,
    /// Free-text rank (e.g., "species", "no rank", "clade")
    pub rank: String,
}

impl TaxonNode {
    pub fn new(tax_id: i64, parent_tax_id: i64, rank: impl Into<String>) -> Self {
        Self {
            tax_id,
            parent_tax_id,
            rank: rank.into(),
        }
    }
}

/// One of possibly several names attached to a taxon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaxonName {
    pub id: i64,
    pub tax_id: i64,
    pub name_txt: String,
    pub unique_name: Option<String>,
    /// e.g., "scientific name", "synonym", "genbank common name"
    pub name_class: String,
}

impl TaxonName {
    pub fn new(
        id: i64,
        tax_id: i64,
        name_txt: impl Into<String>,
        unique_name: Option<String>,
        name_class: impl Into<String>,
    ) -> Self {
        Self {
            id,
            tax_id,
            name_txt: name_txt.into(),
            unique_name,
            name_class: name_class.into(),
        }
    }
}

/// A node joined with its scientific name, as produced by lineage queries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineageRecord {
    pub tax_id: i64,
    pub name_txt: String,
    pub unique_name: Option<String>,
    pub parent_tax_id: i64,
    pub rank: String,
}

impl LineageRecord {
    /// Record fields in output column order, NULL rendered as empty
    pub fn fields(&self) -> [String; 5] {
        [
            self.tax_id.to_string(),
            self.name_txt.clone(),
            self.unique_name.clone().unwrap_or_default(),
            self.parent_tax_id.to_string(),
            self.rank.clone(),
        ]
    }

    /// Column names matching [`LineageRecord::fields`]
    pub fn header() -> [&'static str; 5] {
        ["tax_id", "name_txt", "unique_name", "parent_tax_id", "rank"]
    }
}

/// One row of a user supplied custom taxonomy
///
/// `parent_tax_id` is either an existing numeric taxon id or the `key` of
/// another row in the same input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomTaxon {
    pub key: String,
    pub parent_tax_id: String,
    pub name_txt: String,
    #[serde(default)]
    pub unique_name: Option<String>,
    pub rank: String,
    #[serde(default)]
    pub name_class: Option<String>,
}

impl CustomTaxon {
    /// Create a row carrying a scientific name
    pub fn new(
        key: impl Into<String>,
        parent_tax_id: impl Into<String>,
        name_txt: impl Into<String>,
        rank: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            parent_tax_id: parent_tax_id.into(),
            name_txt: name_txt.into(),
            unique_name: None,
            rank: rank.into(),
            name_class: None,
        }
    }

    /// Name class, defaulting to "scientific name"
    pub fn name_class(&self) -> &str {
        match self.name_class.as_deref() {
            Some(class) if !class.is_empty() => class,
            _ => SCIENTIFIC_NAME,
        }
    }
}
