//! Custom taxonomy tables
//!
//! Tab-delimited with a header row and at least the columns
//! `key, parent_tax_id, name_txt, unique_name, rank, name_class`.
//! Extra columns are ignored.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use taxa_common::{Result, TaxaError};
use tracing::debug;

use crate::models::CustomTaxon;

/// Columns every custom taxonomy table must carry
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "key",
    "parent_tax_id",
    "name_txt",
    "unique_name",
    "rank",
    "name_class",
];

/// Read a custom taxonomy table from a file
pub fn read_custom_taxonomy_file(path: impl AsRef<Path>) -> Result<Vec<CustomTaxon>> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Reading custom taxonomy");
    read_custom_taxonomy(File::open(path)?)
}

/// Read a custom taxonomy table; keys must be unique
pub fn read_custom_taxonomy<R: Read>(reader: R) -> Result<Vec<CustomTaxon>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .trim(Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|header| header == column) {
            return Err(TaxaError::parse(format!(
                "custom taxonomy is missing the '{}' column",
                column
            )));
        }
    }

    let mut rows = Vec::new();
    let mut keys = HashSet::new();

    for record in reader.deserialize() {
        let row: CustomTaxon = record?;
        if !keys.insert(row.key.clone()) {
            return Err(TaxaError::parse(format!(
                "duplicate key '{}' in custom taxonomy",
                row.key
            )));
        }
        rows.push(row);
    }

    debug!(rows = rows.len(), "Read custom taxonomy rows");

    Ok(rows)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const HEADER: &str = "key\tparent_tax_id\tname_txt\tunique_name\trank\tname_class";

    #[test]
    fn test_read_rows() {
        let table = format!(
            "{}\tcomment\na\t2\tBar\t\tspecies\tscientific name\tfirst\nb\ta\tBar baz\tBar baz <x>\tstrain\t\tsecond\n",
            HEADER
        );
        let rows = read_custom_taxonomy(table.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, "a");
        assert_eq!(rows[0].parent_tax_id, "2");
        assert_eq!(rows[0].unique_name, None);
        assert_eq!(rows[1].parent_tax_id, "a");
        assert_eq!(rows[1].unique_name.as_deref(), Some("Bar baz <x>"));
        assert_eq!(rows[1].name_class(), "scientific name");
    }

    #[test]
    fn test_missing_column() {
        let table = "key\tparent_tax_id\tname_txt\trank\na\t2\tBar\tspecies\n";
        let err = read_custom_taxonomy(table.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("unique_name"));
    }

    #[test]
    fn test_duplicate_key() {
        let table = format!(
            "{}\na\t2\tBar\t\tspecies\tscientific name\na\t2\tBaz\t\tspecies\tscientific name\n",
            HEADER
        );
        let err = read_custom_taxonomy(table.as_bytes()).unwrap_err();
        assert!(matches!(err, TaxaError::Parse(_)));
    }
}
