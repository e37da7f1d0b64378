//! Delimited output for query results

use std::io::Write;

use taxa_core::LineageRecord;

/// Interpret `\t` style escapes typed on the command line
pub fn unescape_delimiter(delimiter: &str) -> String {
    match delimiter {
        "\\t" | "TAB" | "tab" => "\t".to_string(),
        "\\n" => "\n".to_string(),
        other => other.to_string(),
    }
}

/// Header row of the ancestors table
pub fn write_ancestors_header(out: &mut impl Write, delimiter: &str) -> std::io::Result<()> {
    let mut columns = vec!["taxon"];
    columns.extend(LineageRecord::header());
    writeln!(out, "{}", columns.join(delimiter))
}

/// One row per ancestor, prefixed with the taxon as requested
pub fn write_ancestors(
    out: &mut impl Write,
    taxon: i64,
    lineage: &[LineageRecord],
    delimiter: &str,
) -> std::io::Result<()> {
    for record in lineage {
        let mut row = vec![taxon.to_string()];
        row.extend(record.fields());
        writeln!(out, "{}", row.join(delimiter))?;
    }
    Ok(())
}

/// The taxon followed by one descendant per line
pub fn write_descendants(out: &mut impl Write, taxon: i64, ids: &[i64]) -> std::io::Result<()> {
    writeln!(out, "{}", taxon)?;
    for id in ids {
        writeln!(out, "{}", id)?;
    }
    Ok(())
}

/// `key<TAB>tax_id` for every minted id
pub fn write_mapping(out: &mut impl Write, mapping: &[(String, i64)]) -> std::io::Result<()> {
    for (key, tax_id) in mapping {
        writeln!(out, "{}\t{}", key, tax_id)?;
    }
    Ok(())
}
