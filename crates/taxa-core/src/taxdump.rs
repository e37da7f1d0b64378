//! Taxonomy dump ingestion
//!
//! Reads `nodes.dmp`, `merged.dmp` and `names.dmp` out of a (optionally
//! gzip-compressed) tar archive and loads them into the store.
//!
//! # File Format
//! One record per line, fields separated by `|` and padded with whitespace.
//! Lines end with a trailing `|`:
//! ```text
//! 9606	|	9605	|	species	|	HS	|	...	|
//! ```

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use tar::Archive;
use taxa_common::{Result, TaxaError};
use tracing::{debug, info};

use crate::models::{MergedRedirect, TaxonName, TaxonNode};
use crate::store::TaxonomyStore;

pub const NODES_FILE: &str = "nodes.dmp";
pub const MERGED_FILE: &str = "merged.dmp";
pub const NAMES_FILE: &str = "names.dmp";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Split a dump line on `|` and trim every field
pub fn split_dump_line(line: &str) -> Vec<&str> {
    line.split('|').map(str::trim).collect()
}

/// Contents of the three dump members used for ingestion
#[derive(Debug, Clone, Default)]
pub struct TaxdumpFiles {
    pub nodes: String,
    pub merged: String,
    pub names: String,
}

impl TaxdumpFiles {
    /// Read the dump members from a tar or tar.gz archive
    pub fn from_archive(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)?;

        let mut magic = [0u8; 2];
        let is_gzip = file.read_exact(&mut magic).is_ok() && magic == GZIP_MAGIC;
        file.seek(SeekFrom::Start(0))?;

        debug!(path = %path.display(), gzip = is_gzip, "Opening taxonomy dump");

        let reader = BufReader::new(file);
        if is_gzip {
            Self::from_tar(GzDecoder::new(reader))
        } else {
            Self::from_tar(reader)
        }
    }

    /// Read the dump members from an uncompressed tar stream
    pub fn from_tar<R: Read>(reader: R) -> Result<Self> {
        let mut archive = Archive::new(reader);
        let mut nodes = None;
        let mut merged = None;
        let mut names = None;

        for entry in archive.entries()? {
            let mut entry = entry?;
            let path = entry.path()?.into_owned();

            let slot = match path.file_name().and_then(|name| name.to_str()) {
                Some(NODES_FILE) => &mut nodes,
                Some(MERGED_FILE) => &mut merged,
                Some(NAMES_FILE) => &mut names,
                _ => continue,
            };

            let mut content = String::new();
            entry.read_to_string(&mut content)?;
            debug!(member = %path.display(), bytes = content.len(), "Extracted dump member");
            *slot = Some(content);
        }

        let missing = |name: &str| TaxaError::parse(format!("archive has no {} member", name));

        Ok(Self {
            nodes: nodes.ok_or_else(|| missing(NODES_FILE))?,
            merged: merged.ok_or_else(|| missing(MERGED_FILE))?,
            names: names.ok_or_else(|| missing(NAMES_FILE))?,
        })
    }
}

/// Row counts of an ingestion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    pub nodes: usize,
    pub merged: usize,
    pub names: usize,
}

/// Parser for taxonomy dump files
#[derive(Debug, Default)]
pub struct TaxdumpParser;

impl TaxdumpParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse nodes.dmp: `tax_id | parent_tax_id | rank | ...`
    pub fn parse_nodes(&self, content: &str) -> Result<Vec<TaxonNode>> {
        records(content)
            .map(|(line_num, fields)| self.parse_node_fields(&fields, line_num))
            .collect()
    }

    pub fn parse_node_fields(&self, fields: &[&str], line_num: usize) -> Result<TaxonNode> {
        require_fields(NODES_FILE, fields, 3, line_num)?;

        Ok(TaxonNode::new(
            parse_id(NODES_FILE, fields[0], line_num)?,
            parse_id(NODES_FILE, fields[1], line_num)?,
            fields[2],
        ))
    }

    /// Parse merged.dmp: `old_tax_id | new_tax_id |`
    pub fn parse_merged(&self, content: &str) -> Result<Vec<MergedRedirect>> {
        records(content)
            .map(|(line_num, fields)| self.parse_merged_fields(&fields, line_num))
            .collect()
    }

    pub fn parse_merged_fields(&self, fields: &[&str], line_num: usize) -> Result<MergedRedirect> {
        require_fields(MERGED_FILE, fields, 2, line_num)?;

        Ok(MergedRedirect::new(
            parse_id(MERGED_FILE, fields[0], line_num)?,
            parse_id(MERGED_FILE, fields[1], line_num)?,
        ))
    }

    /// Parse names.dmp: `tax_id | name_txt | unique_name | name_class |`
    ///
    /// Name rows carry no id of their own; they are numbered from 1 in file
    /// order.
    pub fn parse_names(&self, content: &str) -> Result<Vec<TaxonName>> {
        records(content)
            .enumerate()
            .map(|(index, (line_num, fields))| {
                self.parse_name_fields(index as i64 + 1, &fields, line_num)
            })
            .collect()
    }

    pub fn parse_name_fields(&self, id: i64, fields: &[&str], line_num: usize) -> Result<TaxonName> {
        require_fields(NAMES_FILE, fields, 4, line_num)?;

        let unique_name = Some(fields[2]).filter(|name| !name.is_empty()).map(String::from);

        Ok(TaxonName::new(
            id,
            parse_id(NAMES_FILE, fields[0], line_num)?,
            fields[1],
            unique_name,
            fields[3],
        ))
    }
}

/// Non-empty lines of a dump file as (1-based line number, fields)
fn records(content: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| (index + 1, split_dump_line(line)))
}

fn require_fields(file: &str, fields: &[&str], count: usize, line_num: usize) -> Result<()> {
    if fields.len() < count {
        return Err(TaxaError::parse(format!(
            "{} line {}: expected at least {} fields, got {}",
            file,
            line_num,
            count,
            fields.len()
        )));
    }
    Ok(())
}

fn parse_id(file: &str, field: &str, line_num: usize) -> Result<i64> {
    field.parse().map_err(|_| {
        TaxaError::parse(format!("{} line {}: invalid taxonomy id '{}'", file, line_num, field))
    })
}

/// Load a taxonomy dump into the store as one unit of work
///
/// The schema must exist. Nothing is committed unless all three files load.
pub async fn ingest(store: &TaxonomyStore, files: &TaxdumpFiles) -> Result<IngestStats> {
    let parser = TaxdumpParser::new();
    let mut session = store.begin().await?;

    info!("nodes...");
    let nodes = parser.parse_nodes(&files.nodes)?;
    session.bulk_insert_nodes(&nodes).await?;

    info!("merged...");
    let merged = parser.parse_merged(&files.merged)?;
    session.bulk_insert_merged(&merged).await?;

    info!("names...");
    let names = parser.parse_names(&files.names)?;
    session.bulk_insert_names(&names).await?;

    session.commit().await?;

    let stats = IngestStats {
        nodes: nodes.len(),
        merged: merged.len(),
        names: names.len(),
    };
    info!(
        nodes = stats.nodes,
        merged = stats.merged,
        names = stats.names,
        "Taxonomy dump loaded"
    );

    Ok(stats)
}
