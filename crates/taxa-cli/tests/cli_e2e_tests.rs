//! End-to-end tests for the taxa binary against a SQLite database file
//!
//! These tests validate the full workflow:
//! - Database creation from a taxonomy dump
//! - Ancestor and descendant queries
//! - Custom taxonomy grafting and its failure modes

use std::fs::File;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const NODES: &str = "1\t|\t1\t|\tno rank\t|\n2\t|\t1\t|\tgenus\t|\n";
const MERGED: &str = "20\t|\t2\t|\n";
const NAMES: &str = "1\t|\troot\t|\t\t|\tscientific name\t|\n2\t|\tFoo\t|\t\t|\tscientific name\t|\n";

fn append(builder: &mut tar::Builder<File>, name: &str, content: &str) {
    let mut header = tar::Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, name, content.as_bytes()).unwrap();
}

/// Create a database from a small dump and return (tempdir, database path)
fn created_database() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("taxdump.tar");

    let mut builder = tar::Builder::new(File::create(&archive).unwrap());
    append(&mut builder, "nodes.dmp", NODES);
    append(&mut builder, "merged.dmp", MERGED);
    append(&mut builder, "names.dmp", NAMES);
    builder.finish().unwrap();

    let database = dir.path().join("taxa.db");
    taxa(&database)
        .args(["create", archive.to_str().unwrap()])
        .assert()
        .success();

    (dir, database)
}

fn taxa(database: &Path) -> Command {
    let mut cmd = Command::cargo_bin("taxa").unwrap();
    cmd.args(["--database", database.to_str().unwrap()]);
    cmd
}

// ============================================================================
// Lineage Tests
// ============================================================================

#[test]
fn test_lineage_ancestors() {
    let (_dir, database) = created_database();

    taxa(&database)
        .args(["lineage", "20", "404"])
        .assert()
        .success()
        .stdout(
            "taxon\ttax_id\tname_txt\tunique_name\tparent_tax_id\trank\n\
             20\t1\troot\t\t1\tno rank\n\
             20\t2\tFoo\t\t1\tgenus\n",
        );
}

#[test]
fn test_lineage_ancestors_custom_delimiter() {
    let (_dir, database) = created_database();

    taxa(&database)
        .args(["lineage", "1", "--delimiter", ","])
        .assert()
        .success()
        .stdout(predicate::str::contains("1,1,root,,1,no rank"));
}

#[test]
fn test_lineage_descendants() {
    let (_dir, database) = created_database();

    taxa(&database)
        .args(["lineage", "1", "--mode", "descendants"])
        .assert()
        .success()
        .stdout("1\n2\n");
}

#[test]
fn test_lineage_single_dash_flags() {
    let (_dir, database) = created_database();

    Command::cargo_bin("taxa")
        .unwrap()
        .args(["-database", database.to_str().unwrap()])
        .args(["lineage", "1", "-mode", "descendants"])
        .assert()
        .success()
        .stdout("1\n2\n");
}

#[test]
fn test_lineage_requires_taxa() {
    let (_dir, database) = created_database();

    taxa(&database).arg("lineage").assert().failure();
}

// ============================================================================
// Custom Taxonomy Tests
// ============================================================================

fn write_custom(dir: &Path, rows: &str) -> PathBuf {
    let path = dir.join("custom.tsv");
    std::fs::write(
        &path,
        format!("key\tparent_tax_id\tname_txt\tunique_name\trank\tname_class\n{}", rows),
    )
    .unwrap();
    path
}

#[test]
fn test_custom_graft() {
    let (dir, database) = created_database();
    let custom = write_custom(dir.path(), "a\t2\tBar\t\tspecies\tscientific name\n");

    taxa(&database)
        .args(["custom", custom.to_str().unwrap()])
        .assert()
        .success()
        .stdout("a\t3\n");

    taxa(&database)
        .args(["lineage", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3\t3\tBar\t\t2\tspecies"));
}

#[test]
fn test_custom_graft_unknown_root_writes_nothing() {
    let (dir, database) = created_database();
    let custom = write_custom(
        dir.path(),
        "a\t2\tBar\t\tspecies\tscientific name\nb\t77\tBaz\t\tspecies\tscientific name\n",
    );

    taxa(&database)
        .args(["custom", custom.to_str().unwrap()])
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("not an existing taxon"));

    taxa(&database)
        .args(["lineage", "2", "--mode", "descendants"])
        .assert()
        .success()
        .stdout("2\n");
}
