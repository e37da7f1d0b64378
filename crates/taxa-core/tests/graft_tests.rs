//! Custom taxonomy graft tests against an in-memory store

use taxa_common::{DatabaseConfig, GraftError, TaxaError};
use taxa_core::models::SCIENTIFIC_NAME;
use taxa_core::{ancestors, graft, CustomTaxon, TaxonName, TaxonNode, TaxonomyStore};

/// root(1) with genus Foo(2) below it
async fn foo_store() -> TaxonomyStore {
    let store = TaxonomyStore::connect(&DatabaseConfig::default()).await.unwrap();
    store.create_schema().await.unwrap();

    let mut session = store.begin().await.unwrap();
    session
        .bulk_insert_nodes(&[TaxonNode::new(1, 1, "no rank"), TaxonNode::new(2, 1, "genus")])
        .await
        .unwrap();
    session
        .bulk_insert_names(&[
            TaxonName::new(1, 1, "root", None, SCIENTIFIC_NAME),
            TaxonName::new(2, 2, "Foo", None, SCIENTIFIC_NAME),
        ])
        .await
        .unwrap();
    session.commit().await.unwrap();

    store
}

async fn graft_rows(
    store: &TaxonomyStore,
    rows: &[CustomTaxon],
) -> Result<Vec<(String, i64)>, TaxaError> {
    let mut session = store.begin().await?;
    let report = graft(&mut session, rows).await?;
    session.commit().await?;
    Ok(report)
}

#[tokio::test]
async fn test_graft_single_species() {
    let store = foo_store().await;

    let mut session = store.begin().await.unwrap();
    let expected_id = session.next_free_tax_id().await.unwrap();
    drop(session);

    let report = graft_rows(&store, &[CustomTaxon::new("a", "2", "Bar", "species")])
        .await
        .unwrap();
    assert_eq!(report, vec![("a".to_string(), expected_id)]);
    assert_eq!(expected_id, 3);

    let mut session = store.begin().await.unwrap();
    let lineage = ancestors(&mut session, expected_id).await.unwrap();
    let names: Vec<&str> = lineage.iter().map(|r| r.name_txt.as_str()).collect();
    assert_eq!(names, vec!["root", "Foo", "Bar"]);
    assert_eq!(lineage[2].parent_tax_id, 2);
    assert_eq!(lineage[2].rank, "species");
}

#[tokio::test]
async fn test_ancestors_of_genus() {
    let store = foo_store().await;
    let mut session = store.begin().await.unwrap();

    let lineage = ancestors(&mut session, 2).await.unwrap();
    let ids: Vec<i64> = lineage.iter().map(|r| r.tax_id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_graft_assigns_ids_breadth_first_across_components() {
    let store = foo_store().await;

    let rows = vec![
        CustomTaxon::new("leaf", "mid", "Leaf", "strain"),
        CustomTaxon::new("mid", "2", "Mid", "species"),
        CustomTaxon::new("other", "1", "Other", "genus"),
        CustomTaxon::new("sibling", "2", "Sibling", "species"),
    ];
    let report = graft_rows(&store, &rows).await.unwrap();

    assert_eq!(
        report,
        vec![
            ("mid".to_string(), 3),
            ("sibling".to_string(), 4),
            ("leaf".to_string(), 5),
            ("other".to_string(), 6),
        ]
    );

    let mut session = store.begin().await.unwrap();
    let leaf = ancestors(&mut session, 5).await.unwrap();
    let ids: Vec<i64> = leaf.iter().map(|r| r.tax_id).collect();
    assert_eq!(ids, vec![1, 2, 3, 5]);
    assert_eq!(session.next_free_name_id().await.unwrap(), 7);
}

#[tokio::test]
async fn test_graft_empty_input_reports_nothing() {
    let store = foo_store().await;
    assert!(graft_rows(&store, &[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_graft_rejects_unknown_root() {
    let store = foo_store().await;

    let err = graft_rows(&store, &[CustomTaxon::new("a", "77", "Bar", "species")])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TaxaError::Graft(GraftError::UnknownRoot { ref root }) if root == "77"
    ));

    let err = graft_rows(&store, &[CustomTaxon::new("a", "nowhere", "Bar", "species")])
        .await
        .unwrap_err();
    assert!(matches!(err, TaxaError::Graft(GraftError::UnknownRoot { .. })));
}

#[tokio::test]
async fn test_graft_rejects_two_roots() {
    let store = foo_store().await;

    let rows = vec![
        CustomTaxon::new("a", "1", "A", "genus"),
        CustomTaxon::new("b", "2", "B", "species"),
        CustomTaxon::new("c", "a", "C", "species"),
        CustomTaxon::new("c", "b", "C", "species"),
    ];
    let err = graft_rows(&store, &rows).await.unwrap_err();
    assert!(matches!(err, TaxaError::Graft(GraftError::AmbiguousRoot { .. })));
}

#[tokio::test]
async fn test_graft_rejects_two_cycle() {
    let store = foo_store().await;

    let rows = vec![
        CustomTaxon::new("a", "2", "A", "species"),
        CustomTaxon::new("b", "a", "B", "strain"),
        CustomTaxon::new("a", "b", "A", "species"),
    ];
    let err = graft_rows(&store, &rows).await.unwrap_err();
    assert!(matches!(err, TaxaError::Graft(GraftError::NotATree { .. })));
}

#[tokio::test]
async fn test_failed_component_aborts_whole_graft() {
    let store = foo_store().await;

    let rows = vec![
        CustomTaxon::new("good", "2", "Good", "species"),
        CustomTaxon::new("bad", "404", "Bad", "species"),
    ];
    assert!(graft_rows(&store, &rows).await.is_err());

    let mut session = store.begin().await.unwrap();
    assert_eq!(session.next_free_tax_id().await.unwrap(), 3);
    assert_eq!(session.next_free_name_id().await.unwrap(), 3);
    assert!(session.children_of(2).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_numeric_key_shadows_existing_taxon() {
    let store = foo_store().await;

    // "2" is both an existing taxon and a new key; as a parent it means the key
    let rows = vec![
        CustomTaxon::new("2", "1", "Two", "genus"),
        CustomTaxon::new("b", "2", "B", "species"),
    ];
    let report = graft_rows(&store, &rows).await.unwrap();
    assert_eq!(report, vec![("2".to_string(), 3), ("b".to_string(), 4)]);

    let mut session = store.begin().await.unwrap();
    let lineage = ancestors(&mut session, 4).await.unwrap();
    let ids: Vec<i64> = lineage.iter().map(|r| r.tax_id).collect();
    assert_eq!(ids, vec![1, 3, 4]);
    assert!(session.children_of(2).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_graft_fails_when_ids_run_out() {
    let store = foo_store().await;

    let mut session = store.begin().await.unwrap();
    session
        .bulk_insert_nodes(&[TaxonNode::new(i64::MAX - 1, 1, "genus")])
        .await
        .unwrap();
    session.commit().await.unwrap();

    let rows = vec![
        CustomTaxon::new("a", "2", "A", "species"),
        CustomTaxon::new("b", "2", "B", "species"),
    ];
    let err = graft_rows(&store, &rows).await.unwrap_err();
    assert!(matches!(err, TaxaError::Parse(_)));

    let mut session = store.begin().await.unwrap();
    assert_eq!(session.count_nodes(i64::MAX).await.unwrap(), 0);
    assert!(session.children_of(2).await.unwrap().is_empty());
}
