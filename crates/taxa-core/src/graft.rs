//! Custom taxonomy grafting
//!
//! A custom taxonomy is a list of rows, each naming a new node by `key` and
//! its parent either by an existing numeric taxon id or by another row's key.
//! The rows form a directed graph with one `parent -> key` edge per row.
//! Every weakly connected component of that graph must be an arborescence
//! hanging from a single existing taxon. Once all components pass, new ids
//! are minted breadth first and the rows are written in one session.
//!
//! ```text
//! Collected -> RootIdentified -> RootVerified -> TreeValidated -> Inserted
//! ```

use std::collections::{HashMap, VecDeque};

use taxa_common::{GraftError, Result};
use tracing::{debug, info};

use crate::models::{CustomTaxon, TaxonName, TaxonNode};
use crate::store::{ids_exhausted, Session};

/// Directed graph over the labels of a custom taxonomy
#[derive(Debug)]
pub struct GraftGraph<'a> {
    labels: Vec<&'a str>,
    /// Outgoing edges per node as (row index, child node)
    children: Vec<Vec<(usize, usize)>>,
    /// Undirected adjacency for component discovery
    neighbours: Vec<Vec<usize>>,
    in_degree: Vec<usize>,
    /// Parent and child node of each row
    row_parent: Vec<usize>,
    row_child: Vec<usize>,
}

/// A weakly connected component, nodes in order of first appearance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub nodes: Vec<usize>,
}

/// A validated component ready for insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraftPlan {
    /// Existing taxon the component attaches to
    pub root: i64,
    /// Row indices in breadth-first order from the root
    pub rows: Vec<usize>,
}

impl<'a> GraftGraph<'a> {
    /// Build the graph with one `parent -> key` edge per row
    pub fn new(rows: &'a [CustomTaxon]) -> Self {
        let mut graph = Self {
            labels: Vec::new(),
            children: Vec::new(),
            neighbours: Vec::new(),
            in_degree: Vec::new(),
            row_parent: Vec::with_capacity(rows.len()),
            row_child: Vec::with_capacity(rows.len()),
        };
        let mut index: HashMap<&'a str, usize> = HashMap::new();

        for (row_index, row) in rows.iter().enumerate() {
            let parent = graph.intern(&mut index, row.parent_tax_id.trim());
            let child = graph.intern(&mut index, row.key.trim());

            graph.children[parent].push((row_index, child));
            graph.neighbours[parent].push(child);
            graph.neighbours[child].push(parent);
            graph.in_degree[child] += 1;
            graph.row_parent.push(parent);
            graph.row_child.push(child);
        }

        graph
    }

    fn intern(&mut self, index: &mut HashMap<&'a str, usize>, label: &'a str) -> usize {
        *index.entry(label).or_insert_with(|| {
            self.labels.push(label);
            self.children.push(Vec::new());
            self.neighbours.push(Vec::new());
            self.in_degree.push(0);
            self.labels.len() - 1
        })
    }

    /// Label of a node
    pub fn label(&self, node: usize) -> &'a str {
        self.labels[node]
    }

    /// Weakly connected components, ordered by first appearance in the input
    pub fn components(&self) -> Vec<Component> {
        let mut assigned = vec![false; self.labels.len()];
        let mut components = Vec::new();

        for start in 0..self.labels.len() {
            if assigned[start] {
                continue;
            }

            let mut nodes = Vec::new();
            let mut stack = vec![start];
            assigned[start] = true;

            while let Some(node) = stack.pop() {
                nodes.push(node);
                for &next in &self.neighbours[node] {
                    if !assigned[next] {
                        assigned[next] = true;
                        stack.push(next);
                    }
                }
            }

            nodes.sort_unstable();
            components.push(Component { nodes });
        }

        components
    }

    /// The single node of `component` without a parent
    pub fn root(&self, component: &Component) -> std::result::Result<usize, GraftError> {
        let roots: Vec<usize> = component
            .nodes
            .iter()
            .copied()
            .filter(|&node| self.in_degree[node] == 0)
            .collect();

        match roots.as_slice() {
            [root] => Ok(*root),
            _ => Err(GraftError::AmbiguousRoot {
                component: self.label(component.nodes[0]).to_string(),
                roots: roots.iter().map(|&node| self.label(node).to_string()).collect(),
            }),
        }
    }

    /// Rows of `component` in breadth-first order from `root`, provided the
    /// component is an out-tree: `root` has no parent and every other node
    /// exactly one
    pub fn arborescence(
        &self,
        component: &Component,
        root: usize,
    ) -> std::result::Result<Vec<usize>, GraftError> {
        let not_a_tree = |reason: String| GraftError::NotATree {
            root: self.label(root).to_string(),
            reason,
        };

        for &node in &component.nodes {
            let parents = if node == root { 0 } else { 1 };
            if self.in_degree[node] != parents {
                return Err(not_a_tree(format!(
                    "'{}' has {} parents",
                    self.label(node),
                    self.in_degree[node]
                )));
            }
        }

        // one parent per non-root node in a weakly connected component leaves
        // exactly n - 1 edges, so the walk below sees every node once
        let mut order = Vec::with_capacity(component.nodes.len().saturating_sub(1));
        let mut queue = VecDeque::from([root]);

        while let Some(node) = queue.pop_front() {
            for &(row, child) in &self.children[node] {
                order.push(row);
                queue.push_back(child);
            }
        }
        debug_assert_eq!(order.len() + 1, component.nodes.len());

        Ok(order)
    }
}

/// Graft `rows` into the store and report the minted `(key, tax_id)` pairs
/// in allocation order.
///
/// All components are validated before anything is written; the first
/// failure aborts with a [`GraftError`]. The caller owns the session and
/// commits it, so a failure here leaves the store untouched once the session
/// is dropped.
pub async fn graft(session: &mut Session, rows: &[CustomTaxon]) -> Result<Vec<(String, i64)>> {
    let graph = GraftGraph::new(rows);
    let components = graph.components();
    let mut plans = Vec::with_capacity(components.len());

    for component in &components {
        let root = graph.root(component)?;
        let root_label = graph.label(root);

        let root_id = match root_label.parse::<i64>() {
            Ok(id) => (session.count_nodes(id).await? == 1).then_some(id),
            Err(_) => None,
        };
        let Some(root_id) = root_id else {
            return Err(GraftError::UnknownRoot {
                root: root_label.to_string(),
            }
            .into());
        };

        let order = graph.arborescence(component, root)?;
        debug!(root = root_id, rows = order.len(), "Validated custom component");
        plans.push(GraftPlan {
            root: root_id,
            rows: order,
        });
    }

    let mut next_tax_id = Some(session.next_free_tax_id().await?);
    let mut next_name_id = Some(session.next_free_name_id().await?);

    let mut assigned: HashMap<usize, i64> = HashMap::new();
    let mut nodes = Vec::with_capacity(rows.len());
    let mut names = Vec::with_capacity(rows.len());
    let mut report = Vec::with_capacity(rows.len());

    for plan in &plans {
        for &row_index in &plan.rows {
            let row = &rows[row_index];
            let parent_id = assigned
                .get(&graph.row_parent[row_index])
                .copied()
                .unwrap_or(plan.root);

            let tax_id = next_tax_id.ok_or_else(|| ids_exhausted("tax_node"))?;
            next_tax_id = tax_id.checked_add(1);
            let name_id = next_name_id.ok_or_else(|| ids_exhausted("tax_name"))?;
            next_name_id = name_id.checked_add(1);

            nodes.push(TaxonNode::new(tax_id, parent_id, row.rank.clone()));
            names.push(TaxonName::new(
                name_id,
                tax_id,
                row.name_txt.clone(),
                row.unique_name.clone().filter(|name| !name.is_empty()),
                row.name_class(),
            ));

            assigned.insert(graph.row_child[row_index], tax_id);
            report.push((row.key.trim().to_string(), tax_id));
        }
    }

    session.bulk_insert_nodes(&nodes).await?;
    session.bulk_insert_names(&names).await?;

    info!(
        components = plans.len(),
        taxa = report.len(),
        "Grafted custom taxonomy"
    );

    Ok(report)
}
