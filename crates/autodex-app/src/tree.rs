// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Hierarchical regrouping of a filtered result list.
//!
//! The flat list is grouped into make name → model name → trims. Children of
//! a node are only materialized the first time that node is expanded, and the
//! materialized list is memoized by node path so collapsing and re-expanding
//! never recomputes it. Expansion state and memoized children are independent:
//! a collapsed node keeps its children.

use anyhow::{Result, anyhow};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{FilteredRecord, MakeId};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodePath {
    Make(String),
    Model { make: String, model: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Make { make_id: MakeId, name: String },
    Model { make_name: String, name: String },
    Trim(FilteredRecord),
}

impl TreeNode {
    pub fn path(&self) -> Option<NodePath> {
        match self {
            Self::Make { name, .. } => Some(NodePath::Make(name.clone())),
            Self::Model { make_name, name } => Some(NodePath::Model {
                make: make_name.clone(),
                model: name.clone(),
            }),
            Self::Trim(_) => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Make { name, .. } | Self::Model { name, .. } => name.clone(),
            Self::Trim(record) => format!("{} {}", record.year, record.trim_name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub depth: usize,
    pub node: TreeNode,
    pub expanded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MakeGroup {
    make_id: MakeId,
    models: BTreeMap<String, Vec<FilteredRecord>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultTree {
    groups: BTreeMap<String, MakeGroup>,
    roots: Vec<TreeNode>,
    expanded: BTreeSet<NodePath>,
    materialized: HashMap<NodePath, Vec<TreeNode>>,
    materializations: usize,
}

impl ResultTree {
    pub fn build(records: &[FilteredRecord]) -> Self {
        let mut groups: BTreeMap<String, MakeGroup> = BTreeMap::new();
        for record in records {
            groups
                .entry(record.make_name.clone())
                .or_insert_with(|| MakeGroup {
                    make_id: record.make_id.clone(),
                    models: BTreeMap::new(),
                })
                .models
                .entry(record.model_name.clone())
                .or_default()
                .push(record.clone());
        }

        let roots = groups
            .iter()
            .map(|(name, group)| TreeNode::Make {
                make_id: group.make_id.clone(),
                name: name.clone(),
            })
            .collect();

        Self {
            groups,
            roots,
            expanded: BTreeSet::new(),
            materialized: HashMap::new(),
            materializations: 0,
        }
    }

    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    pub fn is_expanded(&self, path: &NodePath) -> bool {
        self.expanded.contains(path)
    }

    /// Children already materialized for `path`, if it was ever expanded.
    pub fn children(&self, path: &NodePath) -> Option<&[TreeNode]> {
        self.materialized.get(path).map(Vec::as_slice)
    }

    /// Number of times any node's children were computed.
    pub fn materializations(&self) -> usize {
        self.materializations
    }

    /// Flips the expansion state of `path` and returns the new state.
    pub fn toggle(&mut self, path: &NodePath) -> Result<bool> {
        if self.expanded.remove(path) {
            return Ok(false);
        }
        self.materialize(path)?;
        self.expanded.insert(path.clone());
        Ok(true)
    }

    pub fn expand(&mut self, path: &NodePath) -> Result<()> {
        if !self.is_expanded(path) {
            self.toggle(path)?;
        }
        Ok(())
    }

    pub fn collapse(&mut self, path: &NodePath) {
        self.expanded.remove(path);
    }

    pub fn expand_all(&mut self) -> Result<()> {
        let make_paths = self
            .roots
            .iter()
            .filter_map(TreeNode::path)
            .collect::<Vec<_>>();
        for make_path in make_paths {
            self.expand(&make_path)?;
            let model_paths = self
                .children(&make_path)
                .unwrap_or_default()
                .iter()
                .filter_map(TreeNode::path)
                .collect::<Vec<_>>();
            for model_path in model_paths {
                self.expand(&model_path)?;
            }
        }
        Ok(())
    }

    /// Rows currently visible: every root, plus the memoized children of each
    /// expanded node, depth first.
    pub fn visible_rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        for root in &self.roots {
            self.push_rows(root, 0, &mut rows);
        }
        rows
    }

    fn push_rows(&self, node: &TreeNode, depth: usize, rows: &mut Vec<TreeRow>) {
        let path = node.path();
        let expanded = path.as_ref().is_some_and(|path| self.is_expanded(path));
        rows.push(TreeRow {
            depth,
            node: node.clone(),
            expanded,
        });
        if !expanded {
            return;
        }
        let Some(children) = path.as_ref().and_then(|path| self.children(path)) else {
            return;
        };
        for child in children {
            self.push_rows(child, depth + 1, rows);
        }
    }

    fn materialize(&mut self, path: &NodePath) -> Result<()> {
        if self.materialized.contains_key(path) {
            return Ok(());
        }

        let children = match path {
            NodePath::Make(make) => {
                let group = self
                    .groups
                    .get(make)
                    .ok_or_else(|| anyhow!("tree has no make named {make:?}"))?;
                group
                    .models
                    .keys()
                    .map(|model| TreeNode::Model {
                        make_name: make.clone(),
                        name: model.clone(),
                    })
                    .collect::<Vec<_>>()
            }
            NodePath::Model { make, model } => {
                let records = self
                    .groups
                    .get(make)
                    .and_then(|group| group.models.get(model))
                    .ok_or_else(|| anyhow!("tree has no model {model:?} under {make:?}"))?;
                let mut records = records.clone();
                records.sort_by(|a, b| b.year.cmp(&a.year));
                records.into_iter().map(TreeNode::Trim).collect()
            }
        };

        self.materializations += 1;
        self.materialized.insert(path.clone(), children);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{NodePath, ResultTree, TreeNode};
    use crate::{FilteredRecord, MakeId, TrimId};
    use anyhow::Result;

    fn record(make: &str, model: &str, trim: &str, year: i32) -> FilteredRecord {
        FilteredRecord {
            make_id: MakeId::from(make.to_lowercase().as_str()),
            make_name: make.to_owned(),
            model_name: model.to_owned(),
            trim_id: TrimId::from(trim),
            year,
            trim_name: "Base".to_owned(),
        }
    }

    fn sample() -> Vec<FilteredRecord> {
        vec![
            record("Toyota", "Supra", "s1", 1994),
            record("Audi", "A4", "a1", 2015),
            record("Toyota", "Corolla", "c1", 2001),
            record("Toyota", "Corolla", "c2", 2019),
        ]
    }

    #[test]
    fn roots_sort_by_make_name_and_start_collapsed() {
        let tree = ResultTree::build(&sample());
        let labels = tree
            .visible_rows()
            .iter()
            .map(|row| row.node.label())
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["Audi", "Toyota"]);
        assert_eq!(tree.materializations(), 0);
    }

    #[test]
    fn expansion_materializes_once_and_is_reused() -> Result<()> {
        let mut tree = ResultTree::build(&sample());
        let toyota = NodePath::Make("Toyota".to_owned());

        assert!(tree.toggle(&toyota)?);
        assert_eq!(tree.materializations(), 1);
        assert!(!tree.toggle(&toyota)?);
        assert!(tree.children(&toyota).is_some());
        assert!(tree.toggle(&toyota)?);
        assert_eq!(tree.materializations(), 1);

        let models = tree
            .children(&toyota)
            .unwrap_or_default()
            .iter()
            .map(TreeNode::label)
            .collect::<Vec<_>>();
        assert_eq!(models, vec!["Corolla", "Supra"]);
        Ok(())
    }

    #[test]
    fn trims_order_by_year_descending_under_model() -> Result<()> {
        let mut tree = ResultTree::build(&sample());
        tree.expand(&NodePath::Make("Toyota".to_owned()))?;
        tree.expand(&NodePath::Model {
            make: "Toyota".to_owned(),
            model: "Corolla".to_owned(),
        })?;

        let rows = tree.visible_rows();
        let rendered = rows
            .iter()
            .map(|row| format!("{}{}", "-".repeat(row.depth), row.node.label()))
            .collect::<Vec<_>>();
        assert_eq!(
            rendered,
            vec![
                "Audi",
                "Toyota",
                "-Corolla",
                "--2019 Base",
                "--2001 Base",
                "-Supra",
            ]
        );
        Ok(())
    }

    #[test]
    fn collapsing_parent_hides_but_keeps_expanded_children() -> Result<()> {
        let mut tree = ResultTree::build(&sample());
        let toyota = NodePath::Make("Toyota".to_owned());
        let supra = NodePath::Model {
            make: "Toyota".to_owned(),
            model: "Supra".to_owned(),
        };
        tree.expand(&toyota)?;
        tree.expand(&supra)?;

        tree.collapse(&toyota);
        assert_eq!(tree.visible_rows().len(), 2);

        tree.expand(&toyota)?;
        assert!(tree.is_expanded(&supra));
        assert_eq!(tree.visible_rows().len(), 5);
        assert_eq!(tree.materializations(), 2);
        Ok(())
    }

    #[test]
    fn unknown_path_is_an_error() {
        let mut tree = ResultTree::build(&sample());
        assert!(tree.toggle(&NodePath::Make("Saab".to_owned())).is_err());
    }

    #[test]
    fn empty_list_builds_empty_tree() {
        let tree = ResultTree::build(&[]);
        assert!(tree.roots().is_empty());
        assert!(tree.visible_rows().is_empty());
    }
}
