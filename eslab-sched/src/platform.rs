/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Platform model: the homogeneous processing nodes a schedule runs on.
//!
//! Nodes are identical and can run any job.  Communication is free: a job's
//! result is visible on every node the instant it completes.

use crate::job::ModelError;

/// One processing node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Position of the node in [`Platform::nodes`]; also the tie-break key
    /// when several nodes are equally eligible.
    pub index: usize,
    pub name: String,
}

impl Node {
    /// Node with the default `node<i>` name.
    pub fn default_named(index: usize) -> Self {
        Self {
            index,
            name: format!("node{index}"),
        }
    }
}

/// The set of nodes available for execution (m ≥ 1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    nodes: Vec<Node>,
}

impl Platform {
    /// `node_count` identical nodes named `node0`, `node1`, ….
    pub fn homogeneous(node_count: usize) -> Result<Self, ModelError> {
        if node_count == 0 {
            return Err(ModelError::NoNodes);
        }
        Ok(Self {
            nodes: (0..node_count).map(Node::default_named).collect(),
        })
    }

    /// Nodes with caller-supplied names, indexed in the given order.
    pub fn named<I, S>(names: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let nodes: Vec<Node> = names
            .into_iter()
            .enumerate()
            .map(|(index, name)| Node {
                index,
                name: name.into(),
            })
            .collect();
        if nodes.is_empty() {
            return Err(ModelError::NoNodes);
        }
        Ok(Self { nodes })
    }

    /// The one-node platform used by the single-node algorithms.
    pub fn single() -> Self {
        Self {
            nodes: vec![Node::default_named(0)],
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Keep only the first node, preserving its name.
    pub fn first_node(&self) -> Self {
        Self {
            nodes: self.nodes.iter().take(1).cloned().collect(),
        }
    }
}
