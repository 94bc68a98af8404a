//! Directed neuron graphs built fresh for each draw.

use hashbrown::HashMap;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::connectome::Connectome;
use crate::filter::{EdgeKind, NeuronConnections};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Synapse,
    Gap,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub weight: f32,
    pub kind: LinkKind,
}

/// Node order is insertion order (first appearance of a name in an edge).
#[derive(Debug, Clone, Default)]
pub struct NeuronGraph {
    graph: DiGraph<String, Link>,
    index: HashMap<String, NodeIndex>,
}

impl NeuronGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_connections(conn: &NeuronConnections) -> Self {
        let mut g = Self::new();
        for e in conn.edges() {
            let kind = match e.kind {
                EdgeKind::SynapseIn | EdgeKind::SynapseOut => LinkKind::Synapse,
                EdgeKind::Gap => LinkKind::Gap,
            };
            g.add_link(&e.from, &e.to, Link { weight: e.weight, kind });
        }
        g
    }

    /// All synapses, then all gap junctions (each gap entry of the matrix is
    /// its own directed edge). Neurons without any connection are left out.
    pub fn whole(connectome: &Connectome) -> Self {
        let mut g = Self::new();
        for (a, b, w) in connectome.synapses().positive_entries() {
            g.add_link(a, b, Link { weight: w, kind: LinkKind::Synapse });
        }
        for (a, b, w) in connectome.gaps().positive_entries() {
            g.add_link(a, b, Link { weight: w, kind: LinkKind::Gap });
        }
        g
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(&ix) = self.index.get(name) {
            return ix;
        }
        let ix = self.graph.add_node(name.to_string());
        self.index.insert(name.to_string(), ix);
        ix
    }

    pub fn add_link(&mut self, from: &str, to: &str, link: Link) {
        let a = self.node(from);
        let b = self.node(to);
        self.graph.add_edge(a, b, link);
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph.node_weights().map(String::as_str)
    }

    pub fn links(&self) -> impl Iterator<Item = (&str, &str, Link)> + '_ {
        self.graph.edge_references().map(move |e| {
            (
                self.graph[e.source()].as_str(),
                self.graph[e.target()].as_str(),
                *e.weight(),
            )
        })
    }

    pub fn links_of_kind(&self, kind: LinkKind) -> impl Iterator<Item = (&str, &str, f32)> + '_ {
        self.links()
            .filter(move |(_, _, l)| l.kind == kind)
            .map(|(a, b, l)| (a, b, l.weight))
    }

    /// Symmetric weighted adjacency (row-major, node order) for the spring
    /// layout. Each directed edge adds its weight to both cells of the pair,
    /// so reciprocal synapses sum and gap junctions count twice.
    pub fn layout_weights(&self) -> Vec<f64> {
        let n = self.node_count();
        let mut adj = vec![0.0f64; n * n];
        for e in self.graph.edge_references() {
            let (i, j) = (e.source().index(), e.target().index());
            if i == j {
                continue;
            }
            let w = e.weight().weight as f64;
            adj[i * n + j] += w;
            adj[j * n + i] += w;
        }
        adj
    }
}
