//! Per-neuron edge extraction from the two adjacency tables.

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::connectome::Connectome;
use crate::error::{ConnectomeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EdgeKind {
    SynapseIn,
    SynapseOut,
    Gap,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub weight: f32,
    pub kind: EdgeKind,
}

impl Edge {
    fn new(from: &str, to: &str, weight: f32, kind: EdgeKind) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            weight,
            kind,
        }
    }
}

/// Everything touching one neuron.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuronConnections {
    pub neuron: String,
    /// Presynaptic partners: `pre -> neuron`.
    pub inbound: Vec<Edge>,
    /// Postsynaptic partners: `neuron -> post`.
    pub outbound: Vec<Edge>,
    /// Gap junctions, both directions: all `neuron -> k` then all `k -> neuron`.
    pub gaps: Vec<Edge>,
}

impl NeuronConnections {
    /// Filter the synapse column/row and the gap column of `neuron`.
    ///
    /// The neuron must appear in both tables.
    pub fn of(connectome: &Connectome, neuron: &str) -> Result<Self> {
        if !connectome.synapses().contains(neuron) || !connectome.gaps().contains(neuron) {
            return Err(ConnectomeError::UnknownNeuron(neuron.to_string()));
        }

        let inbound = connectome
            .synapses()
            .column(neuron)?
            .into_iter()
            .map(|(pre, w)| Edge::new(pre, neuron, w, EdgeKind::SynapseIn))
            .collect();

        let outbound = connectome
            .synapses()
            .row(neuron)?
            .into_iter()
            .map(|(post, w)| Edge::new(neuron, post, w, EdgeKind::SynapseOut))
            .collect();

        let partners = connectome.gaps().column(neuron)?;
        let mut gaps = Vec::with_capacity(partners.len() * 2);
        gaps.extend(
            partners
                .iter()
                .map(|&(k, w)| Edge::new(neuron, k, w, EdgeKind::Gap)),
        );
        gaps.extend(
            partners
                .iter()
                .map(|&(k, w)| Edge::new(k, neuron, w, EdgeKind::Gap)),
        );

        Ok(Self {
            neuron: neuron.to_string(),
            inbound,
            outbound,
            gaps,
        })
    }

    /// Inbound, gap pairs, outbound.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.inbound
            .iter()
            .chain(self.gaps.iter())
            .chain(self.outbound.iter())
    }

    /// Distinct partners in first-appearance order over [`Self::edges`].
    pub fn neighbours(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for e in self.edges() {
            for n in [e.from.as_str(), e.to.as_str()] {
                if n != self.neuron && !seen.contains(&n) {
                    seen.push(n);
                }
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectome::fixture;

    #[test]
    fn inbound_matches_positive_column() {
        let c = fixture::connectome();
        let conn = NeuronConnections::of(&c, "AVAL").unwrap();
        let pres: Vec<_> = conn.inbound.iter().map(|e| (e.from.as_str(), e.weight)).collect();
        assert_eq!(pres, vec![("AVBL", 2.0), ("DVA", 4.0), ("ASHL", 6.0)]);

        for post in c.neuron_names() {
            let conn = NeuronConnections::of(&c, &post).unwrap();
            assert!(conn.inbound.iter().all(|e| e.to == post));
            for pre in c.synapses().names() {
                let positive = c.synapses().get(pre, &post) > 0.0;
                let listed = conn.inbound.iter().any(|e| &e.from == pre);
                assert_eq!(positive, listed, "{pre} -> {post}");
            }
        }
    }

    #[test]
    fn outbound_matches_positive_row() {
        let c = fixture::connectome();
        let conn = NeuronConnections::of(&c, "AVAL").unwrap();
        let posts: Vec<_> = conn.outbound.iter().map(|e| (e.to.as_str(), e.weight)).collect();
        assert_eq!(posts, vec![("AVBL", 3.0), ("DVA", 1.0), ("VA01", 5.0)]);

        for pre in c.neuron_names() {
            let conn = NeuronConnections::of(&c, &pre).unwrap();
            assert!(conn.outbound.iter().all(|e| e.from == pre));
            for post in c.synapses().names() {
                let positive = c.synapses().get(&pre, post) > 0.0;
                let listed = conn.outbound.iter().any(|e| &e.to == post);
                assert_eq!(positive, listed, "{pre} -> {post}");
            }
        }
    }

    #[test]
    fn gap_edges_come_in_symmetric_pairs() {
        let c = fixture::connectome();
        for name in c.neuron_names() {
            let conn = NeuronConnections::of(&c, &name).unwrap();
            assert_eq!(conn.gaps.len() % 2, 0);
            for e in &conn.gaps {
                assert!(conn
                    .gaps
                    .iter()
                    .any(|r| r.from == e.to && r.to == e.from && r.weight == e.weight));
            }
        }

        let conn = NeuronConnections::of(&c, "AVAL").unwrap();
        let gaps: Vec<_> = conn
            .gaps
            .iter()
            .map(|e| (e.from.as_str(), e.to.as_str()))
            .collect();
        assert_eq!(gaps, vec![("AVAL", "VA01"), ("VA01", "AVAL")]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let c = fixture::connectome();
        let a = NeuronConnections::of(&c, "DVA").unwrap();
        let b = NeuronConnections::of(&c, "DVA").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.edges().collect::<Vec<_>>(), b.edges().collect::<Vec<_>>());
    }

    #[test]
    fn neighbours_in_first_appearance_order() {
        let c = fixture::connectome();
        let conn = NeuronConnections::of(&c, "AVAL").unwrap();
        assert_eq!(conn.neighbours(), vec!["AVBL", "DVA", "ASHL", "VA01"]);
    }

    #[test]
    fn sink_neuron_has_no_outbound() {
        let c = fixture::connectome();
        let conn = NeuronConnections::of(&c, "VA01").unwrap();
        assert!(conn.outbound.is_empty());
        assert!(!conn.inbound.is_empty());
    }

    #[test]
    fn unknown_neuron_fails_fast() {
        let c = fixture::connectome();
        assert!(matches!(
            NeuronConnections::of(&c, "XYZ"),
            Err(ConnectomeError::UnknownNeuron(_))
        ));
    }
}
