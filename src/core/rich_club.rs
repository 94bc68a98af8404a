//! Hand-curated "rich club" hubs and the subset shown in the whole view.

use crate::connectome::Connectome;
use crate::error::Result;

/// Command interneurons forming the core rich club.
pub const RICH1: &[&str] = &[
    "AVAL", "AVAR", "AVBL", "AVBR", "AVDL", "AVDR", "AVEL", "AVER", "PVCL", "PVCR", "DVA",
];
pub const RICH2: &[&str] = &["RIBL"];
pub const RICH3: &[&str] = &["AIBR", "RIAR"];

/// Neurons the whole-connectome view is restricted to.
pub const SELECTION: &[&str] = &[
    "AIBL", "AIBR", "ALA", "ALNL", "ALNR", "AS10", "ASKL", "ASKR", "AVAL", "AVAR", "AVBL", "AVBR",
    "AVEL", "AVER", "AVFL", "AVFR", "BAGL", "DA01", "DA07", "DA09", "DB01", "DB02", "DB07", "DVA",
    "DVC", "LUAR", "OLQDL", "OLQDR", "OLQVL", "OLQVR", "PDA", "PHAR", "PVCL", "PVCR", "PVNL",
    "PVNR", "RIBL", "RIBR", "RID", "RIFR", "RIMR", "RIS", "RIVR", "RMED", "RMEL", "RMEV", "SABD",
    "SABVL", "SABVR", "SIADL", "SIADR", "SIAVL", "SIAVR", "SMDDL", "SMDDR", "SMDVL", "SMDVR",
    "VA01", "VA11", "VA12", "VB02", "VB11", "VD11", "VD13",
];

/// One halo tier: its members and ring sizes as multiples of the node size.
/// A multiplier of zero means the ring is not drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tier {
    pub members: &'static [&'static str],
    pub outer: f32,
    pub middle: f32,
    pub inner: f32,
}

/// Drawn in this order so the largest halos end up on top.
pub const TIERS: [Tier; 3] = [
    Tier {
        members: RICH3,
        outer: 1.84,
        middle: 0.0,
        inner: 1.8,
    },
    Tier {
        members: RICH2,
        outer: 2.24,
        middle: 2.2,
        inner: 1.8,
    },
    Tier {
        members: RICH1,
        outer: 2.8,
        middle: 2.6,
        inner: 2.0,
    },
];

/// The whole connectome cut down to [`SELECTION`].
pub fn curated_subset(connectome: &Connectome) -> Result<Connectome> {
    connectome.restrict(SELECTION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectome::fixture;
    use crate::error::ConnectomeError;

    #[test]
    fn selection_has_no_duplicates() {
        assert_eq!(SELECTION.len(), 64);
        let mut sorted = SELECTION.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), SELECTION.len());
    }

    #[test]
    fn rings_shrink_inwards() {
        for t in TIERS {
            assert!(t.outer > t.inner);
            assert!(t.middle == 0.0 || (t.outer > t.middle && t.middle > t.inner));
        }
    }

    #[test]
    fn membership() {
        let tiered = |name: &str| TIERS.iter().any(|t| t.members.contains(&name));
        assert!(tiered("DVA"));
        assert!(tiered("RIAR"));
        assert!(!tiered("VA01"));
    }

    #[test]
    fn subset_needs_every_selected_neuron() {
        // The five-neuron fixture lacks most of the selection.
        let err = curated_subset(&fixture::connectome()).unwrap_err();
        assert!(matches!(err, ConnectomeError::UnknownNeuron(_)));
    }
}
