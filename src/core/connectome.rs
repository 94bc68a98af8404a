//! The loaded connectome: synapse table, gap-junction table and categories.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::category::{Category, CategoryTable};
use crate::error::{ConnectomeError, Result};
use crate::table::WeightMatrix;

pub const SYNAPSE_FILE: &str = "Neuro279_Syn.csv";
pub const GAP_FILE: &str = "Neuro279_EJ.csv";
pub const CATEGORY_FILE: &str = "neuron_categories.csv";

/// Locations of the three input tables.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub synapses: PathBuf,
    pub gaps: PathBuf,
    pub categories: PathBuf,
}

impl DataPaths {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            synapses: dir.join(SYNAPSE_FILE),
            gaps: dir.join(GAP_FILE),
            categories: dir.join(CATEGORY_FILE),
        }
    }
}

/// Immutable, load-once tables. Every query borrows.
#[derive(Debug, Clone)]
pub struct Connectome {
    synapses: WeightMatrix,
    gaps: WeightMatrix,
    categories: CategoryTable,
}

impl Connectome {
    pub fn load(paths: &DataPaths) -> Result<Self> {
        let synapses = WeightMatrix::load(&paths.synapses)?;
        let gaps = WeightMatrix::load(&paths.gaps)?;
        let categories = CategoryTable::load(&paths.categories)?;
        let c = Self::from_tables(synapses, gaps, categories)?;
        info!(
            neurons = c.neuron_names().len(),
            synapses = c.synapses.positive_entries().count(),
            gap_junctions = c.gaps.positive_entries().count(),
            "connectome loaded"
        );
        Ok(c)
    }

    /// Every neuron of the gap-junction table must be classified.
    pub fn from_tables(
        synapses: WeightMatrix,
        gaps: WeightMatrix,
        categories: CategoryTable,
    ) -> Result<Self> {
        if let Some(missing) = gaps.names().iter().find(|n| categories.get(n).is_none()) {
            return Err(ConnectomeError::MissingCategory(missing.clone()));
        }
        Ok(Self {
            synapses,
            gaps,
            categories,
        })
    }

    pub fn synapses(&self) -> &WeightMatrix {
        &self.synapses
    }

    pub fn gaps(&self) -> &WeightMatrix {
        &self.gaps
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    /// Union of both table indices, sorted.
    pub fn neuron_names(&self) -> Vec<String> {
        let set: BTreeSet<&String> = self
            .synapses
            .names()
            .iter()
            .chain(self.gaps.names().iter())
            .collect();
        set.into_iter().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.synapses.contains(name) || self.gaps.contains(name)
    }

    pub fn category_of(&self, name: &str) -> Option<Category> {
        self.categories.get(name)
    }

    /// Same connectome limited to `names`, both matrices in that order.
    pub fn restrict<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        Ok(Self {
            synapses: self.synapses.restrict(names)?,
            gaps: self.gaps.restrict(names)?,
            categories: self.categories.clone(),
        })
    }
}

#[cfg(test)]
pub(crate) mod fixture {
    use super::*;

    pub const SYN: &str = "\
,AVAL,AVBL,DVA,VA01,ASHL
AVAL,0,3,1,5,0
AVBL,2,0,0,0,0
DVA,4,0,0,1,0
VA01,0,0,0,0,0
ASHL,6,1,0,0,0
";

    pub const GAP: &str = "\
,AVAL,AVBL,DVA,VA01,ASHL
AVAL,0,0,0,2,0
AVBL,0,0,1,0,0
DVA,0,1,0,0,0
VA01,2,0,0,0,0
ASHL,0,0,0,0,0
";

    pub const CATS: &str = "\
row,Neuron,Category
0,AVAL,INTERNEURON
1,AVBL,INTERNEURON
2,DVA,INTERNEURON
3,VA01,MOTOR
4,ASHL,SENSORY
";

    pub fn connectome() -> Connectome {
        Connectome::from_tables(
            WeightMatrix::from_reader(SYN.as_bytes()).unwrap(),
            WeightMatrix::from_reader(GAP.as_bytes()).unwrap(),
            CategoryTable::from_reader(CATS.as_bytes()).unwrap(),
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_sorted_union() {
        let c = fixture::connectome();
        assert_eq!(c.neuron_names(), vec!["ASHL", "AVAL", "AVBL", "DVA", "VA01"]);
    }

    #[test]
    fn missing_category_is_rejected() {
        let cats = CategoryTable::from_reader("r,Neuron,Category\n0,AVAL,MOTOR\n".as_bytes()).unwrap();
        let err = Connectome::from_tables(
            WeightMatrix::from_reader(fixture::SYN.as_bytes()).unwrap(),
            WeightMatrix::from_reader(fixture::GAP.as_bytes()).unwrap(),
            cats,
        )
        .unwrap_err();
        assert!(matches!(err, ConnectomeError::MissingCategory(n) if n == "AVBL"));
    }

    #[test]
    fn restrict_limits_both_tables() {
        let c = fixture::connectome().restrict(&["VA01", "AVAL"]).unwrap();
        assert_eq!(c.synapses().names(), &["VA01", "AVAL"]);
        assert_eq!(c.gaps().get("AVAL", "VA01"), 2.0);
        assert!(!c.contains("DVA"));
        assert_eq!(c.category_of("VA01"), Some(Category::Motor));
    }

    #[test]
    fn load_from_disk() {
        let dir = std::env::temp_dir().join(format!("connectome-load-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(SYNAPSE_FILE), fixture::SYN).unwrap();
        std::fs::write(dir.join(GAP_FILE), fixture::GAP).unwrap();
        std::fs::write(dir.join(CATEGORY_FILE), fixture::CATS).unwrap();

        let c = Connectome::load(&DataPaths::in_dir(&dir)).unwrap();
        assert_eq!(c.neuron_names().len(), 5);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Connectome::load(&DataPaths::in_dir("/definitely/not/here")).unwrap_err();
        match err {
            ConnectomeError::Io { path, .. } => assert!(path.ends_with(SYNAPSE_FILE)),
            other => panic!("unexpected error: {other}"),
        }
    }
}
