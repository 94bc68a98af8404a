//! Neuron classification (sensory / interneuron / motor).

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, Trim};
use hashbrown::HashMap;
use thiserror::Error;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ConnectomeError, Result};

/// Column holding the neuron name in the classification file.
const NAME_COLUMN: usize = 1;
const CATEGORY_HEADER: &str = "Category";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Category {
    Sensory,
    Interneuron,
    Motor,
}

impl Category {
    /// Drawing order used by both views.
    pub const ALL: [Category; 3] = [Category::Sensory, Category::Interneuron, Category::Motor];

    pub fn label(self) -> &'static str {
        match self {
            Category::Sensory => "SENSORY",
            Category::Interneuron => "INTERNEURON",
            Category::Motor => "MOTOR",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a neuron category: {0:?}")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SENSORY" => Ok(Category::Sensory),
            "INTERNEURON" => Ok(Category::Interneuron),
            "MOTOR" => Ok(Category::Motor),
            _ => Err(ParseCategoryError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CategoryTable {
    order: Vec<String>,
    by_name: HashMap<String, Category>,
}

impl CategoryTable {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ConnectomeError::io(path, e))?;
        let table = Self::from_reader(BufReader::new(file))?;
        debug!(path = %path.display(), neurons = table.len(), "loaded categories");
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let cat_col = rdr
            .headers()?
            .iter()
            .position(|h| h == CATEGORY_HEADER)
            .ok_or_else(|| ConnectomeError::MissingColumn(CATEGORY_HEADER.to_string()))?;

        let mut table = Self::default();
        for result in rdr.records() {
            let record = result?;
            let name = record
                .get(NAME_COLUMN)
                .ok_or_else(|| ConnectomeError::MissingColumn(format!("#{NAME_COLUMN}")))?;
            let raw = record
                .get(cat_col)
                .ok_or_else(|| ConnectomeError::MissingColumn(CATEGORY_HEADER.to_string()))?;
            let cat = raw
                .parse::<Category>()
                .map_err(|_| ConnectomeError::UnknownCategory {
                    neuron: name.to_string(),
                    value: raw.to_string(),
                })?;
            table.insert(name, cat);
        }
        Ok(table)
    }

    /// Later rows for the same name replace earlier ones.
    pub fn insert(&mut self, name: &str, cat: Category) {
        if self.by_name.insert(name.to_string(), cat).is_none() {
            self.order.push(name.to_string());
        }
    }

    pub fn get(&self, name: &str) -> Option<Category> {
        self.by_name.get(name).copied()
    }

    /// Names in `cat`, in table order.
    pub fn members(&self, cat: Category) -> impl Iterator<Item = &str> + '_ {
        self.order
            .iter()
            .filter(move |n| self.by_name.get(n.as_str()) == Some(&cat))
            .map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
