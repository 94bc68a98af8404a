//! Square weight matrices keyed by neuron name.
//!
//! Both connectome tables (chemical synapses and gap junctions) share the
//! same CSV shape: a header row whose first cell is a corner label, then one
//! row per neuron holding the neuron name followed by one weight per column.
//! Row and column labels must match one to one.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use hashbrown::HashMap;
use tracing::debug;

use crate::error::{ConnectomeError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct WeightMatrix {
    names: Vec<String>,
    index: HashMap<String, usize>,
    // Row-major, names.len() x names.len().
    weights: Vec<f32>,
}

impl WeightMatrix {
    /// Build from labels and row-major weights.
    pub fn new(names: Vec<String>, weights: Vec<f32>) -> Result<Self> {
        let n = names.len();
        if weights.len() != n * n {
            let cols = if n == 0 { weights.len() } else { weights.len() / n };
            return Err(ConnectomeError::NotSquare { rows: n, cols });
        }
        let index = build_index(&names);
        Ok(Self {
            names,
            index,
            weights,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ConnectomeError::io(path, e))?;
        let m = Self::from_reader(BufReader::new(file))?;
        debug!(path = %path.display(), neurons = m.len(), "loaded weight matrix");
        Ok(m)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let cols: Vec<String> = rdr.headers()?.iter().skip(1).map(str::to_string).collect();

        let mut rows: Vec<String> = Vec::with_capacity(cols.len());
        let mut weights: Vec<f32> = Vec::with_capacity(cols.len() * cols.len());

        for result in rdr.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let mut fields = record.iter();
            let Some(name) = fields.next() else {
                continue;
            };
            rows.push(name.to_string());

            for (col, raw) in cols.iter().zip(fields) {
                // Blank cells are treated as "no connection".
                let w = if raw.is_empty() {
                    0.0
                } else {
                    raw.parse::<f32>().map_err(|_| ConnectomeError::BadWeight {
                        line,
                        column: col.clone(),
                        value: raw.to_string(),
                    })?
                };
                weights.push(w);
            }
        }

        if rows.len() != cols.len() {
            return Err(ConnectomeError::NotSquare {
                rows: rows.len(),
                cols: cols.len(),
            });
        }
        for (i, (r, c)) in rows.iter().zip(cols.iter()).enumerate() {
            if r != c {
                return Err(ConnectomeError::LabelMismatch {
                    index: i,
                    row: r.clone(),
                    col: c.clone(),
                });
            }
        }

        Self::new(rows, weights)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn require(&self, name: &str) -> Result<usize> {
        self.index_of(name)
            .ok_or_else(|| ConnectomeError::UnknownNeuron(name.to_string()))
    }

    /// Weight at (row, column); unknown names read as 0.
    pub fn get(&self, row: &str, col: &str) -> f32 {
        match (self.index_of(row), self.index_of(col)) {
            (Some(r), Some(c)) => self.at(r, c),
            _ => 0.0,
        }
    }

    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f32 {
        self.weights[row * self.names.len() + col]
    }

    /// Rows with a strictly positive weight in `name`'s column, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<(&str, f32)>> {
        let c = self.require(name)?;
        Ok((0..self.len())
            .map(|r| (r, self.at(r, c)))
            .filter(|&(_, w)| w > 0.0)
            .map(|(r, w)| (self.names[r].as_str(), w))
            .collect())
    }

    /// Columns with a strictly positive weight in `name`'s row, in column order.
    pub fn row(&self, name: &str) -> Result<Vec<(&str, f32)>> {
        let r = self.require(name)?;
        Ok((0..self.len())
            .map(|c| (c, self.at(r, c)))
            .filter(|&(_, w)| w > 0.0)
            .map(|(c, w)| (self.names[c].as_str(), w))
            .collect())
    }

    /// Every strictly positive entry as (row, column, weight), row-major.
    pub fn positive_entries(&self) -> impl Iterator<Item = (&str, &str, f32)> + '_ {
        let n = self.len();
        self.weights
            .iter()
            .enumerate()
            .filter(|(_, &w)| w > 0.0)
            .map(move |(i, &w)| (self.names[i / n].as_str(), self.names[i % n].as_str(), w))
    }

    /// Sub-matrix over `names`, in the order given.
    pub fn restrict<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let idx: Vec<usize> = names
            .iter()
            .map(|s| self.require(s.as_ref()))
            .collect::<Result<_>>()?;

        let mut weights = Vec::with_capacity(idx.len() * idx.len());
        for &r in &idx {
            for &c in &idx {
                weights.push(self.at(r, c));
            }
        }
        let names = idx.iter().map(|&i| self.names[i].clone()).collect();
        Self::new(names, weights)
    }
}

fn build_index(names: &[String]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(names.len());
    for (i, n) in names.iter().enumerate() {
        index.entry(n.clone()).or_insert(i);
    }
    index
}
