//! Node placement: circular, radial (centred) and force-directed layouts.

use hashbrown::HashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::graph::NeuronGraph;
use crate::prng::Prng;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn dist2(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Axis-aligned extent of a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// Name -> position, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Positions {
    names: Vec<String>,
    points: Vec<Point>,
    index: HashMap<String, usize>,
}

impl Positions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the point of an existing name in place.
    pub fn insert(&mut self, name: &str, p: Point) {
        if let Some(&i) = self.index.get(name) {
            self.points[i] = p;
            return;
        }
        self.index.insert(name.to_string(), self.names.len());
        self.names.push(name.to_string());
        self.points.push(p);
    }

    pub fn get(&self, name: &str) -> Option<Point> {
        self.index.get(name).map(|&i| self.points[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Point)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.points.iter().copied())
    }

    /// Closest node to `p` and its squared distance.
    pub fn nearest(&self, p: Point) -> Option<(&str, f64)> {
        self.iter()
            .map(|(n, q)| (n, q.dist2(p)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let first = *self.points.first()?;
        let mut b = Bounds {
            min: first,
            max: first,
        };
        for p in &self.points[1..] {
            b.min.x = b.min.x.min(p.x);
            b.min.y = b.min.y.min(p.y);
            b.max.x = b.max.x.max(p.x);
            b.max.y = b.max.y.max(p.y);
        }
        Some(b)
    }
}

/// Centre on the mean, then scale so the largest |coordinate| is `scale`.
fn rescale(points: &mut [Point], scale: f64) {
    if points.is_empty() {
        return;
    }
    let n = points.len() as f64;
    let mx = points.iter().map(|p| p.x).sum::<f64>() / n;
    let my = points.iter().map(|p| p.y).sum::<f64>() / n;
    let mut lim = 0.0f64;
    for p in points.iter_mut() {
        p.x -= mx;
        p.y -= my;
        lim = lim.max(p.x.abs()).max(p.y.abs());
    }
    if lim > 0.0 {
        let f = scale / lim;
        for p in points.iter_mut() {
            p.x *= f;
            p.y *= f;
        }
    }
}

/// Evenly spaced on a circle, counter-clockwise from angle 0.
pub fn circular<S: AsRef<str>>(names: &[S], scale: f64) -> Positions {
    let mut out = Positions::new();
    match names.len() {
        0 => {}
        1 => out.insert(names[0].as_ref(), Point::ORIGIN),
        n => {
            let mut pts: Vec<Point> = (0..n)
                .map(|i| {
                    let theta = std::f64::consts::TAU * i as f64 / n as f64;
                    Point::new(theta.cos(), theta.sin())
                })
                .collect();
            rescale(&mut pts, scale);
            for (name, p) in names.iter().zip(pts) {
                out.insert(name.as_ref(), p);
            }
        }
    }
    out
}

/// Radius of the ring of partners around a selected neuron.
pub const RADIAL_SCALE: f64 = 2.0;

/// Partners on a circle, `centre` pinned at the origin.
pub fn radial<S: AsRef<str>>(centre: &str, neighbours: &[S], scale: f64) -> Positions {
    let ring: Vec<&str> = neighbours
        .iter()
        .map(|s| s.as_ref())
        .filter(|n| *n != centre)
        .collect();
    let mut pos = circular(&ring, scale);
    pos.insert(centre, Point::ORIGIN);
    pos
}

/// Fruchterman-Reingold force-directed layout.
#[derive(Debug, Clone, Copy)]
pub struct SpringLayout {
    pub iterations: usize,
    /// Stop once the mean per-node step falls below this.
    pub threshold: f64,
    pub scale: f64,
    pub seed: u64,
}

impl Default for SpringLayout {
    fn default() -> Self {
        Self {
            iterations: 50,
            threshold: 1e-4,
            scale: 1.0,
            seed: 42,
        }
    }
}

impl SpringLayout {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn layout_graph(&self, graph: &NeuronGraph) -> Positions {
        let names: Vec<&str> = graph.node_names().collect();
        self.run(&names, &graph.layout_weights())
    }

    /// `adjacency` is row-major `names.len()` squared.
    pub fn run<S: AsRef<str>>(&self, names: &[S], adjacency: &[f64]) -> Positions {
        let n = names.len();
        debug_assert_eq!(adjacency.len(), n * n);

        let mut out = Positions::new();
        if n == 0 {
            return out;
        }
        if n == 1 {
            out.insert(names[0].as_ref(), Point::ORIGIN);
            return out;
        }

        let mut rng = Prng::new(self.seed);
        let mut pos: Vec<Point> = (0..n)
            .map(|_| {
                let x = rng.next_f64_01();
                let y = rng.next_f64_01();
                Point::new(x, y)
            })
            .collect();

        let k = (1.0 / n as f64).sqrt();
        let mut t = {
            let b = extent(&pos);
            b.width().max(b.height()) * 0.1
        };
        let dt = t / (self.iterations as f64 + 1.0);

        for _ in 0..self.iterations {
            let disp = displacements(&pos, adjacency, k);

            let mut step_sq = 0.0f64;
            for (p, d) in pos.iter_mut().zip(disp) {
                let len = (d.x * d.x + d.y * d.y).sqrt();
                let len = if len < 0.01 { 0.1 } else { len };
                let sx = d.x * t / len;
                let sy = d.y * t / len;
                p.x += sx;
                p.y += sy;
                step_sq += sx * sx + sy * sy;
            }
            t -= dt;
            if step_sq.sqrt() / (n as f64) < self.threshold {
                break;
            }
        }

        rescale(&mut pos, self.scale);
        for (name, p) in names.iter().zip(pos) {
            out.insert(name.as_ref(), p);
        }
        out
    }
}

fn extent(pos: &[Point]) -> Bounds {
    let mut b = Bounds {
        min: pos[0],
        max: pos[0],
    };
    for p in pos {
        b.min.x = b.min.x.min(p.x);
        b.min.y = b.min.y.min(p.y);
        b.max.x = b.max.x.max(p.x);
        b.max.y = b.max.y.max(p.y);
    }
    b
}

/// Net force on node `i`: repulsion k^2/d between all pairs, attraction
/// A_ij * d^2 / k along edges.
fn force_on(i: usize, pos: &[Point], adjacency: &[f64], k: f64) -> Point {
    let n = pos.len();
    let pi = pos[i];
    let mut f = Point::ORIGIN;
    for (j, pj) in pos.iter().enumerate() {
        if j == i {
            continue;
        }
        let dx = pi.x - pj.x;
        let dy = pi.y - pj.y;
        let d = (dx * dx + dy * dy).sqrt().max(0.01);
        let c = k * k / (d * d) - adjacency[i * n + j] * d / k;
        f.x += dx * c;
        f.y += dy * c;
    }
    f
}

#[cfg(feature = "parallel")]
fn displacements(pos: &[Point], adjacency: &[f64], k: f64) -> Vec<Point> {
    (0..pos.len())
        .into_par_iter()
        .map(|i| force_on(i, pos, adjacency, k))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn displacements(pos: &[Point], adjacency: &[f64], k: f64) -> Vec<Point> {
    (0..pos.len())
        .map(|i| force_on(i, pos, adjacency, k))
        .collect()
}
