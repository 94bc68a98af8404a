//! View state behind the GUI controls.
//!
//! Each view owns what it last drew and rebuilds its scene when a control
//! changes. The tables and preferences are passed in on every call; a view
//! never holds on to them.

use tracing::debug;

use crate::connectome::Connectome;
use crate::error::Result;
use crate::graph::NeuronGraph;
use crate::layout::{Positions, SpringLayout};
pub use crate::path::Viewport;
use crate::scene::{single_neuron_scene, whole_scene, Scene};
use crate::style::Preferences;

/// Clicks farther than this (squared, layout units) from every node are ignored.
pub const CLICK_RADIUS2: f64 = 0.2;
/// The single view always shows `[-3, 3]` on both axes.
pub const SINGLE_HALF_EXTENT: f64 = 3.0;
pub const SINGLE_FIGURE_INCHES: f32 = 12.0;
pub const WHOLE_FIGURE_INCHES: f32 = 10.0;
const WHOLE_MARGIN: f64 = 0.08;

pub const NODE_SIZE_MIN: f32 = 10.0;
pub const NODE_SIZE_MAX: f32 = 1000.0;
/// Requested starting size; clamped into the slider range like any other value.
pub const NODE_SIZE_REQUESTED: f32 = 2000.0;

/// One neuron at the centre, its partners around it.
#[derive(Debug, Clone)]
pub struct SingleNeuronView {
    neuron: String,
    curved: bool,
    scene: Scene,
    positions: Positions,
}

impl SingleNeuronView {
    pub fn new(connectome: &Connectome, prefs: &Preferences, neuron: &str) -> Result<Self> {
        let mut v = Self {
            neuron: neuron.to_string(),
            curved: true,
            scene: Scene::default(),
            positions: Positions::new(),
        };
        v.redraw(connectome, prefs)?;
        Ok(v)
    }

    pub fn neuron(&self) -> &str {
        &self.neuron
    }

    pub fn curved(&self) -> bool {
        self.curved
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn positions(&self) -> &Positions {
        &self.positions
    }

    pub fn viewport(width: f32, height: f32) -> Viewport {
        Viewport::centered(SINGLE_HALF_EXTENT, width, height, SINGLE_FIGURE_INCHES)
    }

    /// On error the previous picture is kept.
    pub fn select(&mut self, connectome: &Connectome, prefs: &Preferences, neuron: &str) -> Result<()> {
        let (scene, positions) = single_neuron_scene(connectome, neuron, self.curved, prefs)?;
        self.neuron = neuron.to_string();
        self.scene = scene;
        self.positions = positions;
        debug!(neuron, nodes = self.positions.len(), "single view redrawn");
        Ok(())
    }

    pub fn set_curved(&mut self, connectome: &Connectome, prefs: &Preferences, curved: bool) -> Result<()> {
        self.curved = curved;
        self.redraw(connectome, prefs)
    }

    pub fn redraw(&mut self, connectome: &Connectome, prefs: &Preferences) -> Result<()> {
        let neuron = self.neuron.clone();
        self.select(connectome, prefs, &neuron)
    }

    /// Recentre on the node nearest to a canvas click. Returns the new
    /// centre, or `None` when the click is too far from every node.
    pub fn click(
        &mut self,
        connectome: &Connectome,
        prefs: &Preferences,
        px: f32,
        py: f32,
        width: f32,
        height: f32,
    ) -> Result<Option<String>> {
        let at = Self::viewport(width, height).to_data(px, py);
        let hit = match self.positions.nearest(at) {
            Some((name, d2)) if d2 < CLICK_RADIUS2 => name.to_string(),
            _ => return Ok(None),
        };
        self.select(connectome, prefs, &hit)?;
        Ok(Some(hit))
    }
}

/// Force-directed picture of a whole (sub)connectome. The layout is
/// computed once and reused until [`WholeView::relayout`].
#[derive(Debug, Clone)]
pub struct WholeView {
    rich: bool,
    node_size: f32,
    layout: SpringLayout,
    positions: Option<Positions>,
    scene: Scene,
    layouts_computed: usize,
}

pub fn clamp_node_size(size: f32) -> f32 {
    size.clamp(NODE_SIZE_MIN, NODE_SIZE_MAX)
}

impl WholeView {
    pub fn new(connectome: &Connectome, prefs: &Preferences, seed: u64) -> Self {
        let mut v = Self {
            rich: true,
            node_size: clamp_node_size(NODE_SIZE_REQUESTED),
            layout: SpringLayout::default().with_seed(seed),
            positions: None,
            scene: Scene::default(),
            layouts_computed: 0,
        };
        v.redraw(connectome, prefs);
        v
    }

    pub fn rich(&self) -> bool {
        self.rich
    }

    pub fn node_size(&self) -> f32 {
        self.node_size
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn positions(&self) -> Option<&Positions> {
        self.positions.as_ref()
    }

    pub fn layouts_computed(&self) -> usize {
        self.layouts_computed
    }

    pub fn set_rich(&mut self, connectome: &Connectome, prefs: &Preferences, rich: bool) {
        self.rich = rich;
        self.redraw(connectome, prefs);
    }

    pub fn set_node_size(&mut self, connectome: &Connectome, prefs: &Preferences, size: f32) {
        self.node_size = clamp_node_size(size);
        self.redraw(connectome, prefs);
    }

    /// Throw the cached positions away and lay out again from a fresh seed.
    pub fn relayout(&mut self, connectome: &Connectome, prefs: &Preferences) {
        self.layout.seed = self.layout.seed.wrapping_add(1);
        self.positions = None;
        self.redraw(connectome, prefs);
    }

    /// Rebuild the scene, computing the layout only when none is cached.
    pub fn redraw(&mut self, connectome: &Connectome, prefs: &Preferences) {
        if self.positions.is_none() {
            let graph = NeuronGraph::whole(connectome);
            debug!(
                nodes = graph.node_count(),
                edges = graph.edge_count(),
                seed = self.layout.seed,
                "computing spring layout"
            );
            self.positions = Some(self.layout.layout_graph(&graph));
            self.layouts_computed += 1;
        }
        if let Some(positions) = &self.positions {
            self.scene = whole_scene(connectome, positions, self.rich, self.node_size, prefs);
        }
    }

    pub fn viewport(&self, width: f32, height: f32) -> Viewport {
        match self.scene.bounds() {
            Some(bounds) => Viewport::fit(bounds, WHOLE_MARGIN, width, height, WHOLE_FIGURE_INCHES),
            None => Viewport::centered(1.0, width, height, WHOLE_FIGURE_INCHES),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectome::fixture;
    use crate::error::ConnectomeError;

    #[test]
    fn single_view_starts_curved_and_centred() {
        let c = fixture::connectome();
        let p = Preferences::default();
        let v = SingleNeuronView::new(&c, &p, "AVAL").unwrap();
        assert!(v.curved());
        assert_eq!(v.neuron(), "AVAL");
        assert_eq!(v.positions().get("AVAL"), Some(crate::layout::Point::ORIGIN));
    }

    #[test]
    fn unknown_neuron_keeps_previous_picture() {
        let c = fixture::connectome();
        let p = Preferences::default();
        let mut v = SingleNeuronView::new(&c, &p, "AVAL").unwrap();
        let before = v.scene().clone();
        let err = v.select(&c, &p, "NOPE").unwrap_err();
        assert!(matches!(err, ConnectomeError::UnknownNeuron(_)));
        assert_eq!(v.neuron(), "AVAL");
        assert_eq!(v.scene(), &before);
    }

    #[test]
    fn click_near_a_node_recentres() {
        let c = fixture::connectome();
        let p = Preferences::default();
        let mut v = SingleNeuronView::new(&c, &p, "AVAL").unwrap();
        let (w, h) = (600.0, 600.0);
        let target = v.positions().iter().find(|(n, _)| *n != "AVAL").unwrap();
        let name = target.0.to_string();
        let (px, py) = SingleNeuronView::viewport(w, h).to_px(target.1);
        let hit = v.click(&c, &p, px + 3.0, py - 3.0, w, h).unwrap();
        assert_eq!(hit.as_deref(), Some(name.as_str()));
        assert_eq!(v.neuron(), name);
    }

    #[test]
    fn click_in_empty_space_is_ignored() {
        let c = fixture::connectome();
        let p = Preferences::default();
        let mut v = SingleNeuronView::new(&c, &p, "AVAL").unwrap();
        // Top-left corner maps to (-3, 3), well outside the radius-2 ring.
        assert_eq!(v.click(&c, &p, 0.0, 0.0, 600.0, 600.0).unwrap(), None);
        assert_eq!(v.neuron(), "AVAL");
    }

    #[test]
    fn straight_toggle_removes_bends() {
        let c = fixture::connectome();
        let p = Preferences::default();
        let mut v = SingleNeuronView::new(&c, &p, "AVAL").unwrap();
        v.set_curved(&c, &p, false).unwrap();
        assert!(v.scene().edges().all(|e| e.curvature == 0.0));
    }

    #[test]
    fn node_size_is_clamped() {
        assert_eq!(clamp_node_size(NODE_SIZE_REQUESTED), NODE_SIZE_MAX);
        assert_eq!(clamp_node_size(1.0), NODE_SIZE_MIN);
        assert_eq!(clamp_node_size(300.0), 300.0);
    }

    #[test]
    fn layout_is_cached_across_redraws() {
        let c = fixture::connectome();
        let p = Preferences::default();
        let mut v = WholeView::new(&c, &p, 7);
        assert_eq!(v.layouts_computed(), 1);
        assert_eq!(v.node_size(), NODE_SIZE_MAX);
        let before = v.positions().cloned();

        v.set_rich(&c, &p, false);
        v.set_node_size(&c, &p, 200.0);
        assert_eq!(v.layouts_computed(), 1);
        assert_eq!(v.positions().cloned(), before);

        v.relayout(&c, &p);
        assert_eq!(v.layouts_computed(), 2);
    }

    #[test]
    fn rich_toggle_changes_mark_count() {
        let c = fixture::connectome();
        let p = Preferences::default();
        let mut v = WholeView::new(&c, &p, 1);
        let with = v.scene().nodes().count();
        v.set_rich(&c, &p, false);
        assert!(v.scene().nodes().count() < with);
    }
}
