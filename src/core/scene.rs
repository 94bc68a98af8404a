//! Backend-independent draw lists for both views.
//!
//! A [`Scene`] is an ordered list of marks, back to front: edges, nodes,
//! halos, labels. Coordinates are layout units; sizes (node areas, stroke
//! widths, font sizes) are in points so that renderers can keep them
//! constant regardless of zoom.

use crate::category::Category;
use crate::connectome::Connectome;
use crate::error::Result;
use crate::filter::{Edge, NeuronConnections};
use crate::graph::{LinkKind, NeuronGraph};
use crate::layout::{radial, Bounds, Point, Positions, RADIAL_SCALE};
use crate::rich_club::TIERS;
use crate::style::{ArrowHead, EdgeStyle, Preferences, Rgba};

/// Reference size the whole-view label font is scaled against.
const LABEL_REFERENCE_SIZE: f32 = 2500.0;
const WHOLE_LABEL_SIZE: f32 = 26.0;
const BACKING_SCALE: f32 = 1.1;

#[derive(Debug, Clone, PartialEq)]
pub struct NodeMark {
    pub name: String,
    pub center: Point,
    /// Marker area in pt^2; the rendered diameter is `sqrt(area)` points.
    pub area: f32,
    pub color: Rgba,
}

impl NodeMark {
    pub fn radius_pt(&self) -> f32 {
        node_radius_pt(self.area)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMark {
    pub from: Point,
    pub to: Point,
    pub width: f32,
    pub color: Rgba,
    /// 0 is a straight line; otherwise the arc3 bend.
    pub curvature: f32,
    pub arrow: ArrowHead,
    /// Area of the nodes at either end, so the stroke stops at their rim.
    pub node_area: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelMark {
    pub text: String,
    pub at: Point,
    pub size: f32,
    pub color: Rgba,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    Edge(EdgeMark),
    Node(NodeMark),
    Label(LabelMark),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub marks: Vec<Mark>,
}

pub fn node_radius_pt(area: f32) -> f32 {
    area.max(0.0).sqrt() * 0.5
}

impl Scene {
    pub fn nodes(&self) -> impl Iterator<Item = &NodeMark> + '_ {
        self.marks.iter().filter_map(|m| match m {
            Mark::Node(n) => Some(n),
            _ => None,
        })
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeMark> + '_ {
        self.marks.iter().filter_map(|m| match m {
            Mark::Edge(e) => Some(e),
            _ => None,
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = &LabelMark> + '_ {
        self.marks.iter().filter_map(|m| match m {
            Mark::Label(l) => Some(l),
            _ => None,
        })
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let mut it = self.nodes().map(|n| n.center);
        let first = it.next()?;
        let mut b = Bounds {
            min: first,
            max: first,
        };
        for p in it {
            b.min.x = b.min.x.min(p.x);
            b.min.y = b.min.y.min(p.y);
            b.max.x = b.max.x.max(p.x);
            b.max.y = b.max.y.max(p.y);
        }
        Some(b)
    }

    fn edge(&mut self, pos: &Positions, from: &str, to: &str, mark: EdgeDraft) {
        if from == to {
            return;
        }
        let (Some(a), Some(b)) = (pos.get(from), pos.get(to)) else {
            return;
        };
        self.marks.push(Mark::Edge(EdgeMark {
            from: a,
            to: b,
            width: mark.width,
            color: mark.style.color.with_alpha(mark.style.alpha),
            curvature: mark.curvature,
            arrow: mark.style.arrow,
            node_area: mark.node_area,
        }));
    }

    fn node(&mut self, name: &str, center: Point, area: f32, color: Rgba) {
        self.marks.push(Mark::Node(NodeMark {
            name: name.to_string(),
            center,
            area,
            color,
        }));
    }

    fn label(&mut self, text: &str, at: Point, size: f32, color: Rgba) {
        self.marks.push(Mark::Label(LabelMark {
            text: text.to_string(),
            at,
            size,
            color,
        }));
    }
}

struct EdgeDraft {
    style: EdgeStyle,
    width: f32,
    curvature: f32,
    node_area: f32,
}

fn draft(style: EdgeStyle, weight: f32, curved: bool, prefs: &Preferences, node_area: f32) -> EdgeDraft {
    EdgeDraft {
        style,
        width: weight * style.width_scale,
        curvature: if curved && style.curved {
            prefs.curve_radius
        } else {
            0.0
        },
        node_area,
    }
}

/// Category nodes for every positioned neuron, one category at a time.
fn category_nodes(
    scene: &mut Scene,
    connectome: &Connectome,
    pos: &Positions,
    order: &[Category],
    area: f32,
    prefs: &Preferences,
) {
    for &cat in order {
        let color = prefs.category_color(cat).with_alpha(prefs.node_alpha);
        for (name, p) in pos.iter() {
            if connectome.category_of(name) == Some(cat) {
                scene.node(name, p, area, color);
            }
        }
    }
}

/// The selected neuron at the origin, its partners on a ring around it.
pub fn single_neuron_scene(
    connectome: &Connectome,
    neuron: &str,
    curved: bool,
    prefs: &Preferences,
) -> Result<(Scene, Positions)> {
    let conn = NeuronConnections::of(connectome, neuron)?;
    let pos = radial(neuron, &conn.neighbours(), RADIAL_SCALE);
    let area = prefs.node_size;

    let mut scene = Scene::default();
    let push = |edges: &[Edge], style: EdgeStyle, scene: &mut Scene| {
        for e in edges {
            scene.edge(&pos, &e.from, &e.to, draft(style, e.weight, curved, prefs, area));
        }
    };
    push(&conn.inbound, prefs.synapse_in, &mut scene);
    push(&conn.outbound, prefs.synapse_out, &mut scene);
    push(&conn.gaps, prefs.gap, &mut scene);

    category_nodes(&mut scene, connectome, &pos, &Category::ALL, area, prefs);

    for (name, p) in pos.iter() {
        scene.label(name, p, prefs.label_size, prefs.label_color);
    }

    Ok((scene, pos))
}

/// Whole-graph picture over precomputed positions. Nodes without a position
/// are skipped.
pub fn whole_scene(
    connectome: &Connectome,
    pos: &Positions,
    rich: bool,
    node_size: f32,
    prefs: &Preferences,
) -> Scene {
    let graph = NeuronGraph::whole(connectome);
    let mut scene = Scene::default();

    for (a, b, w) in graph.links_of_kind(LinkKind::Synapse) {
        scene.edge(pos, a, b, draft(prefs.whole_synapse, w, true, prefs, node_size));
    }
    for (a, b, w) in graph.links_of_kind(LinkKind::Gap) {
        scene.edge(pos, a, b, draft(prefs.whole_gap, w, true, prefs, node_size));
    }

    let shown: Positions = {
        let mut p = Positions::new();
        for name in graph.node_names() {
            if let Some(pt) = pos.get(name) {
                p.insert(name, pt);
            }
        }
        p
    };

    let backing = prefs.backing_color.with_alpha(prefs.node_alpha);
    for (name, p) in shown.iter() {
        scene.node(name, p, BACKING_SCALE * node_size, backing);
    }
    category_nodes(
        &mut scene,
        connectome,
        &shown,
        &[Category::Sensory, Category::Motor, Category::Interneuron],
        node_size,
        prefs,
    );

    if rich {
        rich_halos(&mut scene, &shown, node_size, prefs);
    }

    let font = WHOLE_LABEL_SIZE * node_size / LABEL_REFERENCE_SIZE;
    for (name, p) in shown.iter() {
        scene.label(name, p, font, prefs.label_color);
    }

    scene
}

/// Concentric rings around each rich club member, then the member redrawn
/// on top in the interneuron colour.
fn rich_halos(scene: &mut Scene, pos: &Positions, node_size: f32, prefs: &Preferences) {
    let alpha = prefs.node_alpha;
    for tier in TIERS {
        let members: Vec<(&str, Point)> = tier
            .members
            .iter()
            .filter_map(|&m| pos.get(m).map(|p| (m, p)))
            .collect();

        let rings = [
            (tier.outer, prefs.halo_outer),
            (tier.middle, prefs.halo_middle),
            (tier.inner, prefs.halo_inner),
            (1.0, prefs.interneuron_color),
        ];
        for (mult, color) in rings {
            if mult <= 0.0 {
                continue;
            }
            for &(name, p) in &members {
                scene.node(name, p, mult * node_size, color.with_alpha(alpha));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectome::fixture;

    #[test]
    fn single_scene_orders_edges_nodes_labels() {
        let c = fixture::connectome();
        let (scene, pos) = single_neuron_scene(&c, "AVAL", true, &Preferences::default()).unwrap();

        let kinds: Vec<u8> = scene
            .marks
            .iter()
            .map(|m| match m {
                Mark::Edge(_) => 0,
                Mark::Node(_) => 1,
                Mark::Label(_) => 2,
            })
            .collect();
        let mut sorted = kinds.clone();
        sorted.sort_unstable();
        assert_eq!(kinds, sorted);

        assert_eq!(pos.len(), 5);
        assert_eq!(pos.get("AVAL"), Some(Point::ORIGIN));
        assert_eq!(scene.nodes().count(), 5);
        assert_eq!(scene.labels().count(), 5);
        // 3 in + 3 out + 2 gap.
        assert_eq!(scene.edges().count(), 8);
    }

    #[test]
    fn gap_edges_stay_straight_and_thin() {
        let c = fixture::connectome();
        let prefs = Preferences::default();
        let (scene, _) = single_neuron_scene(&c, "AVAL", true, &prefs).unwrap();
        let gold = prefs.gap.color.with_alpha(prefs.gap.alpha);
        let gaps: Vec<_> = scene.edges().filter(|e| e.color == gold).collect();
        assert_eq!(gaps.len(), 2);
        for g in gaps {
            assert_eq!(g.curvature, 0.0);
            assert!((g.width - 0.2).abs() < 1e-6);
        }
        let curved = scene.edges().filter(|e| e.curvature != 0.0).count();
        assert_eq!(curved, 6);
    }

    #[test]
    fn straight_toggle_flattens_synapses() {
        let c = fixture::connectome();
        let (scene, _) = single_neuron_scene(&c, "AVAL", false, &Preferences::default()).unwrap();
        assert!(scene.edges().all(|e| e.curvature == 0.0));
    }

    #[test]
    fn nodes_take_category_colour() {
        let c = fixture::connectome();
        let prefs = Preferences::default();
        let (scene, _) = single_neuron_scene(&c, "AVAL", true, &prefs).unwrap();
        let ashl = scene.nodes().find(|n| n.name == "ASHL").unwrap();
        assert_eq!(ashl.color, prefs.sensory_color.with_alpha(0.9));
        let va01 = scene.nodes().find(|n| n.name == "VA01").unwrap();
        assert_eq!(va01.color, prefs.motor_color.with_alpha(0.9));
    }

    fn whole_positions(c: &Connectome) -> Positions {
        crate::layout::SpringLayout::default().layout_graph(&NeuronGraph::whole(c))
    }

    #[test]
    fn whole_scene_backs_every_node() {
        let c = fixture::connectome();
        let pos = whole_positions(&c);
        let prefs = Preferences::default();
        let scene = whole_scene(&c, &pos, false, 1000.0, &prefs);

        let backing = scene
            .nodes()
            .filter(|n| (n.area - 1100.0).abs() < 1e-3)
            .count();
        assert_eq!(backing, pos.len());
        assert_eq!(scene.labels().count(), pos.len());
        let font = scene.labels().next().unwrap().size;
        assert!((font - 26.0 * 1000.0 / 2500.0).abs() < 1e-4);
    }

    #[test]
    fn rich_club_adds_nested_halos() {
        let c = fixture::connectome();
        let pos = whole_positions(&c);
        let prefs = Preferences::default();
        let plain = whole_scene(&c, &pos, false, 100.0, &prefs);
        let rich = whole_scene(&c, &pos, true, 100.0, &prefs);

        // AVAL, AVBL and DVA are in the first tier: three rings plus the core each.
        assert_eq!(rich.nodes().count(), plain.nodes().count() + 12);

        let aval: Vec<f32> = rich
            .nodes()
            .filter(|n| n.name == "AVAL")
            .map(|n| n.area)
            .collect();
        let tail = &aval[aval.len() - 4..];
        assert_eq!(tail.len(), 4);
        assert!((tail[0] - 280.0).abs() < 1e-3);
        assert!((tail[1] - 260.0).abs() < 1e-3);
        assert!((tail[2] - 200.0).abs() < 1e-3);
        assert!((tail[3] - 100.0).abs() < 1e-3);
    }

    #[test]
    fn whole_edge_widths_follow_weights() {
        let c = fixture::connectome();
        let pos = whole_positions(&c);
        let prefs = Preferences::default();
        let scene = whole_scene(&c, &pos, false, 500.0, &prefs);
        let syn = prefs.whole_synapse.color.with_alpha(prefs.whole_synapse.alpha);
        let mut widths: Vec<f32> = scene
            .edges()
            .filter(|e| e.color == syn)
            .map(|e| e.width)
            .collect();
        widths.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(widths, vec![1.0, 1.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }
}
