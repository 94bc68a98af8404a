//! Static SVG export of a [`Scene`].

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::{ConnectomeError, Result};
use crate::path::{EdgePath, Viewport};
use crate::scene::{Mark, Scene};
use crate::style::Rgba;

fn rgb(c: Rgba) -> String {
    format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render back to front in scene order. Sizes given in points are converted
/// with the viewport's `px_per_pt`.
pub fn render_svg(scene: &Scene, vp: &Viewport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = vp.width,
        h = vp.height
    );
    let _ = writeln!(
        out,
        r#"<rect width="100%" height="100%" fill="{}"/>"#,
        rgb(Rgba::WHITE)
    );

    for mark in &scene.marks {
        match mark {
            Mark::Edge(e) => {
                let Some(p) = EdgePath::resolve(e, vp) else {
                    continue;
                };
                let d = match p.ctrl {
                    Some(c) => format!(
                        "M{:.2},{:.2} Q{:.2},{:.2} {:.2},{:.2}",
                        p.start.0, p.start.1, c.0, c.1, p.end.0, p.end.1
                    ),
                    None => format!(
                        "M{:.2},{:.2} L{:.2},{:.2}",
                        p.start.0, p.start.1, p.end.0, p.end.1
                    ),
                };
                let _ = writeln!(
                    out,
                    r#"<path d="{d}" fill="none" stroke="{}" stroke-opacity="{:.3}" stroke-width="{:.2}"/>"#,
                    rgb(e.color),
                    e.color.a,
                    p.width
                );
                let [tip, l, r] = p.head;
                if p.filled_head {
                    let _ = writeln!(
                        out,
                        r#"<polygon points="{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}" fill="{}" fill-opacity="{:.3}"/>"#,
                        tip.0, tip.1, l.0, l.1, r.0, r.1,
                        rgb(e.color),
                        e.color.a
                    );
                } else {
                    let _ = writeln!(
                        out,
                        r#"<polyline points="{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}" fill="none" stroke="{}" stroke-opacity="{:.3}" stroke-width="{:.2}"/>"#,
                        l.0, l.1, tip.0, tip.1, r.0, r.1,
                        rgb(e.color),
                        e.color.a,
                        p.width
                    );
                }
            }
            Mark::Node(n) => {
                let (cx, cy) = vp.to_px(n.center);
                let _ = writeln!(
                    out,
                    r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{:.2}" fill="{}" fill-opacity="{:.3}"><title>{}</title></circle>"#,
                    vp.pt(n.radius_pt()),
                    rgb(n.color),
                    n.color.a,
                    escape(&n.name)
                );
            }
            Mark::Label(l) => {
                let (x, y) = vp.to_px(l.at);
                let _ = writeln!(
                    out,
                    r#"<text x="{x:.2}" y="{y:.2}" font-family="sans-serif" font-size="{:.2}" fill="{}" fill-opacity="{:.3}" text-anchor="middle" dominant-baseline="central">{}</text>"#,
                    vp.pt(l.size),
                    rgb(l.color),
                    l.color.a,
                    escape(&l.text)
                );
            }
        }
    }
    out.push_str("</svg>\n");
    out
}

pub fn write_svg(path: impl AsRef<Path>, scene: &Scene, vp: &Viewport) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, render_svg(scene, vp)).map_err(|e| ConnectomeError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectome::fixture;
    use crate::scene::single_neuron_scene;
    use crate::style::Preferences;

    #[test]
    fn single_view_renders_every_mark() {
        let c = fixture::connectome();
        let prefs = Preferences::default();
        let (scene, pos) = single_neuron_scene(&c, "AVAL", true, &prefs).unwrap();
        let vp = Viewport::centered(3.0, 864.0, 864.0, 12.0);
        let svg = render_svg(&scene, &vp);

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<circle").count(), pos.len());
        assert_eq!(svg.matches("<text").count(), pos.len());
        assert_eq!(svg.matches(" Q").count(), scene.edges().filter(|e| e.curvature != 0.0).count());
        assert!(svg.contains("#006000"));
    }

    #[test]
    fn names_are_escaped() {
        assert_eq!(escape("a<b&\"c\">"), "a&lt;b&amp;&quot;c&quot;&gt;");
    }
}
