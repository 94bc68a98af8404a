use connectome::config::AppConfig;
use connectome::path::EdgePath;
use connectome::rich_club::curated_subset;
use connectome::scene::{Mark, Scene};
use connectome::style::{Preferences, Rgba};
use connectome::view::{
    clamp_node_size, SingleNeuronView, Viewport, WholeView, NODE_SIZE_MAX, NODE_SIZE_MIN,
    NODE_SIZE_REQUESTED,
};
use connectome::Connectome;
use macroquad::prelude::*;
use std::process;
use tracing::{info, warn};

// Space reserved for the tab bar and the per-tab controls.
const TOP_UI_H: f32 = 52.0;
const UI_MARGIN: f32 = 12.0;
const UI_GAP: f32 = 6.0;
const BTN_H: f32 = 28.0;
const BTN_W_TAB: f32 = 100.0;
const BTN_W_SMALL: f32 = 120.0;
const BTN_FONT_SIZE: f32 = 18.0;

const PICKER_W: f32 = 96.0;
const PICKER_ROW_H: f32 = 20.0;
const PICKER_FONT_SIZE: f32 = 16.0;
const SLOT_BAR_H: f32 = 36.0;

const SLIDER_W: f32 = 260.0;
const CURVE_SEGMENTS: usize = 24;

fn window_conf() -> Conf {
    Conf {
        window_title: "Connectome Visualizer".to_owned(),
        window_width: 1000,
        window_height: 860,
        high_dpi: true,
        ..Default::default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tab {
    Single,
    Whole,
}

fn color_of(c: Rgba) -> Color {
    Color::from_rgba(c.r, c.g, c.b, (c.a.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn draw_panel(rect: Rect) {
    draw_rectangle(
        rect.x,
        rect.y,
        rect.w,
        rect.h,
        Color::new(0.10, 0.10, 0.12, 0.88),
    );
    draw_rectangle_lines(
        rect.x,
        rect.y,
        rect.w,
        rect.h,
        1.0,
        Color::new(0.28, 0.28, 0.30, 1.0),
    );
}

fn button(rect: Rect, label: &str, active: bool) -> bool {
    let (mx, my) = mouse_position();
    let hovered = rect.contains(vec2(mx, my));
    let clicked = hovered && is_mouse_button_pressed(MouseButton::Left);

    let bg = if active {
        Color::new(0.20, 0.45, 0.22, 1.0)
    } else if hovered {
        Color::new(0.25, 0.25, 0.25, 1.0)
    } else {
        Color::new(0.18, 0.18, 0.18, 1.0)
    };

    draw_rectangle(rect.x, rect.y, rect.w, rect.h, bg);
    draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 1.0, GRAY);
    draw_text(
        label,
        rect.x + 10.0,
        rect.y + rect.h * 0.72,
        BTN_FONT_SIZE,
        WHITE,
    );

    clicked
}

fn draw_label(rect: Rect, label: &str) {
    draw_text(
        label,
        rect.x + 4.0,
        rect.y + rect.h * 0.72,
        BTN_FONT_SIZE,
        LIGHTGRAY,
    );
}

/// Draw a scene onto `canvas`. The viewport works in canvas-local pixels.
fn draw_scene(scene: &Scene, vp: &Viewport, canvas: Rect) {
    draw_rectangle(canvas.x, canvas.y, canvas.w, canvas.h, WHITE);
    let at = |(x, y): (f32, f32)| (canvas.x + x, canvas.y + y);

    for mark in &scene.marks {
        match mark {
            Mark::Edge(e) => {
                let Some(path) = EdgePath::resolve(e, vp) else {
                    continue;
                };
                let col = color_of(e.color);
                let pts = path.sample(CURVE_SEGMENTS);
                for w in pts.windows(2) {
                    let (x0, y0) = at(w[0]);
                    let (x1, y1) = at(w[1]);
                    draw_line(x0, y0, x1, y1, path.width, col);
                }
                let [tip, l, r] = path.head.map(at);
                if path.filled_head {
                    draw_triangle(vec2(tip.0, tip.1), vec2(l.0, l.1), vec2(r.0, r.1), col);
                } else {
                    draw_line(l.0, l.1, tip.0, tip.1, path.width, col);
                    draw_line(r.0, r.1, tip.0, tip.1, path.width, col);
                }
            }
            Mark::Node(n) => {
                let (x, y) = at(vp.to_px(n.center));
                draw_circle(x, y, vp.pt(n.radius_pt()), color_of(n.color));
            }
            Mark::Label(l) => {
                let (x, y) = at(vp.to_px(l.at));
                let size = vp.pt(l.size).max(1.0);
                let font = size.round().max(1.0) as u16;
                let dims = measure_text(&l.text, None, font, 1.0);
                draw_text(
                    &l.text,
                    x - dims.width * 0.5,
                    y + dims.offset_y * 0.5,
                    size,
                    color_of(l.color),
                );
            }
        }
    }
}

/// Picker row of `name`, so the current centre can be scrolled into view.
fn picker_index(names: &[String], name: &str) -> Option<usize> {
    names.iter().position(|n| n == name)
}

/// One single-neuron canvas with its picker.
struct Slot {
    view: SingleNeuronView,
    scroll: usize,
}

impl Slot {
    fn new(view: SingleNeuronView, names: &[String]) -> Self {
        let scroll = picker_index(names, view.neuron()).unwrap_or(0);
        Self { view, scroll }
    }

    /// Picker on the left, toggle bar on top, canvas filling the rest.
    fn tick_and_render(
        &mut self,
        area: Rect,
        names: &[String],
        connectome: &Connectome,
        prefs: &Preferences,
        status: &mut String,
    ) {
        let picker = Rect::new(area.x, area.y, PICKER_W, area.h);
        draw_panel(picker);
        let rows = ((picker.h - 2.0 * UI_GAP) / PICKER_ROW_H).floor().max(1.0) as usize;
        let max_scroll = names.len().saturating_sub(rows);

        let (mx, my) = mouse_position();
        if picker.contains(vec2(mx, my)) {
            let (_, wheel) = mouse_wheel();
            if wheel < 0.0 {
                self.scroll = (self.scroll + 3).min(max_scroll);
            } else if wheel > 0.0 {
                self.scroll = self.scroll.saturating_sub(3);
            }
        }
        self.scroll = self.scroll.min(max_scroll);

        let mut picked: Option<String> = None;
        for (i, name) in names.iter().skip(self.scroll).take(rows).enumerate() {
            let row = Rect::new(
                picker.x + UI_GAP,
                picker.y + UI_GAP + i as f32 * PICKER_ROW_H,
                picker.w - 2.0 * UI_GAP,
                PICKER_ROW_H,
            );
            let selected = name == self.view.neuron();
            let hovered = row.contains(vec2(mx, my));
            if selected {
                draw_rectangle(row.x, row.y, row.w, row.h, Color::new(0.20, 0.45, 0.22, 1.0));
            } else if hovered {
                draw_rectangle(row.x, row.y, row.w, row.h, Color::new(0.25, 0.25, 0.25, 1.0));
            }
            draw_text(name, row.x + 4.0, row.y + row.h * 0.75, PICKER_FONT_SIZE, WHITE);
            if hovered && is_mouse_button_pressed(MouseButton::Left) {
                picked = Some(name.clone());
            }
        }
        if let Some(name) = picked {
            if let Err(e) = self.view.select(connectome, prefs, &name) {
                warn!(error = %e, "select failed");
                *status = e.to_string();
            }
        }

        let right_x = picker.x + picker.w + UI_GAP;
        let right_w = (area.w - PICKER_W - UI_GAP).max(1.0);
        let bar = Rect::new(right_x, area.y, BTN_W_SMALL, BTN_H);
        let curved = self.view.curved();
        if button(bar, "Curved", curved) {
            if let Err(e) = self.view.set_curved(connectome, prefs, !curved) {
                warn!(error = %e, "redraw failed");
                *status = e.to_string();
            }
        }
        draw_label(
            Rect::new(bar.x + bar.w + UI_GAP, bar.y, right_w - bar.w, BTN_H),
            self.view.neuron(),
        );

        let canvas = Rect::new(
            right_x,
            area.y + SLOT_BAR_H,
            right_w,
            (area.h - SLOT_BAR_H).max(1.0),
        );
        if is_mouse_button_pressed(MouseButton::Left) && canvas.contains(vec2(mx, my)) {
            match self.view.click(
                connectome,
                prefs,
                mx - canvas.x,
                my - canvas.y,
                canvas.w,
                canvas.h,
            ) {
                Ok(Some(name)) => {
                    info!(neuron = %name, "recentred");
                    if let Some(i) = picker_index(names, &name) {
                        self.scroll = i;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "recentre failed");
                    *status = e.to_string();
                }
            }
        }
        let vp = SingleNeuronView::viewport(canvas.w, canvas.h);
        draw_scene(self.view.scene(), &vp, canvas);
    }
}

/// Node-size slider. The value follows the drag; `Some` is returned once,
/// on release.
struct SizeSlider {
    value: f32,
    dragging: bool,
}

impl SizeSlider {
    fn new(value: f32) -> Self {
        Self {
            value: clamp_node_size(value),
            dragging: false,
        }
    }

    fn tick_and_render(&mut self, track: Rect) -> Option<f32> {
        let (mx, my) = mouse_position();
        if is_mouse_button_pressed(MouseButton::Left) && track.contains(vec2(mx, my)) {
            self.dragging = true;
        }
        if self.dragging {
            let frac = ((mx - track.x) / track.w).clamp(0.0, 1.0);
            self.value = NODE_SIZE_MIN + frac * (NODE_SIZE_MAX - NODE_SIZE_MIN);
        }

        let mid = track.y + track.h * 0.5;
        draw_line(track.x, mid, track.x + track.w, mid, 2.0, GRAY);
        // Ticks every 50.
        let mut t = 50.0;
        while t <= NODE_SIZE_MAX {
            let x = track.x + (t - NODE_SIZE_MIN) / (NODE_SIZE_MAX - NODE_SIZE_MIN) * track.w;
            draw_line(x, mid + 4.0, x, mid + 8.0, 1.0, DARKGRAY);
            t += 50.0;
        }
        let frac = (self.value - NODE_SIZE_MIN) / (NODE_SIZE_MAX - NODE_SIZE_MIN);
        draw_circle(track.x + frac * track.w, mid, 7.0, WHITE);

        if self.dragging && is_mouse_button_released(MouseButton::Left) {
            self.dragging = false;
            return Some(self.value.round());
        }
        None
    }
}

fn fail(msg: &str, e: impl std::fmt::Display) -> ! {
    eprintln!("{msg}: {e}");
    process::exit(1);
}

#[macroquad::main(window_conf)]
async fn main() {
    tracing_subscriber::fmt::init();

    let (cfg, rest) = AppConfig::from_env_and_args();
    let whole_all = rest.iter().any(|a| a == "--all");

    let connectome = cfg
        .load_connectome()
        .unwrap_or_else(|e| fail("failed to load connectome", e));
    let prefs = cfg
        .load_preferences()
        .unwrap_or_else(|e| fail("failed to load preferences", e));
    let whole_data = if whole_all {
        connectome.clone()
    } else {
        curated_subset(&connectome).unwrap_or_else(|e| fail("curated subset unavailable", e))
    };

    let names = connectome.neuron_names();
    let Some(first) = names.first().cloned() else {
        fail("no neurons", "synapse table is empty");
    };

    let new_slot = |neuron: &str| -> Slot {
        let view = SingleNeuronView::new(&connectome, &prefs, neuron)
            .unwrap_or_else(|e| fail("failed to draw neuron", e));
        Slot::new(view, &names)
    };

    let mut tab = Tab::Single;
    let mut slots: Vec<Slot> = vec![new_slot(&first)];
    let mut whole: Option<WholeView> = None;
    let mut slider = SizeSlider::new(NODE_SIZE_REQUESTED);
    let mut status = String::new();

    loop {
        clear_background(Color::new(0.08, 0.08, 0.10, 1.0));

        draw_rectangle(
            0.0,
            0.0,
            screen_width(),
            TOP_UI_H,
            Color::new(0.07, 0.07, 0.09, 1.0),
        );
        draw_line(0.0, TOP_UI_H, screen_width(), TOP_UI_H, 1.0, DARKGRAY);

        let top_y = UI_MARGIN;
        let mut x = UI_MARGIN;
        if button(Rect::new(x, top_y, BTN_W_TAB, BTN_H), "Single", tab == Tab::Single) {
            tab = Tab::Single;
        }
        x += BTN_W_TAB + UI_GAP;
        if button(Rect::new(x, top_y, BTN_W_TAB, BTN_H), "Whole", tab == Tab::Whole) {
            tab = Tab::Whole;
        }
        x += BTN_W_TAB + 4.0 * UI_GAP;

        let body = Rect::new(
            UI_MARGIN,
            TOP_UI_H + UI_MARGIN,
            screen_width() - 2.0 * UI_MARGIN,
            screen_height() - TOP_UI_H - 2.0 * UI_MARGIN,
        );

        match tab {
            Tab::Single => {
                if button(Rect::new(x, top_y, BTN_W_SMALL, BTN_H), "Add slot", false) {
                    slots.push(new_slot(&first));
                    info!(slots = slots.len(), "slot added");
                }
                x += BTN_W_SMALL + UI_GAP;
                // The first slot stays.
                if button(Rect::new(x, top_y, BTN_W_SMALL, BTN_H), "Remove slot", false)
                    && slots.len() > 1
                {
                    slots.pop();
                    info!(slots = slots.len(), "slot removed");
                }

                let n = slots.len() as f32;
                let w = (body.w - (n - 1.0) * UI_GAP) / n;
                for (i, slot) in slots.iter_mut().enumerate() {
                    let area = Rect::new(body.x + i as f32 * (w + UI_GAP), body.y, w, body.h);
                    slot.tick_and_render(area, &names, &connectome, &prefs, &mut status);
                }
            }
            Tab::Whole => {
                let view =
                    whole.get_or_insert_with(|| WholeView::new(&whole_data, &prefs, cfg.seed));

                if button(Rect::new(x, top_y, BTN_W_SMALL, BTN_H), "Rich club", view.rich()) {
                    let rich = !view.rich();
                    view.set_rich(&whole_data, &prefs, rich);
                }
                x += BTN_W_SMALL + UI_GAP;
                if button(Rect::new(x, top_y, BTN_W_SMALL, BTN_H), "Relayout", false) {
                    view.relayout(&whole_data, &prefs);
                    info!(layouts = view.layouts_computed(), "relayout");
                }
                x += BTN_W_SMALL + 2.0 * UI_GAP;

                let label = format!("Node size: {:.0}", slider.value);
                draw_label(Rect::new(x, top_y, 150.0, BTN_H), &label);
                x += 150.0;
                if let Some(size) = slider.tick_and_render(Rect::new(x, top_y, SLIDER_W, BTN_H)) {
                    view.set_node_size(&whole_data, &prefs, size);
                }

                let vp = view.viewport(body.w, body.h);
                draw_scene(view.scene(), &vp, body);
            }
        }

        if !status.is_empty() {
            let w = measure_text(&status, None, BTN_FONT_SIZE as u16, 1.0).width;
            draw_text(
                &status,
                screen_width() - w - UI_MARGIN,
                top_y + BTN_H * 0.72,
                BTN_FONT_SIZE,
                Color::new(1.0, 0.45, 0.45, 1.0),
            );
        }

        next_frame().await;
    }
}
