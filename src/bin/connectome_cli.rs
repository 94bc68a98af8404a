//! Headless front-end: listings, per-neuron tables and SVG export.
//!
//! Examples:
//!   connectome-cli neurons
//!   connectome-cli show AVAL
//!   connectome-cli single AVAL --straight -o aval.svg
//!   connectome-cli whole --no-rich --node-size 400 -o whole.svg
//!   connectome-cli layout --all
//!
//! Tables are read from `data/` by default; override with `--data-dir DIR`
//! or `CONNECTOME_DATA_DIR`.

use std::error::Error;
use std::path::PathBuf;
use std::process;

use serde::Serialize;
use tracing::info;

use connectome::category::Category;
use connectome::config::AppConfig;
use connectome::filter::{Edge, NeuronConnections};
use connectome::graph::NeuronGraph;
use connectome::rich_club::curated_subset;
use connectome::scene::Scene;
use connectome::style::Preferences;
use connectome::svg::{render_svg, write_svg};
use connectome::view::{SingleNeuronView, Viewport, WholeView};
use connectome::Connectome;

/// Canvas size for exported pictures, in pixels.
const EXPORT_PX: f32 = 864.0;

#[derive(Debug, Serialize)]
struct LayoutEntry<'a> {
    name: &'a str,
    category: Option<Category>,
    x: f64,
    y: f64,
}

#[derive(Debug, Serialize)]
struct LayoutDump<'a> {
    seed: u64,
    neurons: Vec<LayoutEntry<'a>>,
}

fn usage() -> ! {
    eprintln!("connectome-cli (reads tables from data/ by default)");
    eprintln!("Usage: connectome-cli [--data-dir DIR] [--prefs FILE] [--seed N] <command> [args]\n");
    eprintln!("Commands:");
    eprintln!("  neurons                         List neurons with their category");
    eprintln!("  show <NEURON>                   Inbound, outbound and gap partners");
    eprintln!("  single <NEURON> [--straight] [-o FILE]");
    eprintln!("                                  Single-neuron picture as SVG");
    eprintln!("  whole [--no-rich] [--node-size N] [--all] [-o FILE]");
    eprintln!("                                  Whole-connectome picture as SVG");
    eprintln!("  layout [--all]                  Spring layout positions as JSON");
    process::exit(1);
}

fn parse_args() -> (AppConfig, Vec<String>) {
    let (cfg, args) = AppConfig::from_env_and_args();
    if args.is_empty() {
        usage();
    }
    (cfg, args)
}

/// Flags shared by the drawing commands.
#[derive(Debug, Default)]
struct DrawOpts {
    neuron: Option<String>,
    straight: bool,
    no_rich: bool,
    all: bool,
    node_size: Option<f32>,
    out: Option<PathBuf>,
}

fn parse_draw_opts(args: &[String]) -> DrawOpts {
    let mut opts = DrawOpts::default();
    let mut it = args.iter();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--straight" => opts.straight = true,
            "--no-rich" => opts.no_rich = true,
            "--all" => opts.all = true,
            "--node-size" => {
                let v = it.next().unwrap_or_else(|| usage());
                match v.parse::<f32>() {
                    Ok(n) => opts.node_size = Some(n),
                    Err(_) => {
                        eprintln!("node size must be a number");
                        process::exit(1);
                    }
                }
            }
            "-o" | "--out" => {
                opts.out = Some(PathBuf::from(it.next().unwrap_or_else(|| usage())));
            }
            s if s.starts_with('-') => usage(),
            s => opts.neuron = Some(s.to_string()),
        }
    }
    opts
}

fn print_edges(title: &str, edges: &[Edge], partner: impl Fn(&Edge) -> &str) {
    println!("{title} ({}):", edges.len());
    for e in edges {
        println!("  {:<8} {:>6}", partner(e), e.weight);
    }
}

fn whole_connectome(connectome: &Connectome, all: bool) -> Result<Connectome, Box<dyn Error>> {
    if all {
        Ok(connectome.clone())
    } else {
        Ok(curated_subset(connectome)?)
    }
}

fn emit_svg(scene: &Scene, vp: &Viewport, out: Option<&PathBuf>) -> Result<(), Box<dyn Error>> {
    match out {
        Some(path) => {
            write_svg(path, scene, vp)?;
            info!(path = %path.display(), "svg written");
        }
        None => print!("{}", render_svg(scene, vp)),
    }
    Ok(())
}

fn run(cfg: &AppConfig, args: &[String]) -> Result<(), Box<dyn Error>> {
    let cmd = args[0].as_str();
    let rest = &args[1..];
    let connectome = cfg.load_connectome()?;
    let prefs: Preferences = cfg.load_preferences()?;

    match cmd {
        "neurons" => {
            for name in connectome.neuron_names() {
                let cat = connectome
                    .category_of(&name)
                    .map(|c| c.label())
                    .unwrap_or("-");
                println!("{name:<8} {cat}");
            }
        }
        "show" => {
            let opts = parse_draw_opts(rest);
            let neuron = opts.neuron.unwrap_or_else(|| usage());
            let conn = NeuronConnections::of(&connectome, &neuron)?;
            let cat = connectome
                .category_of(&neuron)
                .map(|c| c.label())
                .unwrap_or("-");
            let graph = NeuronGraph::from_connections(&conn);
            println!(
                "{neuron} ({cat}): {} partners, {} links",
                graph.node_count().saturating_sub(1),
                graph.edge_count()
            );
            print_edges("inbound synapses", &conn.inbound, |e| e.from.as_str());
            print_edges("outbound synapses", &conn.outbound, |e| e.to.as_str());
            let gaps: Vec<Edge> = conn
                .gaps
                .iter()
                .filter(|e| e.from == neuron)
                .cloned()
                .collect();
            print_edges("gap junctions", &gaps, |e| e.to.as_str());
        }
        "single" => {
            let opts = parse_draw_opts(rest);
            let neuron = opts.neuron.unwrap_or_else(|| usage());
            let mut view = SingleNeuronView::new(&connectome, &prefs, &neuron)?;
            if opts.straight {
                view.set_curved(&connectome, &prefs, false)?;
            }
            let vp = SingleNeuronView::viewport(EXPORT_PX, EXPORT_PX);
            emit_svg(view.scene(), &vp, opts.out.as_ref())?;
        }
        "whole" => {
            let opts = parse_draw_opts(rest);
            let shown = whole_connectome(&connectome, opts.all)?;
            let mut view = WholeView::new(&shown, &prefs, cfg.seed);
            if opts.no_rich {
                view.set_rich(&shown, &prefs, false);
            }
            if let Some(size) = opts.node_size {
                view.set_node_size(&shown, &prefs, size);
            }
            let vp = view.viewport(EXPORT_PX, EXPORT_PX);
            emit_svg(view.scene(), &vp, opts.out.as_ref())?;
        }
        "layout" => {
            let opts = parse_draw_opts(rest);
            let shown = whole_connectome(&connectome, opts.all)?;
            let view = WholeView::new(&shown, &prefs, cfg.seed);
            let neurons = view
                .positions()
                .map(|pos| {
                    pos.iter()
                        .map(|(name, p)| LayoutEntry {
                            name,
                            category: shown.category_of(name),
                            x: p.x,
                            y: p.y,
                        })
                        .collect()
                })
                .unwrap_or_default();
            let dump = LayoutDump {
                seed: cfg.seed,
                neurons,
            };
            println!("{}", serde_json::to_string_pretty(&dump)?);
        }
        _ => usage(),
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let (cfg, args) = parse_args();
    if let Err(e) = run(&cfg, &args) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
