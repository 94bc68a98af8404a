//! C. elegans connectome tables, layouts and draw lists.
//!
//! Loading: [`connectome::Connectome`] from the synapse, gap-junction and
//! category tables. Queries: [`filter::NeuronConnections`] for one neuron,
//! [`graph::NeuronGraph`] for the whole network. Drawing: [`scene`] builds
//! backend-independent mark lists that [`svg`] and the desktop front-end
//! render through [`path`].
//!
//! Features:
//! - `serde` (default): preferences files and JSON layout output.
//! - `parallel`: rayon force accumulation in the spring layout.

#[path = "core/error.rs"]
pub mod error;

#[path = "core/prng.rs"]
pub mod prng;

#[path = "core/table.rs"]
pub mod table;

#[path = "core/category.rs"]
pub mod category;

#[path = "core/connectome.rs"]
pub mod connectome;

#[path = "core/filter.rs"]
pub mod filter;

#[path = "core/graph.rs"]
pub mod graph;

#[path = "core/layout.rs"]
pub mod layout;

#[path = "core/style.rs"]
pub mod style;

#[path = "core/rich_club.rs"]
pub mod rich_club;

#[path = "core/scene.rs"]
pub mod scene;

#[path = "core/path.rs"]
pub mod path;

#[path = "core/view.rs"]
pub mod view;

#[path = "core/svg.rs"]
pub mod svg;

#[path = "core/config.rs"]
pub mod config;

pub use connectome::Connectome;
pub use error::{ConnectomeError, Result};
