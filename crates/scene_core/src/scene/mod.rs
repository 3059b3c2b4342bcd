//! Scene graph
//!
//! Scenes own pooled node hierarchies. Local transforms are edited freely;
//! world transforms are brought up to date by one update pass per frame.
//!
//! ## Architecture
//!
//! ```text
//! Scene
//!  ├── pools (nodes, transforms, bounding spheres, partition records)
//!  ├── spatial partition
//!  └── top-level nodes
//!       └── children ...
//! ```

mod node;
mod scene_graph;

pub use node::{Destructor, Node, NodeKey, NodeParent, Payload};
pub use scene_graph::{PoolUsage, Scene};
