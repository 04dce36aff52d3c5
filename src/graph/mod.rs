//! Repository symbol graph and its visualization projection.

mod store;
mod view;

pub use store::{FileEntry, RepoGraph, Snapshot, SymbolRef};
pub use view::{build_graph, EdgeKind, GraphData, GraphEdge, GraphNode};
