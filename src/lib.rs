//! # slpa
//!
//! Overlapping community detection with speaker-listener label propagation.
//!
//! Every node receives a distribution of membership degrees over the
//! communities discovered in the graph, rather than a single hard label.
//!
//! **Default build** includes the `petgraph` adapter. Any graph can be used by
//! implementing [`GraphModel`].

pub mod cancel;
pub mod community;
/// Error types used across `slpa`.
pub mod error;
pub mod graph;

pub use cancel::CancellationToken;
pub use community::{
    extract_cover, Configurable, Cover, Listener, ListenerRule, Memories,
    OverlappingCommunityDetection, Slpa, Speaker, SpeakerRule,
};
pub use error::{Error, Result};
pub use graph::{AdjacencyList, GraphModel, GraphType};
