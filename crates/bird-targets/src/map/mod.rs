//! HTTP view over an export directory: the map page, layers, ranked targets and dossiers.
//!
//! Nothing here computes scores; every response is read from files written by
//! [`crate::export`].

mod router;

pub use router::{map_router, MapArtifacts};
