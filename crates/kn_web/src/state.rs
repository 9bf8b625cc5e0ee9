use std::sync::Arc;

use kn_core::{Embedder, VectorIndex};

/// Shared state for the query service. The embedder must be the same
/// model that produced the indexed vectors.
pub struct AppState {
    pub embedder: Arc<dyn Embedder>,
    pub index: Arc<dyn VectorIndex>,
    pub default_top_k: usize,
}
