pub mod extract;
pub mod fetch;
pub mod indexer;
pub mod normalize;
pub mod pipeline;

pub use fetch::{Fetcher, HttpFetcher};
pub use indexer::Indexer;
pub use pipeline::{IngestFailure, IngestReport, Pipeline};

pub mod prelude {
    pub use super::extract::ArticleStub;
    pub use super::fetch::{Fetcher, HttpFetcher};
    pub use super::indexer::Indexer;
    pub use super::pipeline::{IngestFailure, IngestReport, Pipeline};
    pub use kn_core::{Article, Error, Result};
}
