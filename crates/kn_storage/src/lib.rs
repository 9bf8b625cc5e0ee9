pub mod backends;

pub use backends::memory::MemoryIndex;
pub use backends::pinecone::PineconeIndex;

pub mod prelude {
    pub use super::backends::memory::MemoryIndex;
    pub use super::backends::pinecone::PineconeIndex;
    pub use kn_core::{ArticleMetadata, IndexMatch, VectorIndex};
}
