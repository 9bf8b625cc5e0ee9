pub mod models;

pub use models::hashing::HashEmbedder;
pub use models::openai::OpenAiEmbedder;

pub mod prelude {
    pub use super::models::hashing::HashEmbedder;
    pub use super::models::openai::OpenAiEmbedder;
    pub use kn_core::{Embedder, Error, Result};
}
