pub mod chunker;
pub mod dataset;
pub mod delay;
pub mod error;
pub mod models;
pub mod storage;
pub mod types;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

pub use chunker::chunk_paragraphs;
pub use dataset::assemble;
pub use delay::{Delay, NoDelay, TokioDelay};
pub use models::InferenceModel;
pub use storage::DatasetStorage;
pub use types::{
    Analysis, Dataset, EssayCandidate, GenerationConstraints, Metadata, Passage, Question,
};
