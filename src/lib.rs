pub mod api;
pub mod chunker;
pub mod config;
pub mod error;
pub mod generator;
pub mod heuristics;
pub mod languages;
pub mod llm;
pub mod models;
pub mod monitoring;
pub mod pdf;
pub mod pipeline;
pub mod translation;

pub use error::{PipelineError, PipelineResult};
pub use models::{ActionItem, Priority, ProcessingOutcome, ProcessingResult, ProfessionalType};
pub use pipeline::{build_pipeline, DocumentPipeline};
