//! Scoring, ranking, and skill-gap analysis

pub mod classifier;
pub mod embeddings;
pub mod keywords;
pub mod lexical;
pub mod ranking;
pub mod semantic;
pub mod skill_gap;
pub mod text_processor;
