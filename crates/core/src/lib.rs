//! Core library: expert extraction, persistence and matching.

pub mod config;
pub mod extractor;
pub mod ingest;
pub mod matcher;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod repository;
pub mod seed;
