//! # apt-embeddings
//!
//! Embedding gateway: turns descriptive text into unit-length vectors.
//!
//! - [`service::EmbeddingService`]: the async seam every consumer depends on
//! - [`http_service::HttpEmbeddingService`]: OpenAI-compatible `/embeddings` client
//! - [`retry::RetryingEmbeddingService`]: per-attempt timeout plus bounded backoff
//! - [`controller::EmbeddingController`]: batch embedding with per-item failure isolation
//! - [`text`]: description builders for prototypes, artworks, artists, and quiz answers
//! - [`normalize`]: L2 math shared with the matching engine

#![deny(unsafe_code)]

pub mod config;
pub mod controller;
pub mod errors;
pub mod http_service;
pub mod normalize;
pub mod retry;
pub mod service;
pub mod text;

pub use config::EmbeddingConfig;
pub use controller::{BatchEmbedResult, EmbedItem, EmbeddingController};
pub use errors::{EmbeddingError, Result};
pub use http_service::HttpEmbeddingService;
pub use retry::RetryingEmbeddingService;
pub use service::{EmbeddingService, MockEmbeddingService};
