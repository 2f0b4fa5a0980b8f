//! # apt-engine
//!
//! Vector matching engine for the 16 APT personality types.
//!
//! - [`prototypes`]: one embedded prototype per type, built lazily once
//! - [`builder`]: user vectors from quiz responses
//! - [`similarity`] and [`lsh`]: exact and approximate top-k search
//! - [`evolution`]: like/skip nudges held near the prototype by [`guardrail`]
//! - [`compatibility`], [`scorer`], [`classify`]: ranked, explained matches
//! - [`engine::MatchingEngine`]: the facade that ties them together
//!
//! Numeric work is synchronous; the embedding gateway is the only await
//! point.

#![deny(unsafe_code)]

pub mod builder;
pub mod classify;
pub mod compatibility;
pub mod config;
pub mod engine;
pub mod errors;
pub mod evolution;
pub mod guardrail;
pub mod lsh;
pub mod prototypes;
pub mod scorer;
pub mod similarity;

pub use builder::UserVectorBuilder;
pub use classify::{Classification, TypeScore, classify};
pub use config::EngineConfig;
pub use engine::MatchingEngine;
pub use errors::{EngineError, Result};
pub use evolution::{ActionKind, ContentVectorSource, EvolutionEngine, UserAction};
pub use prototypes::{PrototypeSet, PrototypeStore};
pub use scorer::{
    ArtistCandidate, ArtworkCandidate, ArtworkMatches, MatchOptions, MatchResult, MatchingScorer,
};
pub use similarity::{ScoredMatch, SearchReport, SearchStrategy, SimilarityEngine, similarity};
