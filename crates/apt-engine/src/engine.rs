//! `MatchingEngine`: the entry point consumers hold.
//!
//! Owns the prototype store and one instance of each component, all
//! configured from [`EngineConfig`]. Every operation awaits the prototype
//! set (building it on first use) and then runs synchronously.

use std::sync::Arc;

use apt_core::{PersonalityType, QuizResponse};
use apt_embeddings::EmbeddingService;

use crate::builder::UserVectorBuilder;
use crate::classify::{Classification, classify};
use crate::config::EngineConfig;
use crate::errors::Result;
use crate::evolution::{ContentVectorSource, EvolutionEngine, UserAction};
use crate::prototypes::{PrototypeSet, PrototypeStore};
use crate::scorer::{
    ArtistCandidate, ArtworkCandidate, ArtworkMatches, MatchOptions, MatchResult, MatchingScorer,
};
use crate::similarity::{SearchReport, SearchStrategy, SimilarityEngine};

/// Vector matching engine.
pub struct MatchingEngine {
    store: PrototypeStore,
    config: EngineConfig,
    builder: UserVectorBuilder,
    search: SimilarityEngine,
    evolution: EvolutionEngine,
    scorer: MatchingScorer,
}

impl MatchingEngine {
    /// Create an engine that embeds prototypes through `service` on first use.
    pub fn new(service: Arc<dyn EmbeddingService>, config: EngineConfig) -> Self {
        let store = PrototypeStore::new(service, config.dimensions);
        Self::with_store(store, config)
    }

    /// Create an engine around an existing store.
    pub fn with_store(store: PrototypeStore, config: EngineConfig) -> Self {
        let search = SimilarityEngine::new(config.search.clone());
        Self {
            store,
            builder: UserVectorBuilder::new(config.builder.clone()),
            evolution: EvolutionEngine::new(config.evolution.clone()),
            scorer: MatchingScorer::new(search.clone()),
            search,
            config,
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Prototype store.
    pub fn store(&self) -> &PrototypeStore {
        &self.store
    }

    /// The prototype set, building it if needed.
    pub async fn prototypes(&self) -> Result<&PrototypeSet> {
        self.store.get().await
    }

    /// Prototype vector for a type code.
    pub async fn prototype(&self, code: &str) -> Result<Vec<f32>> {
        let personality = PersonalityType::parse(code)?;
        Ok(self.prototypes().await?.get(personality).to_vec())
    }

    /// Build a user vector from quiz responses.
    pub async fn create_user_vector(
        &self,
        responses: &[QuizResponse],
        code: &str,
    ) -> Result<Vec<f32>> {
        let personality = PersonalityType::parse(code)?;
        let set = self.prototypes().await?;
        Ok(self.builder.build(set, responses, personality))
    }

    /// Apply like/skip actions to a user vector.
    ///
    /// Callers must not evolve the same user's vector concurrently.
    pub async fn evolve_user_vector(
        &self,
        current: &[f32],
        actions: &[UserAction],
        code: &str,
        source: &(dyn ContentVectorSource + Sync),
    ) -> Result<Vec<f32>> {
        let personality = PersonalityType::parse(code)?;
        let set = self.prototypes().await?;
        self.evolution.evolve(set, current, actions, personality, source)
    }

    /// Top-k similarity search.
    pub fn find_best_matches<V>(
        &self,
        query: &[f32],
        candidates: &[V],
        k: usize,
        strategy: SearchStrategy,
    ) -> Result<SearchReport>
    where
        V: AsRef<[f32]> + Sync,
    {
        self.search.find_best_matches(query, candidates, k, strategy)
    }

    /// Ranked artist matches. `None` options use the configured defaults.
    pub fn find_best_artist_matches(
        &self,
        user_vector: &[f32],
        code: &str,
        candidates: &[ArtistCandidate],
        options: Option<&MatchOptions>,
    ) -> Result<Vec<MatchResult>> {
        let personality = PersonalityType::parse(code)?;
        let defaults;
        let options = match options {
            Some(options) => options,
            None => {
                defaults = MatchOptions::from(&self.config.matching);
                &defaults
            }
        };
        self.scorer
            .find_best_artist_matches(user_vector, personality, candidates, options)
    }

    /// Ranked artwork matches.
    pub fn find_best_artwork_matches(
        &self,
        user_vector: &[f32],
        candidates: &[ArtworkCandidate],
        limit: usize,
        strategy: SearchStrategy,
    ) -> Result<ArtworkMatches> {
        self.scorer
            .find_best_artwork_matches(user_vector, candidates, limit, strategy)
    }

    /// Closest personality type for a user vector.
    pub async fn classify(&self, user_vector: &[f32]) -> Result<Classification> {
        classify(self.prototypes().await?, user_vector)
    }
}
