//! Prototype store: one canonical unit vector per personality type.
//!
//! [`PrototypeStore`] builds its [`PrototypeSet`] lazily on first use from
//! one batch embedding call over the 16 prototype descriptions. The set is
//! immutable once built and shared by reference, so concurrent readers need
//! no locking. Concurrent first callers share a single initialization; a
//! failed initialization stores nothing and the next call tries again.

use std::sync::Arc;

use apt_core::{AXIS_SEGMENT_WIDTH, Axis, PersonalityType};
use apt_embeddings::normalize::{is_finite, l2_norm, normalized};
use apt_embeddings::text::build_prototype_text;
use apt_embeddings::{EmbeddingError, EmbeddingService};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::errors::{EngineError, Result, check_dimension};

/// Smallest dimension that holds every axis range.
pub const MIN_DIMENSIONS: usize = AXIS_SEGMENT_WIDTH * Axis::ALL.len();

/// The 16 prototype vectors, indexed by [`PersonalityType::index`].
#[derive(Clone, Debug)]
pub struct PrototypeSet {
    vectors: Vec<Vec<f32>>,
    dimensions: usize,
}

impl PrototypeSet {
    /// Build a set from precomputed vectors.
    ///
    /// Every type must be present exactly once with `dimensions` finite,
    /// non-zero components. Vectors are L2-normalized on the way in.
    pub fn from_vectors<I>(vectors: I, dimensions: usize) -> Result<Self>
    where
        I: IntoIterator<Item = (PersonalityType, Vec<f32>)>,
    {
        if dimensions < MIN_DIMENSIONS {
            return Err(EngineError::DimensionMismatch {
                expected: MIN_DIMENSIONS,
                actual: dimensions,
            });
        }
        let mut slots: Vec<Option<Vec<f32>>> = vec![None; PersonalityType::COUNT];
        for (personality, vector) in vectors {
            check_dimension(dimensions, vector.len())?;
            if !is_finite(&vector) || l2_norm(&vector) == 0.0 {
                return Err(EmbeddingError::InvalidResponse(format!(
                    "degenerate prototype vector for {personality}"
                ))
                .into());
            }
            let slot = &mut slots[personality.index()];
            if slot.is_some() {
                return Err(EmbeddingError::InvalidResponse(format!(
                    "duplicate prototype vector for {personality}"
                ))
                .into());
            }
            *slot = Some(normalized(&vector));
        }

        let vectors = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| {
                    let code = PersonalityType::from_index(index)
                        .map_or_else(|| index.to_string(), |t| t.code());
                    EngineError::from(EmbeddingError::InvalidResponse(format!(
                        "missing prototype vector for {code}"
                    )))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            vectors,
            dimensions,
        })
    }

    /// Embed the 16 prototype descriptions in one batch call.
    pub async fn build(service: &dyn EmbeddingService, dimensions: usize) -> Result<Self> {
        let texts: Vec<String> = PersonalityType::ALL
            .iter()
            .map(|t| build_prototype_text(*t))
            .collect();
        debug!(count = texts.len(), dimensions, "embedding prototype descriptions");

        let embedded = service.embed(&texts).await?;
        if embedded.len() != texts.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected {} prototype vectors, got {}",
                texts.len(),
                embedded.len()
            ))
            .into());
        }
        Self::from_vectors(PersonalityType::ALL.into_iter().zip(embedded), dimensions)
    }

    /// The prototype for `personality`.
    pub fn get(&self, personality: PersonalityType) -> &[f32] {
        &self.vectors[personality.index()]
    }

    /// Vector dimension.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// All prototypes in index order.
    pub fn iter(&self) -> impl Iterator<Item = (PersonalityType, &[f32])> {
        PersonalityType::ALL
            .into_iter()
            .zip(self.vectors.iter().map(Vec::as_slice))
    }
}

/// Lazily initialized, read-only prototype set.
pub struct PrototypeStore {
    service: Option<Arc<dyn EmbeddingService>>,
    dimensions: usize,
    cell: OnceCell<PrototypeSet>,
}

impl PrototypeStore {
    /// Create an uninitialized store that embeds through `service`.
    pub fn new(service: Arc<dyn EmbeddingService>, dimensions: usize) -> Self {
        Self {
            service: Some(service),
            dimensions,
            cell: OnceCell::new(),
        }
    }

    /// Create a store that is already initialized with `set`.
    pub fn from_set(set: PrototypeSet) -> Self {
        Self {
            service: None,
            dimensions: set.dimensions(),
            cell: OnceCell::new_with(Some(set)),
        }
    }

    /// Whether the set has been built.
    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    /// Vector dimension.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// The set if already built, without triggering initialization.
    pub fn try_get(&self) -> Option<&PrototypeSet> {
        self.cell.get()
    }

    /// The prototype set, building it on first use.
    pub async fn get(&self) -> Result<&PrototypeSet> {
        self.cell
            .get_or_try_init(|| async {
                let service = self
                    .service
                    .as_ref()
                    .ok_or(EngineError::EmbeddingService(EmbeddingError::NotReady))?;
                let set = PrototypeSet::build(service.as_ref(), self.dimensions).await?;
                info!(
                    types = PersonalityType::COUNT,
                    dimensions = self.dimensions,
                    "prototype vectors initialized"
                );
                Ok::<_, EngineError>(set)
            })
            .await
    }
}
