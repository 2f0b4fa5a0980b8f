//! # apt-core
//!
//! Foundation types shared by every APT crate:
//!
//! - **Personality vocabulary**: [`PersonalityType`] (16 codes), [`Axis`],
//!   [`Pole`], [`QuestionType`], [`QuizResponse`]
//! - **Vector geometry constants**: [`VECTOR_DIMENSIONS`] and the fixed
//!   per-axis dimension ranges
//! - **Retry math**: backoff with jitter and `Retry-After` parsing
//! - **Logging**: `tracing` subscriber setup

#![deny(unsafe_code)]

pub mod logging;
pub mod personality;
pub mod retry;

pub use personality::{
    AXIS_SEGMENT_WIDTH, Axis, PersonalityError, PersonalityType, Pole, QuestionType,
    QuizResponse, VECTOR_DIMENSIONS,
};
pub use retry::RetryConfig;
