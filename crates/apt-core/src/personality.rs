//! Personality vocabulary: axes, poles, the 16 type codes, and quiz responses.
//!
//! A [`PersonalityType`] is a 4-letter code with one letter per axis, in
//! fixed axis order:
//!
//! | Axis | First pole | Second pole |
//! |------|------------|-------------|
//! | `L_S` | `L`one | `S`ocial |
//! | `A_R` | `A`bstract | `R`ealistic |
//! | `E_M` | `E`motional | `M`ethodical |
//! | `F_C` | `F`lexible | `C`ontrolled |
//!
//! Each axis also owns a fixed, disjoint range of vector dimensions
//! ([`Axis::dimension_range`]). The ranges are laid out back to back from
//! dimension 0, [`AXIS_SEGMENT_WIDTH`] wide each.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Dimension of every prototype, user, and content vector.
pub const VECTOR_DIMENSIONS: usize = 256;

/// Width of the dimension range owned by each axis.
pub const AXIS_SEGMENT_WIDTH: usize = 16;

/// Errors from parsing personality vocabulary.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PersonalityError {
    /// The code is not one of the 16 valid personality types.
    #[error("invalid personality type: {0:?}")]
    InvalidType(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Axis
// ─────────────────────────────────────────────────────────────────────────────

/// One of the four binary personality axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    /// Lone / Social.
    #[serde(rename = "L_S")]
    LoneSocial,
    /// Abstract / Realistic.
    #[serde(rename = "A_R")]
    AbstractRealistic,
    /// Emotional / Methodical.
    #[serde(rename = "E_M")]
    EmotionalMethodical,
    /// Flexible / Controlled.
    #[serde(rename = "F_C")]
    FlexibleControlled,
}

impl Axis {
    /// All axes in code-letter order.
    pub const ALL: [Axis; 4] = [
        Axis::LoneSocial,
        Axis::AbstractRealistic,
        Axis::EmotionalMethodical,
        Axis::FlexibleControlled,
    ];

    /// Wire code (`"L_S"`, `"A_R"`, `"E_M"`, `"F_C"`).
    pub fn code(self) -> &'static str {
        match self {
            Self::LoneSocial => "L_S",
            Self::AbstractRealistic => "A_R",
            Self::EmotionalMethodical => "E_M",
            Self::FlexibleControlled => "F_C",
        }
    }

    /// Parse a wire code, case-insensitively. Returns `None` for unknown axes.
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|axis| axis.code().eq_ignore_ascii_case(code))
    }

    /// Position of this axis in a type code (0 to 3).
    pub fn ordinal(self) -> usize {
        match self {
            Self::LoneSocial => 0,
            Self::AbstractRealistic => 1,
            Self::EmotionalMethodical => 2,
            Self::FlexibleControlled => 3,
        }
    }

    /// The fixed range of vector dimensions owned by this axis.
    pub fn dimension_range(self) -> Range<usize> {
        let start = self.ordinal() * AXIS_SEGMENT_WIDTH;
        start..start + AXIS_SEGMENT_WIDTH
    }

    /// The (first, second) poles of this axis.
    pub fn poles(self) -> (Pole, Pole) {
        match self {
            Self::LoneSocial => (Pole::Lone, Pole::Social),
            Self::AbstractRealistic => (Pole::Abstract, Pole::Realistic),
            Self::EmotionalMethodical => (Pole::Emotional, Pole::Methodical),
            Self::FlexibleControlled => (Pole::Flexible, Pole::Controlled),
        }
    }

    fn bit(self) -> u8 {
        1 << (3 - self.ordinal())
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pole
// ─────────────────────────────────────────────────────────────────────────────

/// One end of an [`Axis`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pole {
    /// Prefers solitary, contemplative viewing.
    Lone,
    /// Prefers shared, conversational viewing.
    Social,
    /// Drawn to abstraction and form.
    Abstract,
    /// Drawn to figuration and representation.
    Realistic,
    /// Responds through feeling.
    Emotional,
    /// Responds through analysis.
    Methodical,
    /// Wanders freely.
    Flexible,
    /// Follows a plan.
    Controlled,
}

impl Pole {
    /// The axis this pole belongs to.
    pub fn axis(self) -> Axis {
        match self {
            Self::Lone | Self::Social => Axis::LoneSocial,
            Self::Abstract | Self::Realistic => Axis::AbstractRealistic,
            Self::Emotional | Self::Methodical => Axis::EmotionalMethodical,
            Self::Flexible | Self::Controlled => Axis::FlexibleControlled,
        }
    }

    /// Code letter of this pole.
    pub fn letter(self) -> char {
        match self {
            Self::Lone => 'L',
            Self::Social => 'S',
            Self::Abstract => 'A',
            Self::Realistic => 'R',
            Self::Emotional => 'E',
            Self::Methodical => 'M',
            Self::Flexible => 'F',
            Self::Controlled => 'C',
        }
    }

    /// Whether this is the first pole of its axis (`L`, `A`, `E`, `F`).
    pub fn is_first(self) -> bool {
        self.axis().poles().0 == self
    }

    /// The other pole of the same axis.
    pub fn opposite(self) -> Self {
        let (first, second) = self.axis().poles();
        if self == first { second } else { first }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Lone => "Lone",
            Self::Social => "Social",
            Self::Abstract => "Abstract",
            Self::Realistic => "Realistic",
            Self::Emotional => "Emotional",
            Self::Methodical => "Methodical",
            Self::Flexible => "Flexible",
            Self::Controlled => "Controlled",
        }
    }

    fn from_letter(axis: Axis, letter: char) -> Option<Self> {
        let (first, second) = axis.poles();
        let letter = letter.to_ascii_uppercase();
        if first.letter() == letter {
            Some(first)
        } else if second.letter() == letter {
            Some(second)
        } else {
            None
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PersonalityType
// ─────────────────────────────────────────────────────────────────────────────

/// One of the 16 personality types.
///
/// Stored as a 4-bit pattern (one bit per axis, set = second pole), so it is
/// `Copy` and usable as a dense index via [`PersonalityType::index`].
/// Serialized as its 4-letter code.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonalityType(u8);

impl PersonalityType {
    /// Number of valid types.
    pub const COUNT: usize = 16;

    /// Every valid type, ordered by [`index`](Self::index).
    pub const ALL: [PersonalityType; 16] = {
        let mut all = [PersonalityType(0); 16];
        let mut i = 0;
        while i < 16 {
            all[i] = PersonalityType(i as u8);
            i += 1;
        }
        all
    };

    /// Look up a type by its dense index (0 to 15).
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Dense index (0 to 15), stable across releases.
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// Parse a 4-letter code, case-insensitively.
    pub fn parse(code: &str) -> Result<Self, PersonalityError> {
        let invalid = || PersonalityError::InvalidType(code.to_string());
        let letters: Vec<char> = code.trim().chars().collect();
        if letters.len() != Axis::ALL.len() {
            return Err(invalid());
        }
        let mut bits = 0u8;
        for (axis, letter) in Axis::ALL.into_iter().zip(letters) {
            let pole = Pole::from_letter(axis, letter).ok_or_else(invalid)?;
            if !pole.is_first() {
                bits |= axis.bit();
            }
        }
        Ok(Self(bits))
    }

    /// The pole this type holds on `axis`.
    pub fn pole(self, axis: Axis) -> Pole {
        let (first, second) = axis.poles();
        if self.0 & axis.bit() == 0 { first } else { second }
    }

    /// The four poles of this type, in axis order.
    pub fn poles(self) -> [Pole; 4] {
        Axis::ALL.map(|axis| self.pole(axis))
    }

    /// This type with `pole` substituted on its axis.
    #[must_use]
    pub fn with_pole(self, pole: Pole) -> Self {
        let bit = pole.axis().bit();
        if pole.is_first() {
            Self(self.0 & !bit)
        } else {
            Self(self.0 | bit)
        }
    }

    /// Whether this type holds `pole`.
    pub fn has_pole(self, pole: Pole) -> bool {
        self.pole(pole.axis()) == pole
    }

    /// Poles held by both types, in axis order.
    pub fn shared_poles(self, other: Self) -> Vec<Pole> {
        Axis::ALL
            .into_iter()
            .map(|axis| self.pole(axis))
            .filter(|pole| other.has_pole(*pole))
            .collect()
    }

    /// Number of axes on which the two types hold the same pole.
    pub fn matching_axes(self, other: Self) -> usize {
        (!(self.0 ^ other.0) & 0x0f).count_ones() as usize
    }

    /// The 4-letter code.
    pub fn code(self) -> String {
        self.poles().iter().map(|p| p.letter()).collect()
    }
}

impl fmt::Display for PersonalityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

impl fmt::Debug for PersonalityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PersonalityType({})", self.code())
    }
}

impl FromStr for PersonalityType {
    type Err = PersonalityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PersonalityType {
    type Error = PersonalityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PersonalityType> for String {
    fn from(value: PersonalityType) -> Self {
        value.code()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Quiz input
// ─────────────────────────────────────────────────────────────────────────────

/// The pole a quiz question probes, or `General` for untargeted questions.
///
/// Unknown wire values deserialize as `General`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    /// Probes the Lone pole.
    Lone,
    /// Probes the Social pole.
    Social,
    /// Probes the Abstract pole.
    Abstract,
    /// Probes the Realistic pole.
    Realistic,
    /// Probes the Emotional pole.
    Emotional,
    /// Probes the Methodical pole.
    Methodical,
    /// Probes the Flexible pole.
    Flexible,
    /// Probes the Controlled pole.
    Controlled,
    /// Not tied to a pole.
    #[default]
    #[serde(other)]
    General,
}

impl QuestionType {
    /// The pole this question probes.
    pub fn pole(self) -> Option<Pole> {
        match self {
            Self::Lone => Some(Pole::Lone),
            Self::Social => Some(Pole::Social),
            Self::Abstract => Some(Pole::Abstract),
            Self::Realistic => Some(Pole::Realistic),
            Self::Emotional => Some(Pole::Emotional),
            Self::Methodical => Some(Pole::Methodical),
            Self::Flexible => Some(Pole::Flexible),
            Self::Controlled => Some(Pole::Controlled),
            Self::General => None,
        }
    }
}

/// One answered quiz question.
///
/// `axis` is kept as the raw wire string: responses on axes this engine
/// does not know are skipped during vector construction, not rejected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse {
    /// Axis code (`"L_S"`, `"A_R"`, `"E_M"`, `"F_C"`).
    pub axis: String,
    /// The pole the question probes.
    #[serde(default)]
    pub question_type: QuestionType,
    /// Answer strength; `1.0` is neutral.
    pub weight: f32,
}

impl QuizResponse {
    /// Create a response.
    pub fn new(axis: impl Into<String>, question_type: QuestionType, weight: f32) -> Self {
        Self {
            axis: axis.into(),
            question_type,
            weight,
        }
    }

    /// The parsed axis, or `None` when the axis code is unknown.
    pub fn resolved_axis(&self) -> Option<Axis> {
        Axis::parse(&self.axis)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
