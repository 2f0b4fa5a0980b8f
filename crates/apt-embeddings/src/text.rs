//! Embedding text builders.
//!
//! Every builder concatenates non-empty sections with newline separators,
//! so a missing field never leaves a blank line behind.

use apt_core::{Axis, PersonalityType, Pole};
use serde::{Deserialize, Serialize};

/// Descriptive phrase for a pole, used to compose prototype texts.
pub fn pole_description(pole: Pole) -> &'static str {
    match pole {
        Pole::Lone => {
            "Prefers to view art alone, lingering quietly and reflecting inwardly on each work"
        }
        Pole::Social => {
            "Enjoys viewing art with others, sharing impressions and discussing works in conversation"
        }
        Pole::Abstract => {
            "Drawn to abstract art: color fields, pure form, gesture, and ambiguous meaning"
        }
        Pole::Realistic => {
            "Drawn to representational art: figures, landscapes, portraits, and recognizable subjects"
        }
        Pole::Emotional => {
            "Responds to art through feeling, atmosphere, mood, and personal emotional resonance"
        }
        Pole::Methodical => {
            "Responds to art through analysis: technique, composition, history, and context"
        }
        Pole::Flexible => {
            "Explores exhibitions freely and spontaneously, following curiosity from room to room"
        }
        Pole::Controlled => {
            "Explores exhibitions in a planned, structured order, following the curated route"
        }
    }
}

/// Build the canonical description of a personality type.
///
/// One line for the code, then one line per axis pole in axis order.
pub fn build_prototype_text(personality: PersonalityType) -> String {
    let mut parts = Vec::with_capacity(Axis::ALL.len() + 1);
    let labels: Vec<&str> = personality.poles().iter().map(|p| p.label()).collect();
    parts.push(format!(
        "Art viewer personality {personality}: {}",
        labels.join(", ")
    ));
    for pole in personality.poles() {
        parts.push(pole_description(pole).to_string());
    }
    parts.join("\n")
}

/// Structured description of an artwork.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtworkDescription {
    /// Stable artwork identifier.
    pub id: String,
    /// Title.
    pub title: String,
    /// Artist display name.
    pub artist: String,
    /// Style or movement label.
    pub style: String,
    /// Medium (oil on canvas, bronze, ...).
    pub medium: String,
    /// Period or year range.
    pub period: String,
    /// Free-text description.
    pub description: String,
    /// Keywords.
    pub tags: Vec<String>,
}

/// Structured description of an artist.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtistDescription {
    /// Stable artist identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Styles the artist works in.
    pub styles: Vec<String>,
    /// Movement the artist is associated with.
    pub movement: String,
    /// Short biography.
    pub bio: String,
    /// Keywords.
    pub tags: Vec<String>,
}

fn push_labeled(parts: &mut Vec<String>, label: &str, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        parts.push(format!("{label}: {value}"));
    }
}

fn push_list(parts: &mut Vec<String>, label: &str, values: &[String], sep: &str) {
    let values: Vec<&str> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect();
    if !values.is_empty() {
        parts.push(format!("{label}: {}", values.join(sep)));
    }
}

/// Build embedding text for an artwork.
pub fn build_artwork_text(artwork: &ArtworkDescription) -> String {
    let mut parts = Vec::new();
    push_labeled(&mut parts, "Title", &artwork.title);
    push_labeled(&mut parts, "Artist", &artwork.artist);
    push_labeled(&mut parts, "Style", &artwork.style);
    push_labeled(&mut parts, "Medium", &artwork.medium);
    push_labeled(&mut parts, "Period", &artwork.period);
    push_labeled(&mut parts, "Description", &artwork.description);
    push_list(&mut parts, "Tags", &artwork.tags, " ");
    parts.join("\n")
}

/// Build embedding text for an artist.
pub fn build_artist_text(artist: &ArtistDescription) -> String {
    let mut parts = Vec::new();
    push_labeled(&mut parts, "Artist", &artist.name);
    push_list(&mut parts, "Styles", &artist.styles, ", ");
    push_labeled(&mut parts, "Movement", &artist.movement);
    push_labeled(&mut parts, "Biography", &artist.bio);
    push_list(&mut parts, "Tags", &artist.tags, " ");
    parts.join("\n")
}

/// Build embedding text for one answered quiz question.
pub fn build_quiz_answer_text(question: &str, answer: &str) -> String {
    let mut parts = Vec::new();
    push_labeled(&mut parts, "Question", question);
    push_labeled(&mut parts, "Answer", answer);
    parts.join("\n")
}
