//! Geofence identifier validation and canonicalization

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// Characters a user may type into a geofence name
static ALLOWED_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-._\s\p{L}\p{N}]+$").expect("Invalid regex"));

/// Canonical identifiers are allowed names with whitespace already replaced
static CANONICAL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-._\p{L}\p{N}]+$").expect("Invalid regex"));

static WHITESPACE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));

/// Errors reported to the user when a geofence submission is refused.
///
/// Variant order mirrors the order in which [`validate`] checks them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Geofence name is empty")]
    EmptyIdentifier,

    #[error("Draw exactly one geofence on the map")]
    NoGeometryDrawn,

    #[error("{0} geofences are drawn on the map, reduce them to one")]
    MultipleGeometriesDrawn(usize),

    #[error("Geofence name may only contain letters, digits, spaces, '-', '.' and '_'")]
    InvalidCharacters,
}

/// Backend-safe geofence identifier, unique within a collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GeofenceId(String);

impl GeofenceId {
    /// Accept an identifier that is already in canonical form, such as one
    /// returned by the backend.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ValidationError::EmptyIdentifier);
        }
        if !CANONICAL_ID_RE.is_match(&raw) {
            return Err(ValidationError::InvalidCharacters);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for GeofenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for GeofenceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for GeofenceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for GeofenceId {
    type Error = ValidationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}

impl From<GeofenceId> for String {
    fn from(id: GeofenceId) -> Self {
        id.0
    }
}

/// Validate a user-supplied geofence name against the number of drawn rings.
///
/// Checks run in a fixed order and the first failure is returned:
/// empty name, nothing drawn, more than one shape drawn, invalid characters.
/// On success every run of whitespace becomes a single `-`.
pub fn validate(raw_id: &str, drawn_ring_count: usize) -> Result<GeofenceId, ValidationError> {
    if raw_id.trim().is_empty() {
        return Err(ValidationError::EmptyIdentifier);
    }
    if drawn_ring_count == 0 {
        return Err(ValidationError::NoGeometryDrawn);
    }
    if drawn_ring_count > 1 {
        return Err(ValidationError::MultipleGeometriesDrawn(drawn_ring_count));
    }
    if !ALLOWED_NAME_RE.is_match(raw_id) {
        return Err(ValidationError::InvalidCharacters);
    }

    let canonical = WHITESPACE_RUN_RE.replace_all(raw_id, "-");
    Ok(GeofenceId(canonical.into_owned()))
}
