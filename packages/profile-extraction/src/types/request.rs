//! Inbound request types.

use serde::{Deserialize, Serialize};

/// Whose profile the captured page belongs to.
///
/// Extraction priorities differ slightly: a member's own profile is extracted
/// with every credential section weighted equally, while a target profile
/// front-loads identity and work history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    /// The requesting member's own profile
    Own,

    /// Somebody else's profile
    Target,
}

impl ProfileKind {
    /// Derive the kind from the caller's `isOwnProfile` flag.
    pub fn from_is_own(is_own: bool) -> Self {
        if is_own {
            Self::Own
        } else {
            Self::Target
        }
    }
}

/// How aggressively to reduce the captured HTML before prompting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationMode {
    /// Keep document structure; narrow to the main content region first
    #[default]
    PreserveStructure,

    /// Strip landmarks and attributes too; for tight token budgets
    AggressiveReduce,
}

impl OptimizationMode {
    /// Parse the caller's optional mode string. Unrecognized values fall back
    /// to the default rather than failing the request.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("aggressive_reduce") | Some("aggressive") => Self::AggressiveReduce,
            _ => Self::PreserveStructure,
        }
    }
}

/// One extraction job. Immutable; constructed once per inbound request.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Raw captured HTML
    pub html: String,

    /// URL the HTML was captured from
    pub source_url: String,

    /// Whose profile this is
    pub profile_kind: ProfileKind,

    /// HTML reduction mode
    pub optimization_mode: OptimizationMode,
}

impl ExtractionRequest {
    /// Create a request for a target profile with default reduction.
    pub fn new(html: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            source_url: source_url.into(),
            profile_kind: ProfileKind::Target,
            optimization_mode: OptimizationMode::default(),
        }
    }

    /// Set the profile kind.
    pub fn with_kind(mut self, kind: ProfileKind) -> Self {
        self.profile_kind = kind;
        self
    }

    /// Set the reduction mode.
    pub fn with_mode(mut self, mode: OptimizationMode) -> Self {
        self.optimization_mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse_is_lenient() {
        assert_eq!(
            OptimizationMode::parse(Some("aggressive_reduce")),
            OptimizationMode::AggressiveReduce
        );
        assert_eq!(
            OptimizationMode::parse(Some("garbage")),
            OptimizationMode::PreserveStructure
        );
        assert_eq!(
            OptimizationMode::parse(None),
            OptimizationMode::PreserveStructure
        );
    }

    #[test]
    fn test_request_builder() {
        let request = ExtractionRequest::new("<html></html>", "https://example.com/in/someone")
            .with_kind(ProfileKind::Own)
            .with_mode(OptimizationMode::AggressiveReduce);

        assert_eq!(request.profile_kind, ProfileKind::Own);
        assert_eq!(request.optimization_mode, OptimizationMode::AggressiveReduce);
    }

    #[test]
    fn test_kind_from_flag() {
        assert_eq!(ProfileKind::from_is_own(true), ProfileKind::Own);
        assert_eq!(ProfileKind::from_is_own(false), ProfileKind::Target);
    }
}
