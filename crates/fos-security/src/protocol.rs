//! Protocol Classification
//!
//! Scheme-prefix classification used for gate short-circuits.

/// Protocol class of a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolClass {
    /// `data:` URL
    Data,
    /// `blob:` URL
    Blob,
    /// `javascript:` URL
    Javascript,
    /// Anything else, including relative paths
    Other,
}

impl ProtocolClass {
    /// Classify a URL by its leading scheme token.
    ///
    /// Matching is exact and case-sensitive; no parsing happens beyond the prefix.
    pub fn classify(url: &str) -> Self {
        if url.starts_with("data:") {
            Self::Data
        } else if url.starts_with("blob:") {
            Self::Blob
        } else if url.starts_with("javascript:") {
            Self::Javascript
        } else {
            Self::Other
        }
    }

    /// `data:` or `blob:`
    pub fn is_local_content(self) -> bool {
        matches!(self, Self::Data | Self::Blob)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Blob => "blob",
            Self::Javascript => "javascript",
            Self::Other => "other",
        }
    }
}
