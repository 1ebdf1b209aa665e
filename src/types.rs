//! Core types for nav-guidance

use serde::{Deserialize, Serialize};

use crate::banner::NoSourceReason;

/// Failure message delivered when a fetch fails for any reason other than an
/// HTTP 401. Transport errors, unexpected status codes, and undecodable
/// bodies all fold into this one message; the distinguishing detail goes to
/// the log instead of the caller.
pub const GENERIC_FETCH_FAILURE: &str = "Something went wrong. Guidance image not received";

/// Unique identifier for an in-flight guidance image fetch
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FetchId(pub u64);

impl FetchId {
    /// Create a new FetchId
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for FetchId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<FetchId> for u64 {
    fn from(id: FetchId) -> Self {
        id.0
    }
}

impl PartialEq<u64> for FetchId {
    fn eq(&self, other: &u64) -> bool {
        self.0 == *other
    }
}

impl PartialEq<FetchId> for u64 {
    fn eq(&self, other: &FetchId) -> bool {
        *self == other.0
    }
}

impl std::fmt::Display for FetchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A decoded guidance view bitmap
///
/// Pixel data is tightly packed RGBA8 in row-major order, so
/// `pixels.len() == width * height * 4`. Rendering the bitmap is the
/// caller's concern.
#[derive(Clone, PartialEq, Eq)]
pub struct GuidanceImage {
    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Raw RGBA8 pixel data, row-major
    pub pixels: Vec<u8>,
}

impl GuidanceImage {
    /// Number of bytes of pixel data
    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }
}

// Pixel data can run into megabytes; Debug prints its size, not its contents.
impl std::fmt::Debug for GuidanceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuidanceImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixels", &format_args!("{} bytes", self.pixels.len()))
            .finish()
    }
}

/// Terminal outcome of a guidance image fetch
///
/// Exactly one of these is delivered per fetch, unless the fetch is
/// cancelled first, in which case nothing is delivered at all. The variants
/// are mutually exclusive; there is no outcome carrying both an image and an
/// error.
#[derive(Clone, Debug, PartialEq)]
pub enum FetchOutcome {
    /// The image was fetched and decoded
    Ready(GuidanceImage),

    /// The banner carried no usable guidance view image URL
    NoSource(NoSourceReason),

    /// The fetch ran but failed; the message is either the HTTP 401 status
    /// message verbatim or [`GENERIC_FETCH_FAILURE`]
    Failure(String),
}

impl FetchOutcome {
    /// Short lowercase label for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            FetchOutcome::Ready(_) => "ready",
            FetchOutcome::NoSource(_) => "no_source",
            FetchOutcome::Failure(_) => "failure",
        }
    }
}
