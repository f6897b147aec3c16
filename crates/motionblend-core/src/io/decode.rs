use crate::error::Result;
use crate::frame::DecodedFrame;

/// Turns a finalized sub-frame payload into pixel channel triples.
///
/// Implementations must report malformed input as an error and never panic:
/// payloads come straight from an external renderer and may be truncated.
pub trait FrameDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedFrame>;

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}
