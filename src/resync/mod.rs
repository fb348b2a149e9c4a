pub mod ffsubsync;

pub use ffsubsync::Ffsubsync;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Realigns subtitle timing against the speech in a reference video.
///
/// Implementations must replace `output` entirely, so running twice on the
/// same inputs leaves the same file behind.
#[async_trait]
pub trait Resynchronizer: Send + Sync {
    async fn resync(&self, reference: &Path, input: &Path, output: &Path) -> Result<()>;
    fn name(&self) -> &'static str;
}
