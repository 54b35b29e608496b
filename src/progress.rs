//! Progress-callback trait for pipeline stage events.
//!
//! Inject an [`Arc<dyn AnalysisProgressCallback>`] via
//! [`crate::config::AnalysisConfigBuilder::progress_callback`] to be told when
//! each stage starts and finishes. The CLI uses it to drive a spinner; a web
//! front end could forward the same events to a socket.
//!
//! # Example
//!
//! ```rust
//! use semfit::{AnalysisConfig, AnalysisProgressCallback, Stage};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     finished: AtomicUsize,
//! }
//!
//! impl AnalysisProgressCallback for CountingCallback {
//!     fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
//!         self.finished.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{stage} done in {elapsed_ms}ms");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { finished: AtomicUsize::new(0) });
//!
//! let config = AnalysisConfig::builder()
//!     .progress_callback(counter as Arc<dyn AnalysisProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;
use std::sync::Arc;

/// A pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Stage {
    ResolveInput,
    ReadDocument,
    ExtractIndices,
    BuildChart,
    GenerateDiagram,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::ResolveInput => "Resolving input",
            Stage::ReadDocument => "Reading PDF text",
            Stage::ExtractIndices => "Extracting fit indices",
            Stage::BuildChart => "Building chart",
            Stage::GenerateDiagram => "Generating path diagram",
        };
        f.write_str(s)
    }
}

/// Called by the analysis pipeline as it moves through its stages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait AnalysisProgressCallback: Send + Sync {
    /// Called when a stage begins.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when a stage finishes successfully.
    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        let _ = (stage, elapsed_ms);
    }

    /// Called once the document is open.
    ///
    /// # Arguments
    /// * `page_count` — pages in the document
    /// * `chars`      — characters of extracted text
    fn on_document_read(&self, page_count: usize, chars: usize) {
        let _ = (page_count, chars);
    }

    /// Called when a stage fails; the error is rendered to a string.
    fn on_stage_error(&self, stage: Stage, error: &str) {
        let _ = (stage, error);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl AnalysisProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::AnalysisConfig`].
pub type ProgressCallback = Arc<dyn AnalysisProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        stages: Mutex<Vec<Stage>>,
        errors: AtomicUsize,
        pages: AtomicUsize,
    }

    impl AnalysisProgressCallback for TrackingCallback {
        fn on_stage_start(&self, _stage: Stage) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_stage_complete(&self, stage: Stage, _elapsed_ms: u64) {
            self.stages.lock().unwrap().push(stage);
        }

        fn on_document_read(&self, page_count: usize, _chars: usize) {
            self.pages.store(page_count, Ordering::SeqCst);
        }

        fn on_stage_error(&self, _stage: Stage, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_stage_start(Stage::ReadDocument);
        cb.on_document_read(3, 1200);
        cb.on_stage_complete(Stage::ReadDocument, 12);
        cb.on_stage_error(Stage::GenerateDiagram, "no Rscript");
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_stage_start(Stage::ReadDocument);
        tracker.on_document_read(4, 900);
        tracker.on_stage_complete(Stage::ReadDocument, 5);
        tracker.on_stage_start(Stage::ExtractIndices);
        tracker.on_stage_complete(Stage::ExtractIndices, 1);
        tracker.on_stage_error(Stage::GenerateDiagram, "timeout");

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.pages.load(Ordering::SeqCst), 4);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(
            *tracker.stages.lock().unwrap(),
            vec![Stage::ReadDocument, Stage::ExtractIndices]
        );
    }

    #[test]
    fn stage_display() {
        assert_eq!(Stage::ExtractIndices.to_string(), "Extracting fit indices");
    }
}
