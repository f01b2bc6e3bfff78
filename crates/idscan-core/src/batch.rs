//! Batch driver: one extraction outcome per document, in discovery order.

use std::collections::BTreeMap;
use std::path::PathBuf;

use futures_util::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::error::FailureKind;
use crate::extraction::{ExtractionOutcome, Extractor};
use crate::imaging::ImagePreparer;
use crate::llm::VisionModel;
use crate::ocr::OcrService;

/// An ordered collection of documents readable as raw image bytes.
pub trait DocumentSource {
    /// Document identifiers in a stable order.
    fn documents(&self) -> Vec<String>;

    /// Read one document's bytes.
    fn load(&self, id: &str) -> std::io::Result<Vec<u8>>;
}

/// Documents given as an explicit list of file paths.
pub struct FileListSource {
    paths: Vec<PathBuf>,
}

impl FileListSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl DocumentSource for FileListSource {
    fn documents(&self) -> Vec<String> {
        self.paths.iter().map(|p| p.display().to_string()).collect()
    }

    fn load(&self, id: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(id)
    }
}

/// Counts for a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Documents attempted.
    pub total: usize,
    /// Documents whose pipeline completed.
    pub extracted: usize,
    /// Documents that fell back to an all-unknown record.
    pub failed: usize,
    /// Failures grouped by kind.
    pub failures_by_kind: BTreeMap<&'static str, usize>,
}

impl BatchSummary {
    fn record(&mut self, outcome: &ExtractionOutcome) {
        self.total += 1;
        match outcome.error() {
            Some(error) => {
                self.failed += 1;
                *self.failures_by_kind.entry(error.kind().as_str()).or_default() += 1;
            }
            None => self.extracted += 1,
        }
    }

    /// Failures of one kind.
    pub fn failures_of(&self, kind: FailureKind) -> usize {
        self.failures_by_kind.get(kind.as_str()).copied().unwrap_or(0)
    }
}

/// Runs an [`Extractor`] over every document of a source.
pub struct BatchDriver<'a, O, P, M> {
    extractor: &'a Extractor<O, P, M>,
    jobs: usize,
}

impl<'a, O, P, M> BatchDriver<'a, O, P, M>
where
    O: OcrService,
    P: ImagePreparer,
    M: VisionModel,
{
    /// Create a sequential driver.
    pub fn new(extractor: &'a Extractor<O, P, M>) -> Self {
        Self { extractor, jobs: 1 }
    }

    /// Number of documents in flight at once. Emission order stays the
    /// discovery order regardless.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Extract every document, passing each outcome to `sink` in order.
    ///
    /// A document that cannot be read or extracted still produces exactly one
    /// outcome; nothing here stops the batch early.
    pub async fn run<S, F>(&self, source: &S, mut sink: F) -> BatchSummary
    where
        S: DocumentSource,
        F: FnMut(ExtractionOutcome),
    {
        let ids = source.documents();
        info!("Processing {} documents with {} job(s)", ids.len(), self.jobs);

        let outcomes = stream::iter(ids)
            .map(|id| async move { self.process_one(source, &id).await })
            .buffered(self.jobs);
        let mut outcomes = std::pin::pin!(outcomes);

        let mut summary = BatchSummary::default();
        while let Some(outcome) = outcomes.next().await {
            summary.record(&outcome);
            sink(outcome);
        }

        info!(
            "Batch complete: {} documents, {} extracted, {} failed",
            summary.total, summary.extracted, summary.failed
        );

        summary
    }

    async fn process_one<S: DocumentSource>(&self, source: &S, id: &str) -> ExtractionOutcome {
        match source.load(id) {
            Ok(bytes) => self.extractor.extract(id, &bytes).await,
            Err(e) => {
                warn!("Could not read {}: {}", id, e);
                ExtractionOutcome::failed(id, e.into())
            }
        }
    }
}
