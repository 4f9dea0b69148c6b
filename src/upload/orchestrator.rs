//! Upload processing pipeline
//!
//! Dispatches an upload to the PDF decomposer or straight to the OCR
//! extractor, records the result and optionally syncs it to GitHub. Sync
//! failures never undo a successful extraction; both outcomes are reported.

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use super::models::{ExtractedContent, FileKind, UploadedDocument};
use crate::error::{AppError, Result};
use crate::github::{ContentSync, SyncResult};
use crate::metrics::METRICS;
use crate::ocr::{extract_text_from_pdf, ImageTextExtractor};
use crate::store::ContentStore;

/// Result of a processed upload
#[derive(Debug, Clone)]
pub struct UploadReport {
    pub content_id: String,
    pub content: Arc<ExtractedContent>,
    /// `None` when sync was not requested or there was no text to sync
    pub sync: Option<SyncResult>,
    pub sync_requested: bool,
}

#[derive(Clone)]
pub struct UploadOrchestrator {
    extractor: Arc<dyn ImageTextExtractor>,
    sync: Arc<dyn ContentSync>,
    store: ContentStore,
}

impl UploadOrchestrator {
    pub fn new(
        extractor: Arc<dyn ImageTextExtractor>,
        sync: Arc<dyn ContentSync>,
        store: ContentStore,
    ) -> Self {
        Self {
            extractor,
            sync,
            store,
        }
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Process one upload end to end
    pub async fn handle_upload(
        &self,
        document: Option<UploadedDocument>,
        sync_requested: bool,
    ) -> Result<UploadReport> {
        let upload_id = Uuid::new_v4();
        let span = info_span!("upload", id = %upload_id);

        async move {
            let start = Instant::now();

            let Some(document) = document else {
                warn!("Upload without a file");
                return Err(AppError::NoFile);
            };

            let kind = document.kind;
            let result = self.process(document, sync_requested).await;
            METRICS.record_upload(kind.as_str(), result.is_ok(), start.elapsed());

            match &result {
                Ok(report) => info!(
                    "Upload {} processed in {:?}: {} chars, synced={}",
                    report.content_id,
                    start.elapsed(),
                    report.content.text.len(),
                    report.sync.as_ref().is_some_and(|s| s.success)
                ),
                Err(e) => warn!("Upload failed ({}): {}", e.kind().as_str(), e),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn process(&self, document: UploadedDocument, sync_requested: bool) -> Result<UploadReport> {
        info!(
            "Processing {} ({} bytes, kind={})",
            document.filename,
            document.bytes.len(),
            document.kind.as_str()
        );

        let text = match document.kind {
            FileKind::Pdf => {
                extract_text_from_pdf(document.bytes.to_vec(), self.extractor.as_ref())
                    .await?
                    .text()
            }
            FileKind::Image => self.extractor.extract_text(&document.bytes).await?,
            FileKind::Unsupported => {
                return Err(AppError::UnsupportedFileType {
                    extension: document.extension,
                })
            }
        };

        let content = ExtractedContent {
            source_filename: document.filename,
            text,
            file_kind: document.kind,
            extension: document.extension,
            created_at: Utc::now(),
        };
        let (content_id, content) = self.store.insert(content).await;

        let sync = if sync_requested && !content.text.is_empty() {
            Some(
                self.sync
                    .sync(&content.text, &content.source_filename, &content.extension)
                    .await,
            )
        } else {
            None
        };

        Ok(UploadReport {
            content_id,
            content,
            sync,
            sync_requested,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::ocr::OcrError;
    use crate::store::StoreConfig;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedExtractor {
        text: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ImageTextExtractor for FixedExtractor {
        async fn extract_text(&self, _image: &[u8]) -> std::result::Result<String, OcrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.text.to_string())
        }
    }

    struct FailingExtractor;

    #[async_trait]
    impl ImageTextExtractor for FailingExtractor {
        async fn extract_text(&self, _image: &[u8]) -> std::result::Result<String, OcrError> {
            Err(OcrError::UpstreamError {
                status: 503,
                message: "overloaded".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingSync {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ContentSync for RecordingSync {
        async fn sync(&self, _content: &str, filename: &str, file_type: &str) -> SyncResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            SyncResult::synced(format!("https://example.test/{}/{}", file_type, filename))
        }
    }

    fn orchestrator(
        extractor: Arc<dyn ImageTextExtractor>,
        sync: Arc<RecordingSync>,
    ) -> UploadOrchestrator {
        UploadOrchestrator::new(extractor, sync, ContentStore::new(StoreConfig::default()))
    }

    fn fixed(text: &'static str) -> Arc<FixedExtractor> {
        Arc::new(FixedExtractor {
            text,
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_missing_file() {
        let sync = Arc::new(RecordingSync::default());
        let err = orchestrator(fixed("x"), sync)
            .handle_upload(None, true)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NoFile));
        assert_eq!(err.kind(), ErrorKind::UserInput);
    }

    #[tokio::test]
    async fn test_unsupported_extension_touches_nothing() {
        let extractor = fixed("never");
        let sync = Arc::new(RecordingSync::default());
        let pipeline = orchestrator(extractor.clone(), sync.clone());

        let doc = UploadedDocument::new("notes.docx", b"PK\x03\x04".to_vec());
        let err = pipeline.handle_upload(Some(doc), true).await.unwrap_err();

        assert!(matches!(err, AppError::UnsupportedFileType { ref extension } if extension == "docx"));
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
        assert_eq!(sync.calls.load(Ordering::SeqCst), 0);
        assert_eq!(pipeline.store().len().await, 0);
    }

    #[tokio::test]
    async fn test_image_without_sync() {
        let sync = Arc::new(RecordingSync::default());
        let pipeline = orchestrator(fixed("Hello from a photo"), sync.clone());

        let doc = UploadedDocument::new("photo.png", vec![1, 2, 3]);
        let report = pipeline.handle_upload(Some(doc), false).await.unwrap();

        assert_eq!(report.content.text, "Hello from a photo");
        assert_eq!(report.content.file_kind, FileKind::Image);
        assert!(report.sync.is_none());
        assert!(report.content_id.starts_with("photo.png_"));
        assert_eq!(sync.calls.load(Ordering::SeqCst), 0);
        assert!(pipeline.store().get(&report.content_id).await.is_some());
    }

    #[tokio::test]
    async fn test_sync_passes_extension_as_file_type() {
        let sync = Arc::new(RecordingSync::default());
        let pipeline = orchestrator(fixed("receipt total 12.50"), sync.clone());

        let doc = UploadedDocument::new("Receipt.JPG", vec![0xff, 0xd8]);
        let report = pipeline.handle_upload(Some(doc), true).await.unwrap();

        let result = report.sync.unwrap();
        assert!(result.success);
        assert_eq!(result.file_url.as_deref(), Some("https://example.test/jpg/Receipt.JPG"));
        assert_eq!(sync.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_text_is_not_synced() {
        let sync = Arc::new(RecordingSync::default());
        let pipeline = orchestrator(fixed(""), sync.clone());

        let doc = UploadedDocument::new("blank.png", vec![0]);
        let report = pipeline.handle_upload(Some(doc), true).await.unwrap();

        assert!(report.sync.is_none());
        assert!(report.sync_requested);
        assert_eq!(sync.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ocr_failure_is_not_stored_or_synced() {
        let sync = Arc::new(RecordingSync::default());
        let pipeline = orchestrator(Arc::new(FailingExtractor), sync.clone());

        let doc = UploadedDocument::new("photo.png", vec![1]);
        let err = pipeline.handle_upload(Some(doc), true).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ExternalService);
        assert_eq!(sync.calls.load(Ordering::SeqCst), 0);
        assert_eq!(pipeline.store().len().await, 0);
    }
}
