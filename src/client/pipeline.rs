//! Extraction pipeline
//!
//! `run` submits the whole PDF first. When the server answers with the
//! scanned signal, `run_fallback` rasterizes locally and submits the pages
//! one at a time, in order, each awaited before the next. A page that
//! fails is left out of the aggregate; only a rasterization failure aborts.

use std::fmt;
use std::sync::Arc;

use super::{
    Aggregator, ClientError, OcrEndpoint, PageRasterizer, PdfFile, RasterError, Upload,
};
use crate::envelope::ExtractionResult;

/// Fallback message when the server rejects without one
const REJECTED_FALLBACK: &str = "Failed to process PDF";

/// Progress reported while a pipeline runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    Uploading,
    ScannedDetected,
    PageStarted { index: usize, total: usize },
    PageSkipped { index: usize, reason: String },
}

impl fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uploading => write!(f, "Uploading PDF..."),
            Self::ScannedDetected => {
                write!(f, "Scanned PDF detected. Converting to images for OCR...")
            }
            Self::PageStarted { index, total } => {
                write!(f, "Processing page {} of {}...", index, total)
            }
            Self::PageSkipped { index, reason } => write!(f, "Skipped page {}: {}", index, reason),
        }
    }
}

type EventFn = dyn Fn(&PipelineEvent) + Send + Sync;

/// Whole-document submission with page-image OCR fallback
pub struct FallbackPipeline {
    endpoint: Arc<dyn OcrEndpoint>,
    rasterizer: Arc<dyn PageRasterizer>,
    on_event: Box<EventFn>,
}

impl FallbackPipeline {
    pub fn new(endpoint: Arc<dyn OcrEndpoint>, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        Self {
            endpoint,
            rasterizer,
            on_event: Box::new(|_| {}),
        }
    }

    /// Observe progress events
    pub fn on_event(mut self, f: impl Fn(&PipelineEvent) + Send + Sync + 'static) -> Self {
        self.on_event = Box::new(f);
        self
    }

    fn emit(&self, event: PipelineEvent) {
        tracing::debug!("{}", event);
        (self.on_event)(&event);
    }

    /// Extract text from a PDF, falling back to page OCR for scanned input
    pub async fn run(&self, file: &PdfFile) -> Result<ExtractionResult, ClientError> {
        self.emit(PipelineEvent::Uploading);

        let result = self
            .endpoint
            .submit(Upload::pdf(&file.name, file.data.clone()))
            .await?;

        if result.success {
            return Ok(result);
        }

        if result.is_scanned {
            self.emit(PipelineEvent::ScannedDetected);
            return self.run_fallback(file).await;
        }

        let message = if result.message.is_empty() {
            REJECTED_FALLBACK.to_string()
        } else {
            result.message
        };
        Err(ClientError::Rejected(message))
    }

    /// Rasterize the PDF and OCR each page through the endpoint
    ///
    /// Succeeds even when every page fails; dropped pages are listed in
    /// `skipped_pages`.
    pub async fn run_fallback(&self, file: &PdfFile) -> Result<ExtractionResult, ClientError> {
        let rasterizer = Arc::clone(&self.rasterizer);
        let data = file.data.clone();

        let pages = tokio::task::spawn_blocking(move || rasterizer.rasterize(&data))
            .await
            .map_err(|e| RasterError::Task(e.to_string()))
            .and_then(|rendered| rendered)
            .map_err(|e| {
                tracing::error!("Error converting PDF to images: {}", e);
                ClientError::ScannedConversion(e)
            })?;

        let total = pages.len();
        tracing::info!(file_name = %file.name, pages = total, "Rasterized scanned PDF");

        let mut aggregator = Aggregator::new();
        for page in pages {
            let index = page.index;
            self.emit(PipelineEvent::PageStarted { index, total });

            let reason = match self.endpoint.submit(Upload::page(page)).await {
                Ok(result) if result.success => {
                    aggregator.record_page(index, result.text.unwrap_or_default());
                    continue;
                }
                Ok(result) => result.message,
                Err(e) => e.to_string(),
            };

            tracing::warn!(page = index, "Error processing page: {}", reason);
            aggregator.skip_page(index);
            self.emit(PipelineEvent::PageSkipped { index, reason });
        }

        tracing::info!(
            recognized = aggregator.recorded(),
            total,
            "Scanned PDF processed"
        );
        Ok(aggregator.finish(&file.name))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::artifact::ArtifactStore;
    use crate::client::{HttpOcrClient, MuPdfRasterizer, PageImage};
    use crate::config::Config;
    use crate::envelope::{SCANNED_PDF_DETECTED, SCANNED_PDF_PROCESSED};
    use crate::extract::{DocumentClassifier, MuPdfExtractor, MIN_USABLE_TEXT_CHARS};
    use crate::ocr::{MockProvider, OcrService};
    use crate::pdf::fixture::pdf_with_pages;
    use crate::pdf::PdfError;
    use crate::routes::app;
    use crate::state::AppState;

    type Responder = dyn Fn(&Upload) -> Result<ExtractionResult, ClientError> + Send + Sync;

    /// Endpoint answering from a closure and recording every upload
    struct ScriptedEndpoint {
        respond: Box<Responder>,
        uploads: Mutex<Vec<String>>,
    }

    impl ScriptedEndpoint {
        fn new(
            respond: impl Fn(&Upload) -> Result<ExtractionResult, ClientError> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                respond: Box::new(respond),
                uploads: Mutex::new(Vec::new()),
            })
        }

        fn uploads(&self) -> Vec<String> {
            self.uploads.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OcrEndpoint for ScriptedEndpoint {
        async fn submit(&self, upload: Upload) -> Result<ExtractionResult, ClientError> {
            self.uploads.lock().unwrap().push(upload.file_name.clone());
            (self.respond)(&upload)
        }
    }

    /// Rasterizer producing `n` placeholder pages, or failing
    struct FakeRasterizer(Option<usize>);

    impl PageRasterizer for FakeRasterizer {
        fn rasterize(&self, _data: &[u8]) -> Result<Vec<PageImage>, RasterError> {
            match self.0 {
                Some(n) => Ok((1..=n)
                    .map(|index| PageImage {
                        index,
                        data: vec![index as u8],
                        width: 1,
                        height: 1,
                    })
                    .collect()),
                None => Err(RasterError::Page {
                    index: 1,
                    source: PdfError::ImageError("corrupt page".to_string()),
                }),
            }
        }
    }

    fn pdf_file() -> PdfFile {
        PdfFile::from_bytes("scan.pdf", b"%PDF-1.4".to_vec()).unwrap()
    }

    fn ok(text: &str) -> Result<ExtractionResult, ClientError> {
        Ok(ExtractionResult::success(text.to_string(), "page", "ok"))
    }

    /// Answers whole-PDF uploads with the scanned signal and pages by script
    fn scanned_then(
        pages: impl Fn(&str) -> Result<ExtractionResult, ClientError> + Send + Sync + 'static,
    ) -> Arc<ScriptedEndpoint> {
        ScriptedEndpoint::new(move |upload| {
            if upload.file_name.ends_with(".pdf") {
                Ok(ExtractionResult::scanned(String::new()))
            } else {
                pages(&upload.file_name)
            }
        })
    }

    #[tokio::test]
    async fn test_failed_page_is_omitted() {
        let endpoint = scanned_then(|name| match name {
            "page-1.jpg" => ok("Hello"),
            "page-2.jpg" => Err(ClientError::InvalidResponse("timeout".to_string())),
            _ => ok("World"),
        });
        let pipeline = FallbackPipeline::new(endpoint.clone(), Arc::new(FakeRasterizer(Some(3))));

        let result = pipeline.run(&pdf_file()).await.unwrap();

        assert!(result.success);
        assert_eq!(
            result.text(),
            "\n--- Page 1 ---\nHello\n\n--- Page 3 ---\nWorld\n"
        );
        assert_eq!(result.message, SCANNED_PDF_PROCESSED);
        assert_eq!(result.file_name.as_deref(), Some("scan.pdf"));
        assert_eq!(result.skipped_pages, vec![2]);
    }

    #[tokio::test]
    async fn test_pages_submitted_in_order_with_markers() {
        let endpoint = scanned_then(|name| ok(name));
        let pipeline = FallbackPipeline::new(endpoint.clone(), Arc::new(FakeRasterizer(Some(4))));

        let result = pipeline.run(&pdf_file()).await.unwrap();

        assert_eq!(
            endpoint.uploads(),
            vec!["scan.pdf", "page-1.jpg", "page-2.jpg", "page-3.jpg", "page-4.jpg"]
        );
        let text = result.text();
        let positions: Vec<usize> = (1..=4)
            .map(|i| text.find(&format!("--- Page {} ---", i)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(result.skipped_pages.is_empty());
    }

    #[tokio::test]
    async fn test_render_failure_submits_no_pages() {
        let endpoint = scanned_then(|_| ok("unused"));
        let pipeline = FallbackPipeline::new(endpoint.clone(), Arc::new(FakeRasterizer(None)));

        let err = pipeline.run(&pdf_file()).await.unwrap_err();

        assert!(matches!(err, ClientError::ScannedConversion(_)));
        assert_eq!(
            err.to_string(),
            "Failed to process scanned PDF. Please try a clearer document."
        );
        assert_eq!(endpoint.uploads(), vec!["scan.pdf"]);
    }

    #[tokio::test]
    async fn test_all_pages_failing_still_succeeds() {
        let endpoint = scanned_then(|_| Ok(ExtractionResult::failure("Error processing PDF: x")));
        let pipeline = FallbackPipeline::new(endpoint, Arc::new(FakeRasterizer(Some(2))));

        let result = pipeline.run(&pdf_file()).await.unwrap();

        assert!(result.success);
        assert_eq!(result.text(), "");
        assert_eq!(result.skipped_pages, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_text_pdf_returned_without_fallback() {
        let endpoint = ScriptedEndpoint::new(|_| {
            Ok(ExtractionResult::success(
                "Direct text".to_string(),
                "scan.pdf",
                "OCR processing completed successfully",
            ))
        });
        let pipeline = FallbackPipeline::new(endpoint.clone(), Arc::new(FakeRasterizer(None)));

        let result = pipeline.run(&pdf_file()).await.unwrap();

        assert_eq!(result.text(), "Direct text");
        assert_eq!(endpoint.uploads().len(), 1);
    }

    #[tokio::test]
    async fn test_rejection_surfaces_message() {
        let endpoint =
            ScriptedEndpoint::new(|_| Ok(ExtractionResult::failure("No file uploaded")));
        let pipeline = FallbackPipeline::new(endpoint, Arc::new(FakeRasterizer(Some(1))));

        let err = pipeline.run(&pdf_file()).await.unwrap_err();
        assert_eq!(err.to_string(), "No file uploaded");

        let endpoint = ScriptedEndpoint::new(|_| Ok(ExtractionResult::failure("")));
        let pipeline = FallbackPipeline::new(endpoint, Arc::new(FakeRasterizer(Some(1))));

        let err = pipeline.run(&pdf_file()).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to process PDF");
    }

    #[tokio::test]
    async fn test_progress_events() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);

        let endpoint = scanned_then(|name| match name {
            "page-2.jpg" => Ok(ExtractionResult::failure("bad page")),
            _ => ok("text"),
        });
        let pipeline = FallbackPipeline::new(endpoint, Arc::new(FakeRasterizer(Some(2))))
            .on_event(move |event| sink.lock().unwrap().push(event.to_string()));

        pipeline.run(&pdf_file()).await.unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                "Uploading PDF...",
                "Scanned PDF detected. Converting to images for OCR...",
                "Processing page 1 of 2...",
                "Processing page 2 of 2...",
                "Skipped page 2: bad page",
            ]
        );
    }

    /// Delegates to a real client, counting requests
    struct CountingEndpoint {
        inner: HttpOcrClient,
        requests: AtomicUsize,
    }

    #[async_trait]
    impl OcrEndpoint for CountingEndpoint {
        async fn submit(&self, upload: Upload) -> Result<ExtractionResult, ClientError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            self.inner.submit(upload).await
        }
    }

    #[tokio::test]
    async fn test_scanned_pdf_end_to_end() {
        let dir = TempDir::new().unwrap();
        let state = AppState::from_parts(
            Config::default(),
            ArtifactStore::open(dir.path()).await.unwrap(),
            DocumentClassifier::new(Arc::new(MuPdfExtractor), MIN_USABLE_TEXT_CHARS),
            OcrService::with_providers(vec![Arc::new(MockProvider::text("Hi"))], "eng"),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app(state)).await.unwrap();
        });

        let endpoint = Arc::new(CountingEndpoint {
            inner: HttpOcrClient::new(&format!("http://{}", addr), Some(Duration::from_secs(30)))
                .unwrap(),
            requests: AtomicUsize::new(0),
        });

        // Direct submission answers with the scanned signal
        let pdf = PdfFile::from_bytes("scan.pdf", pdf_with_pages(&[None, None])).unwrap();
        let signal = endpoint
            .submit(Upload::pdf(&pdf.name, pdf.data.clone()))
            .await
            .unwrap();
        assert!(signal.is_scanned);
        assert_eq!(signal.message, SCANNED_PDF_DETECTED);
        endpoint.requests.store(0, Ordering::SeqCst);

        let pipeline = FallbackPipeline::new(endpoint.clone(), Arc::new(MuPdfRasterizer::default()));
        let result = pipeline.run(&pdf).await.unwrap();

        assert!(result.success);
        assert_eq!(result.text(), "\n--- Page 1 ---\nHi\n\n--- Page 2 ---\nHi\n");
        assert_eq!(result.message, SCANNED_PDF_PROCESSED);
        assert_eq!(endpoint.requests.load(Ordering::SeqCst), 3);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
