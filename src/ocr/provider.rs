//! OCR Providers
//!
//! Defines the provider trait and implementations for different OCR backends.

use std::io::Write;

use async_trait::async_trait;
use tokio::process::Command;

use super::types::{OcrError, OcrProgress, OcrProvider, OcrResult, ProgressFn};

/// OCR provider trait
#[async_trait]
pub trait OcrProviderTrait: Send + Sync {
    /// Get the provider type
    fn provider_type(&self) -> OcrProvider;

    /// Check if the provider is available
    async fn is_available(&self) -> bool;

    /// Perform OCR on an image, reporting progress through `progress`
    async fn recognize(
        &self,
        image_data: &[u8],
        language: &str,
        progress: &ProgressFn,
    ) -> Result<OcrResult, OcrError>;
}

/// Tesseract OCR provider, driving the `tesseract` binary on PATH
pub struct TesseractProvider {
    binary: String,
}

impl TesseractProvider {
    pub fn new() -> Self {
        Self {
            binary: "tesseract".to_string(),
        }
    }

    pub fn with_binary(binary: &str) -> Self {
        Self {
            binary: binary.to_string(),
        }
    }
}

impl Default for TesseractProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OcrProviderTrait for TesseractProvider {
    fn provider_type(&self) -> OcrProvider {
        OcrProvider::Tesseract
    }

    async fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    async fn recognize(
        &self,
        image_data: &[u8],
        language: &str,
        progress: &ProgressFn,
    ) -> Result<OcrResult, OcrError> {
        progress(OcrProgress::new(OcrProgress::LOADING, 0.0));

        // Tesseract only reads images from disk; the file is removed on drop
        let mut input = tempfile::Builder::new()
            .prefix("ocr-input-")
            .tempfile()
            .map_err(|e| OcrError::ProcessingError(format!("Failed to create temp file: {}", e)))?;
        input
            .write_all(image_data)
            .map_err(|e| OcrError::ProcessingError(format!("Failed to write temp file: {}", e)))?;

        progress(OcrProgress::new(OcrProgress::LOADING, 1.0));
        progress(OcrProgress::new(OcrProgress::RECOGNIZING, 0.0));

        let output = Command::new(&self.binary)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .arg("--oem")
            .arg("3")
            .arg("--psm")
            .arg("3")
            .output()
            .await
            .map_err(|e| OcrError::ProcessingError(format!("Failed to run tesseract: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::ProcessingError(format!(
                "Tesseract failed: {}",
                stderr.trim()
            )));
        }

        progress(OcrProgress::new(OcrProgress::RECOGNIZING, 1.0));

        Ok(OcrResult {
            text: String::from_utf8_lossy(&output.stdout).into_owned(),
            confidence: 80.0, // the plain-text output mode carries no confidence
            provider: OcrProvider::Tesseract,
        })
    }
}

/// Ollama vision model provider
pub struct OllamaProvider {
    client: reqwest::Client,
    /// Ollama API URL
    base_url: String,
    /// Model name (e.g., "llava", "bakllava")
    model: String,
}

impl OllamaProvider {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    pub fn default_url() -> Self {
        Self::new("http://localhost:11434", "llava")
    }
}

#[async_trait]
impl OcrProviderTrait for OllamaProvider {
    fn provider_type(&self) -> OcrProvider {
        OcrProvider::Ollama
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn recognize(
        &self,
        image_data: &[u8],
        language: &str,
        progress: &ProgressFn,
    ) -> Result<OcrResult, OcrError> {
        use base64::Engine;

        let url = format!("{}/api/generate", self.base_url);
        let image_base64 = base64::engine::general_purpose::STANDARD.encode(image_data);

        let prompt = format!(
            "Extract all text from this image exactly as written. The text is in {}. \
             Return only the extracted text, nothing else.",
            language
        );

        let request = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "images": [image_base64],
            "stream": false
        });

        progress(OcrProgress::new(OcrProgress::RECOGNIZING, 0.0));

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| OcrError::ApiError(format!("Failed to call Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::ApiError(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| OcrError::ApiError(format!("Failed to parse response: {}", e)))?;

        progress(OcrProgress::new(OcrProgress::RECOGNIZING, 1.0));

        let text = result["response"].as_str().unwrap_or("").trim().to_string();

        Ok(OcrResult {
            text,
            confidence: 75.0, // LLMs don't provide confidence scores
            provider: OcrProvider::Ollama,
        })
    }
}

/// Mock provider for testing
#[cfg(test)]
pub struct MockProvider {
    pub response: Result<String, String>,
    pub available: bool,
    pub provider: OcrProvider,
}

#[cfg(test)]
impl MockProvider {
    pub fn text(text: &str) -> Self {
        Self {
            response: Ok(text.to_string()),
            available: true,
            provider: OcrProvider::Tesseract,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            available: true,
            provider: OcrProvider::Tesseract,
        }
    }
}

#[cfg(test)]
#[async_trait]
impl OcrProviderTrait for MockProvider {
    fn provider_type(&self) -> OcrProvider {
        self.provider
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn recognize(
        &self,
        _image_data: &[u8],
        _language: &str,
        progress: &ProgressFn,
    ) -> Result<OcrResult, OcrError> {
        progress(OcrProgress::new(OcrProgress::RECOGNIZING, 1.0));
        match &self.response {
            Ok(text) => Ok(OcrResult {
                text: text.clone(),
                confidence: 90.0,
                provider: self.provider,
            }),
            Err(message) => Err(OcrError::ProcessingError(message.clone())),
        }
    }
}
