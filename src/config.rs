//! Configuration management for the OCR server

use std::env;
use std::path::PathBuf;

use serde::Deserialize;

use crate::extract::MIN_USABLE_TEXT_CHARS;
use crate::ocr::{OcrProvider, OcrServiceConfig};

/// Default upload limit, matching the 10 MB cap the upload form advertises
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub extract: ExtractConfig,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Directory holding in-flight artifacts
    pub dir: PathBuf,
    pub max_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    /// Minimum trimmed character count for a text layer to count as usable
    pub min_text_chars: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    pub providers: Vec<OcrProvider>,
    pub language: String,
    pub ollama_url: String,
    pub ollama_model: String,
}

impl OcrConfig {
    pub fn service_config(&self) -> OcrServiceConfig {
        OcrServiceConfig {
            providers: self.providers.clone(),
            ollama_url: self.ollama_url.clone(),
            ollama_model: self.ollama_model.clone(),
            default_language: self.language.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let ocr = OcrServiceConfig::default();
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            upload: UploadConfig {
                dir: PathBuf::from("uploads"),
                max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            extract: ExtractConfig {
                min_text_chars: MIN_USABLE_TEXT_CHARS,
            },
            ocr: OcrConfig {
                providers: ocr.providers,
                language: ocr.default_language,
                ollama_url: ocr.ollama_url,
                ollama_model: ocr.ollama_model,
            },
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        Ok(Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or(defaults.server.host),
                port: parse_var("PORT", defaults.server.port)?,
            },
            upload: UploadConfig {
                dir: env::var("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.upload.dir),
                max_bytes: parse_var("MAX_UPLOAD_BYTES", defaults.upload.max_bytes)?,
            },
            extract: ExtractConfig {
                min_text_chars: parse_var("MIN_TEXT_CHARS", defaults.extract.min_text_chars)?,
            },
            ocr: OcrConfig {
                providers: match env::var("OCR_PROVIDERS") {
                    Ok(list) => parse_providers(&list)?,
                    Err(_) => defaults.ocr.providers,
                },
                language: env::var("OCR_LANGUAGE").unwrap_or(defaults.ocr.language),
                ollama_url: env::var("OLLAMA_URL").unwrap_or(defaults.ocr.ollama_url),
                ollama_model: env::var("OLLAMA_MODEL").unwrap_or(defaults.ocr.ollama_model),
            },
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        Err(_) => Ok(default),
    }
}

/// Parse a comma-separated provider list such as `tesseract,ollama`
fn parse_providers(list: &str) -> Result<Vec<OcrProvider>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|name| match name.to_lowercase().as_str() {
            "tesseract" => Ok(OcrProvider::Tesseract),
            "ollama" => Ok(OcrProvider::Ollama),
            _ => Err(ConfigError::InvalidValue {
                name: "OCR_PROVIDERS",
                value: name.to_string(),
            }),
        })
        .collect()
}
