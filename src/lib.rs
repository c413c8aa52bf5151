//! PDF OCR
//!
//! Text extraction for PDFs with an OCR fallback for scanned documents.
//!
//! # Modules
//!
//! - `routes`, `state`, `artifact`, `error`: the upload server
//! - `extract`: text layer extraction and scanned-document classification
//! - `ocr`: OCR engines for page images
//! - `client`: whole-document submission and page-image fallback
//! - `pdf`: MuPDF access shared by both sides

pub mod artifact;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod ocr;
pub mod pdf;
pub mod routes;
pub mod state;
