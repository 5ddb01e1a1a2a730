use async_trait::async_trait;
use kreuzberg::{ExtractionConfig, KreuzbergError, extract_bytes};
use thiserror::Error;

/// Extracted document content, rendered to text
#[derive(Debug, Clone)]
pub struct ConversionResult {
    /// Text content produced by the engine
    pub content: String,
    /// Media type the engine resolved the payload to
    pub media_type: String,
}

/// Failures the conversion engine can signal
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The engine does not recognize the input format
    #[error("{0}")]
    UnsupportedFormat(String),
    /// The engine recognized the format but failed to process it
    #[error("{0}")]
    ConversionFailed(String),
    /// Anything else going wrong on the engine side (I/O, panicked task)
    #[error("{0}")]
    Other(String),
}

/// Trait for document conversion engines.
///
/// Implementations must be safe for concurrent shared use: one instance is
/// built at startup and every request borrows it. Calls are awaited with no
/// gateway-imposed timeout.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    /// Convert a fully-buffered payload to text. The name hint feeds
    /// media-type sniffing only and is never trusted for parser selection.
    async fn convert(
        &self,
        payload: &[u8],
        name_hint: &str,
    ) -> Result<ConversionResult, ConvertError>;

    /// Check if the engine is usable
    async fn health_check(&self) -> bool;

    fn name(&self) -> &'static str;
}

/// Production engine backed by the kreuzberg extraction framework.
///
/// Kreuzberg wants an explicit media type, so the payload is sniffed first:
/// magic bytes, then the name hint's extension, then a plain-text heuristic.
/// Unrecognizable bytes go in as `application/octet-stream`, which the engine
/// rejects as unsupported.
pub struct KreuzbergConverter {
    config: ExtractionConfig,
}

impl KreuzbergConverter {
    pub fn new() -> Self {
        Self {
            config: ExtractionConfig::default(),
        }
    }
}

impl Default for KreuzbergConverter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentConverter for KreuzbergConverter {
    async fn convert(
        &self,
        payload: &[u8],
        name_hint: &str,
    ) -> Result<ConversionResult, ConvertError> {
        let media_type = detect_media_type(payload, name_hint);
        tracing::debug!("Detected media type '{}' for '{}'", media_type, name_hint);

        let result = extract_bytes(payload, &media_type, &self.config)
            .await
            .map_err(|e| match e {
                KreuzbergError::UnsupportedFormat(msg) => ConvertError::UnsupportedFormat(msg),
                KreuzbergError::Io(e) => ConvertError::Other(e.to_string()),
                other => ConvertError::ConversionFailed(other.to_string()),
            })?;

        // The engine hands back a Cow mime type; own it at the seam boundary
        Ok(ConversionResult {
            content: result.content,
            media_type: result.mime_type.into_owned(),
        })
    }

    async fn health_check(&self) -> bool {
        extract_bytes(b"health check", mime::TEXT_PLAIN.essence_str(), &self.config)
            .await
            .is_ok()
    }

    fn name(&self) -> &'static str {
        "kreuzberg"
    }
}

/// Echo engine for development/testing: returns the payload as lossy UTF-8
pub struct EchoConverter;

#[async_trait]
impl DocumentConverter for EchoConverter {
    async fn convert(
        &self,
        payload: &[u8],
        _name_hint: &str,
    ) -> Result<ConversionResult, ConvertError> {
        tracing::warn!("EchoConverter: returning payload verbatim (development mode)");
        Ok(ConversionResult {
            content: String::from_utf8_lossy(payload).into_owned(),
            media_type: mime::TEXT_PLAIN.essence_str().to_string(),
        })
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "echo"
    }
}

/// Factory function to create the appropriate engine based on config
pub fn create_converter(converter_type: &str) -> Box<dyn DocumentConverter> {
    match converter_type.to_lowercase().as_str() {
        "kreuzberg" => Box::new(KreuzbergConverter::new()),
        "echo" | "none" | "disabled" => Box::new(EchoConverter),
        _ => {
            tracing::warn!(
                "Unknown converter type '{}', using the kreuzberg engine",
                converter_type
            );
            Box::new(KreuzbergConverter::new())
        }
    }
}

/// Resolve a media type from payload bytes and the sanitized name hint.
///
/// The client's own content-type header never reaches this decision.
fn detect_media_type(payload: &[u8], name_hint: &str) -> String {
    if let Some(kind) = infer::get(payload) {
        return kind.mime_type().to_string();
    }

    if let Some(guess) = mime_guess::from_path(name_hint).first() {
        return guess.essence_str().to_string();
    }

    if looks_like_text(payload) {
        return mime::TEXT_PLAIN.essence_str().to_string();
    }

    mime::APPLICATION_OCTET_STREAM.essence_str().to_string()
}

fn looks_like_text(payload: &[u8]) -> bool {
    let sample = &payload[..payload.len().min(512)];

    if sample.contains(&0) {
        return false;
    }

    match std::str::from_utf8(sample) {
        Ok(_) => true,
        // A multibyte char cut off at the sample edge is still text
        Err(e) => e.error_len().is_none(),
    }
}
