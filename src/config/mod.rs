use std::env;

/// Gateway configuration for the extraction service
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Maximum upload size in bytes (default: 256 MB)
    pub max_file_size: usize,

    /// Conversion engine: "kreuzberg" or "echo" (default: "kreuzberg")
    pub converter_type: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_file_size: 256 * 1024 * 1024, // 256 MB
            converter_type: "kreuzberg".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            converter_type: env::var("CONVERTER_TYPE").unwrap_or(default.converter_type),
        }
    }

    /// Create config for development (echo engine, no extraction stack needed)
    pub fn development() -> Self {
        Self {
            max_file_size: 256 * 1024 * 1024,
            converter_type: "echo".to_string(),
        }
    }
}
