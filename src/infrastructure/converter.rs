use crate::config::GatewayConfig;
use crate::services::converter::DocumentConverter;
use anyhow::{Result, bail};
use std::sync::Arc;
use tracing::info;

/// Build the conversion engine and run its startup check.
///
/// A failed check aborts startup rather than leaving the gateway serving
/// with an engine that cannot convert anything.
pub async fn setup_converter(config: &GatewayConfig) -> Result<Arc<dyn DocumentConverter>> {
    let converter = crate::services::converter::create_converter(&config.converter_type);

    if !converter.health_check().await {
        bail!(
            "Conversion engine '{}' failed its startup check",
            converter.name()
        );
    }

    info!("📄 Conversion engine '{}' ready", converter.name());

    Ok(converter.into())
}
