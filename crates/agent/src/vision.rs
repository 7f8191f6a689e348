//! Image analysis through a vision model.
//!
//! An image is decoded, shrunk so its longest side fits `max_dimension`,
//! re-encoded as JPEG and sent base64-encoded to the generate endpoint in a
//! single request.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use neura_config::VisionConfig;
use neura_core::error::ProviderError;
use neura_core::provider::{Provider, VisionRequest};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

/// Returned instead of a description when the image path does not exist.
pub const IMAGE_NOT_FOUND: &str = "Erro: Arquivo de imagem não encontrado.";

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("image file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("could not decode image: {0}")]
    Decode(String),

    #[error("could not encode image: {0}")]
    Encode(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Vision model and preprocessing parameters.
#[derive(Debug, Clone)]
pub struct VisionSettings {
    pub model: String,
    pub max_dimension: u32,
    pub jpeg_quality: u8,
}

impl From<&VisionConfig> for VisionSettings {
    fn from(config: &VisionConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_dimension: config.max_dimension,
            jpeg_quality: config.jpeg_quality,
        }
    }
}

/// Sends preprocessed images to the vision endpoint.
pub struct VisionDispatcher {
    provider: Option<Arc<dyn Provider>>,
    settings: VisionSettings,
}

impl VisionDispatcher {
    pub fn new(provider: Option<Arc<dyn Provider>>, settings: VisionSettings) -> Self {
        Self { provider, settings }
    }

    /// Describe the image at `path`, returning the trimmed model output.
    ///
    /// A missing file fails before any preprocessing or network traffic.
    pub async fn describe(&self, path: &Path, prompt: &str) -> Result<String, VisionError> {
        if !path.exists() {
            return Err(VisionError::FileNotFound(path.to_path_buf()));
        }

        let payload = encode_image_file(
            path,
            self.settings.max_dimension,
            self.settings.jpeg_quality,
        )
        .await?;

        let provider = self.provider.as_ref().ok_or_else(|| {
            ProviderError::NotConfigured("inference server client is unavailable".into())
        })?;

        debug!(
            model = %self.settings.model,
            path = %path.display(),
            bytes = payload.len(),
            "Dispatching image to vision model"
        );

        let text = provider
            .describe_image(VisionRequest {
                model: self.settings.model.clone(),
                prompt: prompt.to_string(),
                images: vec![payload],
                temperature: 0.0,
            })
            .await?;

        Ok(text.trim().to_string())
    }

    /// Like [`describe`](Self::describe), but every failure becomes a readable string.
    pub async fn analyze(&self, path: &Path, prompt: &str) -> String {
        match self.describe(path, prompt).await {
            Ok(text) => text,
            Err(e) => render_error(&e),
        }
    }
}

/// User-facing text for a failed analysis. Failures other than a missing file are logged.
pub fn render_error(e: &VisionError) -> String {
    match e {
        VisionError::FileNotFound(_) => IMAGE_NOT_FOUND.to_string(),
        other => {
            error!("Image analysis failed: {other}");
            format!("Error: {other}")
        }
    }
}

/// Read, shrink and JPEG-encode an image file, returning standard base64.
///
/// Decoding and resizing run on the blocking pool.
pub async fn encode_image_file(
    path: &Path,
    max_dimension: u32,
    quality: u8,
) -> Result<String, VisionError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            VisionError::FileNotFound(path.to_path_buf())
        } else {
            VisionError::Decode(format!("{}: {e}", path.display()))
        }
    })?;

    let jpeg = tokio::task::spawn_blocking(move || shrink_to_jpeg(&bytes, max_dimension, quality))
        .await
        .map_err(|e| VisionError::Encode(format!("image worker failed: {e}")))??;

    Ok(STANDARD.encode(jpeg))
}

/// Decode any supported format, fit the longest side into `max_dimension`
/// (never upscaling), and encode as RGB JPEG.
pub fn shrink_to_jpeg(bytes: &[u8], max_dimension: u32, quality: u8) -> Result<Vec<u8>, VisionError> {
    let mut img = image::load_from_memory(bytes).map_err(|e| VisionError::Decode(e.to_string()))?;

    if img.width() > max_dimension || img.height() > max_dimension {
        img = img.thumbnail(max_dimension, max_dimension);
    }

    let rgb = img.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(&rgb)
        .map_err(|e| VisionError::Encode(e.to_string()))?;

    Ok(out)
}
