//! Preview image generation for thumbnails.
//!
//! The thumbnail cache treats preview generation as an opaque async
//! function from a path to encoded image bytes. [`PreviewGenerator`] is
//! that seam; [`ImagePreviewGenerator`] is the default implementation,
//! decoding with the `image` crate and re-encoding a downscaled PNG.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use image::GenericImageView;

use crate::error::{CoreError, CoreResult};

/// Default edge length of generated thumbnails, in pixels (96pt at 2x).
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 192;

/// Image file extensions the default generator can decode.
const IMAGE_EXTENSIONS: &[&str] = &["png", "gif", "bmp", "webp", "ico", "tiff", "tif"];

/// An encoded preview image.
///
/// The bytes are shared, so clones handed to the presentation layer are
/// cheap. The core never inspects them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub bytes: Arc<[u8]>,
}

/// Produces preview images for files.
#[async_trait]
pub trait PreviewGenerator: Send + Sync {
    /// Generates a preview of `path` that fits in `target_size` x `target_size`.
    ///
    /// # Errors
    ///
    /// Any failure (unsupported format, decode error, file gone) means the
    /// item simply has no thumbnail.
    async fn generate_preview(&self, path: &Path, target_size: u32) -> CoreResult<Thumbnail>;
}

/// Decodes still images with the `image` crate on a blocking thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImagePreviewGenerator;

#[async_trait]
impl PreviewGenerator for ImagePreviewGenerator {
    async fn generate_preview(&self, path: &Path, target_size: u32) -> CoreResult<Thumbnail> {
        if !is_image(path) {
            return Err(CoreError::Preview(format!(
                "unsupported format: {}",
                path.display()
            )));
        }
        let owned: PathBuf = path.to_path_buf();
        tokio::task::spawn_blocking(move || render_thumbnail(&owned, target_size))
            .await
            .map_err(|e| CoreError::Preview(format!("preview task failed: {e}")))?
    }
}

/// Returns `true` if the path has an extension the default generator decodes.
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn render_thumbnail(path: &Path, target_size: u32) -> CoreResult<Thumbnail> {
    if !path.is_file() {
        return Err(CoreError::NotFound(path.to_path_buf()));
    }

    let img = image::open(path).map_err(|e| CoreError::Preview(format!("image error: {e}")))?;
    let scaled = img.thumbnail(target_size, target_size);
    let (width, height) = scaled.dimensions();

    let mut buf = Cursor::new(Vec::new());
    scaled
        .write_to(&mut buf, image::ImageFormat::Png)
        .map_err(|e| CoreError::Preview(format!("encode error: {e}")))?;

    Ok(Thumbnail {
        width,
        height,
        bytes: buf.into_inner().into(),
    })
}
