//! Source image decoding, matte transparency and patch resampling

use crate::io::error::{DatasetError, Result};
use crate::spatial::lattice::PixelRect;
use image::imageops::{self, FilterType};
use image::{ImageBuffer, RgbaImage};
use std::path::Path;

/// Decoding collaborator used by the dataset compiler
///
/// Buffers are always normalized to 8-bit RGBA so that identical pixels hash
/// identically regardless of the source encoding.
pub trait ImageDecoder {
    /// Decode an image, zeroing the alpha of pixels matching a matte color
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be read or decoded
    fn decode(&self, path: &Path, matte: &[[u8; 3]]) -> Result<RgbaImage>;

    /// Cut a tile out of a decoded image and scale it to `target` x `target`
    fn crop_and_resample(&self, image: &RgbaImage, rect: PixelRect, target: u32) -> RgbaImage {
        crop_and_resample(image, rect, target)
    }
}

/// Decodes images from the file system with the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct FileDecoder;

impl ImageDecoder for FileDecoder {
    fn decode(&self, path: &Path, matte: &[[u8; 3]]) -> Result<RgbaImage> {
        let img = image::open(path).map_err(|e| DatasetError::ImageLoad {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut rgba = img.to_rgba8();
        apply_matte(&mut rgba, matte);
        Ok(rgba)
    }
}

/// Force alpha to 0 on every pixel whose RGB equals a matte color
pub fn apply_matte(image: &mut RgbaImage, matte: &[[u8; 3]]) {
    if matte.is_empty() {
        return;
    }

    for pixel in image.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        if matte.contains(&[r, g, b]) {
            pixel.0 = [r, g, b, 0];
        }
    }
}

/// Nearest-neighbour crop and resize
///
/// Crops already at the target size are copied unchanged.
pub fn crop_and_resample(image: &RgbaImage, rect: PixelRect, target: u32) -> RgbaImage {
    let crop = imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image();
    if crop.width() == target && crop.height() == target {
        crop
    } else {
        imageops::resize(&crop, target, target, FilterType::Nearest)
    }
}

/// Save an RGBA buffer, creating parent directories
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the image
/// cannot be encoded and written
pub fn save_rgba(image: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| DatasetError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }

    image.save(path).map_err(|e| DatasetError::ImageExport {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Transparent RGBA canvas
pub fn blank_canvas(width: u32, height: u32) -> RgbaImage {
    ImageBuffer::new(width, height)
}
