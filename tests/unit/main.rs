//! Unit tests mirroring the `src/` layout, one file per source file

mod io;

/// Shared fixtures: in-memory decoding and small synthetic catalogs
mod support {
    use image::{ImageError, Rgba, RgbaImage};
    use pixelset::catalog::{Source, SourceImage};
    use pixelset::io::error::{DatasetError, Result};
    use pixelset::io::image::{ImageDecoder, apply_matte};
    use pixelset::spatial::TilingConfig;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    pub const CACHE_ROOT: &str = "/cache";

    /// Decoder serving images from memory; unknown paths fail to decode
    #[derive(Default)]
    pub struct MemoryDecoder {
        images: HashMap<PathBuf, RgbaImage>,
    }

    impl MemoryDecoder {
        pub fn with_image(mut self, path: PathBuf, image: RgbaImage) -> Self {
            self.images.insert(path, image);
            self
        }
    }

    impl ImageDecoder for MemoryDecoder {
        fn decode(&self, path: &Path, matte: &[[u8; 3]]) -> Result<RgbaImage> {
            let mut image = self.images.get(path).cloned().ok_or_else(|| {
                DatasetError::ImageLoad {
                    path: path.to_path_buf(),
                    source: ImageError::IoError(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "not in memory",
                    )),
                }
            })?;
            apply_matte(&mut image, matte);
            Ok(image)
        }
    }

    /// Image made of `block` x `block` squares, each with its own color
    pub fn distinct_blocks(width: u32, height: u32, block: u32, seed: u8) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            let bx = (x / block) as u8;
            let by = (y / block) as u8;
            Rgba([
                bx.wrapping_mul(17).wrapping_add(1),
                by.wrapping_mul(17).wrapping_add(1),
                seed,
                255,
            ])
        })
    }

    /// Single-color image
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(color))
    }

    /// Square tiling with no offset or spacing
    pub fn square_tiling(patch: i32) -> TilingConfig {
        TilingConfig {
            patch_size_x: patch,
            patch_size_y: patch,
            ..TilingConfig::default()
        }
    }

    /// Source below [`CACHE_ROOT`] with one image per `(name, tilings)` entry
    pub fn source_with(url: &str, images: Vec<(&str, Vec<TilingConfig>)>) -> Source {
        let root = Path::new(CACHE_ROOT);
        let mut source = Source::new(url, root);
        source.images = images
            .into_iter()
            .map(|(name, tilings)| {
                SourceImage::new(source.folder.join(name), root, &source.folder)
                    .with_tilings(tilings)
            })
            .collect();
        source
    }

    /// Path a [`source_with`] image is decoded from
    pub fn image_path(url: &str, name: &str) -> PathBuf {
        Source::new(url, Path::new(CACHE_ROOT)).folder.join(name)
    }
}
