//! # Image Sources
//!
//! The rasterizer works on decoded pixels; this module is the seam to
//! whatever stores the receipt image. Decoding happens once per job and a
//! failure is reported as [`PrintError::Asset`] without retrying.

use std::path::{Path, PathBuf};

use image::{DynamicImage, imageops::FilterType};

use crate::error::PrintError;

/// Something that can produce a decoded image for a print job.
pub trait ImageSource: Send + Sync {
    /// Decode the image.
    fn load(&self) -> Result<DynamicImage, PrintError>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// An image file on disk, format detected from its contents.
#[derive(Debug, Clone)]
pub struct FileImage {
    path: PathBuf,
}

impl FileImage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ImageSource for FileImage {
    fn load(&self) -> Result<DynamicImage, PrintError> {
        let reader = image::ImageReader::open(&self.path)
            .map_err(|e| {
                PrintError::Asset(format!("Failed to open {}: {}", self.path.display(), e))
            })?
            .with_guessed_format()
            .map_err(|e| {
                PrintError::Asset(format!("Failed to read {}: {}", self.path.display(), e))
            })?;

        reader.decode().map_err(|e| {
            PrintError::Asset(format!("Failed to decode {}: {}", self.path.display(), e))
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// An encoded image held in memory (e.g. embedded with `include_bytes!`).
#[derive(Debug, Clone)]
pub struct MemoryImage {
    bytes: Vec<u8>,
}

impl MemoryImage {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl ImageSource for MemoryImage {
    fn load(&self) -> Result<DynamicImage, PrintError> {
        image::load_from_memory(&self.bytes)
            .map_err(|e| PrintError::Asset(format!("Failed to decode image: {}", e)))
    }

    fn describe(&self) -> String {
        format!("<memory: {} bytes>", self.bytes.len())
    }
}

impl ImageSource for DynamicImage {
    fn load(&self) -> Result<DynamicImage, PrintError> {
        Ok(self.clone())
    }

    fn describe(&self) -> String {
        format!("<decoded: {}x{}>", self.width(), self.height())
    }
}

/// Scale an image down so it is at most `max_width` pixels wide.
///
/// Aspect ratio is preserved. Images that already fit are returned as-is,
/// so small images keep their exact pixels.
pub fn fit_to_width(image: DynamicImage, max_width: u32) -> DynamicImage {
    if image.width() <= max_width || max_width == 0 {
        return image;
    }
    let height = ((image.height() as u64 * max_width as u64) / image.width() as u64).max(1) as u32;
    image.resize_exact(max_width, height, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(img: &RgbImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_memory_image_decodes_png() {
        let mut img = RgbImage::new(3, 2);
        img.put_pixel(1, 1, Rgb([10, 20, 30]));
        let loaded = MemoryImage::new(png_bytes(&img)).load().unwrap();
        assert_eq!((loaded.width(), loaded.height()), (3, 2));
        assert_eq!(loaded.to_rgb8().get_pixel(1, 1), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_memory_image_garbage_is_asset_error() {
        let err = MemoryImage::new(b"not an image".to_vec()).load().unwrap_err();
        assert!(matches!(err, PrintError::Asset(_)));
    }

    #[test]
    fn test_missing_file_is_asset_error() {
        let err = FileImage::new("/nonexistent/logo.png").load().unwrap_err();
        assert!(matches!(err, PrintError::Asset(_)));
    }

    #[test]
    fn test_file_image_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.bin"); // extension doesn't matter
        std::fs::write(&path, png_bytes(&RgbImage::new(4, 4))).unwrap();
        let loaded = FileImage::new(&path).load().unwrap();
        assert_eq!(loaded.width(), 4);
    }

    #[test]
    fn test_fit_to_width_leaves_small_images() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(2, 2));
        let fitted = fit_to_width(img, 384);
        assert_eq!((fitted.width(), fitted.height()), (2, 2));
    }

    #[test]
    fn test_fit_to_width_downscales() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(768, 100));
        let fitted = fit_to_width(img, 384);
        assert_eq!((fitted.width(), fitted.height()), (384, 50));
    }
}
