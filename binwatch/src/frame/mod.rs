//! Camera frames.
//!
//! A [`Frame`] keeps both the colour raster (uploaded to the classifier) and
//! its single-channel intensity version (used for motion detection). Frames
//! are immutable: masking a region produces a new frame.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, ImageResult, Luma, Rgb, RgbImage};

use crate::region::Rect;

/// Encoding used when uploading frames to the classifier.
const UPLOAD_FORMAT: ImageFormat = ImageFormat::Jpeg;

/// A captured camera frame.
#[derive(Debug, Clone)]
pub struct Frame {
    color: RgbImage,
    gray: GrayImage,
}

impl Frame {
    /// Build a frame from any decoded image.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self {
            gray: image.to_luma8(),
            color: image.to_rgb8(),
        }
    }

    /// Build a frame from an intensity raster.
    ///
    /// The colour raster is the grey value replicated on all channels.
    pub fn from_gray(gray: GrayImage) -> Self {
        let color = RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
            let Luma([v]) = *gray.get_pixel(x, y);
            Rgb([v, v, v])
        });
        Self { color, gray }
    }

    /// Decode an encoded image (JPEG, PNG, ...).
    pub fn from_bytes(bytes: &[u8]) -> ImageResult<Self> {
        image::load_from_memory(bytes).map(Self::from_dynamic)
    }

    /// Load an image file from disk.
    pub fn open(path: impl AsRef<Path>) -> ImageResult<Self> {
        image::open(path).map(Self::from_dynamic)
    }

    pub fn width(&self) -> u32 {
        self.gray.width()
    }

    pub fn height(&self) -> u32 {
        self.gray.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.gray.dimensions()
    }

    /// Single-channel intensity raster.
    pub fn gray(&self) -> &GrayImage {
        &self.gray
    }

    /// Colour raster.
    pub fn color(&self) -> &RgbImage {
        &self.color
    }

    /// Derived frame with every pixel outside `rect` set to zero.
    ///
    /// Parts of `rect` beyond the frame edge are ignored.
    pub fn masked(&self, rect: &Rect) -> Frame {
        let color = RgbImage::from_fn(self.width(), self.height(), |x, y| {
            if rect.contains(x, y) {
                *self.color.get_pixel(x, y)
            } else {
                Rgb([0, 0, 0])
            }
        });
        let gray = GrayImage::from_fn(self.width(), self.height(), |x, y| {
            if rect.contains(x, y) {
                *self.gray.get_pixel(x, y)
            } else {
                Luma([0])
            }
        });
        Frame { color, gray }
    }

    /// Encode the colour raster as JPEG.
    pub fn to_jpeg(&self) -> ImageResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.color
            .write_to(&mut Cursor::new(&mut bytes), UPLOAD_FORMAT)?;
        Ok(bytes)
    }

    /// Write the colour raster to disk; the format follows the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> ImageResult<()> {
        self.color.save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Frame {
        Frame::from_gray(GrayImage::from_fn(width, height, |x, y| {
            Luma([((x + y) % 200 + 20) as u8])
        }))
    }

    #[test]
    fn test_from_gray_replicates_channels() {
        let frame = Frame::from_gray(GrayImage::from_pixel(4, 3, Luma([77])));
        assert_eq!(frame.dimensions(), (4, 3));
        assert_eq!(*frame.color().get_pixel(2, 1), Rgb([77, 77, 77]));
    }

    #[test]
    fn test_masked_zeroes_outside_rect() {
        let frame = gradient(20, 10);
        let rect = Rect::new(5, 10, 2, 6).unwrap();
        let masked = frame.masked(&rect);

        assert_eq!(masked.dimensions(), frame.dimensions());
        for y in 0..10 {
            for x in 0..20 {
                let expected = if rect.contains(x, y) {
                    *frame.gray().get_pixel(x, y)
                } else {
                    Luma([0])
                };
                assert_eq!(*masked.gray().get_pixel(x, y), expected);
            }
        }
        // Original untouched
        assert_ne!(*frame.gray().get_pixel(0, 0), Luma([0]));
    }

    #[test]
    fn test_jpeg_round_trip_preserves_dimensions() {
        let frame = gradient(32, 16);
        let jpeg = frame.to_jpeg().unwrap();
        assert!(jpeg.starts_with(&[0xFF, 0xD8]));

        let decoded = Frame::from_bytes(&jpeg).unwrap();
        assert_eq!(decoded.dimensions(), (32, 16));
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(Frame::from_bytes(b"not an image").is_err());
    }
}
