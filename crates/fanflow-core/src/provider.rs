//! Image sources for the frame sampler

use std::path::Path;

use image::{DynamicImage, Rgb, RgbImage};

use crate::Result;

/// A repeatedly callable source of frames.
///
/// Implementations may serve a static picture, a live render or a camera
/// feed. The frame source calls `next_image` at an unbounded rate, so the
/// call must be safe to repeat indefinitely.
pub trait ImageProvider: Send {
    /// Produce the current frame.
    fn next_image(&mut self) -> Result<DynamicImage>;
}

impl<F> ImageProvider for F
where
    F: FnMut() -> Result<DynamicImage> + Send,
{
    fn next_image(&mut self) -> Result<DynamicImage> {
        self()
    }
}

/// Provider backed by a single decoded image file.
pub struct StillImage {
    image: DynamicImage,
}

impl StillImage {
    /// Decode `path` once; `next_image` hands out clones.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            image: image::open(path)?,
        })
    }
}

impl From<DynamicImage> for StillImage {
    fn from(image: DynamicImage) -> Self {
        Self { image }
    }
}

impl ImageProvider for StillImage {
    fn next_image(&mut self) -> Result<DynamicImage> {
        Ok(self.image.clone())
    }
}

/// Fixed-color provider, for tests and for driving the fan without
/// content.
pub struct SolidColor {
    width: u32,
    height: u32,
    rgb: [u8; 3],
}

impl SolidColor {
    /// A `width` x `height` image filled with `rgb`.
    pub fn new(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        Self { width, height, rgb }
    }
}

impl ImageProvider for SolidColor {
    fn next_image(&mut self) -> Result<DynamicImage> {
        Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            self.width,
            self.height,
            Rgb(self.rgb),
        )))
    }
}
