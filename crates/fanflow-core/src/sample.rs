//! Sample maps: how a source image becomes one frame of fan pixels

use image::imageops::{self, FilterType};
use image::DynamicImage;

use crate::{CoreError, Result};

/// One sampled frame: packed RGB triplets.
pub type PixelBuffer = Vec<u8>;

/// Static sampling topology, fetched from the device once at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleMap {
    /// One fractional `(x, y)` image coordinate per physical LED
    /// position, in the device's pixel order. Coordinates are in
    /// `0.0..=1.0` and sampled with bilinear interpolation.
    Concentric { coords: Vec<(f32, f32)> },

    /// A virtual screen resolution; the image is resized to it and
    /// serialized row-major.
    Cartesian { width: u32, height: u32 },
}

impl SampleMap {
    /// Byte length of a sampled frame (3 bytes per pixel).
    pub fn frame_len(&self) -> usize {
        match self {
            SampleMap::Concentric { coords } => coords.len() * 3,
            SampleMap::Cartesian { width, height } => *width as usize * *height as usize * 3,
        }
    }

    /// Sample `image` into one complete frame.
    pub fn sample(&self, image: &DynamicImage) -> Result<PixelBuffer> {
        match self {
            SampleMap::Concentric { coords } => {
                let mut frame = Vec::with_capacity(coords.len() * 3);
                for &(x, y) in coords {
                    let pixel = imageops::sample_bilinear(image, x, y).ok_or_else(|| {
                        CoreError::SampleError(format!("cannot sample image at ({x}, {y})"))
                    })?;
                    frame.extend_from_slice(&pixel.0[..3]);
                }
                Ok(frame)
            }
            SampleMap::Cartesian { width, height } => Ok(image
                .resize_exact(*width, *height, FilterType::CatmullRom)
                .to_rgb8()
                .into_raw()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb)))
    }

    #[test]
    fn test_concentric_samples_in_map_order() {
        let map = SampleMap::Concentric {
            coords: vec![(0.0, 0.0), (1.0, 0.0), (0.5, 0.5), (1.0, 1.0)],
        };
        let frame = map.sample(&solid(16, 16, [10, 200, 30])).unwrap();

        assert_eq!(frame.len(), map.frame_len());
        assert_eq!(frame, [10, 200, 30].repeat(4));
    }

    #[test]
    fn test_concentric_interpolates_between_pixels() {
        let mut image = RgbImage::new(2, 1);
        image.put_pixel(0, 0, Rgb([0, 0, 0]));
        image.put_pixel(1, 0, Rgb([200, 100, 50]));
        let map = SampleMap::Concentric {
            coords: vec![(0.5, 0.0)],
        };

        let frame = map.sample(&DynamicImage::ImageRgb8(image)).unwrap();
        assert_eq!(frame, vec![100, 50, 25]);
    }

    #[test]
    fn test_concentric_rejects_out_of_range_coordinate() {
        let map = SampleMap::Concentric {
            coords: vec![(1.5, 0.0)],
        };
        assert!(map.sample(&solid(4, 4, [0, 0, 0])).is_err());
    }

    #[test]
    fn test_cartesian_resizes_row_major() {
        let map = SampleMap::Cartesian {
            width: 6,
            height: 4,
        };
        let frame = map.sample(&solid(32, 32, [9, 8, 7])).unwrap();

        assert_eq!(frame.len(), 6 * 4 * 3);
        assert_eq!(frame.len(), map.frame_len());
        assert_eq!(&frame[..3], &[9, 8, 7]);
        assert_eq!(&frame[frame.len() - 3..], &[9, 8, 7]);
    }
}
