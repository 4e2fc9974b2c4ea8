use crate::AssetError;
use image::RgbaImage;
use image::imageops::{self, FilterType};
use std::path::Path;

/// One level of a mip chain, tightly packed RGBA8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Decoded RGBA8 texture with its full mip chain, level 0 first.
#[derive(Debug, Clone)]
pub struct TextureImage {
    pub levels: Vec<MipLevel>,
}

impl TextureImage {
    /// Decode an image file (PNG) and build its mip chain.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|source| AssetError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = decoded.to_rgba8();
        tracing::debug!(
            path = %path.display(),
            width = rgba.width(),
            height = rgba.height(),
            "decoded texture"
        );
        Ok(Self::from_rgba(rgba))
    }

    pub fn from_rgba(base: RgbaImage) -> Self {
        let mut levels = Vec::with_capacity(mip_count(base.width(), base.height()) as usize);
        let mut current = base;
        loop {
            let (width, height) = current.dimensions();
            let next = (width > 1 || height > 1).then(|| {
                imageops::resize(
                    &current,
                    (width / 2).max(1),
                    (height / 2).max(1),
                    FilterType::Triangle,
                )
            });
            levels.push(MipLevel {
                width,
                height,
                pixels: current.into_raw(),
            });
            match next {
                Some(image) => current = image,
                None => break,
            }
        }
        Self { levels }
    }

    /// Opaque 1x1 white, bound when a lesson has no texture.
    pub fn white() -> Self {
        Self {
            levels: vec![MipLevel {
                width: 1,
                height: 1,
                pixels: vec![255; 4],
            }],
        }
    }

    pub fn width(&self) -> u32 {
        self.levels[0].width
    }

    pub fn height(&self) -> u32 {
        self.levels[0].height
    }

    pub fn mip_level_count(&self) -> u32 {
        self.levels.len() as u32
    }
}

/// Number of levels down to 1x1 for the given base size.
pub fn mip_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn mip_count_for_common_sizes() {
        assert_eq!(mip_count(1, 1), 1);
        assert_eq!(mip_count(2, 2), 2);
        assert_eq!(mip_count(256, 256), 9);
        assert_eq!(mip_count(300, 20), 9);
    }

    #[test]
    fn chain_halves_down_to_one_pixel() {
        let base = RgbaImage::from_pixel(8, 2, Rgba([10, 20, 30, 255]));
        let texture = TextureImage::from_rgba(base);
        let sizes: Vec<(u32, u32)> = texture
            .levels
            .iter()
            .map(|l| (l.width, l.height))
            .collect();
        assert_eq!(sizes, vec![(8, 2), (4, 1), (2, 1), (1, 1)]);
        assert_eq!(texture.mip_level_count(), mip_count(8, 2));
        for level in &texture.levels {
            assert_eq!(level.pixels.len(), (level.width * level.height * 4) as usize);
        }
    }

    #[test]
    fn uniform_colour_survives_downsampling() {
        let base = RgbaImage::from_pixel(4, 4, Rgba([200, 100, 50, 255]));
        let texture = TextureImage::from_rgba(base);
        let last = texture.levels.last().unwrap();
        for (got, want) in last.pixels.iter().zip([200u8, 100, 50, 255]) {
            assert!(got.abs_diff(want) <= 1, "{got} vs {want}");
        }
    }

    #[test]
    fn load_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.png");
        let image = RgbaImage::from_fn(16, 16, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        image.save(&path).unwrap();

        let texture = TextureImage::load(&path).unwrap();
        assert_eq!((texture.width(), texture.height()), (16, 16));
        assert_eq!(texture.mip_level_count(), 5);
        assert_eq!(&texture.levels[0].pixels[..4], &[255, 255, 255, 255]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = TextureImage::load("does/not/exist.png").unwrap_err();
        assert!(matches!(err, AssetError::Image { .. }));
    }

    #[test]
    fn white_is_single_opaque_pixel() {
        let white = TextureImage::white();
        assert_eq!(white.mip_level_count(), 1);
        assert_eq!(white.levels[0].pixels, vec![255, 255, 255, 255]);
    }
}
