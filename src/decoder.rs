//! Turns raw file contents into bitmaps the classifier can read.

use image::DynamicImage;

use crate::error::DecodeError;
use crate::model::ImageFile;

/// Decoded bitmap handed to the classifier.
pub type DecodedImage = DynamicImage;

/// Decodes an [`ImageFile`] into a [`DecodedImage`].
pub trait ImageDecoder {
    /// Decode a single file.
    fn decode(&self, file: &ImageFile) -> Result<DecodedImage, DecodeError>;
}

/// Decoder backed by the `image` crate.
///
/// The format is detected from the file contents, not the name, so a
/// mislabelled PNG still decodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, file: &ImageFile) -> Result<DecodedImage, DecodeError> {
        if !file.is_image() {
            return Err(DecodeError::NotAnImage {
                name: file.name().to_string(),
                mime: file.mime().to_string(),
            });
        }

        let img = image::load_from_memory(file.data()).map_err(|source| DecodeError::Image {
            name: file.name().to_string(),
            source,
        })?;

        log::debug!(
            "Decoded '{}' ({}x{}, {} bytes)",
            file.name(),
            img.width(),
            img.height(),
            file.size()
        );

        Ok(img)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    /// Encode a solid-colour PNG in memory.
    pub(crate) fn solid_png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb(color));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode png");
        bytes
    }

    #[test]
    fn test_decode_png() {
        let file = ImageFile::from_bytes("red.png", solid_png(4, 3, [255, 0, 0]));
        let img = ImageCrateDecoder.decode(&file).expect("decode");
        assert_eq!((img.width(), img.height()), (4, 3));
    }

    #[test]
    fn test_decode_rejects_non_image_mime() {
        let file = ImageFile::from_bytes("notes.txt", b"hello".to_vec());
        let err = ImageCrateDecoder.decode(&file).unwrap_err();
        assert!(matches!(err, DecodeError::NotAnImage { .. }));
    }

    #[test]
    fn test_decode_corrupt_bytes() {
        let file = ImageFile::from_bytes("broken.jpg", vec![0xFF, 0xD8, 0x00, 0x01]);
        let err = ImageCrateDecoder.decode(&file).unwrap_err();
        assert!(matches!(err, DecodeError::Image { .. }));
    }
}
