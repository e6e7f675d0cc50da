//! Raster image embedding
//!
//! Raster logos (PNG/JPEG) are decoded with the `image` crate and embedded
//! as DeviceRGB image XObjects, with the alpha channel split into a
//! DeviceGray SMask when present. Raster content is always embedded as RGB;
//! print CMYK conversion of raster data is an upstream production step, not
//! a document-generation concern.

use image::io::Reader as ImageReader;
use image::DynamicImage;
use pdf_writer::{Pdf, Ref};
use std::io::Cursor;

use crate::error::{EngineError, EngineResult};

/// Decode raster bytes, guessing the format from the stream.
pub fn decode_raster(data: &[u8]) -> EngineResult<DynamicImage> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| EngineError::ElementEmbed(format!("failed to detect image format: {e}")))?;
    reader
        .decode()
        .map_err(|e| EngineError::ElementEmbed(format!("failed to decode image: {e}")))
}

/// Write an image XObject (and SMask if the image has alpha) into the
/// document. `next_ref_id` is the document-wide object id counter.
pub fn write_image_xobject(
    pdf: &mut Pdf,
    image: &DynamicImage,
    image_id: Ref,
    next_ref_id: &mut i32,
) {
    let has_alpha = image.color().has_alpha();

    let (rgb, width, height, alpha) = if has_alpha {
        let rgba = image.to_rgba8();
        let (w, h) = rgba.dimensions();
        let bytes = rgba.into_raw();
        let mut rgb = Vec::with_capacity((w * h * 3) as usize);
        let mut alpha = Vec::with_capacity((w * h) as usize);
        for px in bytes.chunks_exact(4) {
            rgb.extend_from_slice(&px[..3]);
            alpha.push(px[3]);
        }
        (rgb, w, h, Some(alpha))
    } else {
        let rgb = image.to_rgb8();
        let (w, h) = rgb.dimensions();
        (rgb.into_raw(), w, h, None)
    };

    // SMask first so the image XObject can reference it
    let smask_id = alpha.map(|alpha| {
        let smask_id = Ref::new(*next_ref_id);
        *next_ref_id += 1;
        let mut smask = pdf.image_xobject(smask_id, &alpha);
        smask.width(width as i32);
        smask.height(height as i32);
        smask.color_space().device_gray();
        smask.bits_per_component(8);
        smask_id
    });

    let mut xobject = pdf.image_xobject(image_id, &rgb);
    xobject.width(width as i32);
    xobject.height(height as i32);
    xobject.color_space().device_rgb();
    xobject.bits_per_component(8);
    if let Some(smask_id) = smask_id {
        xobject.s_mask(smask_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn png_bytes(image: DynamicImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_raster_png() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([255, 0, 0])));
        let decoded = decode_raster(&png_bytes(img)).unwrap();
        assert_eq!(decoded.width(), 2);
    }

    #[test]
    fn test_decode_raster_garbage_fails() {
        assert!(decode_raster(b"definitely not an image").is_err());
    }

    #[test]
    fn test_write_image_xobject_with_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([0, 255, 0, 128])));
        let mut pdf = Pdf::new();
        let mut next_ref = 11;
        write_image_xobject(&mut pdf, &img, Ref::new(10), &mut next_ref);
        // One extra object allocated for the SMask
        assert_eq!(next_ref, 12);
        let bytes = pdf.finish();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/SMask"));
        assert!(text.contains("/DeviceRGB"));
    }

    #[test]
    fn test_write_image_xobject_opaque() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([1, 2, 3])));
        let mut pdf = Pdf::new();
        let mut next_ref = 11;
        write_image_xobject(&mut pdf, &img, Ref::new(10), &mut next_ref);
        assert_eq!(next_ref, 11);
    }
}
