//! Image XObject resolution.
//!
//! Turns an image stream into bytes a decoder can read: JPEG and JPEG 2000
//! data pass through as stored, raw 8-bit gray/RGB/CMYK and 1-bit gray
//! samples are re-encoded as PNG, anything else is handed back raw.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Document as LopdfDocument, Object, Stream};

use super::backend::ExtractedImage;
use crate::error::{Error, Result};

/// Resolve an image stream to bytes and an extension.
pub(crate) fn resolve_image(doc: &LopdfDocument, stream: &Stream) -> Result<ExtractedImage> {
    let dict = &stream.dict;
    let filters = filter_names(dict.get(b"Filter").ok());

    match filters.as_slice() {
        [only] if only == "DCTDecode" => {
            return Ok(ExtractedImage {
                data: stream.content.clone(),
                ext: "jpeg".to_string(),
            })
        }
        [only] if only == "JPXDecode" => {
            return Ok(ExtractedImage {
                data: stream.content.clone(),
                ext: "jpx".to_string(),
            })
        }
        _ => {}
    }

    let data = if filters.is_empty() {
        stream.content.clone()
    } else {
        stream
            .decompressed_content()
            .map_err(|e| Error::ImageExtract(format!("cannot decode image stream: {}", e)))?
    };

    let width = dict_int(dict, b"Width");
    let height = dict_int(dict, b"Height");
    let is_mask = matches!(dict.get(b"ImageMask"), Ok(Object::Boolean(true)));
    let bits = if is_mask {
        Some(1)
    } else {
        dict_int(dict, b"BitsPerComponent")
    };
    let components = if is_mask {
        Some(1)
    } else {
        dict.get(b"ColorSpace")
            .ok()
            .and_then(|cs| color_components(doc, cs))
    };

    let png = match (width, height, bits, components) {
        (Some(w), Some(h), Some(bpc), Some(n)) => encode_samples(w, h, bpc, n, &data),
        _ => None,
    };

    Ok(match png {
        Some(png) => ExtractedImage {
            data: png,
            ext: "png".to_string(),
        },
        None => ExtractedImage {
            data,
            ext: "raw".to_string(),
        },
    })
}

fn filter_names(filter: Option<&Object>) -> Vec<String> {
    match filter {
        Some(Object::Name(n)) => vec![String::from_utf8_lossy(n).to_string()],
        Some(Object::Array(arr)) => arr
            .iter()
            .filter_map(|o| o.as_name_str().ok())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

fn dict_int(dict: &lopdf::Dictionary, key: &[u8]) -> Option<u32> {
    dict.get(key)
        .ok()
        .and_then(|v| v.as_i64().ok())
        .and_then(|v| u32::try_from(v).ok())
}

/// Number of colour components for the supported device spaces.
fn color_components(doc: &LopdfDocument, cs: &Object) -> Option<u32> {
    let cs = match cs {
        Object::Reference(r) => doc.get_object(*r).ok()?,
        other => other,
    };
    match cs {
        Object::Name(name) => match name.as_slice() {
            b"DeviceGray" | b"G" => Some(1),
            b"DeviceRGB" | b"RGB" => Some(3),
            b"DeviceCMYK" | b"CMYK" => Some(4),
            _ => None,
        },
        // [/ICCBased stream]: the profile's N gives the component count
        Object::Array(arr) if arr.first().and_then(|o| o.as_name_str().ok()) == Some("ICCBased") => {
            let profile = match arr.get(1)? {
                Object::Reference(r) => doc.get_object(*r).ok()?,
                other => other,
            };
            let Object::Stream(profile) = profile else {
                return None;
            };
            dict_int(&profile.dict, b"N").filter(|n| matches!(n, 1 | 3 | 4))
        }
        _ => None,
    }
}

/// Re-encode raw samples as PNG.
fn encode_samples(width: u32, height: u32, bpc: u32, components: u32, data: &[u8]) -> Option<Vec<u8>> {
    let pixels = (width as usize).checked_mul(height as usize)?;
    // Even 1-bit samples need a byte per eight pixels
    if pixels / 8 > data.len() {
        return None;
    }
    let img = match (bpc, components) {
        (8, 1) => DynamicImage::ImageLuma8(GrayImage::from_raw(
            width,
            height,
            data.get(..pixels)?.to_vec(),
        )?),
        (8, 3) => DynamicImage::ImageRgb8(RgbImage::from_raw(
            width,
            height,
            data.get(..pixels.checked_mul(3)?)?.to_vec(),
        )?),
        (8, 4) => {
            let rgb = data
                .get(..pixels.checked_mul(4)?)?
                .chunks_exact(4)
                .flat_map(|px| cmyk_to_rgb(px[0], px[1], px[2], px[3]))
                .collect();
            DynamicImage::ImageRgb8(RgbImage::from_raw(width, height, rgb)?)
        }
        (1, 1) => DynamicImage::ImageLuma8(GrayImage::from_raw(
            width,
            height,
            unpack_bits(width as usize, height as usize, data)?,
        )?),
        _ => return None,
    };

    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).ok()?;
    Some(out.into_inner())
}

fn cmyk_to_rgb(c: u8, m: u8, y: u8, k: u8) -> [u8; 3] {
    let k = 255 - k as u16;
    let channel = |v: u8| ((255 - v as u16) * k / 255) as u8;
    [channel(c), channel(m), channel(y)]
}

/// Expand 1-bit rows (each padded to a byte boundary) to 8-bit gray.
fn unpack_bits(width: usize, height: usize, data: &[u8]) -> Option<Vec<u8>> {
    let row_bytes = width.div_ceil(8);
    let rows = data.get(..row_bytes.checked_mul(height)?)?;
    let mut out = Vec::with_capacity(width * height);
    for row in rows.chunks_exact(row_bytes) {
        for x in 0..width {
            let bit = (row[x / 8] >> (7 - (x % 8))) & 1;
            out.push(if bit == 1 { 255 } else { 0 });
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn image_stream(dict: lopdf::Dictionary, data: Vec<u8>) -> Stream {
        Stream::new(dict, data)
    }

    #[test]
    fn test_jpeg_passes_through() {
        let doc = LopdfDocument::with_version("1.5");
        let stream = image_stream(
            dictionary! { "Subtype" => "Image", "Filter" => "DCTDecode" },
            vec![0xFF, 0xD8, 0xFF],
        );
        let image = resolve_image(&doc, &stream).unwrap();
        assert_eq!(image.ext, "jpeg");
        assert_eq!(image.data, vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_gray_samples_become_png() {
        let doc = LopdfDocument::with_version("1.5");
        let stream = image_stream(
            dictionary! {
                "Subtype" => "Image",
                "Width" => 2,
                "Height" => 2,
                "BitsPerComponent" => 8,
                "ColorSpace" => "DeviceGray",
            },
            vec![0, 64, 128, 255],
        );
        let image = resolve_image(&doc, &stream).unwrap();
        assert_eq!(image.ext, "png");

        let decoded = image::load_from_memory(&image.data).unwrap().to_luma8();
        assert_eq!(decoded.dimensions(), (2, 2));
        assert_eq!(decoded.get_pixel(1, 1).0, [255]);
    }

    #[test]
    fn test_unsupported_layout_stays_raw() {
        let doc = LopdfDocument::with_version("1.5");
        let stream = image_stream(
            dictionary! {
                "Subtype" => "Image",
                "Width" => 2,
                "Height" => 1,
                "BitsPerComponent" => 4,
                "ColorSpace" => "DeviceGray",
            },
            vec![0x0F],
        );
        let image = resolve_image(&doc, &stream).unwrap();
        assert_eq!(image.ext, "raw");
        assert_eq!(image.data, vec![0x0F]);
    }

    #[test]
    fn test_short_sample_data_stays_raw() {
        let doc = LopdfDocument::with_version("1.5");
        let stream = image_stream(
            dictionary! {
                "Subtype" => "Image",
                "Width" => 4,
                "Height" => 4,
                "BitsPerComponent" => 8,
                "ColorSpace" => "DeviceRGB",
            },
            vec![1, 2, 3],
        );
        assert_eq!(resolve_image(&doc, &stream).unwrap().ext, "raw");
    }

    #[test]
    fn test_huge_dimensions_stay_raw() {
        let doc = LopdfDocument::with_version("1.5");
        for color_space in ["DeviceGray", "DeviceRGB", "DeviceCMYK"] {
            let stream = image_stream(
                dictionary! {
                    "Subtype" => "Image",
                    "Width" => u32::MAX as i64,
                    "Height" => u32::MAX as i64,
                    "BitsPerComponent" => 8,
                    "ColorSpace" => color_space,
                },
                vec![0; 16],
            );
            assert_eq!(resolve_image(&doc, &stream).unwrap().ext, "raw", "{color_space}");
        }
        assert!(encode_samples(u32::MAX, u32::MAX, 8, 3, &[0; 16]).is_none());
        assert!(encode_samples(u32::MAX, 2, 1, 1, &[0; 16]).is_none());
    }

    #[test]
    fn test_unpack_bits() {
        assert_eq!(
            unpack_bits(3, 2, &[0b1010_0000, 0b0100_0000]).unwrap(),
            vec![255, 0, 255, 0, 255, 0]
        );
        assert!(unpack_bits(9, 1, &[0xFF]).is_none());
    }

    #[test]
    fn test_cmyk_conversion() {
        assert_eq!(cmyk_to_rgb(0, 0, 0, 0), [255, 255, 255]);
        assert_eq!(cmyk_to_rgb(0, 0, 0, 255), [0, 0, 0]);
        assert_eq!(cmyk_to_rgb(255, 0, 0, 0), [0, 255, 255]);
    }
}
