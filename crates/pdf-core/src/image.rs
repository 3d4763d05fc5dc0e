//! Image handling for PDF documents

use crate::{PdfError, Result};
use image::{DynamicImage, GenericImageView};
use lopdf::{Dictionary, Object, Stream};

impl From<image::ImageError> for PdfError {
    fn from(err: image::ImageError) -> Self {
        PdfError::ImageError(err.to_string())
    }
}

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Detected image format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

/// Image scaling mode for `insert_image_scaled`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageScaleMode {
    /// Stretch to exact dimensions, ignoring aspect ratio
    #[default]
    Stretch,
    /// Scale proportionally based on width, auto-calculate height
    FitWidth,
    /// Scale proportionally based on height, auto-calculate width
    FitHeight,
    /// Fit within bounding box, preserving aspect ratio
    FitBox,
}

/// Calculate display dimensions based on scaling mode
///
/// # Arguments
/// * `original_width` - Original image width in pixels
/// * `original_height` - Original image height in pixels
/// * `target_width` - Target width in points
/// * `target_height` - Target height in points
/// * `mode` - Scaling mode
///
/// # Returns
/// (actual_width, actual_height) in points
pub fn calculate_scaled_dimensions(
    original_width: u32,
    original_height: u32,
    target_width: f64,
    target_height: f64,
    mode: ImageScaleMode,
) -> (f64, f64) {
    if original_width == 0 || original_height == 0 {
        return (target_width, target_height);
    }

    let (w, h) = (f64::from(original_width), f64::from(original_height));
    match mode {
        ImageScaleMode::Stretch => (target_width, target_height),
        ImageScaleMode::FitWidth => (target_width, target_width * h / w),
        ImageScaleMode::FitHeight => (target_height * w / h, target_height),
        ImageScaleMode::FitBox => {
            let scale = (target_width / w).min(target_height / h);
            (w * scale, h * scale)
        }
    }
}

/// Detect image format from magic bytes
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Ok(ImageFormat::Jpeg);
    }
    if data.starts_with(&PNG_SIGNATURE) {
        return Ok(ImageFormat::Png);
    }
    Err(PdfError::ImageError(
        "Unknown image format (expected JPEG or PNG)".to_string(),
    ))
}

/// Frame header values read from a JPEG SOF segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct JpegInfo {
    width: u32,
    height: u32,
    components: u8,
}

/// Walk JPEG segments up to the first start-of-frame marker
fn read_jpeg_info(data: &[u8]) -> Result<JpegInfo> {
    let mut i = 2;
    while i + 9 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];
        // SOF0..SOF15 except DHT, JPG and DAC
        if (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
            return Ok(JpegInfo {
                height: u32::from(u16::from_be_bytes([data[i + 5], data[i + 6]])),
                width: u32::from(u16::from_be_bytes([data[i + 7], data[i + 8]])),
                components: data[i + 9],
            });
        }

        let length = usize::from(u16::from_be_bytes([data[i + 2], data[i + 3]]));
        if length < 2 {
            break;
        }
        i += 2 + length;
    }

    Err(PdfError::ImageError("Could not parse JPEG header".to_string()))
}

/// Image XObject for PDF embedding
#[derive(Debug, Clone)]
pub(crate) struct ImageXObject {
    pub width: u32,
    pub height: u32,
    /// "DeviceRGB", "DeviceGray" or "DeviceCMYK"
    pub color_space: &'static str,
    /// "DCTDecode" for JPEG passthrough, "FlateDecode" for decoded pixels
    pub filter: &'static str,
    /// Compressed sample data
    pub data: Vec<u8>,
}

impl ImageXObject {
    /// Create an XObject from JPEG or PNG bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        match detect_format(data)? {
            ImageFormat::Jpeg => Self::from_jpeg(data),
            ImageFormat::Png => Self::from_png(data),
        }
    }

    /// JPEG data is embedded as-is with DCTDecode
    pub fn from_jpeg(data: &[u8]) -> Result<Self> {
        let info = read_jpeg_info(data)?;
        let color_space = match info.components {
            1 => "DeviceGray",
            4 => "DeviceCMYK",
            _ => "DeviceRGB",
        };

        Ok(Self {
            width: info.width,
            height: info.height,
            color_space,
            filter: "DCTDecode",
            data: data.to_vec(),
        })
    }

    /// PNG data is decoded, flattened onto white and re-compressed
    pub fn from_png(data: &[u8]) -> Result<Self> {
        let image = image::load_from_memory_with_format(data, image::ImageFormat::Png)?;
        let (width, height) = image.dimensions();
        let (samples, color_space) = flatten_on_white(&image);

        Ok(Self {
            width,
            height,
            color_space,
            filter: "FlateDecode",
            data: crate::deflate(&samples)?,
        })
    }

    /// Convert to lopdf Stream object
    pub fn to_pdf_stream(&self) -> Stream {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        dict.set("Width", i64::from(self.width));
        dict.set("Height", i64::from(self.height));
        dict.set("ColorSpace", Object::Name(self.color_space.as_bytes().to_vec()));
        dict.set("BitsPerComponent", 8);
        dict.set("Filter", Object::Name(self.filter.as_bytes().to_vec()));

        Stream::new(dict, self.data.clone())
    }
}

/// 8-bit samples with any alpha blended against white
fn flatten_on_white(image: &DynamicImage) -> (Vec<u8>, &'static str) {
    let blend = |value: u8, alpha: u8| -> u8 {
        let a = u16::from(alpha);
        ((u16::from(value) * a + 255 * (255 - a) + 127) / 255) as u8
    };

    let color = image.color();
    match (color.has_color(), color.has_alpha()) {
        (false, false) => (image.to_luma8().into_raw(), "DeviceGray"),
        (false, true) => {
            let samples = image
                .to_luma_alpha8()
                .pixels()
                .map(|p| blend(p[0], p[1]))
                .collect();
            (samples, "DeviceGray")
        }
        (true, false) => (image.to_rgb8().into_raw(), "DeviceRGB"),
        (true, true) => {
            let samples = image
                .to_rgba8()
                .pixels()
                .flat_map(|p| [blend(p[0], p[3]), blend(p[1], p[3]), blend(p[2], p[3])])
                .collect();
            (samples, "DeviceRGB")
        }
    }
}

/// Generate operators to draw an image XObject
///
/// `x`/`y` are the lower-left corner in PDF coordinates.
pub(crate) fn generate_image_operators(
    image_name: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Vec<u8> {
    format!("q\n{width} 0 0 {height} {x} {y} cm\n/{image_name} Do\nQ\n").into_bytes()
}
