//! Format detection and encoder compatibility.

use image::{ColorType, DynamicImage, ImageFormat};

/// Lowercase name used in `image/<name>` content types.
pub fn format_name(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        ImageFormat::Gif => "gif",
        ImageFormat::WebP => "webp",
        ImageFormat::Tiff => "tiff",
        ImageFormat::Bmp => "bmp",
        _ => "unknown",
    }
}

/// Sniff the magic bytes of an encoded image.
pub fn detect_format_name(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .map(format_name)
        .unwrap_or("unknown")
}

/// `Content-Type` value for an encoded image.
pub fn content_type(bytes: &[u8]) -> String {
    format!("image/{}", detect_format_name(bytes))
}

fn is_8bit(color: ColorType) -> bool {
    color.bytes_per_pixel() == color.channel_count()
}

fn is_gray(color: ColorType) -> bool {
    !color.has_color()
}

fn to_8bit(img: DynamicImage) -> DynamicImage {
    let color = img.color();
    match (is_gray(color), color.has_alpha()) {
        (true, false) => DynamicImage::ImageLuma8(img.to_luma8()),
        (true, true) => DynamicImage::ImageLumaA8(img.to_luma_alpha8()),
        (false, false) => DynamicImage::ImageRgb8(img.to_rgb8()),
        (false, true) => DynamicImage::ImageRgba8(img.to_rgba8()),
    }
}

/// Convert pixel layout to one the target encoder accepts.
///
/// Only conversions that are required happen; an 8-bit RGB image headed for
/// JPEG passes through untouched.
pub fn prepare_for_encoding(img: DynamicImage, format: ImageFormat) -> DynamicImage {
    let color = img.color();
    match format {
        ImageFormat::Jpeg => match color {
            ColorType::L8 | ColorType::Rgb8 => img,
            _ if is_gray(color) => DynamicImage::ImageLuma8(img.to_luma8()),
            _ => DynamicImage::ImageRgb8(img.to_rgb8()),
        },
        ImageFormat::Gif => match color {
            ColorType::Rgba8 => img,
            _ => DynamicImage::ImageRgba8(img.to_rgba8()),
        },
        ImageFormat::Tiff if is_gray(color) && color.has_alpha() => {
            DynamicImage::ImageRgba8(img.to_rgba8())
        }
        ImageFormat::Png | ImageFormat::Tiff
            if matches!(color, ColorType::Rgb32F | ColorType::Rgba32F) =>
        {
            to_8bit(img)
        }
        ImageFormat::Bmp | ImageFormat::WebP if !is_8bit(color) => to_8bit(img),
        _ => img,
    }
}
