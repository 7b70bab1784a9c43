//! Caption compositing.
//!
//! Overlays up to two caption strings (top, bottom) onto a decoded
//! frame. Rendering is two-pass per caption: the text is first drawn in
//! black onto a transparent layer, box-blurred, and alpha-composited
//! onto the frame as a soft shadow; then drawn again sharp in the
//! foreground color at the same position. The shadow pass always comes
//! first.
//!
//! [`compose`] is pure: it never mutates its input and identical inputs
//! produce identical pixels, so byte-identical JPEG output is
//! guaranteed for response caching.

use std::collections::HashMap;
use std::path::Path;

use fontdue::layout::{CoordinateSystem, GlyphRasterConfig, Layout, LayoutSettings, TextStyle};
use fontdue::{Font, FontSettings};
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, RgbaImage};

use epiclip_models::{wrap_caption, CaptionRequest};

use crate::error::{MediaError, MediaResult};

/// Caption block vertical margin as a fraction of image height.
const TEXT_VMARGIN: f32 = 0.10;
/// Inter-line spacing in pixels.
const TEXT_SPACING: u32 = 4;
/// Box blur radius for the shadow pass.
const SHADOW_BLUR_RADIUS: u32 = 7;

const SHADOW_COLOR: [u8; 3] = [0, 0, 0];
const TEXT_COLOR: [u8; 3] = [255, 255, 255];

/// A loaded caption font.
pub struct CaptionFont {
    font: Font,
    size: f32,
}

impl CaptionFont {
    /// Load a TTF/OTF font file at the given pixel size.
    pub fn load(path: impl AsRef<Path>, size: f32) -> MediaResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(|message| {
            MediaError::InvalidFont {
                path: path.to_path_buf(),
                message: message.to_string(),
            }
        })?;
        Ok(Self { font, size })
    }

    fn line_height(&self) -> u32 {
        self.font
            .horizontal_line_metrics(self.size)
            .map(|m| (m.ascent - m.descent).ceil() as u32)
            .unwrap_or(self.size.ceil() as u32)
            .max(1)
    }
}

/// Process-wide caption rendering configuration.
pub struct CaptionStyle {
    /// Configured font; `None` falls back to serving the frame without
    /// caller captions rather than failing.
    pub font: Option<CaptionFont>,
    /// Maximum caption line width in characters.
    pub max_line_width: usize,
    /// JPEG re-encode quality.
    pub jpeg_quality: u8,
}

impl CaptionStyle {
    pub fn new(font: Option<CaptionFont>, max_line_width: usize, jpeg_quality: u8) -> Self {
        Self {
            font,
            max_line_width,
            jpeg_quality,
        }
    }
}

/// A glyph positioned within a laid-out line.
struct PlacedGlyph {
    key: GlyphRasterConfig,
    x: i32,
    y: i32,
    width: usize,
    height: usize,
}

struct GlyphBitmap {
    width: usize,
    height: usize,
    bitmap: Vec<u8>,
}

/// Compose captions onto a frame, returning a new image.
///
/// The top caption block's top edge sits at 10% of the image height;
/// the bottom block's bottom edge sits 10% above the image bottom. Both
/// blocks are horizontally centered. With no font configured the frame
/// is returned unchanged.
pub fn compose(base: &RgbaImage, request: &CaptionRequest, style: &CaptionStyle) -> RgbaImage {
    let mut image = base.clone();
    let Some(ref font) = style.font else {
        return image;
    };

    let mut cache: HashMap<GlyphRasterConfig, GlyphBitmap> = HashMap::new();
    let (width, height) = image.dimensions();
    let line_height = font.line_height();
    let margin = (TEXT_VMARGIN * height as f32).round() as u32;

    for (text, at_top) in [(&request.top, true), (&request.bottom, false)] {
        let lines = wrap_caption(text, style.max_line_width);
        if lines.is_empty() {
            continue;
        }

        let block_height =
            lines.len() as u32 * line_height + (lines.len() as u32 - 1) * TEXT_SPACING;
        let block_top = if at_top {
            margin as i32
        } else {
            height as i32 - margin as i32 - block_height as i32
        };

        let glyphs = layout_block(font, &lines, width, line_height, block_top);

        // Shadow pass: black text on a transparent layer, blurred, then
        // composited through its own alpha.
        let mut shadow = RgbaImage::new(width, height);
        for glyph in &glyphs {
            draw_glyph(&mut shadow, font, &mut cache, glyph, SHADOW_COLOR, true);
        }
        box_blur_alpha(&mut shadow, SHADOW_BLUR_RADIUS);
        composite_layer(&mut image, &shadow);

        // Sharp pass at the same positions.
        for glyph in &glyphs {
            draw_glyph(&mut image, font, &mut cache, glyph, TEXT_COLOR, false);
        }
    }

    image
}

/// Lay out wrapped lines, each centered on the image width.
fn layout_block(
    font: &CaptionFont,
    lines: &[String],
    image_width: u32,
    line_height: u32,
    block_top: i32,
) -> Vec<PlacedGlyph> {
    let mut placed = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let line_top = block_top + i as i32 * (line_height + TEXT_SPACING) as i32;

        let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings::default());
        layout.append(&[&font.font], &TextStyle::new(line, font.size, 0));

        let line_width = layout
            .glyphs()
            .iter()
            .map(|g| g.x + g.width as f32)
            .fold(0.0_f32, f32::max);
        let line_left = ((image_width as f32 - line_width) / 2.0).round() as i32;

        for glyph in layout.glyphs() {
            if glyph.width == 0 || glyph.height == 0 {
                continue;
            }
            placed.push(PlacedGlyph {
                key: glyph.key,
                x: line_left + glyph.x.round() as i32,
                y: line_top + glyph.y.round() as i32,
                width: glyph.width,
                height: glyph.height,
            });
        }
    }

    placed
}

/// Rasterize and blend one glyph into the target image.
///
/// On a transparent layer (`onto_layer`) coverage is written into the
/// alpha channel directly; on an opaque frame it is alpha-blended.
fn draw_glyph(
    target: &mut RgbaImage,
    font: &CaptionFont,
    cache: &mut HashMap<GlyphRasterConfig, GlyphBitmap>,
    glyph: &PlacedGlyph,
    color: [u8; 3],
    onto_layer: bool,
) {
    let bitmap = cache.entry(glyph.key).or_insert_with(|| {
        let (_, bitmap) = font.font.rasterize_config(glyph.key);
        GlyphBitmap {
            width: glyph.width,
            height: glyph.height,
            bitmap,
        }
    });

    let (width, height) = target.dimensions();
    for row in 0..bitmap.height {
        let py = glyph.y + row as i32;
        if py < 0 || py >= height as i32 {
            continue;
        }
        for col in 0..bitmap.width {
            let px = glyph.x + col as i32;
            if px < 0 || px >= width as i32 {
                continue;
            }
            let mask = bitmap.bitmap[row * bitmap.width + col];
            if mask == 0 {
                continue;
            }
            let pixel = target.get_pixel_mut(px as u32, py as u32);
            if onto_layer {
                // Overlapping glyphs keep the strongest coverage.
                pixel.0 = [color[0], color[1], color[2], mask.max(pixel.0[3])];
            } else {
                blend_pixel(&mut pixel.0, color, mask);
            }
        }
    }
}

/// Alpha-blend `color` at `alpha` coverage over an opaque pixel.
fn blend_pixel(dst: &mut [u8; 4], color: [u8; 3], alpha: u8) {
    let a = u16::from(alpha);
    let inv = 255 - a;
    for c in 0..3 {
        let blended = (u16::from(color[c]) * a + u16::from(dst[c]) * inv + 127) / 255;
        dst[c] = blended as u8;
    }
    dst[3] = 255;
}

/// Separable box blur over the alpha channel of a layer.
///
/// Edge samples are clamped. Color channels are untouched; the shadow
/// layer is uniformly black so only coverage needs spreading.
fn box_blur_alpha(layer: &mut RgbaImage, radius: u32) {
    let (width, height) = layer.dimensions();
    if width == 0 || height == 0 || radius == 0 {
        return;
    }
    let r = radius as i64;
    let window = 2 * r + 1;

    let mut alpha: Vec<u32> = layer.pixels().map(|p| u32::from(p.0[3])).collect();
    let mut pass = vec![0u32; alpha.len()];

    // Horizontal pass
    for y in 0..height as i64 {
        for x in 0..width as i64 {
            let mut sum: u64 = 0;
            for dx in -r..=r {
                let sx = (x + dx).clamp(0, width as i64 - 1);
                sum += u64::from(alpha[(y * width as i64 + sx) as usize]);
            }
            pass[(y * width as i64 + x) as usize] = (sum / window as u64) as u32;
        }
    }

    // Vertical pass
    for y in 0..height as i64 {
        for x in 0..width as i64 {
            let mut sum: u64 = 0;
            for dy in -r..=r {
                let sy = (y + dy).clamp(0, height as i64 - 1);
                sum += u64::from(pass[(sy * width as i64 + x) as usize]);
            }
            alpha[(y * width as i64 + x) as usize] = (sum / window as u64) as u32;
        }
    }

    for (pixel, a) in layer.pixels_mut().zip(alpha) {
        pixel.0[3] = a as u8;
    }
}

/// Composite a shadow layer onto the frame through the layer's alpha.
fn composite_layer(base: &mut RgbaImage, layer: &RgbaImage) {
    for (dst, src) in base.pixels_mut().zip(layer.pixels()) {
        if src.0[3] > 0 {
            blend_pixel(&mut dst.0, [src.0[0], src.0[1], src.0[2]], src.0[3]);
        }
    }
}

/// Encode an image as JPEG at the given quality.
pub fn encode_jpeg(image: &RgbaImage, quality: u8) -> MediaResult<Vec<u8>> {
    let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality).encode(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        ColorType::Rgb8,
    )?;
    Ok(out)
}

/// Decode a stored frame, compose captions, and re-encode as JPEG.
pub fn compose_to_jpeg(
    frame: &[u8],
    request: &CaptionRequest,
    style: &CaptionStyle,
) -> MediaResult<Vec<u8>> {
    let base = image::load_from_memory(frame)?.to_rgba8();
    let composed = compose(&base, request, style);
    encode_jpeg(&composed, style.jpeg_quality)
}
