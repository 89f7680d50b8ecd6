//! Drawing of the kept detections onto the decoded image.

use std::path::Path;
use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use anyhow::Context;
use image::{DynamicImage, Rgba};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use crate::common::{is_allowed_class, normalize_class_name, Detection};

pub const BOX_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);

pub const TEXT_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Stroke width of the box outline, in pixels.
pub const BOX_THICKNESS: i32 = 2;

pub const LABEL_SCALE: f32 = 16.0;

/// Gap between the label baseline and the top edge of the box.
pub const LABEL_OFFSET: i32 = 5;

/// DejaVu Sans Mono, shipped with the crate so labels never depend on the host's fonts.
const BUILTIN_FONT: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

/// How boxes and labels are rendered. Without a font only the boxes are drawn.
pub struct LabelStyle {
    pub font: Option<FontArc>,
    pub scale: f32,
    pub thickness: i32,
}

impl Default for LabelStyle {
    fn default() -> Self {
        let font = FontArc::try_from_slice(BUILTIN_FONT)
            .map_err(|err| log::error!("Built-in label font is unreadable: {err}"))
            .ok();
        Self {
            font,
            scale: LABEL_SCALE,
            thickness: BOX_THICKNESS,
        }
    }
}

impl LabelStyle {
    pub fn with_font_path(font_path: &Path) -> anyhow::Result<Self> {
        let font_data = std::fs::read(font_path)
            .with_context(|| format!("Failed to read font file {}", font_path.display()))?;
        let font = FontArc::try_from_vec(font_data)
            .map_err(|_| anyhow::anyhow!("Failed to parse font file: {}", font_path.display()))?;

        Ok(Self {
            font: Some(font),
            ..Default::default()
        })
    }

    /// Uses `font_path` when given and loadable, otherwise the built-in font.
    pub fn load(font_path: Option<&Path>) -> Self {
        match font_path {
            Some(path) => Self::with_font_path(path).unwrap_or_else(|err| {
                log::warn!("{err:#}; using the built-in font");
                Self::default()
            }),
            None => Self::default(),
        }
    }
}

/// Draws every detection whose class is in the allowed set and returns the
/// label strings that were rendered, in order. Other detections are dropped
/// without a trace.
pub fn annotate(image: &mut DynamicImage, detections: &[Detection], style: &LabelStyle) -> Vec<String> {
    let mut labels = Vec::new();
    for detection in detections {
        let name = normalize_class_name(&detection.label);
        if !is_allowed_class(&name) {
            continue;
        }

        let detection = detection.clone().with_label(&name);
        let corners = clamp_corners(image, detection.bbox.as_x1y1_x2y2_i32(), style.thickness);
        draw_box(image, corners, style.thickness);

        let label = detection.label_text();
        let (x1, y1, x2, y2) = corners;
        if draw_label(image, &label, x1.min(x2), y1.min(y2), style) {
            labels.push(label);
        }
    }
    labels
}

/// Limits corners to the image grown by `pad` pixels on every side; anything
/// further out is never visible.
fn clamp_corners(image: &DynamicImage, (x1, y1, x2, y2): (i32, i32, i32, i32), pad: i32) -> (i32, i32, i32, i32) {
    let pad = pad.max(1);
    let max_x = i32::try_from(image.width()).unwrap_or(i32::MAX).saturating_add(pad);
    let max_y = i32::try_from(image.height()).unwrap_or(i32::MAX).saturating_add(pad);
    (x1.clamp(-pad, max_x), y1.clamp(-pad, max_y), x2.clamp(-pad, max_x), y2.clamp(-pad, max_y))
}

/// Outline of `(x1, y1)-(x2, y2)`, both corners inclusive, `thickness` pixels
/// wide growing inwards. Parts outside the image are clipped.
pub fn draw_box(image: &mut DynamicImage, corners: (i32, i32, i32, i32), thickness: i32) {
    let (x1, y1, x2, y2) = clamp_corners(image, corners, thickness);
    let (left, right) = (x1.min(x2), x1.max(x2));
    let (top, bottom) = (y1.min(y2), y1.max(y2));

    for t in 0..thickness.max(1) {
        let w = i64::from(right) - i64::from(left) + 1 - 2 * i64::from(t);
        let h = i64::from(bottom) - i64::from(top) + 1 - 2 * i64::from(t);
        if w <= 0 || h <= 0 {
            break;
        }
        let rect = Rect::at(left + t, top + t).of_size(w as u32, h as u32);
        draw_hollow_rect_mut(image, rect, BOX_COLOR);
    }
}

/// Top edge of a label of height `text_h` whose baseline sits [`LABEL_OFFSET`]
/// above a box with top `y1`. Never negative.
pub fn label_top(y1: i32, text_h: i32) -> i32 {
    y1.saturating_sub(LABEL_OFFSET).saturating_sub(text_h).max(0)
}

/// Returns whether the text was rendered.
fn draw_label(image: &mut DynamicImage, text: &str, x1: i32, y1: i32, style: &LabelStyle) -> bool {
    let Some(font) = &style.font else {
        return false;
    };
    let scale = PxScale::from(style.scale);
    let (_, text_h) = text_size(scale, font, text);
    let text_h = i32::try_from(text_h).unwrap_or(i32::MAX);
    let ascent = font.as_scaled(scale).ascent().round() as i32;
    // glyphs are laid out one ascent below `y`
    let y = label_top(y1, text_h).saturating_add(text_h).saturating_sub(ascent);

    // second pass one pixel to the right gives a two pixel stroke
    draw_text_mut(image, TEXT_COLOR, x1, y, scale, font, text);
    draw_text_mut(image, TEXT_COLOR, x1.saturating_add(1), y, scale, font, text);
    true
}
