//! Image to tensor conversion ahead of inference.

use anyhow::{bail, Result};
use fast_image_resize::{
    images::{CroppedImageMut, Image as FirImage},
    pixels::PixelType,
    FilterType, ResizeAlg, ResizeOptions, Resizer,
};
use image::{DynamicImage, RgbImage};
use rayon::prelude::*;
use crate::data::X;

/// Grey value used for the letterbox border.
pub const LETTERBOX_FILL: u8 = 114;

/// Letterboxes every image into `target_w x target_h`, normalises to `[0, 1]`
/// and stacks the result as one `NCHW` batch.
pub fn preprocess(xs: &[DynamicImage], target_h: u32, target_w: u32) -> Result<X> {
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));

    let image_tensors: Vec<Vec<f32>> = xs
        .par_iter()
        .map(|img| {
            let mut resizer = Resizer::new();
            let src = to_fir_image(img.to_rgb8())?;
            let resized = letterbox_image(&src, target_h, target_w, LETTERBOX_FILL, &mut resizer, &options)?;
            nchw_normalize_flat(&resized)
        })
        .collect::<Result<_>>()?;

    let channels = 3;
    let height = target_h as usize;
    let width = target_w as usize;
    let image_size = channels * height * width;

    let mut batch_flat: Vec<f32> = Vec::with_capacity(xs.len() * image_size);
    for img in image_tensors.iter() {
        batch_flat.extend_from_slice(img);
    }

    X::from_shape_vec(&[xs.len(), channels, height, width], batch_flat)
}

/// Ratio applied to an image of `w0 x h0` when letterboxed into `target_w x target_h`.
pub fn letterbox_ratio(w0: u32, h0: u32, target_w: u32, target_h: u32) -> f32 {
    (target_w as f32 / w0 as f32).min(target_h as f32 / h0 as f32)
}

pub fn to_fir_image(image: RgbImage) -> Result<FirImage<'static>> {
    let (width, height) = image.dimensions();
    let buffer = image.into_raw();
    Ok(FirImage::from_vec_u8(width, height, buffer, PixelType::U8x3)?)
}

/// Scales `img` to fit, anchored at the top-left corner, and pads the rest with `bg`.
fn letterbox_image(
    img: &FirImage,
    target_h: u32,
    target_w: u32,
    bg: u8,
    resizer: &mut Resizer,
    resize_options: &ResizeOptions,
) -> Result<FirImage<'static>> {
    let (w0, h0) = (img.width(), img.height());
    if w0 == 0 || h0 == 0 {
        bail!("Cannot letterbox an empty image ({}x{})", w0, h0);
    }
    let scale = letterbox_ratio(w0, h0, target_w, target_h);
    let new_w = ((w0 as f32 * scale).round() as u32).clamp(1, target_w);
    let new_h = ((h0 as f32 * scale).round() as u32).clamp(1, target_h);

    let mut padded = FirImage::from_vec_u8(
        target_w,
        target_h,
        vec![bg; (target_w * target_h * 3) as usize],
        PixelType::U8x3,
    )?;

    let mut cropped = CroppedImageMut::new(&mut padded, 0, 0, new_w, new_h)?;
    resizer.resize(img, &mut cropped, resize_options)?;

    Ok(padded)
}

fn nchw_normalize_flat(img: &FirImage) -> Result<Vec<f32>> {
    let buf = img.buffer();
    let w = img.width() as usize;
    let h = img.height() as usize;

    if buf.len() != w * h * 3 {
        bail!("Unexpected buffer size: got {}, expected {}", buf.len(), w * h * 3);
    }

    let mut out = vec![0.0f32; buf.len()];
    let hw = w * h;

    for i in 0..hw {
        out[i] = buf[3 * i] as f32 / 255.0;
        out[i + hw] = buf[3 * i + 1] as f32 / 255.0;
        out[i + 2 * hw] = buf[3 * i + 2] as f32 / 255.0;
    }

    Ok(out)
}
