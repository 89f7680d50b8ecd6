use std::sync::OnceLock;
use anyhow::Result;
use image::{DynamicImage, GenericImageView};
use ndarray::{s, ArrayView, Axis, IxDyn};
use rayon::prelude::*;
use regex::Regex;

use crate::common::{BoxType, DetBox, Detection, YoloPreds};
use crate::data::{ConfigOrt, Xs, Y};
use crate::detection_runners::inference_process::InferenceProcess;
use crate::detection_runners::ort_detector::image_ops;
use crate::detection_runners::ort_detector::OrtEngine;

#[derive(Debug)]
pub struct OrtYOLO {
    engine: OrtEngine,
    options: ConfigOrt,
    names: Vec<String>,
    layout: YoloPreds,
}

impl InferenceProcess for OrtYOLO {
    type Input = DynamicImage;

    fn new(options: ConfigOrt) -> Result<Self> {
        options.validate()?;
        let engine = OrtEngine::new(&options)?;

        let version = options.yolo_version;
        let layout = version.layout();

        // Class names: user-defined, else parsed from the model metadata
        let names_parsed = Self::fetch_names(&engine)?;
        let names = match (&options.names, names_parsed) {
            (Some(names), Some(parsed)) => {
                if names.len() != parsed.len() {
                    anyhow::bail!(
                        "The lengths of parsed class names: {} and user-defined class names: {} do not match.",
                        parsed.len(),
                        names.len(),
                    );
                }
                Some(names.clone())
            }
            (Some(names), None) => Some(names.clone()),
            (None, parsed) => parsed,
        };

        let names = match names {
            Some(names) if !names.is_empty() => names,
            _ => anyhow::bail!(
                "Unable to obtain the class names: the model carries no `names` metadata and no labels file was given."
            ),
        };
        let nc = names.len();

        log::info!("YOLO Version: {} | Classes: {} | Conf: {:?} | IoU: {}",
            version.name(), nc, options.confs, options.iou);

        Ok(Self {
            engine,
            options,
            names,
            layout,
        })
    }

    fn preprocess(&self, xs: &[Self::Input]) -> Result<Xs> {
        let x = image_ops::preprocess(xs, self.height(), self.width())?;
        Ok(Xs::from(x))
    }

    fn inference(&mut self, xs: Xs) -> Result<Xs> {
        self.engine.run(xs)
    }

    fn postprocess(&self, xs: Xs, xs0: &[Self::Input]) -> Result<Vec<Y>> {
        if xs.is_empty() {
            anyhow::bail!("Model produced no outputs");
        }
        let preds = &xs[0];
        if preds.ndim() != 3 {
            anyhow::bail!("Expected a 3-D prediction tensor, got shape {:?}", preds.shape());
        }

        preds
            .axis_iter(Axis(0))
            .into_par_iter()
            .enumerate()
            .map(|(idx, preds)| {
                let Some(image) = xs0.get(idx) else {
                    return Ok(Y::default());
                };
                let (w0, h0) = image.dimensions();
                let ratio = image_ops::letterbox_ratio(w0, h0, self.width(), self.height());
                decode_preds(preds, &self.layout, &self.names, &self.options, ratio, (w0, h0))
            })
            .collect()
    }
}

impl OrtYOLO {
    pub fn width(&self) -> u32 {
        self.engine.model_width()
    }

    pub fn height(&self) -> u32 {
        self.engine.model_height()
    }

    fn fetch_names(engine: &OrtEngine) -> Result<Option<Vec<String>>> {
        // fetch class names from onnx metadata
        // String format: `{0: 'person', 1: 'bicycle', 2: 'sports ball', ..., 27: "yellow_lady's_slipper"}`
        engine.try_fetch("names").map(|names| parse_names(&names)).transpose()
    }
}

/// Decodes one image's slice of the prediction tensor into detections in
/// original image coordinates. `ratio` is the letterbox scale used when the
/// image was fed to the model.
///
/// Scores below the per-class threshold are dropped; a score equal to it is kept.
pub fn decode_preds(
    preds: ArrayView<f32, IxDyn>,
    layout: &YoloPreds,
    names: &[String],
    options: &ConfigOrt,
    ratio: f32,
    (image_width, image_height): (u32, u32),
) -> Result<Y> {
    if preds.ndim() != 2 {
        anyhow::bail!("Expected 2-D predictions per image, got shape {:?}", preds.shape());
    }
    let nc = names.len();
    let row_len = if layout.is_anchors_first() { preds.shape()[1] } else { preds.shape()[0] };
    match layout.nc_from_row_len(row_len) {
        Some(n) if n != nc => anyhow::bail!(
            "Model predicts {} classes but {} class names are known", n, nc),
        None if row_len < 6 => anyhow::bail!("Prediction rows too short: {}", row_len),
        _ => {}
    }
    let (image_width, image_height) = (image_width as f32, image_height as f32);

    let (slice_bboxes, slice_id, slice_clss, slice_confs) = layout.parse_preds(preds, nc);

    let detections = slice_bboxes
        .axis_iter(Axis(0))
        .into_par_iter()
        .enumerate()
        .filter_map(|(i, bbox)| {
            // confidence & class_id
            let (class_id, confidence) = match &slice_id {
                Some(ids) => (ids[[i, 0]] as usize, slice_clss[[i, 0]]),
                None => {
                    let (class_id, &confidence) = slice_clss
                        .slice(s![i, ..])
                        .into_iter()
                        .enumerate()
                        .max_by(|a, b| a.1.total_cmp(b.1))?;

                    match &slice_confs {
                        None => (class_id, confidence),
                        Some(slice_confs) => (class_id, confidence * slice_confs[[i, 0]]),
                    }
                }
            };

            // filtering low scores
            if confidence < options.conf_for(class_id) {
                return None;
            }
            let label = names.get(class_id)?;

            let bbox = bbox.mapv(|x| x / ratio);
            let det_box = match layout.bbox {
                BoxType::Cxcywh => DetBox::default().with_cxcy_wh(bbox[0], bbox[1], bbox[2], bbox[3]),
                BoxType::Xyxy => DetBox::new(bbox[0], bbox[1], bbox[2], bbox[3]),
            }
            .clamp_to(image_width, image_height);

            Some(Detection {
                class_id: class_id as isize,
                label: label.to_owned(),
                bbox: det_box,
                confidence: Some(confidence),
            })
        })
        .collect::<Vec<_>>();

    if detections.is_empty() {
        return Ok(Y::default());
    }
    let y = Y::default().with_detections(&detections);
    Ok(if layout.apply_nms { y.apply_nms(options.iou) } else { y })
}

static NAMES_RE: OnceLock<Regex> = OnceLock::new();

/// Parses the `names` metadata written by YOLO exporters.
pub fn parse_names(names: &str) -> Result<Vec<String>> {
    let re = match NAMES_RE.get() {
        Some(re) => re,
        None => {
            let re = Regex::new(r#"(['"])([-()\w '"]+)(['"])"#)?;
            NAMES_RE.get_or_init(|| re)
        }
    };
    Ok(re
        .captures_iter(names)
        .map(|x| x.extract::<3>().1[1].to_string())
        .collect())
}
