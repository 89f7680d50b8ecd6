use std::path::{Path, PathBuf};
use anyhow::Context;
use crate::common::{ModelConfig, DEFAULT_CONF_THRESHOLD};

/// Environment variable overriding the detection confidence threshold.
pub const CONF_ENV_VAR: &str = "YOLO_CONF";

pub const WEIGHTS_REL_PATH: &str = "bin/best.onnx";
pub const INPUT_REL_DIR: &str = "test_images";
pub const OUTPUT_REL_DIR: &str = "output_images";

/// Everything one batch run needs. Built once at start-up and never mutated
/// after the run begins.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub model: ModelConfig,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// TrueType font for the labels; the built-in font is used when unset.
    pub font_path: Option<PathBuf>,
}

impl RunConfig {
    /// Fixed layout under `base_dir`, with the threshold taken from the raw
    /// value of [`CONF_ENV_VAR`] when present.
    pub fn resolve(base_dir: &Path, conf_env: Option<&str>) -> anyhow::Result<Self> {
        let conf_threshold = match conf_env {
            Some(raw) => parse_threshold(raw)
                .with_context(|| format!("Invalid {CONF_ENV_VAR} value: {raw:?}"))?,
            None => DEFAULT_CONF_THRESHOLD,
        };

        Ok(Self {
            model: ModelConfig::new(base_dir.join(WEIGHTS_REL_PATH), conf_threshold),
            input_dir: base_dir.join(INPUT_REL_DIR),
            output_dir: base_dir.join(OUTPUT_REL_DIR),
            font_path: None,
        })
    }

    /// Same as [`RunConfig::resolve`], reading [`CONF_ENV_VAR`] from the process environment.
    pub fn from_env(base_dir: &Path) -> anyhow::Result<Self> {
        let conf_env = std::env::var(CONF_ENV_VAR).ok();
        Self::resolve(base_dir, conf_env.as_deref())
    }

    pub fn conf_threshold(&self) -> f32 {
        self.model.conf_threshold
    }

    pub fn with_weights_path(mut self, path: PathBuf) -> Self {
        self.model.weights_path = path;
        self
    }

    pub fn with_input_dir(mut self, dir: PathBuf) -> Self {
        self.input_dir = dir;
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    pub fn with_conf_threshold(mut self, conf: f32) -> Self {
        self.model.conf_threshold = conf;
        self
    }

    pub fn with_font_path(mut self, path: PathBuf) -> Self {
        self.font_path = Some(path);
        self
    }
}

pub fn parse_threshold(raw: &str) -> anyhow::Result<f32> {
    let conf: f32 = raw.trim().parse()?;
    if !conf.is_finite() {
        anyhow::bail!("threshold must be a finite number");
    }
    Ok(conf)
}
