//! ONNX Runtime session wrapper.

use anyhow::Result;
use half::{bf16, f16};
use ndarray::{Array, IxDyn};
use ort::{
    execution_providers::{ExecutionProvider, CPUExecutionProvider, CUDAExecutionProvider, TensorRTExecutionProvider},
    session::builder::{GraphOptimizationLevel, SessionBuilder},
    session::{Session, SessionInputValue},
    tensor::{PrimitiveTensorElementType, TensorElementType},
    value::{DynValue, Tensor, ValueType},
};
use crate::common::InferenceDevice;
use crate::data::{ConfigOrt, Xs, X, CROSS_MARK};

/// ONNX Runtime tensor attributes: names, element types and dimensions
/// (`-1` for symbolic axes).
#[derive(Debug, Clone, Default)]
pub struct OrtTensorAttr {
    pub names: Vec<String>,
    pub dtypes: Vec<TensorElementType>,
    pub dimss: Vec<Vec<i64>>,
}

/// ONNXRuntime Backend
#[derive(Debug)]
pub struct OrtEngine {
    session: Session,
    inputs_attrs: OrtTensorAttr,
    outputs_attrs: OrtTensorAttr,
    model_width: u32,
    model_height: u32,
}

impl OrtEngine {
    pub fn new(config: &ConfigOrt) -> Result<Self> {
        if let Some(lib) = &config.ort_lib_path {
            match ort::init_from(lib.to_string_lossy()).commit() {
                Ok(_) => {}
                Err(e) => anyhow::bail!("Failed to commit ORT from {}: {:?}", lib.display(), e),
            }
        }

        let mut builder = Session::builder()?;

        let mut device = config.device;
        match device {
            InferenceDevice::TensorRT(device_id) => {
                Self::build_trt(
                    &mut builder,
                    device_id,
                    config.trt_fp16_enable,
                    config.trt_engine_cache_enable,
                )?;
            }
            InferenceDevice::CUDA(device_id) => {
                Self::build_cuda(&mut builder, device_id).unwrap_or_else(|err| {
                    log::warn!("{err}, Using cpu");
                    device = InferenceDevice::CPU;
                })
            }
            InferenceDevice::CPU => {
                Self::build_cpu(&mut builder)?;
            }
        }

        let session = builder
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(&config.onnx_path)?;

        let inputs_attrs = Self::io_attrs(session.inputs.iter().map(|i| (&i.name, &i.input_type)))?;
        let outputs_attrs = Self::io_attrs(session.outputs.iter().map(|o| (&o.name, &o.output_type)))?;

        // fixed spatial dims in the graph win over the configured ones
        let dims = inputs_attrs.dimss.first().cloned().unwrap_or_default();
        let model_height = Self::fixed_dim(&dims, 2).unwrap_or(config.model_height);
        let model_width = Self::fixed_dim(&dims, 3).unwrap_or(config.model_width);

        log::info!(
            "Backend: ONNXRuntime | Device: {} | Inputs: {:?} | Outputs: {:?} | Input size: {}x{}",
            device,
            inputs_attrs.names,
            outputs_attrs.names,
            model_width,
            model_height,
        );

        Ok(Self {
            session,
            inputs_attrs,
            outputs_attrs,
            model_width,
            model_height,
        })
    }

    fn build_trt(
        builder: &mut SessionBuilder,
        device_id: usize,
        fp16_enable: bool,
        engine_cache_enable: bool,
    ) -> Result<()> {
        let trt = TensorRTExecutionProvider::default()
            .with_device_id(device_id as i32)
            .with_fp16(fp16_enable)
            .with_engine_cache(engine_cache_enable)
            .with_engine_cache_path("trt-cache");
        if trt.is_available()? {
            match trt.register(builder) {
                Ok(_) => { }
                Err(err) => { anyhow::bail!("{CROSS_MARK} TensorRT initialization failed: {:?}", err) }
            }
            log::info!("Initial model serialization with TensorRT may take some time...");
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} TensorRT execution provider not available")
        }
    }

    fn build_cuda(builder: &mut SessionBuilder, device_id: usize) -> Result<()> {
        let ep = CUDAExecutionProvider::default().with_device_id(device_id as i32);
        if ep.is_available()? {
            match ep.register(builder) {
                Ok(_) => { }
                Err(err) => { anyhow::bail!("{CROSS_MARK} CUDA initialization failed: {:?}", err) }
            }
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CUDA execution provider not available")
        }
    }

    fn build_cpu(builder: &mut SessionBuilder) -> Result<()> {
        let ep = CPUExecutionProvider::default();
        if ep.is_available()? {
            match ep.register(builder) {
                Ok(_) => { }
                Err(err) => { anyhow::bail!("{CROSS_MARK} CPU initialization failed: {:?}", err) }
            }
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CPU execution provider not available")
        }
    }

    fn io_attrs<'a>(values: impl Iterator<Item = (&'a String, &'a ValueType)>) -> Result<OrtTensorAttr> {
        let mut attrs = OrtTensorAttr::default();
        for (name, value_type) in values {
            match value_type {
                ValueType::Tensor { ty, dimensions, .. } => {
                    attrs.names.push(name.to_owned());
                    attrs.dtypes.push(*ty);
                    attrs.dimss.push(dimensions.to_owned());
                }
                other => anyhow::bail!("Unsupported non-tensor value {name}: {:?}", other),
            }
        }
        Ok(attrs)
    }

    fn fixed_dim(dims: &[i64], i: usize) -> Option<u32> {
        dims.get(i).copied().filter(|d| *d > 0).map(|d| d as u32)
    }

    fn tensor_preprocess(x: &X, dtype: &TensorElementType) -> Result<DynValue> {
        let x = match dtype {
            TensorElementType::Float32 => Tensor::from_array(x.0.clone())?.into_dyn(),
            TensorElementType::Float64 => Tensor::from_array(x.mapv(|x_| x_ as f64))?.into_dyn(),
            TensorElementType::Float16 => Tensor::from_array(x.mapv(f16::from_f32))?.into_dyn(),
            TensorElementType::Bfloat16 => Tensor::from_array(x.mapv(bf16::from_f32))?.into_dyn(),
            TensorElementType::Int32 => Tensor::from_array(x.mapv(|x_| x_ as i32))?.into_dyn(),
            TensorElementType::Int64 => Tensor::from_array(x.mapv(|x_| x_ as i64))?.into_dyn(),
            TensorElementType::Uint8 => Tensor::from_array(x.mapv(|x_| x_ as u8))?.into_dyn(),
            _ => anyhow::bail!("Unsupported model input type: {:?}", dtype),
        };
        Ok(x)
    }

    fn tensor_postprocess(x: &DynValue, dtype: &TensorElementType) -> Result<Array<f32, IxDyn>> {
        fn extract_and_convert<T>(x: &DynValue, map_fn: impl Fn(T) -> f32) -> Result<Array<f32, IxDyn>>
        where
            T: Clone + 'static + PrimitiveTensorElementType,
        {
            Ok(x.try_extract_tensor::<T>()?.mapv(map_fn))
        }
        match dtype {
            TensorElementType::Float32 => extract_and_convert::<f32>(x, |x| x),
            TensorElementType::Float16 => extract_and_convert::<f16>(x, f16::to_f32),
            TensorElementType::Bfloat16 => extract_and_convert::<bf16>(x, bf16::to_f32),
            TensorElementType::Float64 => extract_and_convert::<f64>(x, |x| x as f32),
            TensorElementType::Int64 => extract_and_convert::<i64>(x, |x| x as f32),
            TensorElementType::Int32 => extract_and_convert::<i32>(x, |x| x as f32),
            _ => anyhow::bail!("Unsupported ort tensor type: {:?}", dtype),
        }
    }

    pub fn run(&mut self, xs: Xs) -> Result<Xs> {
        let mut xs_ = Vec::new();
        for (dtype, x) in self.inputs_attrs.dtypes.iter().zip(xs.iter()) {
            xs_.push(Into::<SessionInputValue<'_>>::into(Self::tensor_preprocess(x, dtype)?));
        }

        let outputs = self.session.run(&xs_[..])?;

        let mut ys = Xs::new();
        for (dtype, name) in self.outputs_attrs.dtypes.iter().zip(self.outputs_attrs.names.iter()) {
            let y = Self::tensor_postprocess(&outputs[name.as_str()], dtype)?;
            ys.push_kv(name.as_str(), X::from(y))?;
        }
        Ok(ys)
    }

    pub fn model_width(&self) -> u32 { self.model_width }

    pub fn model_height(&self) -> u32 { self.model_height }

    /// Custom metadata entry of the loaded model, e.g. `names`.
    pub fn try_fetch(&self, key: &str) -> Option<String> {
        match self.session.metadata() {
            Err(_) => None,
            Ok(metadata) => metadata.custom(key).unwrap_or_default(),
        }
    }
}
