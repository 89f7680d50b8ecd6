use std::path::Path;
use vehicle_detect::common::{InferenceDevice, ModelVersion, DEFAULT_CONF_THRESHOLD};
use vehicle_detect::data::{parse_threshold, ConfigOrt, RunConfig};

#[test]
fn default_layout_is_relative_to_base_dir() {
    let config = RunConfig::resolve(Path::new("/opt/app"), None).unwrap();

    assert_eq!(config.model.weights_path, Path::new("/opt/app/bin/best.onnx"));
    assert_eq!(config.input_dir, Path::new("/opt/app/test_images"));
    assert_eq!(config.output_dir, Path::new("/opt/app/output_images"));
    assert_eq!(config.conf_threshold(), DEFAULT_CONF_THRESHOLD);
    assert_eq!(config.conf_threshold(), 0.3);
    assert!(config.font_path.is_none());
}

#[test]
fn environment_overrides_threshold() {
    let config = RunConfig::resolve(Path::new("."), Some("0.55")).unwrap();
    assert_eq!(config.conf_threshold(), 0.55);

    let config = RunConfig::resolve(Path::new("."), Some(" 0.25\n")).unwrap();
    assert_eq!(config.conf_threshold(), 0.25);
}

#[test]
fn unparsable_threshold_is_fatal() {
    let err = RunConfig::resolve(Path::new("."), Some("high")).unwrap_err();
    assert!(format!("{err:#}").contains("YOLO_CONF"));
    assert!(parse_threshold("NaN").is_err());
    assert!(parse_threshold("").is_err());
}

#[test]
fn builders_replace_single_fields() {
    let config = RunConfig::resolve(Path::new("/base"), None)
        .unwrap()
        .with_input_dir("/elsewhere/in".into())
        .with_conf_threshold(0.6);

    assert_eq!(config.input_dir, Path::new("/elsewhere/in"));
    assert_eq!(config.output_dir, Path::new("/base/output_images"));
    assert_eq!(config.conf_threshold(), 0.6);
}

#[test]
fn ort_options_follow_model_config() {
    let config = RunConfig::resolve(Path::new("/base"), Some("0.4")).unwrap();
    let options = ConfigOrt::from_model_config(&config.model);

    assert_eq!(options.onnx_path, Path::new("/base/bin/best.onnx"));
    assert_eq!(options.confs, vec![0.4]);
    assert_eq!(options.conf_for(17), 0.4);
    assert_eq!(options.yolo_version, ModelVersion::YoloV5);
    assert_eq!(options.device, InferenceDevice::CPU);
    assert!(options.ort_lib_path.is_none());
    assert!(options.validate().is_ok());
    assert!(options.with_model_width(0).validate().is_err());
}

#[test]
fn device_and_version_strings() {
    assert_eq!(InferenceDevice::parse("cpu"), Some(InferenceDevice::CPU));
    assert_eq!(InferenceDevice::parse("CUDA:1"), Some(InferenceDevice::CUDA(1)));
    assert_eq!(InferenceDevice::parse("tensorrt"), Some(InferenceDevice::TensorRT(0)));
    assert_eq!(InferenceDevice::parse("cuda:x"), None);
    assert_eq!(InferenceDevice::parse("tpu"), None);
    assert_eq!(InferenceDevice::CUDA(2).to_string(), "CUDA:2");

    assert_eq!(ModelVersion::parse("yolov5"), Some(ModelVersion::YoloV5));
    assert_eq!(ModelVersion::parse("V8"), Some(ModelVersion::YoloV8));
    assert_eq!(ModelVersion::parse("11"), Some(ModelVersion::YoloV11));
    assert_eq!(ModelVersion::parse("yolox"), None);
}
