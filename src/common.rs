mod det_box;
mod detection;
mod inference_device;
mod model_config;
mod model_version;
mod vehicle_class;

pub use det_box::*;
pub use detection::*;
pub use inference_device::*;
pub use model_config::*;
pub use model_version::*;
pub use vehicle_class::*;
