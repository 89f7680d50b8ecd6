/// Classes that are drawn on the output images. `motorbike` is listed for
/// completeness but never survives [`normalize_class_name`].
pub const ALLOWED_CLASS_NAMES: [&str; 8] = [
    "car", "bus", "truck", "motorcycle", "motorbike", "bike", "bicycle", "rickshaw",
];

/// Lower-cases a model class name and folds `motorbike` into `motorcycle`.
pub fn normalize_class_name(name: &str) -> String {
    let name = name.to_lowercase();
    if name == "motorbike" {
        return "motorcycle".to_string();
    }
    name
}

pub fn is_allowed_class(name: &str) -> bool {
    ALLOWED_CLASS_NAMES.contains(&name)
}
