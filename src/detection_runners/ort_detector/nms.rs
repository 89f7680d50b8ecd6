pub trait Nms {
    fn iou(&self, other: &Self) -> f32;
    fn confidence(&self) -> f32;
    /// Boxes of different classes never suppress each other.
    fn class_id(&self) -> isize;
}
