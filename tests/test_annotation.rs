mod common;

use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use vehicle_detect::annotation::{annotate, draw_box, label_top, LabelStyle, BOX_COLOR};
use vehicle_detect::common::{normalize_class_name, is_allowed_class, DetBox, Detection};

use common::{detection, gradient_image};

fn black(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
}

fn white(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([255, 255, 255])))
}

fn boxes_only() -> LabelStyle {
    LabelStyle { font: None, ..LabelStyle::default() }
}

/// Number of near-black pixels in rows `top..bottom`.
fn dark_pixels(image: &DynamicImage, top: u32, bottom: u32) -> usize {
    let rgb = image.to_rgb8();
    (top..bottom.min(rgb.height()))
        .flat_map(|y| (0..rgb.width()).map(move |x| (x, y)))
        .filter(|&(x, y)| rgb.get_pixel(x, y).0.iter().all(|&c| c < 100))
        .count()
}

#[test]
fn motorbike_is_relabelled_motorcycle() {
    assert_eq!(normalize_class_name("Motorbike"), "motorcycle");
    assert_eq!(normalize_class_name("MOTORBIKE"), "motorcycle");
    assert_eq!(normalize_class_name("Car"), "car");

    let mut image = black(100, 100);
    let labels = annotate(
        &mut image,
        &[detection("Motorbike", (10., 10., 50., 50.), 0.7)],
        &LabelStyle::default(),
    );

    assert_eq!(labels, vec!["motorcycle 0.70"]);
    assert!(labels.iter().all(|l| !l.contains("motorbike")));
}

#[test]
fn allowed_classes_are_the_vehicle_set() {
    for name in ["car", "bus", "truck", "motorcycle", "bike", "bicycle", "rickshaw"] {
        assert!(is_allowed_class(name), "{name}");
    }
    for name in ["person", "dog", "Car", "traffic light", ""] {
        assert!(!is_allowed_class(name), "{name}");
    }
}

#[test]
fn label_has_two_decimals_or_no_confidence() {
    assert_eq!(detection("car", (0., 0., 1., 1.), 0.8).label_text(), "car 0.80");
    assert_eq!(detection("bus", (0., 0., 1., 1.), 0.456).label_text(), "bus 0.46");
    assert_eq!(Detection::new("truck", DetBox::default(), None).label_text(), "truck");
}

#[test]
fn unknown_classes_leave_the_image_untouched() {
    let original = DynamicImage::ImageRgb8(gradient_image(80, 60));
    let mut image = original.clone();

    let labels = annotate(
        &mut image,
        &[
            detection("person", (5., 5., 40., 40.), 0.9),
            detection("traffic light", (0., 0., 79., 59.), 0.5),
        ],
        &LabelStyle::default(),
    );

    assert!(labels.is_empty());
    assert_eq!(image.to_rgb8().as_raw(), original.to_rgb8().as_raw());
}

#[test]
fn box_is_green_and_two_pixels_wide() {
    let mut image = black(60, 50);
    let labels = annotate(
        &mut image,
        &[detection("car", (10.4, 9.6, 40.2, 30.0), 0.8)],
        &boxes_only(),
    );
    assert!(labels.is_empty());

    let green = BOX_COLOR;
    let black = image::Rgba([0, 0, 0, 255]);
    // corners rounded to (10, 10) and (40, 30)
    assert_eq!(image.get_pixel(10, 10), green);
    assert_eq!(image.get_pixel(40, 30), green);
    assert_eq!(image.get_pixel(11, 11), green);
    assert_eq!(image.get_pixel(39, 29), green);
    assert_eq!(image.get_pixel(12, 12), black);
    assert_eq!(image.get_pixel(9, 10), black);
    assert_eq!(image.get_pixel(25, 20), black);
}

#[test]
fn boxes_outside_the_image_are_clipped() {
    let mut image = black(20, 20);
    draw_box(&mut image, (-5, -5, 30, 10), 2);
    assert_eq!(image.get_pixel(0, 10), BOX_COLOR);
    assert_eq!(image.get_pixel(5, 5), image::Rgba([0, 0, 0, 255]));
}

#[test]
fn label_never_goes_above_the_image() {
    assert_eq!(label_top(100, 12), 83);
    assert_eq!(label_top(3, 12), 0);
    assert_eq!(label_top(0, 12), 0);
    assert_eq!(label_top(i32::MIN, 12), 0);
}

#[test]
fn label_is_drawn_above_the_box() {
    let mut image = white(120, 100);
    let labels = annotate(&mut image, &[detection("car", (20., 50., 90., 90.), 0.8)], &LabelStyle::default());

    assert_eq!(labels, vec!["car 0.80"]);
    assert!(dark_pixels(&image, 0, 46) > 0);
    assert_eq!(dark_pixels(&image, 48, 100), 0);
}

#[test]
fn label_near_the_top_edge_is_pulled_into_the_image() {
    let mut image = white(120, 100);
    let labels = annotate(&mut image, &[detection("bus", (20., 2., 90., 80.), 0.65)], &LabelStyle::default());

    assert_eq!(labels, vec!["bus 0.65"]);
    assert!(dark_pixels(&image, 0, 20) > 0);
}

#[test]
fn labels_are_reported_only_when_rendered() {
    let mut image = white(120, 100);
    let labels = annotate(&mut image, &[detection("car", (20., 50., 90., 90.), 0.8)], &boxes_only());

    assert!(labels.is_empty());
    assert_eq!(dark_pixels(&image, 0, 100), 0);
    assert_eq!(image.get_pixel(20, 50), BOX_COLOR);
}

#[test]
fn enormous_boxes_are_drawn_without_overflow() {
    let mut image = black(50, 50);
    let labels = annotate(&mut image, &[detection("car", (-3e9, -3e9, 3e9, 3e9), 0.8)], &boxes_only());
    assert!(labels.is_empty());
    assert_eq!(image.get_pixel(25, 25), image::Rgba([0, 0, 0, 255]));

    let labels = annotate(&mut image, &[detection("car", (-3e9, -3e9, 3e9, 3e9), 0.8)], &LabelStyle::default());
    assert_eq!(labels, vec!["car 0.80"]);

    let mut image = black(50, 50);
    draw_box(&mut image, (i32::MIN, 10, i32::MAX, 30), 2);
    assert_eq!(image.get_pixel(25, 10), BOX_COLOR);
    assert_eq!(image.get_pixel(25, 11), BOX_COLOR);
    assert_eq!(image.get_pixel(25, 20), image::Rgba([0, 0, 0, 255]));
}

#[test]
fn drawing_keeps_the_pixel_format() {
    let mut image = DynamicImage::ImageRgb8(RgbImage::from_pixel(30, 30, Rgb([9, 9, 9])));
    annotate(&mut image, &[detection("truck", (2., 2., 20., 20.), 0.5)], &LabelStyle::default());
    assert!(matches!(image, DynamicImage::ImageRgb8(_)));
}
