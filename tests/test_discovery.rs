use std::fs;
use std::path::PathBuf;
use vehicle_detect::pipeline::{discover_images, output_path_for};

fn names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn only_supported_extensions_are_found() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["a.jpg", "c.jpeg", "d.png", "e.bmp", "f.gif", "g.txt", "h.JPG", "i.Png", "jpg", ".hidden.jpg"] {
        fs::write(dir.path().join(name), b"x").unwrap();
    }
    fs::create_dir(dir.path().join("nested.png")).unwrap();

    let found = discover_images(dir.path()).unwrap();

    assert_eq!(names(&found), vec!["a.jpg", "c.jpeg", "d.png", "e.bmp"]);
}

#[test]
fn discovery_order_is_lexicographic() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["b.png", "a10.jpg", "a2.bmp", "B.jpeg", "a1.jpg"] {
        fs::write(dir.path().join(name), b"x").unwrap();
    }

    let found = discover_images(dir.path()).unwrap();

    assert_eq!(names(&found), vec!["B.jpeg", "a1.jpg", "a10.jpg", "a2.bmp", "b.png"]);
}

#[test]
fn empty_directory_yields_nothing() {
    let dir = tempfile::tempdir().unwrap();
    assert!(discover_images(dir.path()).unwrap().is_empty());
}

#[test]
fn missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = discover_images(&dir.path().join("nope")).unwrap_err();
    assert!(format!("{err:#}").contains("Input directory not found"));
}

#[test]
fn output_name_keeps_basename_and_case() {
    let out = output_path_for(&PathBuf::from("/in/Car Park.JPEG.png"), &PathBuf::from("/out")).unwrap();
    assert_eq!(out, PathBuf::from("/out/output_Car Park.JPEG.png"));
}

#[cfg(unix)]
#[test]
fn names_that_are_not_utf8_are_still_found() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::tempdir().unwrap();
    let name = OsStr::from_bytes(b"caf\xe9.jpg");
    if fs::write(dir.path().join(name), b"x").is_err() {
        // some filesystems refuse non-UTF-8 names
        return;
    }

    let found = discover_images(dir.path()).unwrap();
    assert_eq!(found, vec![dir.path().join(name)]);

    let out = output_path_for(&found[0], &PathBuf::from("/out")).unwrap();
    assert_eq!(out.file_name().unwrap().as_bytes(), b"output_caf\xe9.jpg");
}
