use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use meshview::config::AssetPaths;
use meshview::scene::loader::load_assets;
use meshview::scene::PendingLoad;
use meshview::{ViewerConfig, ViewerError};
use tempfile::tempdir;

const TRIANGLE_OBJ: &str = "\
v 0 0 0
v 2 0 0
v 0 2 0
vt 0 0
vt 1 0
vt 0 1
f 1/1 2/2 3/3
";

fn write_pair(dir: &Path) -> AssetPaths {
    let model = dir.join("tri.obj");
    std::fs::write(&model, TRIANGLE_OBJ).unwrap();
    let texture = dir.join("tex.jpg");
    image::RgbImage::from_pixel(8, 8, image::Rgb([10, 200, 30]))
        .save(&texture)
        .unwrap();
    AssetPaths { model, texture }
}

#[test]
fn config_file_overrides_assets() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("viewer.json");
    std::fs::write(
        &path,
        r#"{
            "assets": { "model": "capsule.obj", "texture": "capsule.jpg" },
            "metadata": { "name": "Capsule", "author": "Lab" },
            "measurement": { "distance_decimals": 2 }
        }"#,
    )
    .unwrap();

    let cfg = ViewerConfig::from_json_file(&path).unwrap();
    assert_eq!(cfg.assets.model, PathBuf::from("capsule.obj"));
    assert_eq!(cfg.metadata.name, "Capsule");
    assert_eq!(cfg.metadata.format, "OBJ");
    assert_eq!(cfg.metadata.rows().last(), Some(&("Author", "Lab")));
    assert_eq!(cfg.measurement.distance_decimals, 2);
    assert_eq!(cfg.measurement.coordinate_decimals, 3);
}

#[test]
fn missing_config_file_is_an_io_error() {
    let err = ViewerConfig::from_json_file(Path::new("/nonexistent/viewer.json"))
        .err()
        .unwrap();
    assert!(matches!(err, ViewerError::IoRead { .. }));
}

#[test]
fn jpeg_texture_and_obj_load_together() {
    let dir = tempdir().unwrap();
    let paths = write_pair(dir.path());
    let assets = load_assets(&paths).unwrap();
    assert_eq!(assets.texture.size, [8, 8]);
    assert_eq!(assets.model.triangle_count(), 1);
}

#[test]
fn corrupt_texture_reports_texture_failure() {
    let dir = tempdir().unwrap();
    let mut paths = write_pair(dir.path());
    let bad = dir.path().join("bad.jpg");
    std::fs::write(&bad, b"not a jpeg").unwrap();
    paths.texture = bad;

    let err = load_assets(&paths).unwrap_err();
    assert_eq!(err.user_message(), "Failed to load texture.");
}

#[test]
fn broken_obj_reports_obj_failure() {
    let dir = tempdir().unwrap();
    let mut paths = write_pair(dir.path());
    let bad = dir.path().join("bad.obj");
    std::fs::write(&bad, "v 0 0 0\nf 1 2 3\n").unwrap();
    paths.model = bad;

    let err = load_assets(&paths).unwrap_err();
    assert_eq!(err.user_message(), "Failed to load OBJ file.");
}

#[test]
fn superseded_load_is_never_delivered() {
    let dir = tempdir().unwrap();
    let paths = write_pair(dir.path());
    let finished = Arc::new(AtomicUsize::new(0));

    // The first load cannot finish until it has been replaced.
    let (release, gate) = mpsc::channel::<()>();
    let counter = Arc::clone(&finished);
    let first = PendingLoad::spawn_with(
        paths.clone(),
        move |p| {
            let _ = gate.recv();
            load_assets(p)
        },
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
        },
    );
    drop(first);
    release.send(()).unwrap();

    let counter = Arc::clone(&finished);
    let mut second = PendingLoad::spawn(paths.clone(), move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let mut delivered = None;
    for _ in 0..500 {
        delivered = second.poll();
        if delivered.is_some() {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    let assets = delivered.expect("second load delivered").unwrap();
    assert_eq!(assets.paths, paths);
    assert!(second.poll().is_none());

    // Give the released first worker time to finish; only the live load counts.
    std::thread::sleep(Duration::from_millis(200));
    assert_eq!(finished.load(Ordering::SeqCst), 1);
}
