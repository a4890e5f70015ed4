use std::fs;
use std::io::Write;

use cull_trace::color::Color;
use cull_trace::error::Error;
use cull_trace::intersect::TrianglePolicy;
use cull_trace::parallel;
use cull_trace::scene::{ CullingScene, Scene };
use cull_trace::tuple::Tuple3D;

const SCENE_JSON: &str = r#"{
    "camera": {
        "position": [0, 0, 5],
        "facing": [0, 0, -1],
        "frustum": { "near": 1, "far": 100, "fov_y": 1.3, "width": 48, "height": 36 }
    },
    "spheres": [
        { "center": [0, 0, -10], "radius": 2, "color": [1, 0, 0] },
        { "center": [5, 0, -10], "radius": 2, "color": [0.8, 0.2, 0] }
    ],
    "boxes": [
        { "center": [-5, 0, -10], "length": [0, 0, 2], "height": [0, 2, 0],
          "width": 2, "color": [0, 1, 0] }
    ],
    "triangles": [
        { "vertices": [[-10, 5, -13], [-13, 5, -13], [-10, 8, -13]],
          "color": [0, 0.2, 0.8] }
    ]
}"#;

#[test]
fn load_scene_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SCENE_JSON.as_bytes()).unwrap();

    let scene = Scene::load(file.path()).unwrap();

    assert_eq!(scene.camera.position, Tuple3D::new(0.0, 0.0, 5.0));
    assert_eq!(scene.camera.canvas_size(), (48, 36));
    assert_eq!(scene.spheres.len(), 2);
    assert_eq!(scene.boxes.len(), 1);
    assert_eq!(scene.triangles.len(), 1);
    assert_eq!(scene.triangle_policy, TrianglePolicy::Strict);
}

#[test]
fn missing_scene_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Scene::load(dir.path().join("missing.json"));

    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn sequential_and_parallel_renders_agree() {
    let scene = Scene::from_json(SCENE_JSON).unwrap();
    let sequential = scene.render();
    let parallel = parallel::render(&scene, 4).unwrap();

    assert_eq!(sequential, parallel);

    // The red sphere sits in the middle of the view.
    assert_eq!(sequential.read_pixel(24, 18), Some(Color::rgb(1.0, 0.0, 0.0)));
    assert_eq!(sequential.read_pixel(0, 0), Some(Color::black()));
}

#[test]
fn rendered_image_is_saved_as_ppm() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.ppm");

    let scene = Scene::from_json(SCENE_JSON).unwrap();
    parallel::render(&scene, 2).unwrap().save(&path).unwrap();

    let ppm = fs::read_to_string(&path).unwrap();
    let mut lines = ppm.lines();
    assert_eq!(lines.next(), Some("P3"));
    assert_eq!(lines.next(), Some("48 36"));
    assert_eq!(lines.next(), Some("255"));

    let values: Vec<u32> = lines
        .flat_map(|l| l.split_whitespace())
        .map(|v| v.parse().unwrap())
        .collect();
    assert_eq!(values.len(), 48 * 36 * 3);
    assert!(values.iter().all(|v| *v <= 255));
    assert!(ppm.lines().all(|l| l.len() <= 70));

    // Pixel (24, 18) is red.
    let i = (18 * 48 + 24) * 3;
    assert_eq!(&values[i..i + 3], &[255, 0, 0]);
}

#[test]
fn culling_scene_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{
        "camera": {{ "position": [0, 2, 0], "facing": [1, 0, 0] }},
        "width": 50,
        "height": 50,
        "entities": [[10, 1, 3], [-10, 1, 3], [20, 1, -20]]
    }}"#).unwrap();

    let scene = CullingScene::load(file.path()).unwrap();
    let visible = scene.visible_entities();

    assert!(visible.contains(&0));
    assert!(!visible.contains(&1));
}
