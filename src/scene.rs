//! Scene descriptions for the ray caster and the culling demo.
//!
//! Scenes are described in JSON and validated while they are converted into
//! their runtime form, so rendering and culling never see a degenerate
//! primitive or camera.

use std::convert::TryFrom;
use std::fs;
use std::path::Path;

use log::info;
use serde::{ Serialize, Deserialize };

use crate::camera::Camera;
use crate::canvas::Canvas;
use crate::color::Color;
use crate::consts::{ CRATE_SPREAD, FEQ_EPSILON, RAY_MISS_DISTANCE };
use crate::error::{ Error, Result };
use crate::frustum::Frustum;
use crate::geometry::{ Sphere, Obb, Triangle };
use crate::intersect::{ Intersect, Intersection, TrianglePolicy };
use crate::matrix::Matrix4D;
use crate::quadtree::{ Located, QuadTree, QuadTreeConfig, QuadTreeNode };
use crate::ray::Ray;
use crate::tuple::{ Tuple2D, Tuple3D };

/// A primitive together with the color it shows when hit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Colored<G> {
    pub geometry: G,
    pub color: Color,
}

impl<G> Colored<G> {
    pub fn new(geometry: G, color: Color) -> Colored<G> {
        Colored { geometry, color }
    }
}

/// A scene for the ray caster.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub camera: Camera,
    pub spheres: Vec<Colored<Sphere>>,
    pub boxes: Vec<Colored<Obb>>,
    pub triangles: Vec<Colored<Triangle>>,
    pub triangle_policy: TrianglePolicy,
}

impl Scene {
    /// An empty scene seen through `camera`.
    pub fn new(camera: Camera) -> Scene {
        Scene { camera, ..Default::default() }
    }

    /// The built-in scene: two spheres, two boxes and two triangles in front
    /// of a camera at `(0, 0, 5)` looking down `-z`.
    pub fn demo() -> Scene {
        let camera = Camera::default().at(Tuple3D::new(0.0, 0.0, 5.0));
        let mut scene = Scene::new(camera);

        scene.spheres = vec![
            Colored::new(
                Sphere::new(Tuple3D::new(0.0, 0.0, -10.0), 2.0),
                Color::rgb(1.0, 0.0, 0.0)
            ),
            Colored::new(
                Sphere::new(Tuple3D::new(5.0, 0.0, -10.0), 2.0),
                Color::rgb(0.8, 0.2, 0.0)
            ),
        ];

        scene.boxes = vec![
            Colored::new(
                Obb::new(
                    Tuple3D::new(-5.0, 0.0, -10.0),
                    Tuple3D::new(0.0, 0.0, 2.0),
                    Tuple3D::new(0.0, 2.0, 0.0),
                    2.0
                ),
                Color::rgb(0.0, 1.0, 0.0)
            ),
            Colored::new(
                Obb::new(
                    Tuple3D::new(-5.0, 5.0, -10.0),
                    Tuple3D::new(1.0, 0.0, 1.0),
                    Tuple3D::new(1.0, 0.0, -1.0),
                    3.0
                ),
                Color::rgb(0.2, 0.5, 0.0)
            ),
        ];

        scene.triangles = vec![
            Colored::new(
                Triangle::new(
                    Tuple3D::new(0.0, 5.0, 5.0),
                    Tuple3D::new(0.0, 7.0, 7.0),
                    Tuple3D::new(0.0, 5.0, 7.0)
                ),
                Color::rgb(0.0, 0.0, 1.0)
            ),
            Colored::new(
                Triangle::new(
                    Tuple3D::new(-10.0, 5.0, -13.0),
                    Tuple3D::new(-13.0, 5.0, -13.0),
                    Tuple3D::new(-10.0, 8.0, -13.0)
                ),
                Color::rgb(0.0, 0.2, 0.8)
            ),
        ];

        scene
    }

    /// Parses and validates a JSON scene description.
    pub fn from_json(json: &str) -> Result<Scene> {
        let scene_json: SceneJson = serde_json::from_str(json)?;
        Scene::try_from(scene_json)
    }

    /// Loads a JSON scene description from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Scene> {
        let path = path.as_ref();
        let scene = Scene::from_json(&fs::read_to_string(path)?)?;

        info!("loaded scene {} ({} spheres, {} boxes, {} triangles)",
            path.display(), scene.spheres.len(), scene.boxes.len(),
            scene.triangles.len());
        Ok(scene)
    }

    /// The nearest primitive hit by `ray` closer than the miss distance.
    ///
    /// Primitives are tested spheres first, then boxes, then triangles; on
    /// equal `t` the earlier primitive wins.
    pub fn nearest_hit(&self, ray: &Ray) -> Option<(Intersection, Color)> {
        let mut nearest: Option<(Intersection, Color)> = None;
        let mut best = RAY_MISS_DISTANCE;

        let mut consider = |hit: Option<Intersection>, color: Color| {
            if let Some(hit) = hit {
                if hit.t < best {
                    best = hit.t;
                    nearest = Some((hit, color));
                }
            }
        };

        for s in self.spheres.iter() {
            consider(s.geometry.intersect(ray), s.color);
        }

        for b in self.boxes.iter() {
            consider(b.geometry.intersect(ray), b.color);
        }

        for t in self.triangles.iter() {
            consider(ray.intersect_triangle_with(&t.geometry,
                self.triangle_policy), t.color);
        }

        nearest
    }

    /// The color seen along `ray`: the nearest primitive's color, or black.
    pub fn intersect_ray_vs_scene(&self, ray: &Ray) -> Color {
        self.nearest_hit(ray)
            .map(|(_, color)| color)
            .unwrap_or_else(Color::black)
    }

    /// Renders row `y` of the image.
    pub fn render_row(&self, y: usize) -> Vec<Color> {
        let (width, _) = self.camera.canvas_size();

        (0..width)
            .map(|x| self.intersect_ray_vs_scene(&self.camera.ray_for_pixel(x, y)))
            .collect()
    }

    /// Renders the scene on the calling thread.
    pub fn render(&self) -> Canvas {
        let (width, height) = self.camera.canvas_size();
        let mut image = Canvas::new(width, height);

        info!("rendering {}x{} image on 1 thread", width, height);
        for y in 0..height {
            image.write_row(y, &self.render_row(y));
        }

        image
    }
}

/* JSON descriptions */

/// Camera placement shared by both kinds of scene description.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraJson {
    pub position: [f32; 3],
    pub facing: [f32; 3],
    pub frustum: Frustum,
}

impl Default for CameraJson {
    fn default() -> CameraJson {
        CameraJson {
            position: [0.0, 0.0, 0.0],
            facing: [0.0, 0.0, -1.0],
            frustum: Frustum::default(),
        }
    }
}

impl TryFrom<CameraJson> for Camera {
    type Error = Error;

    fn try_from(camera_json: CameraJson) -> Result<Camera> {
        Camera::new(
            camera_json.position.into(),
            camera_json.facing.into(),
            camera_json.frustum
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SphereJson {
    pub center: [f32; 3],
    pub radius: f32,
    pub color: [f32; 3],
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoxJson {
    pub center: [f32; 3],
    pub length: [f32; 3],
    pub height: [f32; 3],
    pub width: f32,
    pub color: [f32; 3],
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TriangleJson {
    pub vertices: [[f32; 3]; 3],
    pub color: [f32; 3],
}

/// A ray caster scene as stored on disk.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneJson {
    pub camera: CameraJson,
    pub triangle_policy: TrianglePolicy,
    pub spheres: Vec<SphereJson>,
    pub boxes: Vec<BoxJson>,
    pub triangles: Vec<TriangleJson>,
}

fn color_from(rgb: [f32; 3], what: &str) -> Result<Color> {
    let color = Color::from(rgb);
    if !color.is_finite() {
        return Err(Error::InvalidScene(format!("{} has a non-finite color", what)));
    }

    Ok(color)
}

fn point_from(p: [f32; 3], what: &str) -> Result<Tuple3D> {
    let point = Tuple3D::from(p);
    if !point.is_finite() {
        return Err(Error::InvalidScene(format!("{} has a non-finite coordinate", what)));
    }

    Ok(point)
}

impl TryFrom<SphereJson> for Colored<Sphere> {
    type Error = Error;

    fn try_from(sphere_json: SphereJson) -> Result<Colored<Sphere>> {
        let center = point_from(sphere_json.center, "sphere")?;
        if !sphere_json.radius.is_finite() || sphere_json.radius <= 0.0 {
            return Err(Error::InvalidScene(format!(
                "sphere radius must be positive, got {}", sphere_json.radius
            )));
        }

        Ok(Colored::new(
            Sphere::new(center, sphere_json.radius),
            color_from(sphere_json.color, "sphere")?
        ))
    }
}

impl TryFrom<BoxJson> for Colored<Obb> {
    type Error = Error;

    fn try_from(box_json: BoxJson) -> Result<Colored<Obb>> {
        let center = point_from(box_json.center, "box")?;
        let length = point_from(box_json.length, "box")?;
        let height = point_from(box_json.height, "box")?;

        if length.magnitude() < FEQ_EPSILON || height.magnitude() < FEQ_EPSILON {
            return Err(Error::InvalidScene(
                "box edge vectors must be non-zero".to_string()
            ));
        }

        if length.cross(&height).magnitude() < FEQ_EPSILON {
            return Err(Error::InvalidScene(
                "box edge vectors must not be parallel".to_string()
            ));
        }

        if !box_json.width.is_finite() || box_json.width < 0.0 {
            return Err(Error::InvalidScene(format!(
                "box width must not be negative, got {}", box_json.width
            )));
        }

        Ok(Colored::new(
            Obb::new(center, length, height, box_json.width),
            color_from(box_json.color, "box")?
        ))
    }
}

impl TryFrom<TriangleJson> for Colored<Triangle> {
    type Error = Error;

    fn try_from(triangle_json: TriangleJson) -> Result<Colored<Triangle>> {
        let [a, b, c] = triangle_json.vertices;
        let triangle = Triangle::new(
            point_from(a, "triangle")?,
            point_from(b, "triangle")?,
            point_from(c, "triangle")?
        );

        if triangle.double_area() < FEQ_EPSILON {
            return Err(Error::InvalidScene(format!(
                "triangle {:?} is degenerate", triangle.vertices
            )));
        }

        Ok(Colored::new(triangle, color_from(triangle_json.color, "triangle")?))
    }
}

impl TryFrom<SceneJson> for Scene {
    type Error = Error;

    fn try_from(scene_json: SceneJson) -> Result<Scene> {
        let camera = Camera::try_from(scene_json.camera)?;

        Ok(Scene {
            camera,
            spheres: scene_json.spheres.into_iter()
                .map(Colored::try_from)
                .collect::<Result<_>>()?,
            boxes: scene_json.boxes.into_iter()
                .map(Colored::try_from)
                .collect::<Result<_>>()?,
            triangles: scene_json.triangles.into_iter()
                .map(Colored::try_from)
                .collect::<Result<_>>()?,
            triangle_policy: scene_json.triangle_policy,
        })
    }
}

/* Culling */

/// An entity placed in the world by its transform.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: usize,
    pub transform: Matrix4D,
}

impl Located for Entity {
    fn world_position(&self) -> Tuple3D {
        self.transform.translation_part()
    }
}

/// Entities spread over the ground plane, indexed by a quadtree and viewed
/// by a camera.
#[derive(Clone, Debug)]
pub struct CullingScene {
    pub camera: Camera,
    pub entities: Vec<Entity>,
    pub tree: QuadTree<Entity>,
}

impl CullingScene {
    /// Builds the tree over `transforms`, covering `width` by `height`
    /// around `origin`. Entity ids are positions in `transforms`.
    pub fn new(camera: Camera, transforms: Vec<Matrix4D>, origin: Tuple2D,
        width: f32, height: f32, config: QuadTreeConfig) -> CullingScene {
        let entities: Vec<Entity> = transforms.into_iter()
            .enumerate()
            .map(|(id, transform)| Entity { id, transform })
            .collect();

        let mut tree = QuadTree::with_config(origin, width, height, config);
        tree.extend(entities.iter().copied());
        info!("indexed {} entities in {} quadtree nodes", entities.len(),
            tree.root().node_count());

        CullingScene { camera, entities, tree }
    }

    /// Ten crates on a `CRATE_SPREAD` square ground plane, each turned about
    /// its vertical axis, seen from the origin looking down `-z`.
    pub fn demo() -> CullingScene {
        let positions = [
            (-20.0, -18.0), (-8.5, -21.0), (3.0, -12.0), (14.0, -19.5),
            (21.0, -4.0), (-16.0, 2.5), (-3.5, 7.0), (9.0, 11.0),
            (-22.0, 19.0), (17.5, 22.0),
        ];
        let entities = positions.iter()
            .enumerate()
            .map(|(i, &(x, z))| Matrix4D::translation(x, 1.0, z)
                * Matrix4D::rotation_y(i as f32 * 0.6))
            .collect();

        CullingScene::new(Camera::default(), entities, Tuple2D::new(0.0, 0.0),
            CRATE_SPREAD, CRATE_SPREAD, QuadTreeConfig::default())
    }

    pub fn from_json(json: &str) -> Result<CullingScene> {
        let culling_json: CullingSceneJson = serde_json::from_str(json)?;
        CullingScene::try_from(culling_json)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<CullingScene> {
        let path = path.as_ref();
        let scene = CullingScene::from_json(&fs::read_to_string(path)?)?;

        info!("loaded culling scene {} ({} entities)", path.display(),
            scene.entities.len());
        Ok(scene)
    }

    /// Leaves inside the camera's view.
    pub fn visible_nodes(&self) -> Vec<&QuadTreeNode<Entity>> {
        self.tree.root().nodes_intersecting_frustum(self.camera.position,
            self.camera.facing(), &self.camera.frustum)
    }

    /// Nodes outside the camera's view.
    pub fn culled_nodes(&self) -> Vec<&QuadTreeNode<Entity>> {
        self.tree.root().nodes_not_intersecting_frustum(self.camera.position,
            self.camera.facing(), &self.camera.frustum)
    }

    /// Ids of the indexed entities that lie on a visible leaf, ascending.
    ///
    /// Entities on a quadrant seam, or accepted before their node split,
    /// are only held by an ancestor, so each entity is matched by position
    /// against the closed bounds of the visible leaves.
    pub fn visible_entities(&self) -> Vec<usize> {
        let leaves = self.visible_nodes();
        let mut visible: Vec<usize> = self.tree.root().entities().iter()
            .filter(|e| {
                let p = e.world_position().xz();
                leaves.iter().any(|leaf| leaf.covers(p))
            })
            .map(|e| e.id)
            .collect();
        visible.sort_unstable();

        visible
    }
}

/// A culling scene as stored on disk. Entities are given by position.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CullingSceneJson {
    pub camera: CameraJson,
    pub origin: [f32; 2],
    pub width: f32,
    pub height: f32,
    pub quadtree: QuadTreeConfig,
    pub entities: Vec<[f32; 3]>,
}

impl Default for CullingSceneJson {
    fn default() -> CullingSceneJson {
        CullingSceneJson {
            camera: Default::default(),
            origin: [0.0, 0.0],
            width: CRATE_SPREAD,
            height: CRATE_SPREAD,
            quadtree: Default::default(),
            entities: Vec::new(),
        }
    }
}

impl TryFrom<CullingSceneJson> for CullingScene {
    type Error = Error;

    fn try_from(culling_json: CullingSceneJson) -> Result<CullingScene> {
        let camera = Camera::try_from(culling_json.camera)?;

        let (width, height) = (culling_json.width, culling_json.height);
        if !width.is_finite() || !height.is_finite() || width <= 0.0
            || height <= 0.0 {
            return Err(Error::InvalidScene(format!(
                "ground plane {}x{} is not positive", width, height
            )));
        }

        let entities = culling_json.entities.into_iter()
            .map(|p| {
                let p = point_from(p, "entity")?;
                Ok(Matrix4D::translation(p.x, p.y, p.z))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CullingScene::new(camera, entities, culling_json.origin.into(),
            width, height, culling_json.quadtree))
    }
}

/* Tests */

#[test]
fn demo_center_pixel_sees_red_sphere() {
    let scene = Scene::demo();
    let (w, h) = scene.camera.canvas_size();
    let ray = scene.camera.ray_for_pixel(w / 2, h / 2);

    assert_eq!(scene.intersect_ray_vs_scene(&ray), Color::rgb(1.0, 0.0, 0.0));
}

#[test]
fn empty_scene_is_black() {
    let scene = Scene::new(Camera::default());
    let ray = Ray::new(Tuple3D::zero(), Tuple3D::new(0.0, 0.0, -1.0));

    assert_eq!(scene.intersect_ray_vs_scene(&ray), Color::black());
    assert!(scene.nearest_hit(&ray).is_none());
}

#[test]
fn nearest_primitive_wins() {
    let mut scene = Scene::new(Camera::default());
    scene.spheres.push(Colored::new(
        Sphere::new(Tuple3D::new(0.0, 0.0, -20.0), 1.0),
        Color::rgb(1.0, 0.0, 0.0)
    ));
    scene.boxes.push(Colored::new(
        Obb::axis_aligned(Tuple3D::new(0.0, 0.0, -10.0),
            Tuple3D::new(1.0, 1.0, 1.0)),
        Color::rgb(0.0, 1.0, 0.0)
    ));
    let ray = Ray::new(Tuple3D::zero(), Tuple3D::new(0.0, 0.0, -1.0));

    let (hit, color) = scene.nearest_hit(&ray).unwrap();
    assert!(crate::feq(hit.t, 9.0));
    assert_eq!(color, Color::rgb(0.0, 1.0, 0.0));
}

#[test]
fn ties_keep_the_earlier_primitive() {
    let mut scene = Scene::new(Camera::default());
    let sphere = Sphere::new(Tuple3D::new(0.0, 0.0, -10.0), 1.0);
    scene.spheres.push(Colored::new(sphere, Color::rgb(1.0, 0.0, 0.0)));
    scene.spheres.push(Colored::new(sphere, Color::rgb(0.0, 0.0, 1.0)));
    let ray = Ray::new(Tuple3D::zero(), Tuple3D::new(0.0, 0.0, -1.0));

    assert_eq!(scene.intersect_ray_vs_scene(&ray), Color::rgb(1.0, 0.0, 0.0));
}

#[test]
fn hits_past_miss_distance_are_ignored() {
    let mut scene = Scene::new(Camera::default());
    scene.spheres.push(Colored::new(
        Sphere::new(Tuple3D::new(0.0, 0.0, -200000.0), 1.0),
        Color::rgb(1.0, 0.0, 0.0)
    ));
    let ray = Ray::new(Tuple3D::zero(), Tuple3D::new(0.0, 0.0, -1.0));

    assert_eq!(scene.intersect_ray_vs_scene(&ray), Color::black());
}

#[test]
fn scene_policy_applies_to_triangles() {
    let mut scene = Scene::new(Camera::default());
    scene.triangles.push(Colored::new(
        Triangle::new(
            Tuple3D::new(-1.0, -1.0, 5.0),
            Tuple3D::new(1.0, -1.0, 5.0),
            Tuple3D::new(0.0, 1.0, 5.0)
        ),
        Color::rgb(0.0, 0.0, 1.0)
    ));
    let ray = Ray::new(Tuple3D::zero(), Tuple3D::new(0.0, 0.0, -1.0));

    assert_eq!(scene.intersect_ray_vs_scene(&ray), Color::black());

    scene.triangle_policy = TrianglePolicy::Legacy;
    assert_eq!(scene.intersect_ray_vs_scene(&ray), Color::rgb(0.0, 0.0, 1.0));
}

#[test]
fn scene_json_defaults() {
    let scene = Scene::from_json(r#"{
        "spheres": [
            { "center": [0, 0, -10], "radius": 2, "color": [1, 0, 0] }
        ]
    }"#).unwrap();

    assert_eq!(scene.camera.position, Tuple3D::zero());
    assert_eq!(scene.camera.frustum, Frustum::default());
    assert_eq!(scene.triangle_policy, TrianglePolicy::Strict);
    assert_eq!(scene.spheres.len(), 1);
    assert!(scene.boxes.is_empty());
}

#[test]
fn scene_json_reads_every_primitive() {
    let scene = Scene::from_json(r#"{
        "camera": {
            "position": [0, 0, 5],
            "facing": [0, 0, -2],
            "frustum": { "width": 64, "height": 48 }
        },
        "triangle_policy": "legacy",
        "spheres": [
            { "center": [0, 0, -10], "radius": 2, "color": [1, 0, 0] }
        ],
        "boxes": [
            { "center": [-5, 0, -10], "length": [0, 0, 2], "height": [0, 2, 0],
              "width": 2, "color": [0, 1, 0] }
        ],
        "triangles": [
            { "vertices": [[0, 5, 5], [0, 7, 7], [0, 5, 7]], "color": [0, 0, 1] }
        ]
    }"#).unwrap();

    assert_eq!(scene.camera.facing(), Tuple3D::new(0.0, 0.0, -1.0));
    assert_eq!(scene.camera.canvas_size(), (64, 48));
    assert_eq!(scene.triangle_policy, TrianglePolicy::Legacy);
    assert_eq!(scene.boxes[0].geometry.half_lengths, [1.0, 1.0, 1.0]);
    assert_eq!(scene.triangles[0].color, Color::rgb(0.0, 0.0, 1.0));
}

#[test]
fn scene_json_rejects_degenerate_primitives() {
    let bad = [
        r#"{ "spheres": [ { "center": [0, 0, 0], "radius": 0, "color": [1, 0, 0] } ] }"#,
        r#"{ "spheres": [ { "center": [0, 0, 0], "radius": -1, "color": [1, 0, 0] } ] }"#,
        r#"{ "boxes": [ { "center": [0, 0, 0], "length": [0, 0, 0], "height": [0, 1, 0],
              "width": 1, "color": [0, 1, 0] } ] }"#,
        r#"{ "boxes": [ { "center": [0, 0, 0], "length": [1, 0, 0], "height": [0, 1, 0],
              "width": -1, "color": [0, 1, 0] } ] }"#,
        r#"{ "triangles": [ { "vertices": [[0, 0, 0], [1, 1, 1], [2, 2, 2]],
              "color": [0, 0, 1] } ] }"#,
        r#"{ "camera": { "facing": [0, 0, 0] } }"#,
        r#"{ "camera": { "frustum": { "near": 10, "far": 1 } } }"#,
        r#"{ "camera": { "frustum": { "width": 1e30 } } }"#,
    ];

    for json in bad.iter() {
        assert!(Scene::from_json(json).is_err(), "accepted {}", json);
    }

    assert!(matches!(Scene::from_json("{ \"spheres\": 3 }"), Err(Error::Json(_))));
}

#[test]
fn culling_demo_sees_crates_ahead() {
    let scene = CullingScene::demo();
    let visible = scene.visible_entities();

    // The camera looks down -z from the origin; crates behind it are culled.
    assert!(!visible.is_empty());
    for i in visible.iter() {
        assert!(scene.entities[*i].world_position().z < 0.0);
    }
    assert!(!visible.contains(&9));
}

#[test]
fn culling_nodes_partition_the_root() {
    let scene = CullingScene::demo();
    let area = |nodes: Vec<&QuadTreeNode<Entity>>| -> f32 {
        nodes.iter().map(|n| n.width * n.height).sum()
    };

    let total = area(scene.visible_nodes()) + area(scene.culled_nodes());
    let root = scene.tree.root();
    assert!((total - root.width * root.height).abs() < 1e-2);
}

#[test]
fn culling_json_builds_tree() {
    let scene = CullingScene::from_json(r#"{
        "width": 100,
        "height": 100,
        "quadtree": { "capacity": 1, "max_depth": 2 },
        "entities": [[10, 0, 10], [-30, 0, -30]]
    }"#).unwrap();

    assert_eq!(scene.entities.len(), 2);
    assert_eq!(scene.tree.config().max_depth, 2);
    let ids: Vec<usize> = scene.tree.root().entities().iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(ids, vec![0, 1]);
    assert_eq!(scene.visible_entities(), vec![1]);
}

#[test]
fn entity_on_quadrant_seam_is_visible() {
    let scene = CullingScene::from_json(r#"{
        "width": 100,
        "height": 100,
        "entities": [[0, 0, -10]]
    }"#).unwrap();

    // Only the root holds it; neither child accepts a point on their seam.
    let children = scene.tree.root().children().expect("root should split");
    assert!(children.iter().all(|c| c.entities().is_empty()));
    assert_eq!(scene.visible_entities(), vec![0]);
}

#[test]
fn entity_kept_above_split_is_visible() {
    let scene = CullingScene::from_json(r#"{
        "width": 100,
        "height": 100,
        "quadtree": { "capacity": 2, "max_depth": 4 },
        "entities": [[-3, 0, -10], [20, 0, 30]]
    }"#).unwrap();

    // The first entity arrived before the root split and stays there.
    let children = scene.tree.root().children().expect("root should split");
    assert!(children[0].entities().is_empty());
    assert_eq!(children[3].entities().len(), 1);
    assert_eq!(scene.visible_entities(), vec![0]);
}

#[test]
fn entities_outside_the_ground_are_never_visible() {
    let scene = CullingScene::from_json(r#"{
        "width": 10,
        "height": 10,
        "entities": [[0, 0, -20], [1, 0, -2]]
    }"#).unwrap();

    assert_eq!(scene.visible_entities(), vec![1]);
}

#[test]
fn culling_json_rejects_empty_ground() {
    assert!(CullingScene::from_json(r#"{ "width": 0 }"#).is_err());
}
