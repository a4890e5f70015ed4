pub mod consts;
pub mod error;

pub mod tuple;
pub mod matrix;
pub mod ray;

pub mod frustum;
pub mod quadtree;

pub mod geometry;
pub mod intersect;

pub mod color;
pub mod canvas;
pub mod camera;
pub mod scene;
pub mod parallel;

use consts::FEQ_EPSILON;

pub fn feq(left: f32, right: f32) -> bool {
    (left - right).abs() < FEQ_EPSILON
}
