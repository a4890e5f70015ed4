use crate::error::{ Error, Result };
use crate::frustum::Frustum;
use crate::matrix::Matrix3D;
use crate::ray::Ray;
use crate::tuple::Tuple3D;

/// A pinhole camera.
///
/// The camera sits at `position` and looks along the unit vector `facing`;
/// its view volume is `frustum`. The same basis orients the frustum for
/// culling and the primary rays for ray tracing, so both agree on what the
/// camera sees. The basis is derived from `facing`, which can only be set
/// through `new`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Tuple3D,
    pub frustum: Frustum,

    facing: Tuple3D,
    basis: Matrix3D,
}

/// A camera at the origin looking down `-z` with the default frustum.
impl Default for Camera {
    fn default() -> Camera {
        let facing = Tuple3D::new(0.0, 0.0, -1.0);

        Camera {
            position: Tuple3D::zero(),
            facing,
            frustum: Frustum::default(),
            basis: Matrix3D::camera_basis(facing),
        }
    }
}

impl Camera {
    /// The same camera moved to `position`.
    pub fn at(self, position: Tuple3D) -> Camera {
        Camera { position, ..self }
    }

    /// Creates a camera, normalizing `facing`.
    ///
    /// Fails when `facing` is zero, not finite, or vertical (there is no
    /// right vector for a camera looking straight up or down), or when the
    /// frustum is invalid.
    pub fn new(position: Tuple3D, facing: Tuple3D, frustum: Frustum)
        -> Result<Camera> {
        frustum.validate()?;

        let facing = facing.normalize();
        if !facing.is_finite() {
            return Err(Error::InvalidScene(
                "camera facing must be a non-zero vector".to_string()
            ));
        }

        let basis = Matrix3D::camera_basis(facing);
        if !basis.column(0).is_finite() {
            return Err(Error::InvalidScene(
                format!("camera facing {:?} is vertical", facing)
            ));
        }

        Ok(Camera { position, facing, frustum, basis })
    }

    /// The unit viewing direction.
    pub fn facing(&self) -> Tuple3D {
        self.facing
    }

    /// The canvas size implied by the frustum's viewport, in whole pixels.
    pub fn canvas_size(&self) -> (usize, usize) {
        (
            self.frustum.width.round().max(1.0) as usize,
            self.frustum.height.round().max(1.0) as usize,
        )
    }

    /// The primary ray through the center of pixel `(px, py)`.
    ///
    /// Pixel `(0, 0)` is the top-left corner of the image. The direction is
    /// unit length.
    pub fn ray_for_pixel(&self, px: usize, py: usize) -> Ray {
        let (width, height) = self.canvas_size();
        let (offset_x, offset_y) = self.frustum.offsets();

        let ndc_x = 2.0 * (px as f32 + 0.5) / width as f32 - 1.0;
        let ndc_y = 1.0 - 2.0 * (py as f32 + 0.5) / height as f32;

        let local = Tuple3D::new(ndc_x * offset_x, ndc_y * offset_y, 1.0);
        let direction = (self.basis * local).normalize();

        Ray::new(self.position, direction)
    }
}

/* Tests */

#[cfg(test)]
fn square_frustum(size: f32) -> Frustum {
    Frustum::new(1.0, 100.0, std::f32::consts::FRAC_PI_2, size, size).unwrap()
}

#[test]
fn ray_through_center() {
    let c = Camera::new(Tuple3D::new(0.0, 0.0, 5.0),
        Tuple3D::new(0.0, 0.0, -1.0), square_frustum(201.0)).unwrap();
    let r = c.ray_for_pixel(100, 100);

    assert_eq!(r.origin, Tuple3D::new(0.0, 0.0, 5.0));
    assert_eq!(r.direction, Tuple3D::new(0.0, 0.0, -1.0));
}

#[test]
fn ray_through_top_left_corner() {
    let c = Camera::new(Tuple3D::zero(), Tuple3D::new(0.0, 0.0, -1.0),
        square_frustum(2.0)).unwrap();
    let r = c.ray_for_pixel(0, 0);

    // Pixel center at ndc (-0.5, 0.5) with unit offsets.
    let expected = Tuple3D::new(-0.5, 0.5, -1.0).normalize();
    assert_eq!(r.direction, expected);
}

#[test]
fn ray_follows_facing() {
    let c = Camera::new(Tuple3D::new(1.0, 2.0, 3.0), Tuple3D::new(2.0, 0.0, 0.0),
        square_frustum(101.0)).unwrap();
    let r = c.ray_for_pixel(50, 50);

    assert_eq!(c.facing(), Tuple3D::new(1.0, 0.0, 0.0));
    assert_eq!(r.direction, Tuple3D::new(1.0, 0.0, 0.0));
}

#[test]
fn center_ray_matches_facing() {
    let c = Camera::new(Tuple3D::new(4.0, 1.0, -2.0),
        Tuple3D::new(-3.0, 0.0, 4.0), square_frustum(101.0)).unwrap();
    let r = c.ray_for_pixel(50, 50);

    assert_eq!(c.facing(), Tuple3D::new(-0.6, 0.0, 0.8));
    assert_eq!(r.direction, c.facing());

    // Moving the camera keeps its orientation.
    let moved = c.at(Tuple3D::zero());
    assert_eq!(moved.ray_for_pixel(50, 50).direction, c.facing());
}

#[test]
fn canvas_size_rounds_viewport() {
    let f = Frustum::new(1.0, 10.0, 1.0, 799.6, 600.2).unwrap();
    let c = Camera::new(Tuple3D::zero(), Tuple3D::new(0.0, 0.0, -1.0), f)
        .unwrap();

    assert_eq!(c.canvas_size(), (800, 600));
}

#[test]
fn reject_bad_facing() {
    let f = Frustum::default();

    assert!(Camera::new(Tuple3D::zero(), Tuple3D::zero(), f).is_err());
    assert!(Camera::new(Tuple3D::zero(), Tuple3D::new(0.0, 1.0, 0.0), f)
        .is_err());
}
