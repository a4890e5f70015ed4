use serde::{ Serialize, Deserialize };

use crate::consts::{ PERSPECTIVE_NEAR, PERSPECTIVE_FAR,
    PERSPECTIVE_FOV_DEGREES, VIEWPORT_WIDTH, VIEWPORT_HEIGHT, VIEWPORT_MAX };
use crate::error::{ Error, Result };
use crate::matrix::Matrix3D;
use crate::tuple::Tuple3D;

/// A symmetric perspective view volume.
///
/// The pyramid starts at the camera, is clipped by the `near` and `far`
/// distances along the facing direction, and opens by `fov_y` radians
/// vertically. The horizontal opening follows from the viewport aspect ratio
/// `width / height`.
///
/// Fields are public so a camera can update `width` and `height` on resize;
/// use `Frustum::new` to get a validated value. Fields missing from a scene
/// description take their default values.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Frustum {
    pub near: f32,
    pub far: f32,
    pub fov_y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for Frustum {
    fn default() -> Frustum {
        Frustum {
            near: PERSPECTIVE_NEAR,
            far: PERSPECTIVE_FAR,
            fov_y: PERSPECTIVE_FOV_DEGREES.to_radians(),
            width: VIEWPORT_WIDTH,
            height: VIEWPORT_HEIGHT,
        }
    }
}

impl Frustum {
    /// Creates a frustum, rejecting parameters that don't form a pyramid.
    ///
    /// Requires `0 < near < far`, `0 < fov_y < PI` and a positive viewport no
    /// larger than `VIEWPORT_MAX` on either side.
    pub fn new(near: f32, far: f32, fov_y: f32, width: f32, height: f32)
        -> Result<Frustum> {
        let frustum = Frustum { near, far, fov_y, width, height };
        frustum.validate()?;

        Ok(frustum)
    }

    /// Checks the frustum invariants.
    pub fn validate(&self) -> Result<()> {
        let values = [self.near, self.far, self.fov_y, self.width, self.height];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidFrustum(
                format!("non-finite parameter in {:?}", self)
            ));
        }

        if self.near <= 0.0 || self.far <= self.near {
            return Err(Error::InvalidFrustum(format!(
                "expected 0 < near < far, got near {} and far {}",
                self.near, self.far
            )));
        }

        if self.fov_y <= 0.0 || self.fov_y >= std::f32::consts::PI {
            return Err(Error::InvalidFrustum(format!(
                "vertical field of view {} is outside (0, PI)", self.fov_y
            )));
        }

        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(Error::InvalidFrustum(format!(
                "viewport {}x{} is not positive", self.width, self.height
            )));
        }

        if self.width > VIEWPORT_MAX || self.height > VIEWPORT_MAX {
            return Err(Error::InvalidFrustum(format!(
                "viewport {}x{} exceeds {} pixels per side",
                self.width, self.height, VIEWPORT_MAX
            )));
        }

        Ok(())
    }

    /// Half-extents of the view pyramid at unit distance, `(x, y)`.
    ///
    /// `y = tan(fov_y / 2)` and `x = y * width / height`.
    pub fn offsets(&self) -> (f32, f32) {
        let offset_y = (self.fov_y * 0.5).tan();
        let offset_x = offset_y * (self.width / self.height);

        (offset_x, offset_y)
    }

    /// The eight corners of the frustum in camera-local space.
    ///
    /// Local `+z` is the facing direction. The first four corners lie on the
    /// near plane, the last four on the far plane.
    pub fn local_corners(&self) -> [Tuple3D; 8] {
        let (offset_x, offset_y) = self.offsets();
        let mut corners = [Tuple3D::zero(); 8];

        for (i, d) in [self.near, self.far].iter().enumerate() {
            corners[i * 4]     = *d * Tuple3D::new(-offset_x, -offset_y, 1.0);
            corners[i * 4 + 1] = *d * Tuple3D::new( offset_x, -offset_y, 1.0);
            corners[i * 4 + 2] = *d * Tuple3D::new(-offset_x,  offset_y, 1.0);
            corners[i * 4 + 3] = *d * Tuple3D::new( offset_x,  offset_y, 1.0);
        }

        corners
    }

    /// The eight corners of the frustum for a camera at `position` looking
    /// along the unit vector `facing`.
    pub fn world_corners(&self, position: Tuple3D, facing: Tuple3D)
        -> [Tuple3D; 8] {
        let rotation = Matrix3D::camera_basis(facing);
        let mut corners = self.local_corners();

        for corner in corners.iter_mut() {
            *corner = rotation * *corner + position;
        }

        corners
    }
}

#[test]
fn default_frustum_is_valid() {
    assert!(Frustum::default().validate().is_ok());
}

#[test]
fn reject_degenerate_frustums() {
    use std::f32::consts::PI;

    assert!(Frustum::new(0.0, 100.0, 1.0, 800.0, 600.0).is_err());
    assert!(Frustum::new(10.0, 10.0, 1.0, 800.0, 600.0).is_err());
    assert!(Frustum::new(1.0, 100.0, 0.0, 800.0, 600.0).is_err());
    assert!(Frustum::new(1.0, 100.0, PI, 800.0, 600.0).is_err());
    assert!(Frustum::new(1.0, 100.0, 1.0, 800.0, 0.0).is_err());
    assert!(Frustum::new(1.0, 100.0, 1.0, -1.0, 600.0).is_err());
    assert!(Frustum::new(1.0, f32::NAN, 1.0, 800.0, 600.0).is_err());
}

#[test]
fn reject_oversized_viewport() {
    assert!(Frustum::new(1.0, 100.0, 1.0, 1e30, 600.0).is_err());
    assert!(Frustum::new(1.0, 100.0, 1.0, 800.0, VIEWPORT_MAX + 1.0).is_err());
    assert!(Frustum::new(1.0, 100.0, 1.0, VIEWPORT_MAX, VIEWPORT_MAX).is_ok());
}

#[test]
fn offsets_follow_aspect_ratio() {
    use approx::assert_relative_eq;

    let f = Frustum::new(1.0, 10.0, std::f32::consts::FRAC_PI_2, 200.0, 100.0)
        .unwrap();
    let (x, y) = f.offsets();

    assert_relative_eq!(y, 1.0, epsilon = 1e-6);
    assert_relative_eq!(x, 2.0, epsilon = 1e-6);
}

#[test]
fn local_corners_scale_with_distance() {
    let f = Frustum::new(1.0, 10.0, std::f32::consts::FRAC_PI_2, 100.0, 100.0)
        .unwrap();
    let c = f.local_corners();

    assert_eq!(c[0], Tuple3D::new(-1.0, -1.0, 1.0));
    assert_eq!(c[3], Tuple3D::new(1.0, 1.0, 1.0));
    assert_eq!(c[4], Tuple3D::new(-10.0, -10.0, 10.0));
    assert_eq!(c[7], Tuple3D::new(10.0, 10.0, 10.0));
}

#[test]
fn world_corners_follow_camera() {
    let f = Frustum::new(1.0, 10.0, std::f32::consts::FRAC_PI_2, 100.0, 100.0)
        .unwrap();
    let position = Tuple3D::new(5.0, 0.0, 5.0);
    let c = f.world_corners(position, Tuple3D::new(0.0, 0.0, -1.0));

    // Camera-local +x is world +x when looking down -z.
    assert_eq!(c[1], Tuple3D::new(6.0, -1.0, 4.0));
    assert_eq!(c[6], Tuple3D::new(-5.0, 10.0, -5.0));
}
