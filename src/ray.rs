use crate::tuple::Tuple3D;

/// A ray, `origin + t * direction`.
///
/// The direction does not have to be unit length for sphere and box tests,
/// but the triangle test and the frustum culling assume it is; `t` is only a
/// distance when the direction is normalized.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Ray {
    pub origin: Tuple3D,
    pub direction: Tuple3D,
}

impl Ray {
    pub fn new(origin: Tuple3D, direction: Tuple3D) -> Ray {
        Ray { origin, direction }
    }

    pub fn position(&self, t: f32) -> Tuple3D {
        self.origin + (t * self.direction)
    }
}

#[test]
fn ray_position() {
    let r = Ray::new(
                Tuple3D::new(2.0, 3.0, 4.0),
                Tuple3D::new(1.0, 0.0, 0.0)
            );

    assert_eq!(r.position(0.0), Tuple3D::new(2.0, 3.0, 4.0));
    assert_eq!(r.position(1.0), Tuple3D::new(3.0, 3.0, 4.0));
    assert_eq!(r.position(-1.0), Tuple3D::new(1.0, 3.0, 4.0));
    assert_eq!(r.position(2.5), Tuple3D::new(4.5, 3.0, 4.0));
}
