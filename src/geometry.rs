use crate::tuple::Tuple3D;

/// A sphere given by its center and radius.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sphere {
    pub center: Tuple3D,
    pub radius: f32,
}

impl Default for Sphere {
    fn default() -> Sphere {
        Sphere { center: Tuple3D::zero(), radius: 1.0 }
    }
}

impl Sphere {
    pub fn new(center: Tuple3D, radius: f32) -> Sphere {
        Sphere { center, radius }
    }
}

/// An oriented bounding box.
///
/// `axes` are the unit directions of the box's three sides and
/// `half_lengths[i]` is the distance from the center to the faces crossed by
/// `axes[i]`. The axes are expected to be orthogonal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Obb {
    pub center: Tuple3D,
    pub axes: [Tuple3D; 3],
    pub half_lengths: [f32; 3],
}

/// A unit cube centered on the origin.
impl Default for Obb {
    fn default() -> Obb {
        Obb::axis_aligned(Tuple3D::zero(), Tuple3D::new(0.5, 0.5, 0.5))
    }
}

impl Obb {
    /// Creates a box from two edge vectors and a width.
    ///
    /// `length` and `height` are full edges of the box; the third side runs
    /// along `length x height` and spans `width`. Zero-length edges produce
    /// non-finite axes.
    pub fn new(center: Tuple3D, length: Tuple3D, height: Tuple3D, width: f32)
        -> Obb {
        let length_magnitude = length.magnitude();
        let height_magnitude = height.magnitude();

        Obb {
            center,
            axes: [
                length / length_magnitude,
                height / height_magnitude,
                length.cross(&height).normalize(),
            ],
            half_lengths: [
                length_magnitude * 0.5,
                height_magnitude * 0.5,
                width * 0.5,
            ],
        }
    }

    /// Creates a box aligned with the world axes.
    pub fn axis_aligned(center: Tuple3D, half_lengths: Tuple3D) -> Obb {
        Obb {
            center,
            axes: [
                Tuple3D::new(1.0, 0.0, 0.0),
                Tuple3D::new(0.0, 1.0, 0.0),
                Tuple3D::new(0.0, 0.0, 1.0),
            ],
            half_lengths: [half_lengths.x, half_lengths.y, half_lengths.z],
        }
    }
}

/// A triangle given by its three vertices.
///
/// The winding only matters for `plane_normal`; intersection normals are
/// always turned toward the incoming ray.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Triangle {
    pub vertices: [Tuple3D; 3],
}

impl Default for Triangle {
    fn default() -> Triangle {
        Triangle::new(
            Tuple3D::zero(),
            Tuple3D::new(1.0, 0.0, 0.0),
            Tuple3D::new(0.0, 1.0, 0.0),
        )
    }
}

impl Triangle {
    pub fn new(a: Tuple3D, b: Tuple3D, c: Tuple3D) -> Triangle {
        Triangle { vertices: [a, b, c] }
    }

    /// The two edges leaving the first vertex.
    pub fn edges(&self) -> (Tuple3D, Tuple3D) {
        (
            self.vertices[1] - self.vertices[0],
            self.vertices[2] - self.vertices[0],
        )
    }

    /// Twice the triangle's area. Zero for collinear vertices.
    pub fn double_area(&self) -> f32 {
        let (e1, e2) = self.edges();
        e1.cross(&e2).magnitude()
    }

    /// Unit normal following the winding `v0 -> v1 -> v2`.
    pub fn plane_normal(&self) -> Tuple3D {
        let (e1, e2) = self.edges();
        e1.cross(&e2).normalize()
    }
}

/* Tests */

#[test]
fn obb_from_edges() {
    let b = Obb::new(
        Tuple3D::new(-5.0, 0.0, -10.0),
        Tuple3D::new(0.0, 0.0, 2.0),
        Tuple3D::new(0.0, 2.0, 0.0),
        2.0
    );

    assert_eq!(b.axes[0], Tuple3D::new(0.0, 0.0, 1.0));
    assert_eq!(b.axes[1], Tuple3D::new(0.0, 1.0, 0.0));
    assert_eq!(b.axes[2], Tuple3D::new(-1.0, 0.0, 0.0));
    assert_eq!(b.half_lengths, [1.0, 1.0, 1.0]);
}

#[test]
fn obb_from_diagonal_edges() {
    let b = Obb::new(
        Tuple3D::zero(),
        Tuple3D::new(1.0, 0.0, 1.0),
        Tuple3D::new(1.0, 0.0, -1.0),
        3.0
    );
    let h = f32::sqrt(2.0) / 2.0;

    assert_eq!(b.axes[0], Tuple3D::new(h, 0.0, h));
    assert_eq!(b.axes[1], Tuple3D::new(h, 0.0, -h));
    assert_eq!(b.axes[2], Tuple3D::new(0.0, 1.0, 0.0));
    assert!(crate::feq(b.half_lengths[0], h));
    assert!(crate::feq(b.half_lengths[2], 1.5));

    for i in 0..3 {
        for j in (i + 1)..3 {
            assert!(crate::feq(b.axes[i].dot(&b.axes[j]), 0.0));
        }
    }
}

#[test]
fn obb_with_zero_edge_is_not_finite() {
    let b = Obb::new(
        Tuple3D::zero(),
        Tuple3D::zero(),
        Tuple3D::new(0.0, 1.0, 0.0),
        1.0
    );

    assert!(!b.axes[0].is_finite());
}

#[test]
fn triangle_area_and_normal() {
    let t = Triangle::new(
        Tuple3D::new(0.0, 0.0, 5.0),
        Tuple3D::new(2.0, 0.0, 5.0),
        Tuple3D::new(0.0, 2.0, 5.0)
    );

    assert!(crate::feq(t.double_area(), 4.0));
    assert_eq!(t.plane_normal(), Tuple3D::new(0.0, 0.0, 1.0));
}

#[test]
fn collinear_triangle_has_no_area() {
    let t = Triangle::new(
        Tuple3D::new(0.0, 0.0, 0.0),
        Tuple3D::new(1.0, 1.0, 1.0),
        Tuple3D::new(2.0, 2.0, 2.0)
    );

    assert!(crate::feq(t.double_area(), 0.0));
}
