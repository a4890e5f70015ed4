use serde::{ Serialize, Deserialize };

use crate::geometry::{ Sphere, Obb, Triangle };
use crate::ray::Ray;
use crate::tuple::Tuple3D;

/// A ray hit.
///
/// `t` is the ray parameter of the hit point and `normal` is the unit surface
/// normal there, always turned against the ray (`dot(direction, normal) <= 0`).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Intersection {
    pub t: f32,
    pub normal: Tuple3D,
}

/// How permissive the triangle test is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrianglePolicy {
    /// Any `t` is a hit, including points behind the ray origin.
    Legacy,

    /// Hits behind the ray origin (`t < 0`) are rejected.
    Strict,
}

impl Default for TrianglePolicy {
    fn default() -> TrianglePolicy {
        TrianglePolicy::Strict
    }
}

/// A primitive a ray can hit.
///
/// Implementations report the nearest forward hit, or `None`.
pub trait Intersect {
    fn intersect(&self, ray: &Ray) -> Option<Intersection>;
}

impl Intersect for Sphere {
    fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        ray.intersect_sphere(self)
    }
}

impl Intersect for Obb {
    fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        ray.intersect_obb(self)
    }
}

impl Intersect for Triangle {
    fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        ray.intersect_triangle_with(self, TrianglePolicy::default())
    }
}

/// Flips `normal` if it points along `direction`.
fn against(normal: Tuple3D, direction: Tuple3D) -> Tuple3D {
    if direction.dot(&normal) > 0.0 {
        -normal
    } else {
        normal
    }
}

impl Ray {
    pub fn intersect<S: Intersect + ?Sized>(&self, shape: &S)
        -> Option<Intersection> {
        shape.intersect(self)
    }

    /// Intersects the ray with a sphere.
    ///
    /// From outside the sphere the entry point is reported. From inside (or
    /// on the surface) the exit point is reported, so the hit is never
    /// behind the origin.
    pub fn intersect_sphere(&self, sphere: &Sphere) -> Option<Intersection> {
        let displacement = sphere.center - self.origin;
        let radius_sq = sphere.radius * sphere.radius;
        let proj = displacement.dot(&self.direction);
        let distance_sq = displacement.dot(&displacement);

        // Sphere behind an origin that lies outside it.
        if proj < 0.0 && distance_sq > radius_sq {
            return None;
        }

        let closest_approach_sq = distance_sq - proj * proj;
        if closest_approach_sq > radius_sq {
            return None;
        }

        let q = (radius_sq - closest_approach_sq).sqrt();
        let t = if distance_sq > radius_sq { proj - q } else { proj + q };
        let outward = (self.position(t) - sphere.center).normalize();

        Some(Intersection { t, normal: against(outward, self.direction) })
    }

    /// Intersects the ray with an oriented box using the slab method.
    ///
    /// From outside the box the entry face is reported. From inside, the hit
    /// is the exit face with its normal turned back toward the origin. A ray
    /// with no usable direction component along any box axis misses.
    pub fn intersect_obb(&self, obb: &Obb) -> Option<Intersection> {
        let mut tmin = f32::NEG_INFINITY;
        let mut tmax = f32::INFINITY;
        let mut entry_axis = None;
        let mut exit_axis = None;

        let displacement = obb.center - self.origin;
        for (axis, half) in obb.axes.iter().zip(obb.half_lengths.iter()) {
            let e = axis.dot(&displacement);
            let f = axis.dot(&self.direction);

            if f.abs() > f32::EPSILON {
                let mut t0 = (e + half) / f;
                let mut t1 = (e - half) / f;
                if t0 > t1 {
                    std::mem::swap(&mut t0, &mut t1);
                }

                if t0 > tmin {
                    tmin = t0;
                    entry_axis = Some(*axis);
                }

                if t1 < tmax {
                    tmax = t1;
                    exit_axis = Some(*axis);
                }

                if tmin > tmax || tmax < 0.0 {
                    return None;
                }
            } else if -e - half > 0.0 || -e + half < 0.0 {
                // Parallel to this slab and outside it.
                return None;
            }
        }

        let (t, axis) = if tmin > 0.0 {
            (tmin, entry_axis?)
        } else {
            (tmax, exit_axis?)
        };

        Some(Intersection { t, normal: against(axis, self.direction) })
    }

    /// Intersects the ray with a triangle using the default (strict) policy.
    pub fn intersect_triangle(&self, triangle: &Triangle)
        -> Option<Intersection> {
        self.intersect_triangle_with(triangle, TrianglePolicy::default())
    }

    /// Intersects the ray with a triangle by solving for `t` and the
    /// barycentric coordinates `u`, `v` (Moller-Trumbore).
    ///
    /// Rays parallel to the triangle's plane miss. `u <= 1` needs no check of
    /// its own: `v >= 0` and `u + v <= 1` already bound it.
    pub fn intersect_triangle_with(&self, triangle: &Triangle,
        policy: TrianglePolicy) -> Option<Intersection> {
        let (e1, e2) = triangle.edges();
        let q = self.direction.cross(&e2);
        let a = e1.dot(&q);

        if a.abs() < f32::EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = self.origin - triangle.vertices[0];
        let u = f * s.dot(&q);
        if u < 0.0 {
            return None;
        }

        let r = s.cross(&e1);
        let v = f * self.direction.dot(&r);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * e2.dot(&r);
        if policy == TrianglePolicy::Strict && t < 0.0 {
            return None;
        }

        let normal = e1.cross(&e2).normalize();
        Some(Intersection { t, normal: against(normal, self.direction) })
    }
}

/* Tests */

#[cfg(test)]
use approx::assert_relative_eq;

#[cfg(test)]
fn forward_ray() -> Ray {
    Ray::new(Tuple3D::zero(), Tuple3D::new(0.0, 0.0, -1.0))
}

#[test]
fn sphere_hit_in_front() {
    let s = Sphere::new(Tuple3D::new(0.0, 0.0, -10.0), 2.0);
    let i = forward_ray().intersect(&s).expect("ray should hit the sphere");

    assert_relative_eq!(i.t, 8.0, epsilon = 1e-5);
    assert_eq!(i.normal, Tuple3D::new(0.0, 0.0, 1.0));
}

#[test]
fn sphere_miss_to_the_side() {
    let s = Sphere::new(Tuple3D::new(5.0, 0.0, -10.0), 2.0);

    assert_eq!(forward_ray().intersect(&s), None);
}

#[test]
fn sphere_behind_origin() {
    let s = Sphere::new(Tuple3D::new(0.0, 0.0, 10.0), 2.0);

    assert_eq!(forward_ray().intersect(&s), None);
}

#[test]
fn sphere_tangent_ray_hits() {
    let s = Sphere::new(Tuple3D::new(2.0, 0.0, -10.0), 2.0);
    let i = forward_ray().intersect(&s).expect("tangent ray should hit");

    assert_relative_eq!(i.t, 10.0, epsilon = 1e-4);
}

#[test]
fn sphere_from_inside_reports_exit() {
    let s = Sphere::new(Tuple3D::new(0.0, 0.0, -10.0), 2.0);
    let r = Ray::new(Tuple3D::new(0.0, 0.0, -10.0), Tuple3D::new(0.0, 0.0, -1.0));
    let i = r.intersect(&s).expect("ray from inside should hit");

    assert_relative_eq!(i.t, 2.0, epsilon = 1e-5);

    // Outward normal at the exit is (0, 0, -1); it is turned toward the ray.
    assert_eq!(i.normal, Tuple3D::new(0.0, 0.0, 1.0));
}

#[test]
fn sphere_entry_and_exit_lie_on_surface() {
    let radius = 3.0;
    let s = Sphere::new(Tuple3D::zero(), radius);
    let direction = Tuple3D::new(1.0, 1.0, 1.0).normalize();

    let outside = Ray::new(-10.0 * direction, direction);
    let entry = outside.intersect(&s).expect("ray should enter the sphere");
    let p1 = outside.position(entry.t);

    let inside = Ray::new(p1 + 1e-3 * direction, direction);
    let exit = inside.intersect(&s).expect("ray should leave the sphere");
    let p2 = inside.position(exit.t);

    assert_relative_eq!(p1.magnitude(), radius, epsilon = 1e-4);
    assert_relative_eq!(p2.magnitude(), radius, epsilon = 1e-4);
    assert_eq!(p1, -p2);
}

#[test]
fn sphere_zero_direction_misses_from_outside() {
    let s = Sphere::new(Tuple3D::new(0.0, 0.0, -10.0), 2.0);
    let r = Ray::new(Tuple3D::zero(), Tuple3D::zero());

    assert_eq!(r.intersect(&s), None);
}

#[test]
fn obb_axis_aligned_hit() {
    let b = Obb::axis_aligned(
        Tuple3D::new(0.0, 0.0, -10.0),
        Tuple3D::new(1.0, 1.0, 1.0)
    );
    let i = forward_ray().intersect(&b).expect("ray should hit the box");

    assert_relative_eq!(i.t, 9.0, epsilon = 1e-5);
    assert_eq!(i.normal, Tuple3D::new(0.0, 0.0, 1.0));
}

#[test]
fn obb_parallel_outside_slab_misses() {
    let b = Obb::axis_aligned(
        Tuple3D::new(3.0, 0.0, -10.0),
        Tuple3D::new(1.0, 1.0, 1.0)
    );

    assert_eq!(forward_ray().intersect(&b), None);
}

#[test]
fn obb_behind_origin_misses() {
    let b = Obb::axis_aligned(
        Tuple3D::new(0.0, 0.0, 10.0),
        Tuple3D::new(1.0, 1.0, 1.0)
    );

    assert_eq!(forward_ray().intersect(&b), None);
}

#[test]
fn obb_from_inside_reports_exit() {
    let b = Obb::axis_aligned(
        Tuple3D::new(0.0, 0.0, -10.0),
        Tuple3D::new(1.0, 2.0, 3.0)
    );
    let r = Ray::new(Tuple3D::new(0.0, 0.0, -10.0), Tuple3D::new(1.0, 0.0, 0.0));
    let i = r.intersect(&b).expect("ray from inside should hit");

    assert_relative_eq!(i.t, 1.0, epsilon = 1e-5);
    assert_eq!(i.normal, Tuple3D::new(-1.0, 0.0, 0.0));
}

#[test]
fn obb_rotated_hit() {
    // A cube of side sqrt(2) turned 45 degrees about Y: the ray meets its
    // front vertical edge one unit in front of the center.
    let b = Obb::new(
        Tuple3D::new(0.0, 0.0, -10.0),
        Tuple3D::new(1.0, 0.0, 1.0),
        Tuple3D::new(0.0, f32::sqrt(2.0), 0.0),
        f32::sqrt(2.0)
    );
    let i = forward_ray().intersect(&b).expect("ray should hit the box");

    assert_relative_eq!(i.t, 9.0, epsilon = 1e-4);
    assert!(i.normal.dot(&forward_ray().direction) <= 0.0);
}

#[test]
fn obb_zero_direction_misses() {
    let b = Obb::axis_aligned(Tuple3D::zero(), Tuple3D::new(1.0, 1.0, 1.0));
    let r = Ray::new(Tuple3D::zero(), Tuple3D::zero());

    assert_eq!(r.intersect(&b), None);
}

/// Reference slab test for an axis-aligned box: nearest `t >= 0`, if any.
#[cfg(test)]
fn aabb_slab(min: Tuple3D, max: Tuple3D, ray: &Ray) -> Option<f32> {
    let o = [ray.origin.x, ray.origin.y, ray.origin.z];
    let d = [ray.direction.x, ray.direction.y, ray.direction.z];
    let lo = [min.x, min.y, min.z];
    let hi = [max.x, max.y, max.z];

    let mut near = f32::NEG_INFINITY;
    let mut far = f32::INFINITY;
    for i in 0..3 {
        if d[i] == 0.0 {
            if o[i] < lo[i] || o[i] > hi[i] {
                return None;
            }
        } else {
            let a = (lo[i] - o[i]) / d[i];
            let b = (hi[i] - o[i]) / d[i];
            near = near.max(a.min(b));
            far = far.min(a.max(b));
        }
    }

    if near > far || far < 0.0 {
        None
    } else if near > 0.0 {
        Some(near)
    } else {
        Some(far)
    }
}

#[test]
fn obb_matches_aabb_slab_test() {
    let center = Tuple3D::new(1.0, -2.0, 3.0);
    let half = Tuple3D::new(1.0, 2.0, 0.5);
    let b = Obb::new(
        center,
        Tuple3D::new(2.0 * half.x, 0.0, 0.0),
        Tuple3D::new(0.0, 2.0 * half.y, 0.0),
        2.0 * half.z
    );
    assert_eq!(b, Obb::axis_aligned(center, half));

    let directions = [
        Tuple3D::new(1.0, 0.0, 0.0), Tuple3D::new(-1.0, 0.0, 0.0),
        Tuple3D::new(0.0, 1.0, 0.0), Tuple3D::new(0.0, -1.0, 0.0),
        Tuple3D::new(0.0, 0.0, 1.0), Tuple3D::new(0.0, 0.0, -1.0),
    ];
    let offsets = [-3.0, -1.5, -0.25, 0.0, 0.75, 2.5];

    for direction in directions.iter() {
        for a in offsets.iter() {
            for c in offsets.iter() {
                let start = center - 10.0 * *direction;
                let origin = if direction.x != 0.0 {
                    start + Tuple3D::new(0.0, *a, *c)
                } else if direction.y != 0.0 {
                    start + Tuple3D::new(*a, 0.0, *c)
                } else {
                    start + Tuple3D::new(*a, *c, 0.0)
                };

                let ray = Ray::new(origin, *direction);
                let expected = aabb_slab(center - half, center + half, &ray);
                let got = ray.intersect(&b).map(|i| i.t);

                match (expected, got) {
                    (None, None) => {},
                    (Some(e), Some(g)) => assert_relative_eq!(e, g,
                        epsilon = 1e-4),
                    _ => panic!("slab tests disagree for {:?}", ray),
                }
            }
        }
    }
}

#[cfg(test)]
fn sample_triangle() -> Triangle {
    Triangle::new(
        Tuple3D::new(0.0, 0.0, 5.0),
        Tuple3D::new(0.0, 2.0, 5.0),
        Tuple3D::new(2.0, 0.0, 5.0)
    )
}

#[test]
fn triangle_hit_inside() {
    let r = Ray::new(Tuple3D::new(0.5, 0.5, 0.0), Tuple3D::new(0.0, 0.0, 1.0));
    let i = r.intersect(&sample_triangle()).expect("ray should hit");

    assert_relative_eq!(i.t, 5.0, epsilon = 1e-5);
    assert_eq!(i.normal, Tuple3D::new(0.0, 0.0, -1.0));
}

#[test]
fn triangle_hit_at_vertex() {
    let r = Ray::new(Tuple3D::zero(), Tuple3D::new(0.0, 0.0, 1.0));
    let i = r.intersect(&sample_triangle()).expect("vertex should count");

    assert_relative_eq!(i.t, 5.0, epsilon = 1e-5);
}

#[test]
fn triangle_miss_outside_edges() {
    let t = sample_triangle();
    let outside = [(-0.5, 0.5), (0.5, -0.5), (1.5, 1.5), (3.0, 0.0)];

    for &(x, y) in outside.iter() {
        let r = Ray::new(Tuple3D::new(x, y, 0.0), Tuple3D::new(0.0, 0.0, 1.0));
        assert_eq!(r.intersect(&t), None);
    }
}

#[test]
fn triangle_parallel_ray_misses() {
    let r = Ray::new(Tuple3D::new(0.5, 0.5, 5.0), Tuple3D::new(1.0, 0.0, 0.0));

    assert_eq!(r.intersect(&sample_triangle()), None);
}

#[test]
fn triangle_zero_direction_misses() {
    let r = Ray::new(Tuple3D::new(0.5, 0.5, 0.0), Tuple3D::zero());

    assert_eq!(r.intersect(&sample_triangle()), None);
}

#[test]
fn triangle_behind_origin_depends_on_policy() {
    let t = sample_triangle();
    let r = Ray::new(Tuple3D::new(0.5, 0.5, 10.0), Tuple3D::new(0.0, 0.0, 1.0));

    assert_eq!(r.intersect_triangle(&t), None);
    assert_eq!(r.intersect_triangle_with(&t, TrianglePolicy::Strict), None);

    let legacy = r.intersect_triangle_with(&t, TrianglePolicy::Legacy)
        .expect("legacy policy keeps hits behind the origin");
    assert_relative_eq!(legacy.t, -5.0, epsilon = 1e-5);
}

/// Barycentric weights of `p` for the first, second and third vertex.
#[cfg(test)]
fn barycentric(t: &Triangle, p: Tuple3D) -> (f32, f32, f32) {
    let (e1, e2) = t.edges();
    let w = p - t.vertices[0];

    let d11 = e1.dot(&e1);
    let d12 = e1.dot(&e2);
    let d22 = e2.dot(&e2);
    let dw1 = w.dot(&e1);
    let dw2 = w.dot(&e2);
    let denom = d11 * d22 - d12 * d12;

    let u = (d22 * dw1 - d12 * dw2) / denom;
    let v = (d11 * dw2 - d12 * dw1) / denom;

    (1.0 - u - v, u, v)
}

#[test]
fn triangle_hits_have_valid_barycentrics() {
    let t = Triangle::new(
        Tuple3D::new(-1.0, 0.0, -4.0),
        Tuple3D::new(2.0, 1.0, -6.0),
        Tuple3D::new(0.0, 3.0, -5.0)
    );
    let origin = Tuple3D::new(0.0, 1.0, 2.0);
    let mut hits = 0;

    for i in -10..=10 {
        for j in -10..=10 {
            let target = Tuple3D::new(i as f32 * 0.2, j as f32 * 0.2, -5.0);
            let r = Ray::new(origin, (target - origin).normalize());

            if let Some(hit) = r.intersect(&t) {
                hits += 1;
                let (a, b, c) = barycentric(&t, r.position(hit.t));
                for w in [a, b, c].iter() {
                    assert!(*w >= -1e-4 && *w <= 1.0 + 1e-4);
                }
                assert!(hit.normal.dot(&r.direction) <= 0.0);
            }
        }
    }

    assert!(hits > 0);
}

#[test]
fn normals_oppose_the_ray() {
    let s = Sphere::new(Tuple3D::new(0.0, 0.0, -10.0), 2.0);
    let b = Obb::new(
        Tuple3D::new(0.0, 0.0, -10.0),
        Tuple3D::new(1.0, 0.0, 1.0),
        Tuple3D::new(1.0, 0.0, -1.0),
        3.0
    );
    let origins = [
        Tuple3D::zero(),
        Tuple3D::new(0.0, 0.0, -10.0),
        Tuple3D::new(0.5, 0.2, -9.5),
        Tuple3D::new(-6.0, 1.0, -4.0),
    ];
    let directions = [
        Tuple3D::new(0.0, 0.0, -1.0),
        Tuple3D::new(0.3, -0.1, -1.0).normalize(),
        Tuple3D::new(1.0, 0.0, -1.0).normalize(),
        Tuple3D::new(0.0, 1.0, 0.0),
    ];

    for o in origins.iter() {
        for d in directions.iter() {
            let r = Ray::new(*o, *d);
            let hits = [r.intersect(&s), r.intersect(&b)];

            for hit in hits.iter().flatten() {
                assert!(hit.normal.dot(d) <= 0.0);
                assert!(hit.t >= 0.0);
            }
        }
    }
}
