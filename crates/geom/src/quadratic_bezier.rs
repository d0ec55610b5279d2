use crate::scalar::Scalar;
use crate::{Box3D, LineSegment, Point3, Vector3};
use num_traits::NumCast;

/// A 3d curve segment defined by three points: the beginning of the segment, a control
/// point and the end of the segment.
///
/// The curve is defined by equation:
/// ```∀ t ∈ [0..1],  P(t) = (1 - t)² * from + 2 * (1 - t) * t * ctrl + t² * to```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct QuadraticBezierSegment<S> {
    pub from: Point3<S>,
    pub ctrl: Point3<S>,
    pub to: Point3<S>,
}

impl<S: Scalar> QuadraticBezierSegment<S> {
    pub fn cast<NewS: NumCast>(self) -> QuadraticBezierSegment<NewS> {
        QuadraticBezierSegment {
            from: self.from.cast(),
            ctrl: self.ctrl.cast(),
            to: self.to.cast(),
        }
    }

    /// The Bernstein basis of degree 2 evaluated at t.
    ///
    /// The weights always sum to one, which makes them usable to interpolate any
    /// per-point attribute (texture coordinates for example) along the curve.
    #[inline]
    pub fn weights(t: S) -> [S; 3] {
        let one_t = S::ONE - t;
        [one_t * one_t, S::TWO * one_t * t, t * t]
    }

    /// Sample the curve at t (expecting t between 0 and 1).
    pub fn sample(&self, t: S) -> Point3<S> {
        let [w0, w1, w2] = Self::weights(t);

        self.from * w0 + self.ctrl.to_vector() * w1 + self.to.to_vector() * w2
    }

    /// Sample the curve's derivative at t (expecting t between 0 and 1).
    pub fn derivative(&self, t: S) -> Vector3<S> {
        let one_t = S::ONE - t;
        (self.ctrl - self.from) * (S::TWO * one_t) + (self.to - self.ctrl) * (S::TWO * t)
    }

    /// Swap the beginning and the end of the segment.
    pub fn flip(&self) -> Self {
        QuadraticBezierSegment {
            from: self.to,
            ctrl: self.ctrl,
            to: self.from,
        }
    }

    /// Distance between the two endpoints of the curve, ignoring the control point.
    #[inline]
    pub fn chord_length(&self) -> S {
        (self.to - self.from).length()
    }

    /// Returns a conservative bounding box for the curve.
    ///
    /// The curve is contained in the convex hull of its control polygon.
    pub fn fast_bounding_box(&self) -> Box3D<S> {
        Box3D::from_points([self.from, self.ctrl, self.to])
    }

    /// The straight segment between the two endpoints, projected on the xy plane.
    pub fn baseline(&self) -> LineSegment<S> {
        LineSegment {
            from: self.from.xy(),
            to: self.to.xy(),
        }
    }
}

#[test]
fn sample_endpoints() {
    use crate::point3;

    let curve = QuadraticBezierSegment {
        from: point3(0.0f64, 0.0, 0.0),
        ctrl: point3(5.0, 10.0, 0.0),
        to: point3(10.0, 0.0, 2.0),
    };

    assert_eq!(curve.sample(0.0), curve.from);
    assert_eq!(curve.sample(1.0), curve.to);

    let mid = curve.sample(0.5);
    assert!((mid.x - 5.0).abs() < 1e-12);
    assert!((mid.y - 5.0).abs() < 1e-12);
    assert!((mid.z - 0.5).abs() < 1e-12);
}

#[test]
fn weights_sum_to_one() {
    for i in 0..=10 {
        let t = i as f64 / 10.0;
        let w = QuadraticBezierSegment::weights(t);
        assert!((w[0] + w[1] + w[2] - 1.0).abs() < 1e-12);
    }
}

#[test]
fn samples_stay_in_bounding_box() {
    use crate::point3;

    let curve = QuadraticBezierSegment {
        from: point3(-3.0f64, 1.0, 0.0),
        ctrl: point3(20.0, -7.0, 4.0),
        to: point3(1.0, 9.0, -1.0),
    };
    let aabb = curve.fast_bounding_box();
    for i in 0..=32 {
        let p = curve.sample(i as f64 / 32.0);
        assert!(p.x >= aabb.min.x && p.x <= aabb.max.x);
        assert!(p.y >= aabb.min.y && p.y <= aabb.max.y);
        assert!(p.z >= aabb.min.z && p.z <= aabb.max.z);
    }
}

#[test]
fn degenerate_curve() {
    use crate::point3;

    let p = point3(0.0f64, 0.0, 0.0);
    let curve = QuadraticBezierSegment { from: p, ctrl: p, to: p };
    assert_eq!(curve.chord_length(), 0.0);
    assert_eq!(curve.sample(0.3), p);
}
