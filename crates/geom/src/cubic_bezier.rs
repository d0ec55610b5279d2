use crate::scalar::Scalar;
use crate::{Box3D, LineSegment, Point3, QuadraticBezierSegment, Vector3};
use num_traits::NumCast;

/// A 3d curve segment defined by four points: the beginning of the segment, two control
/// points and the end of the segment.
///
/// The curve is defined by equation:
/// ```∀ t ∈ [0..1],  P(t) = (1 - t)³ * from + 3 * (1 - t)² * t * ctrl1 + 3 * t² * (1 - t) * ctrl2 + t³ * to```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct CubicBezierSegment<S> {
    pub from: Point3<S>,
    pub ctrl1: Point3<S>,
    pub ctrl2: Point3<S>,
    pub to: Point3<S>,
}

impl<S: Scalar> CubicBezierSegment<S> {
    pub fn cast<NewS: NumCast>(self) -> CubicBezierSegment<NewS> {
        CubicBezierSegment {
            from: self.from.cast(),
            ctrl1: self.ctrl1.cast(),
            ctrl2: self.ctrl2.cast(),
            to: self.to.cast(),
        }
    }

    /// The Bernstein basis of degree 3 evaluated at t.
    #[inline]
    pub fn weights(t: S) -> [S; 4] {
        let t2 = t * t;
        let one_t = S::ONE - t;
        let one_t2 = one_t * one_t;

        [
            one_t2 * one_t,
            S::THREE * one_t2 * t,
            S::THREE * one_t * t2,
            t2 * t,
        ]
    }

    /// Sample the curve at t (expecting t between 0 and 1).
    pub fn sample(&self, t: S) -> Point3<S> {
        let [w0, w1, w2, w3] = Self::weights(t);

        self.from * w0
            + self.ctrl1.to_vector() * w1
            + self.ctrl2.to_vector() * w2
            + self.to.to_vector() * w3
    }

    /// Sample the curve's derivative at t (expecting t between 0 and 1).
    pub fn derivative(&self, t: S) -> Vector3<S> {
        let one_t = S::ONE - t;
        (self.ctrl1 - self.from) * (S::THREE * one_t * one_t)
            + (self.ctrl2 - self.ctrl1) * (S::TWO * S::THREE * one_t * t)
            + (self.to - self.ctrl2) * (S::THREE * t * t)
    }

    /// Swap the beginning and the end of the segment.
    pub fn flip(&self) -> Self {
        CubicBezierSegment {
            from: self.to,
            ctrl1: self.ctrl2,
            ctrl2: self.ctrl1,
            to: self.from,
        }
    }

    /// Distance between the two endpoints of the curve, ignoring the control points.
    #[inline]
    pub fn chord_length(&self) -> S {
        (self.to - self.from).length()
    }

    /// Returns a conservative bounding box for the curve.
    pub fn fast_bounding_box(&self) -> Box3D<S> {
        Box3D::from_points([self.from, self.ctrl1, self.ctrl2, self.to])
    }

    /// The straight segment between the two endpoints, projected on the xy plane.
    pub fn baseline(&self) -> LineSegment<S> {
        LineSegment {
            from: self.from.xy(),
            to: self.to.xy(),
        }
    }
}

impl<S: Scalar> From<QuadraticBezierSegment<S>> for CubicBezierSegment<S> {
    /// Degree elevation.
    fn from(q: QuadraticBezierSegment<S>) -> Self {
        let two_thirds = S::TWO / S::THREE;
        CubicBezierSegment {
            from: q.from,
            ctrl1: q.from.lerp(q.ctrl, two_thirds),
            ctrl2: q.to.lerp(q.ctrl, two_thirds),
            to: q.to,
        }
    }
}

#[test]
fn sample_endpoints() {
    use crate::point3;

    let curve = CubicBezierSegment {
        from: point3(0.0f64, 0.0, 1.0),
        ctrl1: point3(0.0, 10.0, 1.0),
        ctrl2: point3(10.0, 10.0, 1.0),
        to: point3(10.0, 0.0, 1.0),
    };

    assert_eq!(curve.sample(0.0), curve.from);
    assert_eq!(curve.sample(1.0), curve.to);

    let mid = curve.sample(0.5);
    assert!((mid.x - 5.0).abs() < 1e-12);
    assert!((mid.y - 7.5).abs() < 1e-12);
    assert!((mid.z - 1.0).abs() < 1e-12);
}

#[test]
fn weights_sum_to_one() {
    for i in 0..=10 {
        let t = i as f32 / 10.0;
        let w = CubicBezierSegment::weights(t);
        assert!((w.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }
}

#[test]
fn degree_elevation_matches_quadratic() {
    use crate::point3;

    let q = QuadraticBezierSegment {
        from: point3(0.0f64, 0.0, 0.0),
        ctrl: point3(4.0, 8.0, 2.0),
        to: point3(8.0, 0.0, 0.0),
    };
    let c: CubicBezierSegment<f64> = q.into();
    for i in 0..=8 {
        let t = i as f64 / 8.0;
        assert!((q.sample(t) - c.sample(t)).length() < 1e-9);
    }
}
