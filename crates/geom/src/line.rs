use crate::scalar::Scalar;
use crate::{Box2D, Point, Vector};

/// A linear segment on the xy plane.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct LineSegment<S> {
    pub from: Point<S>,
    pub to: Point<S>,
}

impl<S: Scalar> LineSegment<S> {
    /// Sample the segment at t (expecting t between 0 and 1).
    #[inline]
    pub fn sample(&self, t: S) -> Point<S> {
        self.from.lerp(self.to, t)
    }

    /// Returns an inverted version of this segment where the beginning and the end
    /// points are swapped.
    #[inline]
    pub fn flip(&self) -> Self {
        LineSegment {
            from: self.to,
            to: self.from,
        }
    }

    #[inline]
    pub fn to_vector(&self) -> Vector<S> {
        self.to - self.from
    }

    #[inline]
    pub fn length(&self) -> S {
        self.to_vector().length()
    }

    #[inline]
    pub fn square_length(&self) -> S {
        self.to_vector().square_length()
    }

    #[inline]
    pub fn mid_point(&self) -> Point<S> {
        self.sample(S::HALF)
    }

    pub fn bounding_box(&self) -> Box2D<S> {
        Box2D::from_points([self.from, self.to])
    }

    /// Computes the intersection (if any) between this segment and another one.
    ///
    /// The result is provided in the form of the `t` parameter of each
    /// segment. To get the intersection point, sample one of the segments
    /// at the corresponding value.
    ///
    /// Segments sharing an endpoint and parallel segments are not considered
    /// intersecting.
    #[allow(clippy::suspicious_operation_groupings)]
    pub fn intersection_t(&self, other: &Self) -> Option<(S, S)> {
        if self.to == other.to
            || self.from == other.from
            || self.from == other.to
            || self.to == other.from
        {
            return None;
        }

        let v1 = self.to_vector();
        let v2 = other.to_vector();

        let v1_cross_v2 = v1.cross(v2);

        if v1_cross_v2 == S::ZERO {
            return None;
        }

        let sign_v1_cross_v2 = S::signum(v1_cross_v2);
        let abs_v1_cross_v2 = S::abs(v1_cross_v2);

        let v3 = other.from - self.from;

        // t and u should be divided by v1_cross_v2, but we postpone that to not lose precision.
        let t = v3.cross(v2) * sign_v1_cross_v2;
        let u = v3.cross(v1) * sign_v1_cross_v2;

        if t < S::ZERO || t > abs_v1_cross_v2 || u < S::ZERO || u > abs_v1_cross_v2 {
            return None;
        }

        Some((t / abs_v1_cross_v2, u / abs_v1_cross_v2))
    }

    #[inline]
    pub fn intersection(&self, other: &Self) -> Option<Point<S>> {
        self.intersection_t(other).map(|(t, _)| self.sample(t))
    }

    /// Computes the distance between this segment and a point.
    #[inline]
    pub fn distance_to_point(&self, p: Point<S>) -> S {
        (self.closest_point(p) - p).length()
    }

    /// Computes the closest point on this segment to `p`.
    #[inline]
    pub fn closest_point(&self, p: Point<S>) -> Point<S> {
        let v1 = self.to - self.from;
        let len2 = v1.square_length();
        if len2 == S::ZERO {
            return self.from;
        }
        let v2 = p - self.from;
        let t = S::min(S::max(v2.dot(v1) / len2, S::ZERO), S::ONE);

        self.from + v1 * t
    }
}

#[cfg(test)]
use crate::point;

#[test]
fn intersection_rotated() {
    use core::f64::consts::PI;
    let epsilon = 0.0001;
    let count: u32 = 100;

    for i in 0..count {
        for j in 0..count {
            if i % (count / 2) == j % (count / 2) {
                // avoid the colinear case.
                continue;
            }

            let angle1 = i as f64 / (count as f64) * 2.0 * PI;
            let angle2 = j as f64 / (count as f64) * 2.0 * PI;

            let l1 = LineSegment {
                from: point(10.0 * angle1.cos(), 10.0 * angle1.sin()),
                to: point(-10.0 * angle1.cos(), -10.0 * angle1.sin()),
            };

            let l2 = LineSegment {
                from: point(10.0 * angle2.cos(), 10.0 * angle2.sin()),
                to: point(-10.0 * angle2.cos(), -10.0 * angle2.sin()),
            };

            assert!(l1.intersects_at_origin(&l2, epsilon));
        }
    }
}

#[cfg(test)]
impl LineSegment<f64> {
    fn intersects_at_origin(&self, other: &Self, epsilon: f64) -> bool {
        match self.intersection(other) {
            Some(p) => p.x.abs() < epsilon && p.y.abs() < epsilon,
            None => false,
        }
    }
}

#[test]
fn closest_point_is_clamped() {
    let a = LineSegment {
        from: point(0.0f64, 0.0),
        to: point(10.0, 0.0),
    };
    assert_eq!(a.closest_point(point(4.0, 3.0)), point(4.0, 0.0));
    assert_eq!(a.closest_point(point(-4.0, 3.0)), point(0.0, 0.0));
    assert_eq!(a.distance_to_point(point(13.0, 4.0)), 5.0);
}

#[test]
fn intersection_t_of_crossing_diagonals() {
    let a = LineSegment {
        from: point(0.0f64, 0.0),
        to: point(10.0, 10.0),
    };
    let b = LineSegment {
        from: point(0.0f64, 10.0),
        to: point(10.0, 0.0),
    };

    let (t, u) = a.intersection_t(&b).unwrap();
    assert!((t - 0.5).abs() < 1e-12);
    assert!((u - 0.5).abs() < 1e-12);
}

#[test]
fn shared_endpoints_do_not_intersect() {
    let a = LineSegment {
        from: point(0.0f64, 0.0),
        to: point(10.0, 0.0),
    };
    let b = LineSegment {
        from: point(10.0f64, 0.0),
        to: point(5.0, 10.0),
    };
    assert!(a.intersection_t(&b).is_none());
    assert!(a.intersection_t(&a.flip()).is_none());
}
