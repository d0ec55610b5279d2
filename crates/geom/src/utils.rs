//! Normals and areas of polylines.

use crate::scalar::Scalar;
use crate::{vector, Point, Vector};

/// Rotates a vector by 90° counter-clockwise.
#[inline]
pub fn rot90<S: Scalar>(v: Vector<S>) -> Vector<S> {
    vector(-v.y, v.x)
}

/// The normal of an edge going along `edge`, obtained by swapping its coordinates.
///
/// For a counter-clockwise polygon in a y-up frame this points outward.
/// The result is not normalized.
#[inline]
pub fn edge_normal<S: Scalar>(edge: Vector<S>) -> Vector<S> {
    vector(edge.y, -edge.x)
}

/// Compute a normal vector at a point P such that ```x ---e1----> P ---e2---> x```
///
/// The resulting vector is not normalized. The length is such that extruding the shape
/// would yield parallel segments exactly 1 unit away from their original.
/// The normal points towards the positive (left) side of e1.
///
/// v1 and v2 are expected to be normalized.
pub fn miter_normal<S: Scalar>(v1: Vector<S>, v2: Vector<S>) -> Vector<S> {
    let epsilon = S::value(1e-4);

    let n1 = rot90(v1);

    let v12 = v1 + v2;

    if v12.square_length() < epsilon {
        return vector(S::ZERO, S::ZERO);
    }

    let n = rot90(v12.normalize());

    let inv_len = n.dot(n1);

    if inv_len.abs() < epsilon {
        return n1;
    }

    n / inv_len
}

/// Normalizes a vector, returning `None` for vectors too short to have a direction.
#[inline]
pub fn try_normalize<S: Scalar>(v: Vector<S>) -> Option<Vector<S>> {
    let len = v.length();
    if len > S::EPSILON {
        Some(v / len)
    } else {
        None
    }
}

/// Signed area of a closed polygon (shoelace formula).
///
/// Positive for counter-clockwise polygons in a y-up frame.
pub fn signed_area<S: Scalar>(points: impl IntoIterator<Item = Point<S>>) -> S {
    let mut points = points.into_iter();
    let first = match points.next() {
        Some(p) => p,
        None => return S::ZERO,
    };

    let mut double_area = S::ZERO;
    let mut v0 = vector(S::ZERO, S::ZERO);
    for p in points {
        let v1 = p - first;
        double_area += v0.cross(v1);
        v0 = v1;
    }

    double_area * S::HALF
}

#[cfg(test)]
fn assert_almost_eq(a: Vector<f64>, b: Vector<f64>) {
    if (a - b).square_length() > 0.00001 {
        panic!("assert almost equal: {:?} != {:?}", a, b);
    }
}

#[test]
fn test_miter_normal() {
    assert_almost_eq(
        miter_normal(vector(1.0, 0.0), vector(0.0, 1.0)),
        vector(-1.0, 1.0),
    );
    assert_almost_eq(
        miter_normal(vector(1.0, 0.0), vector(0.0, -1.0)),
        vector(1.0, 1.0),
    );
    assert_almost_eq(
        miter_normal(vector(1.0, 0.0), vector(1.0, 0.0)),
        vector(0.0, 1.0),
    );
    assert_almost_eq(
        miter_normal(vector(1.0, 0.0), vector(-1.0, 0.0)),
        vector(0.0, 0.0),
    );
}

#[test]
fn test_edge_normal() {
    assert_almost_eq(edge_normal(vector(1.0, 0.0)), vector(0.0, -1.0));
    assert_almost_eq(edge_normal(vector(0.0, 1.0)), vector(1.0, 0.0));
}

#[test]
fn test_signed_area() {
    use crate::point;

    let ccw = [
        point(0.0f64, 0.0),
        point(2.0, 0.0),
        point(2.0, 2.0),
        point(0.0, 2.0),
    ];
    assert_eq!(signed_area(ccw), 4.0);
    assert_eq!(signed_area(ccw.iter().rev().cloned()), -4.0);
    assert_eq!(signed_area(Vec::<crate::Point<f64>>::new()), 0.0);
}
