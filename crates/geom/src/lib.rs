#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::excessive_precision)]
#![allow(clippy::many_single_char_names)]

//! Simple geometric primitives on top of euclid.
//!
//! This crate is reexported in [relief](../relief/index.html).
//!
//! # Overview.
//!
//! This crate implements some of the maths needed to turn paths into
//! renderable and extrudable geometry:
//!
//! - quadratic and cubic bézier curves in 3D, evaluated with the Bernstein basis,
//! - 2D line segments and their intersections,
//! - edge and miter normals of polylines, signed areas.
//!
//! # Flattening
//!
//! Flattening is the action of approximating a curve with a succession of line segments.
//! The curves in this crate are flattened by sampling them at uniformly spaced parameter
//! values. How many samples to take is decided by the caller, usually as a function of
//! the distance between the two endpoints of the curve (see `chord_length`).

// Reexport dependencies.
pub use euclid;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub mod cubic_bezier;
mod line;
pub mod quadratic_bezier;
pub mod utils;

#[doc(inline)]
pub use crate::cubic_bezier::CubicBezierSegment;
#[doc(inline)]
pub use crate::line::LineSegment;
#[doc(inline)]
pub use crate::quadratic_bezier::QuadraticBezierSegment;

pub use crate::scalar::Scalar;

mod scalar {
    pub(crate) use num_traits::{Float, FloatConst, NumCast};

    use core::fmt::{Debug, Display};
    use core::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

    pub trait Scalar:
        Float
        + NumCast
        + FloatConst
        + Sized
        + Display
        + Debug
        + AddAssign
        + SubAssign
        + MulAssign
        + DivAssign
    {
        const HALF: Self;
        const ZERO: Self;
        const ONE: Self;
        const TWO: Self;
        const THREE: Self;

        const EPSILON: Self;

        fn value(v: f32) -> Self;
    }

    impl Scalar for f32 {
        const HALF: Self = 0.5;
        const ZERO: Self = 0.0;
        const ONE: Self = 1.0;
        const TWO: Self = 2.0;
        const THREE: Self = 3.0;

        const EPSILON: Self = 1e-4;

        #[inline]
        fn value(v: f32) -> Self {
            v
        }
    }

    impl Scalar for f64 {
        const HALF: Self = 0.5;
        const ZERO: Self = 0.0;
        const ONE: Self = 1.0;
        const TWO: Self = 2.0;
        const THREE: Self = 3.0;

        const EPSILON: Self = 1e-8;

        #[inline]
        fn value(v: f32) -> Self {
            v as f64
        }
    }
}

/// Alias for `euclid::default::Point2D`.
pub use euclid::default::Point2D as Point;

/// Alias for `euclid::default::Vector2D`.
pub use euclid::default::Vector2D as Vector;

/// Alias for `euclid::default::Point3D`.
pub use euclid::default::Point3D as Point3;

/// Alias for `euclid::default::Vector3D`.
pub use euclid::default::Vector3D as Vector3;

/// Alias for `euclid::default::Box2D`
pub use euclid::default::Box2D;

/// Alias for `euclid::default::Box3D`
pub use euclid::default::Box3D;

/// Shorthand for `Vector::new(x, y)`.
#[inline]
pub fn vector<S>(x: S, y: S) -> Vector<S> {
    Vector::new(x, y)
}

/// Shorthand for `Point::new(x, y)`.
#[inline]
pub fn point<S>(x: S, y: S) -> Point<S> {
    Point::new(x, y)
}

/// Shorthand for `Point3::new(x, y, z)`.
#[inline]
pub fn point3<S>(x: S, y: S, z: S) -> Point3<S> {
    Point3::new(x, y, z)
}

/// Shorthand for `Vector3::new(x, y, z)`.
#[inline]
pub fn vector3<S>(x: S, y: S, z: S) -> Vector3<S> {
    Vector3::new(x, y, z)
}
