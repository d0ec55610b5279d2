#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::match_like_matches_macro)]

//! Data structures to build and inspect extrudable paths.
//!
//! A [`Path`](path/struct.Path.html) is a flat list of [`PathElement`](path/enum.PathElement.html)s
//! in 3D plus some derived state (start point, current position, bounds) and the decoration
//! settings used when the path is outlined (endpoint styles, line style).
//!
//! This crate is reexported in [relief](../relief/index.html).
//!
//! # Examples
//!
//! ```
//! # extern crate relief_path;
//! # fn main() {
//! use relief_path::Path;
//! use relief_path::math::point3;
//!
//! let mut path = Path::new();
//! path.move_to(point3(0.0, 0.0, 0.0));
//! path.line_to(point3(10.0, 0.0, 0.0));
//! path.quadratic_bezier_to(point3(10.0, 10.0, 0.0), point3(0.0, 10.0, 0.0));
//! path.close();
//!
//! for event in path.iter() {
//!     println!("{:?}", event);
//! }
//! # }
//! ```
//!

pub use relief_geom as geom;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub mod endpoint;
mod events;
pub mod path;
pub mod planar;

pub use crate::endpoint::{EndpointStyle, LineStyle};
pub use crate::events::*;
#[doc(inline)]
pub use crate::path::{ControlHandle, HandleId, Path, PathElement};
#[doc(inline)]
pub use crate::planar::PlanarPath;

use std::fmt;
use std::u32;

pub mod math {
    //! f64 version of the relief_geom types used everywhere. Most other relief crates
    //! reexport them.

    use crate::geom::euclid;

    /// Alias for ```euclid::default::Point2D<f64>```.
    pub type Point = euclid::default::Point2D<f64>;

    /// Alias for ```euclid::default::Vector2D<f64>```.
    pub type Vector = euclid::default::Vector2D<f64>;

    /// Alias for ```euclid::default::Point3D<f64>```.
    pub type Point3 = euclid::default::Point3D<f64>;

    /// Alias for ```euclid::default::Vector3D<f64>```.
    pub type Vector3 = euclid::default::Vector3D<f64>;

    /// Alias for ```euclid::default::Box2D<f64>```.
    pub type Box2D = euclid::default::Box2D<f64>;

    /// Alias for ```euclid::default::Box3D<f64>```.
    pub type Box3 = euclid::default::Box3D<f64>;

    /// Shorthand for `Vector::new(x, y)`.
    #[inline]
    pub fn vector(x: f64, y: f64) -> Vector {
        Vector::new(x, y)
    }

    /// Shorthand for `Point::new(x, y)`.
    #[inline]
    pub fn point(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    /// Shorthand for `Point3::new(x, y, z)`.
    #[inline]
    pub fn point3(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// Shorthand for `Vector3::new(x, y, z)`.
    #[inline]
    pub fn vector3(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3::new(x, y, z)
    }
}

/// The winding rule defines how to determine what is inside and what is outside of a
/// possibly self-intersecting shape, given the winding number of a region.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum WindingRule {
    NonZero,
    Positive,
    Negative,
    AbsGeqTwo,
    Odd,
}

impl WindingRule {
    pub const ALL: [WindingRule; 5] = [
        WindingRule::NonZero,
        WindingRule::Positive,
        WindingRule::Negative,
        WindingRule::AbsGeqTwo,
        WindingRule::Odd,
    ];

    #[inline]
    pub fn is_inside(&self, winding_number: i32) -> bool {
        match *self {
            WindingRule::NonZero => winding_number != 0,
            WindingRule::Positive => winding_number > 0,
            WindingRule::Negative => winding_number < 0,
            WindingRule::AbsGeqTwo => winding_number.abs() >= 2,
            WindingRule::Odd => winding_number % 2 != 0,
        }
    }

    #[inline]
    pub fn is_outside(&self, winding_number: i32) -> bool {
        !self.is_inside(winding_number)
    }

    /// Parses the lower-case names used on command lines (`nonzero`, `positive`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "nonzero" | "non-zero" => Some(WindingRule::NonZero),
            "positive" => Some(WindingRule::Positive),
            "negative" => Some(WindingRule::Negative),
            "abs-geq-two" | "absgeqtwo" => Some(WindingRule::AbsGeqTwo),
            "odd" | "evenodd" | "even-odd" => Some(WindingRule::Odd),
            _ => None,
        }
    }
}

/// Index of an element in a [`Path`](path/struct.Path.html).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ElementId(pub u32);

impl ElementId {
    pub const INVALID: Self = ElementId(u32::MAX);
    pub fn to_usize(self) -> usize {
        self.0 as usize
    }
    pub fn from_usize(val: usize) -> Self {
        ElementId(val as u32)
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[test]
fn winding_rules() {
    let insides: Vec<Vec<i32>> = WindingRule::ALL
        .iter()
        .map(|rule| (-3..=3).filter(|w| rule.is_inside(*w)).collect())
        .collect();

    assert_eq!(insides[0], vec![-3, -2, -1, 1, 2, 3]);
    assert_eq!(insides[1], vec![1, 2, 3]);
    assert_eq!(insides[2], vec![-3, -2, -1]);
    assert_eq!(insides[3], vec![-3, -2, 2, 3]);
    assert_eq!(insides[4], vec![-3, -1, 1, 3]);
}
