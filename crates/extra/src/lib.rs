#![deny(bare_trait_objects)]

//! Optional utilities: a text syntax for paths and helpers to debug tessellation issues.
//!
//! This crate is reexported in [relief](../relief/index.html).

extern crate relief_path as path;

pub use path::geom::euclid;
pub use path::math;

pub mod debugging;
pub mod parser;

pub use crate::parser::{parse_path, ParseError, ParserOptions};
