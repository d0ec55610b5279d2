#![deny(bare_trait_objects)]

//! Turns 3D vector paths into renderable, optionally extruded geometry.
//!
//! # Crates
//!
//! This meta-crate (`relief`) reexports the following sub-crates for convenience:
//!
//! * **relief_tessellation** - Flattening, tessellation, extrusion, outlines and the
//!   draw orchestrator.
//! * **relief_path** - The path model, endpoint decorations and path events.
//! * **relief_geom** - Bézier segments in 3D, line segments and normal helpers.
//! * **relief_extra** - A text syntax for paths and debugging tools.
//!
//! Each `relief_<name>` crate is reexported as a `<name>` module in `relief`. For example:
//!
//! ```ignore
//! extern crate relief_tessellation;
//! use relief_tessellation::PathRenderer;
//! ```
//!
//! Is equivalent to:
//!
//! ```ignore
//! extern crate relief;
//! use relief::tessellation::PathRenderer;
//! ```
//!
//! # Feature flags
//!
//! serialization using serde can be enabled on each crate using the
//! `serialization` feature flag (disabled by default).
//!
//! `relief_extra` is disabled by default. It can be added with the feature flag `extra`.
//!
//! # Examples
//!
//! ## Drawing an extruded path
//!
//! ```
//! use relief::math::point3;
//! use relief::path::{EndpointStyle, Path};
//! use relief::tessellation::{PathRenderer, RecordingSink, StyleContext};
//!
//! // A closed shape with a curved side.
//! let mut path = Path::new();
//! path.move_to(point3(0.0, 0.0, 0.0));
//! path.line_to(point3(100.0, 0.0, 0.0));
//! path.quadratic_bezier_to(point3(100.0, 50.0, 0.0), point3(50.0, 50.0, 0.0));
//! path.line_to(point3(0.0, 50.0, 0.0));
//! path.close();
//! path.end_style = EndpointStyle::None;
//!
//! // Fill it and push it 10 units back, with rounded edges.
//! let style = StyleContext::filled()
//!     .with_depth(10.0)
//!     .with_bevel(2.0, 4);
//!
//! let mut renderer = PathRenderer::new();
//! let mut sink = RecordingSink::new();
//! let report = renderer.draw(&path, &style, &mut sink).unwrap();
//!
//! // The recorded commands can be replayed against a real renderer.
//! println!(
//!     " -- {} batches {} vertices, passes: {:?}",
//!     report.batches,
//!     report.vertices,
//!     report.passes,
//! );
//! ```

pub extern crate relief_tessellation;
#[cfg(feature = "extra")]
pub extern crate relief_extra;

#[cfg(feature = "extra")]
pub use relief_extra as extra;
pub use relief_tessellation as tessellation;
pub use tessellation::geom;
pub use tessellation::path;

pub use path::math;
