//! The draw orchestrator.
//!
//! A draw call goes through the following passes:
//!
//! ```text
//! Idle -> Fill -> Line -> DepthClosure -> Idle
//! ```
//!
//! - `Fill` runs if the style has a fill color. The path is flattened and tessellated,
//!   and for extruded paths the back cap and the side walls are drawn.
//! - `Line` runs if the style has a line color. The outline of the path is computed and
//!   filled like in the fill pass, with the positive winding rule. If the outline could
//!   not be stroked, its centerline is drawn as line strips.
//! - `DepthClosure` runs if the path is extruded and something was drawn. The front caps
//!   are submitted again with color writes disabled.
//!
//! Problems with the geometry are recorded in the [`DrawReport`](struct.DrawReport.html)
//! and never abort the draw call. A failure of the tessellator aborts the current pass
//! only. Errors from the render sink abort the draw call and are returned.

use crate::error::{DrawError, GeometryError, SinkError, TessellationError};
use crate::extrude::extrude_contour;
use crate::fill::TessellationJob;
use crate::flatten::{flatten_path, Contour};
use crate::math::{Box3, Vector3};
use crate::outline::Outline;
use crate::path::{Path, WindingRule};
use crate::sink::{FrontFace, RenderSink};
use crate::stroke::{OutlineStroker, StrokeService};
use crate::tessellator::{Tess2Tessellator, Tessellator};
use crate::{ExtrusionOptions, FlattenedVertex, PrimitiveKind, StyleContext, VertexBatch};

use log::{debug, warn};

/// The passes of a draw call.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Pass {
    Idle,
    Fill,
    Line,
    DepthClosure,
}

/// What happened during a draw call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawReport {
    /// The passes that ran, in order.
    pub passes: Vec<Pass>,
    /// The recoverable problems, with the pass they were found in.
    pub diagnostics: Vec<(Pass, GeometryError)>,
    /// Number of batches submitted to the sink.
    pub batches: usize,
    /// Number of vertices submitted to the sink.
    pub vertices: usize,
}

impl DrawReport {
    /// The diagnostics worth showing to users.
    pub fn warnings(&self) -> impl Iterator<Item = &(Pass, GeometryError)> {
        self.diagnostics.iter().filter(|(_, err)| !err.is_silent())
    }

    fn record(&mut self, pass: Pass, diagnostics: impl IntoIterator<Item = GeometryError>) {
        self.diagnostics
            .extend(diagnostics.into_iter().map(|err| (pass, err)));
    }
}

/// Draws paths into a [`RenderSink`](../sink/trait.RenderSink.html).
///
/// The renderer owns its tessellator and stroke service. Draw calls on the same renderer
/// are serialized by `&mut self`.
///
/// # Example
///
/// ```
/// use relief_tessellation::{PathRenderer, RecordingSink, StyleContext};
/// use relief_tessellation::math::point3;
/// use relief_tessellation::path::Path;
///
/// let mut path = Path::new();
/// path.move_to(point3(0.0, 0.0, 0.0));
/// path.line_to(point3(10.0, 0.0, 0.0));
/// path.line_to(point3(5.0, 10.0, 0.0));
/// path.close();
///
/// let mut renderer = PathRenderer::new();
/// let mut sink = RecordingSink::new();
/// let report = renderer
///     .draw(&path, &StyleContext::filled().with_depth(2.0), &mut sink)
///     .unwrap();
///
/// assert!(report.diagnostics.is_empty());
/// assert_eq!(sink.transform_depth(), 0);
/// ```
pub struct PathRenderer<T: Tessellator = Tess2Tessellator, S: StrokeService = OutlineStroker> {
    tessellator: T,
    stroker: S,
    pass: Pass,
}

impl PathRenderer<Tess2Tessellator, OutlineStroker> {
    pub fn new() -> Self {
        PathRenderer::with_services(Tess2Tessellator::new(), OutlineStroker::new())
    }
}

impl Default for PathRenderer<Tess2Tessellator, OutlineStroker> {
    fn default() -> Self {
        PathRenderer::new()
    }
}

impl<T: Tessellator, S: StrokeService> PathRenderer<T, S> {
    pub fn with_services(tessellator: T, stroker: S) -> Self {
        PathRenderer {
            tessellator,
            stroker,
            pass: Pass::Idle,
        }
    }

    pub fn tessellator(&self) -> &T {
        &self.tessellator
    }

    pub fn tessellator_mut(&mut self) -> &mut T {
        &mut self.tessellator
    }

    pub fn stroker(&self) -> &S {
        &self.stroker
    }

    /// The current pass. Always `Pass::Idle` outside of a draw call.
    pub fn pass(&self) -> Pass {
        self.pass
    }

    /// Draws a path.
    ///
    /// The style is copied when the call starts.
    pub fn draw(
        &mut self,
        path: &Path,
        style: &StyleContext,
        sink: &mut dyn RenderSink,
    ) -> Result<DrawReport, DrawError> {
        let style = *style;
        let mut report = DrawReport::default();
        if !style.fill && !style.line {
            return Ok(report);
        }

        let mut sink = CountingSink {
            inner: sink,
            batches: 0,
            vertices: 0,
        };
        let result = self.run_passes(path, &style, &mut sink, &mut report);
        self.enter(Pass::Idle, &mut report);

        report.batches = sink.batches;
        report.vertices = sink.vertices;

        result.map(|()| report)
    }

    fn run_passes(
        &mut self,
        path: &Path,
        style: &StyleContext,
        sink: &mut dyn RenderSink,
        report: &mut DrawReport,
    ) -> Result<(), DrawError> {
        let extrusion = style.extrusion(path.invert);
        let with_texture = style.texture_units != 0;
        let mut caps = Vec::new();

        if style.fill {
            self.enter(Pass::Fill, report);
            let flattened = flatten_path(path, &style.flattening, with_texture);
            report.record(Pass::Fill, flattened.diagnostics);
            caps.extend(self.fill_and_extrude(
                &flattened.contours,
                style.winding_rule,
                &extrusion,
                sink,
                report,
            )?);
        }

        if style.line {
            self.enter(Pass::Line, report);
            let options = style.stroke(path.line_style);
            let outline = Outline::compute(path, &options, &self.stroker);
            report.record(Pass::Line, outline.diagnostics);

            let flattened = flatten_path(&outline.path, &style.flattening, with_texture);
            report.record(Pass::Line, flattened.diagnostics);
            caps.extend(self.fill_and_extrude(
                &flattened.contours,
                Some(WindingRule::Positive),
                &extrusion,
                sink,
                report,
            )?);

            if let Some(centerline) = &outline.centerline {
                let flattened = flatten_path(centerline, &style.flattening, with_texture);
                for contour in flattened.contours.iter().filter(|c| c.len() >= 2) {
                    sink.submit(PrimitiveKind::LineStrip, &contour.vertices)?;
                }
            }
        }

        if extrusion.depth > 0.0 && !caps.is_empty() {
            self.enter(Pass::DepthClosure, report);
            sink.set_color_write(false)?;
            for batch in &caps {
                sink.submit_batch(batch)?;
            }
            sink.set_color_write(true)?;
        }

        Ok(())
    }

    /// Fills contours and extrudes them. Returns the batches of the front cap.
    fn fill_and_extrude(
        &mut self,
        contours: &[Contour],
        rule: Option<WindingRule>,
        extrusion: &ExtrusionOptions,
        sink: &mut dyn RenderSink,
        report: &mut DrawReport,
    ) -> Result<Vec<VertexBatch>, DrawError> {
        let mut job = TessellationJob::new(rule, *extrusion, &mut *sink);
        match job.fill(contours, &mut self.tessellator) {
            Ok(()) => {}
            Err(TessellationError::Internal(err)) => {
                warn!("aborting the {:?} pass: {}", self.pass, err);
                report.record(self.pass, Some(GeometryError::TessellatorFailure(err)));
                return Ok(Vec::new());
            }
            Err(TessellationError::Sink(err)) => return Err(err.into()),
        }
        job.draw_back_cap()?;
        let caps = job.into_batches();

        if extrusion.depth > 0.0 {
            for contour in contours {
                let walls = extrude_contour(contour, extrusion);
                for batch in &walls.batches {
                    sink.submit_batch(batch)?;
                }
            }
        }

        Ok(caps)
    }

    fn enter(&mut self, pass: Pass, report: &mut DrawReport) {
        if pass == self.pass {
            return;
        }
        debug!("draw pass: {:?} -> {:?}", self.pass, pass);
        self.pass = pass;
        if pass != Pass::Idle {
            report.passes.push(pass);
        }
    }
}

/// Counts what goes through to the actual sink.
struct CountingSink<'l> {
    inner: &'l mut dyn RenderSink,
    batches: usize,
    vertices: usize,
}

impl<'l> RenderSink for CountingSink<'l> {
    fn submit(
        &mut self,
        kind: PrimitiveKind,
        vertices: &[FlattenedVertex],
    ) -> Result<(), SinkError> {
        self.inner.submit(kind, vertices)?;
        self.batches += 1;
        self.vertices += vertices.len();
        Ok(())
    }

    fn set_front_face(&mut self, face: FrontFace) -> Result<(), SinkError> {
        self.inner.set_front_face(face)
    }

    fn push_transform(&mut self) -> Result<(), SinkError> {
        self.inner.push_transform()
    }

    fn pop_transform(&mut self) -> Result<(), SinkError> {
        self.inner.pop_transform()
    }

    fn translate(&mut self, x: f64, y: f64, z: f64) -> Result<(), SinkError> {
        self.inner.translate(x, y, z)
    }

    fn scale(&mut self, x: f64, y: f64, z: f64) -> Result<(), SinkError> {
        self.inner.scale(x, y, z)
    }

    fn set_color_write(&mut self, enabled: bool) -> Result<(), SinkError> {
        self.inner.set_color_write(enabled)
    }
}

/// The bounds of a path, extended to cover a copy of it moved by `offset`.
///
/// With an offset of `(0, 0, -depth)` this covers the extruded volume.
pub fn compute_bounds(path: &Path, offset: Vector3) -> Box3 {
    let bounds = path.bounds();
    let moved = bounds.translate(offset);
    Box3::new(bounds.min.min(moved.min), bounds.max.max(moved.max))
}
