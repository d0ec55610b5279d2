//! The polygon tessellator protocol and a tessellator based on libtess2.
//!
//! # Protocol
//!
//! Polygons are submitted contour by contour:
//!
//! ```text
//! begin_polygon(rule)
//!     begin_contour()
//!         vertex(coords, handle) ...
//!     end_contour()
//!     ...
//! end_polygon(sink)
//! ```
//!
//! Contours are implicitly closed. While `end_polygon` runs, the tessellator calls back
//! into a [`TessellationSink`](trait.TessellationSink.html) to emit primitives. Vertices
//! are referred to by the handles the caller provided. When the tessellator needs a vertex
//! that was not submitted, at a self-intersection, it asks the sink to create one with
//! `on_combine`, giving up to four source vertices and their weights.

use crate::error::{InternalError, TessellationError};
use crate::geom::utils::signed_area;
use crate::geom::LineSegment;
use crate::math::{point, Point};
use crate::path::WindingRule;
use crate::PrimitiveKind;

use log::trace;
use std::os::raw::c_void;
use std::{mem, ptr, slice};
use tess2_sys::*;

/// An opaque reference to a vertex owned by the caller of the tessellator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct VertexHandle(pub u32);

impl VertexHandle {
    pub const INVALID: Self = VertexHandle(u32::MAX);

    #[inline]
    pub fn to_usize(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn from_usize(idx: usize) -> Self {
        VertexHandle(idx as u32)
    }
}

/// Receives the output of a [`Tessellator`](trait.Tessellator.html).
pub trait TessellationSink {
    /// Starts a new primitive.
    fn on_begin(&mut self, kind: PrimitiveKind) -> Result<(), TessellationError>;

    /// Appends a vertex to the current primitive.
    fn on_vertex(&mut self, vertex: VertexHandle) -> Result<(), TessellationError>;

    /// Creates a vertex at `coords`, as a weighted combination of up to four vertices.
    ///
    /// Missing sources have a weight of zero.
    fn on_combine(
        &mut self,
        coords: [f64; 3],
        sources: [Option<VertexHandle>; 4],
        weights: [f64; 4],
    ) -> Result<VertexHandle, TessellationError>;

    /// Ends the current primitive.
    fn on_end(&mut self) -> Result<(), TessellationError>;
}

/// A polygon tessellator following the begin/vertex/combine/end protocol.
///
/// Protocol violations and invalid coordinates are reported by `end_polygon`.
pub trait Tessellator {
    fn begin_polygon(&mut self, rule: WindingRule);

    fn begin_contour(&mut self);

    fn vertex(&mut self, coords: [f64; 3], vertex: VertexHandle);

    fn end_contour(&mut self);

    /// Tessellates the submitted contours, emitting primitives into the sink.
    fn end_polygon(&mut self, sink: &mut dyn TessellationSink) -> Result<(), TessellationError>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Idle,
    Polygon,
    Contour,
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct InputVertex {
    position: Point,
    z: f64,
    handle: VertexHandle,
}

/// A fill tessellator implemented on top of [libtess2](https://github.com/memononen/libtess2).
///
/// Supports all winding rules and self-intersecting polygons. The xy coordinates are
/// handed to libtess2 in single precision; submitted vertices come back with their
/// original handle, so only the vertices created at intersections are affected.
/// All triangles are emitted in a single `Triangles` primitive, counter-clockwise in a
/// y-up frame.
pub struct Tess2Tessellator {
    tess: *mut TESStesselator,
    rule: WindingRule,
    contours: Vec<Vec<InputVertex>>,
    state: State,
    error: Option<InternalError>,
    log: bool,
}

impl Tess2Tessellator {
    /// Output vertices this close to an input edge, relative to the size of the polygon,
    /// are considered to be on it.
    const ON_EDGE_TOLERANCE: f64 = 1e-4;

    pub fn new() -> Self {
        unsafe {
            Tess2Tessellator {
                tess: tessNewTess(ptr::null_mut()),
                rule: WindingRule::Positive,
                contours: Vec::new(),
                state: State::Idle,
                error: None,
                log: false,
            }
        }
    }

    /// Enable/disable some verbose logging during the tessellation, for
    /// debugging purposes.
    pub fn set_logging(&mut self, is_enabled: bool) {
        self.log = is_enabled;
    }

    fn protocol_error(&mut self, message: &'static str) {
        if self.error.is_none() {
            self.error = Some(InternalError::UnbalancedProtocol(message));
        }
    }

    fn reset(&mut self) {
        self.contours.clear();
        self.state = State::Idle;
        self.error = None;
    }

    fn prepare_polygon(&mut self, contours: &[Vec<InputVertex>]) {
        unsafe {
            for contour in contours {
                let coords: Vec<[f32; 2]> = contour
                    .iter()
                    .map(|v| [v.position.x as f32, v.position.y as f32])
                    .collect();
                tessAddContour(
                    self.tess,
                    2,
                    coords.as_ptr() as *const c_void,
                    mem::size_of::<[f32; 2]>() as i32,
                    coords.len() as i32,
                );
            }
        }
    }

    fn do_tessellate(&mut self) -> Option<Output> {
        unsafe {
            let winding_rule = match self.rule {
                WindingRule::NonZero => TessWindingRule::TESS_WINDING_NONZERO,
                WindingRule::Positive => TessWindingRule::TESS_WINDING_POSITIVE,
                WindingRule::Negative => TessWindingRule::TESS_WINDING_NEGATIVE,
                WindingRule::AbsGeqTwo => TessWindingRule::TESS_WINDING_ABS_GEQ_TWO,
                WindingRule::Odd => TessWindingRule::TESS_WINDING_ODD,
            };

            // Without an explicit normal libtess2 flips clockwise input, which would break
            // the positive and negative rules.
            let mut normal: [f32; 3] = [0.0, 0.0, 1.0];
            let res = tessTesselate(
                self.tess,
                winding_rule,
                TessElementType::TESS_POLYGONS,
                3,
                2,
                normal.as_mut_ptr(),
            );
            if res != 1 {
                return None;
            }

            let vertex_count = tessGetVertexCount(self.tess).max(0) as usize;
            let element_count = tessGetElementCount(self.tess).max(0) as usize;
            if vertex_count == 0 || element_count == 0 {
                return Some(Output::default());
            }

            let coords =
                slice::from_raw_parts(tessGetVertices(self.tess) as *const f32, vertex_count * 2);
            let indices =
                slice::from_raw_parts(tessGetVertexIndices(self.tess) as *const i32, vertex_count);
            let elements =
                slice::from_raw_parts(tessGetElements(self.tess) as *const i32, element_count * 3);

            Some(Output {
                positions: coords
                    .chunks(2)
                    .map(|c| point(c[0] as f64, c[1] as f64))
                    .collect(),
                indices: indices.to_vec(),
                elements: elements.to_vec(),
            })
        }
    }
}

impl Drop for Tess2Tessellator {
    fn drop(&mut self) {
        if self.tess.is_null() {
            return;
        }
        unsafe {
            tessDeleteTess(self.tess);
        }
    }
}

impl Default for Tess2Tessellator {
    fn default() -> Self {
        Tess2Tessellator::new()
    }
}

impl Tessellator for Tess2Tessellator {
    fn begin_polygon(&mut self, rule: WindingRule) {
        if self.state != State::Idle {
            self.reset();
            self.protocol_error("polygon started twice");
        }
        self.rule = rule;
        self.state = State::Polygon;
    }

    fn begin_contour(&mut self) {
        if self.state != State::Polygon {
            self.protocol_error("contour started outside of a polygon");
            return;
        }
        self.contours.push(Vec::new());
        self.state = State::Contour;
    }

    fn vertex(&mut self, coords: [f64; 3], handle: VertexHandle) {
        if self.state != State::Contour {
            self.protocol_error("vertex outside of a contour");
            return;
        }
        // The xy coordinates must also fit in single precision.
        let is_finite = coords.iter().all(|c| c.is_finite())
            && (coords[0] as f32).is_finite()
            && (coords[1] as f32).is_finite();
        if !is_finite {
            if self.error.is_none() {
                self.error = Some(InternalError::NonFiniteCoordinates);
            }
            return;
        }
        if let Some(contour) = self.contours.last_mut() {
            contour.push(InputVertex {
                position: point(coords[0], coords[1]),
                z: coords[2],
                handle,
            });
        }
    }

    fn end_contour(&mut self) {
        if self.state != State::Contour {
            self.protocol_error("contour ended outside of a contour");
            return;
        }
        self.state = State::Polygon;
    }

    fn end_polygon(&mut self, sink: &mut dyn TessellationSink) -> Result<(), TessellationError> {
        if self.state == State::Contour {
            self.protocol_error("polygon ended inside of a contour");
        } else if self.state == State::Idle {
            self.protocol_error("polygon ended before being started");
        }

        if let Some(error) = self.error {
            self.reset();
            return Err(error.into());
        }

        let mut contours = mem::take(&mut self.contours);
        self.reset();

        // Contours with less than three vertices have no area.
        contours.retain(|c| c.len() >= 3);
        if contours.is_empty() {
            return Ok(());
        }
        if self.tess.is_null() {
            return Err(InternalError::TessellatorAborted.into());
        }

        self.prepare_polygon(&contours);
        let output = self
            .do_tessellate()
            .ok_or(InternalError::TessellatorAborted)?;

        let polygon = Polygon::new(contours);
        if self.log {
            trace!(
                "tess2: {} input vertices, {} output vertices, {} triangles",
                polygon.vertices.len(),
                output.positions.len(),
                output.elements.len() / 3,
            );
        }

        polygon.emit(&output, self.log, sink)
    }
}

/// What libtess2 produced, copied out of its buffers.
#[derive(Clone, Debug, Default)]
struct Output {
    positions: Vec<Point>,
    /// For each output vertex, the index of the input vertex or a negative value.
    indices: Vec<i32>,
    elements: Vec<i32>,
}

/// The submitted polygon, used to map the output back to the caller's vertices.
struct Polygon {
    vertices: Vec<InputVertex>,
    edges: Vec<(usize, usize)>,
    tolerance: f64,
}

impl Polygon {
    fn new(contours: Vec<Vec<InputVertex>>) -> Self {
        let mut vertices = Vec::new();
        let mut edges = Vec::new();
        for contour in contours {
            let base = vertices.len();
            let n = contour.len();
            for i in 0..n {
                edges.push((base + i, base + (i + 1) % n));
            }
            vertices.extend(contour);
        }

        let extent = vertices
            .iter()
            .map(|v| v.position.x.abs().max(v.position.y.abs()))
            .fold(0.0, f64::max);

        Polygon {
            vertices,
            edges,
            tolerance: Tess2Tessellator::ON_EDGE_TOLERANCE * (1.0 + extent),
        }
    }

    fn segment(&self, edge: (usize, usize)) -> LineSegment<f64> {
        LineSegment {
            from: self.vertices[edge.0].position,
            to: self.vertices[edge.1].position,
        }
    }

    fn emit(
        &self,
        output: &Output,
        log: bool,
        sink: &mut dyn TessellationSink,
    ) -> Result<(), TessellationError> {
        let mut handles = Vec::with_capacity(output.positions.len());
        let mut positions = Vec::with_capacity(output.positions.len());
        for (position, index) in output.positions.iter().zip(output.indices.iter()) {
            let input = usize::try_from(*index)
                .ok()
                .and_then(|idx| self.vertices.get(idx));
            // libtess2 can also create vertices on top of submitted ones, at T-junctions.
            match input.or_else(|| self.vertex_at(*position)) {
                Some(v) => {
                    handles.push(v.handle);
                    positions.push(v.position);
                }
                None => {
                    let (handle, at) = self.combine(*position, sink)?;
                    if log {
                        trace!("tess2: combined vertex {:?} at {:?}", handle, at);
                    }
                    handles.push(handle);
                    positions.push(at);
                }
            }
        }

        let mut open = false;
        for triangle in output.elements.chunks(3) {
            let mut ids = [0; 3];
            for (id, index) in ids.iter_mut().zip(triangle) {
                match usize::try_from(*index) {
                    Ok(idx) if idx < handles.len() => *id = idx,
                    _ => return Err(InternalError::InvalidVertex.into()),
                }
            }

            let [a, b, c] = ids.map(|id| positions[id]);
            if a == b || b == c || a == c {
                continue;
            }
            if signed_area([a, b, c]) < 0.0 {
                ids.swap(1, 2);
            }

            if !open {
                sink.on_begin(PrimitiveKind::Triangles)?;
                open = true;
            }
            for id in ids {
                sink.on_vertex(handles[id])?;
            }
        }

        if open {
            sink.on_end()?;
        }

        Ok(())
    }

    fn vertex_at(&self, at: Point) -> Option<&InputVertex> {
        self.vertices
            .iter()
            .find(|v| (v.position - at).length() <= self.tolerance)
    }

    /// Asks the sink for a vertex at a point libtess2 created.
    ///
    /// The new vertex is expressed in terms of the two input edges crossing there. Points
    /// that are not at a crossing fall back to the closest edge or vertex.
    fn combine(
        &self,
        at: Point,
        sink: &mut dyn TessellationSink,
    ) -> Result<(VertexHandle, Point), TessellationError> {
        let mut nearby: Vec<(f64, usize)> = self
            .edges
            .iter()
            .enumerate()
            .map(|(idx, edge)| (self.segment(*edge).distance_to_point(at), idx))
            .filter(|(d, _)| *d <= self.tolerance)
            .collect();
        nearby.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut crossing: Option<(f64, usize, usize, f64, f64)> = None;
        for (i, &(_, ei)) in nearby.iter().enumerate() {
            for &(_, ej) in &nearby[i + 1..] {
                let (si, sj) = (self.segment(self.edges[ei]), self.segment(self.edges[ej]));
                if let Some((t, u)) = si.intersection_t(&sj) {
                    let d = (si.sample(t) - at).length();
                    if crossing.map_or(true, |best| d < best.0) {
                        crossing = Some((d, ei, ej, t, u));
                    }
                }
            }
        }

        if let Some((_, ei, ej, t, u)) = crossing {
            let (a, b) = (self.edges[ei], self.edges[ej]);
            let position = self.segment(a).sample(t);
            let za = lerp(self.vertices[a.0].z, self.vertices[a.1].z, t);
            let zb = lerp(self.vertices[b.0].z, self.vertices[b.1].z, u);
            let handle = sink.on_combine(
                [position.x, position.y, (za + zb) * 0.5],
                [
                    Some(self.vertices[a.0].handle),
                    Some(self.vertices[a.1].handle),
                    Some(self.vertices[b.0].handle),
                    Some(self.vertices[b.1].handle),
                ],
                [(1.0 - t) * 0.5, t * 0.5, (1.0 - u) * 0.5, u * 0.5],
            )?;
            return Ok((handle, position));
        }

        if let Some(&(_, idx)) = nearby.first() {
            let edge = self.edges[idx];
            let segment = self.segment(edge);
            let position = segment.closest_point(at);
            let length = segment.length();
            let t = if length > 0.0 {
                (position - segment.from).length() / length
            } else {
                0.0
            };
            let z = lerp(self.vertices[edge.0].z, self.vertices[edge.1].z, t);
            let handle = sink.on_combine(
                [position.x, position.y, z],
                [
                    Some(self.vertices[edge.0].handle),
                    Some(self.vertices[edge.1].handle),
                    None,
                    None,
                ],
                [1.0 - t, t, 0.0, 0.0],
            )?;
            return Ok((handle, position));
        }

        let closest = self
            .vertices
            .iter()
            .min_by(|a, b| {
                (a.position - at)
                    .square_length()
                    .total_cmp(&(b.position - at).square_length())
            })
            .ok_or(InternalError::InvalidVertex)?;
        let handle = sink.on_combine(
            [closest.position.x, closest.position.y, closest.z],
            [Some(closest.handle), None, None, None],
            [1.0, 0.0, 0.0, 0.0],
        )?;

        Ok((handle, closest.position))
    }
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::utils::signed_area;

    /// Records the output of the tessellator, keeping track of vertex positions.
    #[derive(Default)]
    struct Recorder {
        positions: Vec<[f64; 3]>,
        combines: Vec<([Option<VertexHandle>; 4], [f64; 4])>,
        primitives: Vec<(PrimitiveKind, Vec<VertexHandle>)>,
        max_vertices: Option<usize>,
    }

    impl Recorder {
        fn triangles(&self) -> Vec<[Point; 3]> {
            let mut triangles = Vec::new();
            for (_, vertices) in &self.primitives {
                for tri in vertices.chunks(3) {
                    let p = |h: VertexHandle| {
                        let v = self.positions[h.to_usize()];
                        point(v[0], v[1])
                    };
                    triangles.push([p(tri[0]), p(tri[1]), p(tri[2])]);
                }
            }
            triangles
        }

        fn area(&self) -> f64 {
            self.triangles().iter().map(|t| signed_area(t.iter().cloned())).sum()
        }
    }

    impl TessellationSink for Recorder {
        fn on_begin(&mut self, kind: PrimitiveKind) -> Result<(), TessellationError> {
            self.primitives.push((kind, Vec::new()));
            Ok(())
        }

        fn on_vertex(&mut self, vertex: VertexHandle) -> Result<(), TessellationError> {
            if vertex.to_usize() >= self.positions.len() {
                return Err(InternalError::InvalidVertex.into());
            }
            match self.primitives.last_mut() {
                Some(primitive) => primitive.1.push(vertex),
                None => return Err(InternalError::UnbalancedProtocol("no primitive").into()),
            }
            Ok(())
        }

        fn on_combine(
            &mut self,
            coords: [f64; 3],
            sources: [Option<VertexHandle>; 4],
            weights: [f64; 4],
        ) -> Result<VertexHandle, TessellationError> {
            if Some(self.positions.len()) == self.max_vertices {
                return Err(InternalError::TooManyVertices.into());
            }
            self.combines.push((sources, weights));
            self.positions.push(coords);
            Ok(VertexHandle::from_usize(self.positions.len() - 1))
        }

        fn on_end(&mut self) -> Result<(), TessellationError> {
            Ok(())
        }
    }

    fn tessellate(
        contours: &[&[(f64, f64)]],
        rule: WindingRule,
        recorder: &mut Recorder,
    ) -> Result<(), TessellationError> {
        let mut tess = Tess2Tessellator::new();
        tess.begin_polygon(rule);
        for contour in contours {
            tess.begin_contour();
            for &(x, y) in contour.iter() {
                recorder.positions.push([x, y, 0.0]);
                tess.vertex([x, y, 0.0], VertexHandle::from_usize(recorder.positions.len() - 1));
            }
            tess.end_contour();
        }
        tess.end_polygon(recorder)
    }

    fn assert_approx(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn tessellator_is_reusable() {
        let square: &[(f64, f64)] = &[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)];
        let mut tess = Tess2Tessellator::new();
        for _ in 0..3 {
            let mut recorder = Recorder::default();
            tess.begin_polygon(WindingRule::NonZero);
            tess.begin_contour();
            for &(x, y) in square {
                recorder.positions.push([x, y, 0.0]);
                tess.vertex([x, y, 0.0], VertexHandle::from_usize(recorder.positions.len() - 1));
            }
            tess.end_contour();
            tess.end_polygon(&mut recorder).unwrap();

            assert!(recorder.combines.is_empty());
            assert_approx(recorder.area(), 16.0);
        }
    }

    #[test]
    fn simple_triangle() {
        let mut recorder = Recorder::default();
        tessellate(
            &[&[(0.0, 0.0), (10.0, 0.0), (5.0, 10.0)]],
            WindingRule::Positive,
            &mut recorder,
        )
        .unwrap();

        assert_eq!(recorder.primitives.len(), 1);
        assert_eq!(recorder.primitives[0].0, PrimitiveKind::Triangles);
        assert_eq!(recorder.primitives[0].1.len(), 3);
        assert!(recorder.combines.is_empty());
        assert_approx(recorder.area(), 50.0);
    }

    #[test]
    fn simple_polygons_need_no_combine() {
        let triangle: &[(f64, f64)] = &[(0.0, 0.0), (10.0, 3.0), (4.0, 10.0)];
        let mut recorder = Recorder::default();
        tessellate(&[triangle], WindingRule::Positive, &mut recorder).unwrap();

        assert!(recorder.combines.is_empty());
        assert_eq!(recorder.positions.len(), 3);
        assert_eq!(recorder.triangles().len(), 1);
        assert_approx(recorder.area(), 0.5 * (10.0 * 10.0 - 3.0 * 4.0));

        // A concave polygon with vertices at distinct heights.
        let arrow: &[(f64, f64)] = &[(0.0, 0.0), (8.0, 1.0), (3.0, 4.0), (9.0, 9.0), (-1.0, 7.0)];
        let mut recorder = Recorder::default();
        tessellate(&[arrow], WindingRule::NonZero, &mut recorder).unwrap();

        assert!(recorder.combines.is_empty());
        assert_eq!(recorder.triangles().len(), 3);
        let expected = signed_area(arrow.iter().map(|&(x, y)| point(x, y)));
        assert_approx(recorder.area(), expected);
        for tri in recorder.triangles() {
            assert!(signed_area(tri.iter().cloned()) > 0.0);
        }
    }

    #[test]
    fn clockwise_triangle_and_winding_rules() {
        let cw: &[(f64, f64)] = &[(0.0, 0.0), (5.0, 10.0), (10.0, 0.0)];

        let mut recorder = Recorder::default();
        tessellate(&[cw], WindingRule::Positive, &mut recorder).unwrap();
        assert!(recorder.primitives.is_empty());

        for rule in [WindingRule::Negative, WindingRule::NonZero, WindingRule::Odd] {
            let mut recorder = Recorder::default();
            tessellate(&[cw], rule, &mut recorder).unwrap();
            assert_approx(recorder.area(), 50.0);
        }
    }

    #[test]
    fn square_with_hole() {
        let outer: &[(f64, f64)] = &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        let inner: &[(f64, f64)] = &[(3.0, 3.0), (3.0, 7.0), (7.0, 7.0), (7.0, 3.0)];

        let mut recorder = Recorder::default();
        tessellate(&[outer, inner], WindingRule::NonZero, &mut recorder).unwrap();
        assert_approx(recorder.area(), 84.0);

        // Same orientation: the inner square has a winding number of 2.
        let inner_ccw: &[(f64, f64)] = &[(3.0, 3.0), (7.0, 3.0), (7.0, 7.0), (3.0, 7.0)];
        let mut recorder = Recorder::default();
        tessellate(&[outer, inner_ccw], WindingRule::AbsGeqTwo, &mut recorder).unwrap();
        assert_approx(recorder.area(), 16.0);

        let mut recorder = Recorder::default();
        tessellate(&[outer, inner_ccw], WindingRule::Odd, &mut recorder).unwrap();
        assert_approx(recorder.area(), 84.0);
    }

    #[test]
    fn self_intersecting_bowtie() {
        let bowtie: &[(f64, f64)] = &[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)];

        let mut recorder = Recorder::default();
        tessellate(&[bowtie], WindingRule::NonZero, &mut recorder).unwrap();

        let (sources, weights) = recorder.combines[0];
        assert!(sources.iter().all(Option::is_some));
        for w in weights {
            assert_approx(w, 0.25);
        }
        assert_eq!(recorder.combines.len(), 1);
        assert_eq!(recorder.positions[4], [5.0, 5.0, 0.0]);
        assert_eq!(recorder.triangles().len(), 2);
        assert_approx(recorder.area(), 50.0);

        for tri in recorder.triangles() {
            assert!(signed_area(tri.iter().cloned()) > 0.0);
        }
    }

    #[test]
    fn t_junction_uses_existing_vertex() {
        let a: &[(f64, f64)] = &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        let b: &[(f64, f64)] = &[(10.0, 5.0), (20.0, 0.0), (20.0, 10.0)];

        let mut recorder = Recorder::default();
        tessellate(&[a, b], WindingRule::NonZero, &mut recorder).unwrap();

        assert!(recorder.combines.is_empty());
        assert_approx(recorder.area(), 100.0 + 50.0);
    }

    #[test]
    fn protocol_errors() {
        let mut tess = Tess2Tessellator::new();
        let mut recorder = Recorder::default();

        tess.begin_polygon(WindingRule::NonZero);
        tess.vertex([0.0, 0.0, 0.0], VertexHandle(0));
        assert_eq!(
            tess.end_polygon(&mut recorder),
            Err(TessellationError::Internal(InternalError::UnbalancedProtocol(
                "vertex outside of a contour"
            )))
        );

        tess.begin_polygon(WindingRule::NonZero);
        tess.begin_contour();
        tess.vertex([f64::NAN, 0.0, 0.0], VertexHandle(0));
        tess.end_contour();
        assert_eq!(
            tess.end_polygon(&mut recorder),
            Err(TessellationError::Internal(InternalError::NonFiniteCoordinates))
        );

        tess.begin_polygon(WindingRule::NonZero);
        tess.begin_contour();
        assert!(tess.end_polygon(&mut recorder).is_err());

        // The tessellator is usable again after an error.
        let mut recorder = Recorder::default();
        tessellate(
            &[&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]],
            WindingRule::NonZero,
            &mut recorder,
        )
        .unwrap();
        assert_eq!(recorder.triangles().len(), 1);
    }

    #[test]
    fn combine_failure_is_reported() {
        let bowtie: &[(f64, f64)] = &[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)];

        let mut recorder = Recorder {
            max_vertices: Some(4),
            ..Recorder::default()
        };
        assert_eq!(
            tessellate(&[bowtie], WindingRule::NonZero, &mut recorder),
            Err(TessellationError::Internal(InternalError::TooManyVertices))
        );
    }

    #[test]
    fn degenerate_contours() {
        let mut recorder = Recorder::default();
        tessellate(
            &[&[(0.0, 0.0)], &[(1.0, 1.0), (2.0, 2.0)], &[]],
            WindingRule::NonZero,
            &mut recorder,
        )
        .unwrap();
        assert!(recorder.primitives.is_empty());
    }
}
