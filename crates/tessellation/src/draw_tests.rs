use crate::error::{DrawError, GeometryError, InternalError, SinkError, TessellationError};
use crate::math::{point3, vector3, Point3};
use crate::path::{EndpointStyle, Path, WindingRule};
use crate::sink::{DrawCommand, FrontFace, RecordingSink, RenderSink};
use crate::stroke::OutlineStroker;
use crate::tessellator::{TessellationSink, Tessellator, VertexHandle};
use crate::{
    compute_bounds, FlattenedVertex, Pass, PathRenderer, PrimitiveKind, StyleContext, VertexBatch,
};

use relief_extra::parser::parse_path;

fn polygon(points: &[(f64, f64)]) -> Path {
    let mut path = Path::new();
    path.move_to(point3(points[0].0, points[0].1, 0.0));
    for &(x, y) in &points[1..] {
        path.line_to(point3(x, y, 0.0));
    }
    path.close();

    path
}

fn triangles_area(batch: &VertexBatch) -> f64 {
    assert_eq!(batch.kind, PrimitiveKind::Triangles);
    batch
        .vertices
        .chunks(3)
        .map(|tri| {
            let a = tri[0].position.to_2d();
            let b = tri[1].position.to_2d();
            let c = tri[2].position.to_2d();
            (b - a).cross(c - a).abs() * 0.5
        })
        .sum()
}

fn draw(path: &Path, style: &StyleContext) -> (crate::DrawReport, RecordingSink) {
    let mut renderer = PathRenderer::new();
    let mut sink = RecordingSink::new();
    let report = renderer.draw(path, style, &mut sink).unwrap();
    assert_eq!(renderer.pass(), Pass::Idle);
    assert_eq!(sink.transform_depth(), 0);

    (report, sink)
}

#[test]
fn filled_triangle() {
    let path = polygon(&[(0.0, 0.0), (10.0, 0.0), (5.0, 10.0)]);
    let (report, sink) = draw(&path, &StyleContext::filled());

    assert_eq!(report.passes, vec![Pass::Fill]);
    assert!(report.diagnostics.is_empty());
    assert_eq!(report.batches, 1);
    assert_eq!(report.vertices, 3);

    assert_eq!(sink.commands.len(), 1);
    let batch = sink.batches().next().unwrap();
    assert_eq!(batch.kind, PrimitiveKind::Triangles);
    assert_eq!(batch.vertices.len(), 3);
    assert!(batch.vertices.iter().all(|v| !v.is_synthesized()));
    assert!((triangles_area(batch) - 50.0).abs() < 1e-9);
}

#[test]
fn stroked_line_with_arrowhead() {
    let mut path = Path::new();
    path.move_to(point3(0.0, 0.0, 0.0));
    path.line_to(point3(10.0, 0.0, 0.0));
    path.end_style = EndpointStyle::Arrowhead;

    let (report, sink) = draw(&path, &StyleContext::stroked(2.0));

    assert_eq!(report.passes, vec![Pass::Line]);
    assert!(report.diagnostics.is_empty());

    let area: f64 = sink.batches().map(triangles_area).sum();
    // The 6x2 stroke and the arrowhead overlap where the wings meet the stroke.
    assert!((area - 19.5).abs() < 1e-6, "area {}", area);

    let tip = sink
        .batches()
        .flat_map(|b| b.vertices.iter())
        .any(|v| (v.position - point3(10.0, 0.0, 0.0)).length() < 1e-9);
    assert!(tip);
}

#[test]
fn zero_length_curve() {
    let mut path = Path::new();
    path.move_to(point3(0.0, 0.0, 0.0));
    path.quadratic_bezier_to(point3(0.0, 0.0, 0.0), point3(0.0, 0.0, 0.0));

    let (report, sink) = draw(&path, &StyleContext::filled());

    assert_eq!(report.passes, vec![Pass::Fill]);
    assert!(report
        .diagnostics
        .contains(&(Pass::Fill, GeometryError::DegenerateGeometry { element: 2 })));
    assert_eq!(report.warnings().count(), 0);
    assert_eq!(sink.triangle_count(), 0);
}

#[test]
fn extruded_square() {
    let path = polygon(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
    let (report, sink) = draw(&path, &StyleContext::filled().with_depth(2.0));

    assert_eq!(report.passes, vec![Pass::Fill, Pass::DepthClosure]);
    assert!(report.diagnostics.is_empty());

    let commands = &sink.commands;
    assert_eq!(commands.len(), 12);

    let front = match &commands[0] {
        DrawCommand::Submit(batch) => batch.clone(),
        cmd => panic!("{:?}", cmd),
    };
    assert_eq!(front.kind, PrimitiveKind::Triangles);
    assert!((triangles_area(&front) - 100.0).abs() < 1e-9);

    assert_eq!(commands[1], DrawCommand::PushTransform);
    assert_eq!(commands[2], DrawCommand::Translate([0.0, 0.0, -2.0]));
    assert_eq!(commands[3], DrawCommand::Scale([1.0, 1.0, -1.0]));
    assert_eq!(commands[4], DrawCommand::SetFrontFace(FrontFace::Cw));
    assert_eq!(commands[5], DrawCommand::Submit(front.clone()));
    assert_eq!(commands[6], DrawCommand::SetFrontFace(FrontFace::Ccw));
    assert_eq!(commands[7], DrawCommand::PopTransform);

    match &commands[8] {
        DrawCommand::Submit(walls) => {
            assert_eq!(walls.kind, PrimitiveKind::TriangleStrip);
            assert_eq!(walls.vertices.len(), 18);
            assert!(walls.vertices.iter().all(|v| v.normal.z == 0.0));
            assert!(walls
                .vertices
                .iter()
                .all(|v| v.position.z == 0.0 || v.position.z == -2.0));
        }
        cmd => panic!("{:?}", cmd),
    }

    assert_eq!(commands[9], DrawCommand::ColorWrite(false));
    assert_eq!(commands[10], DrawCommand::Submit(front));
    assert_eq!(commands[11], DrawCommand::ColorWrite(true));

    assert_eq!(report.batches, 4);
    assert_eq!(report.vertices, sink.vertex_count());
}

#[test]
fn beveled_outline_is_closed_by_depth_pass() {
    let mut path = Path::new();
    path.move_to(point3(0.0, 0.0, 0.0));
    path.line_to(point3(20.0, 0.0, 0.0));
    path.start_style = EndpointStyle::Circle;

    let style = StyleContext::stroked(2.0)
        .with_depth(3.0)
        .with_bevel(0.5, 2);
    let (report, sink) = draw(&path, &style);

    assert_eq!(report.passes, vec![Pass::Line, Pass::DepthClosure]);
    assert_eq!(report.warnings().count(), 0);
    assert!(sink
        .batches()
        .any(|b| b.kind == PrimitiveKind::TriangleStrip));
    assert!(sink
        .commands
        .iter()
        .any(|cmd| *cmd == DrawCommand::ColorWrite(false)));
}

#[test]
fn self_intersecting_fill() {
    let path = polygon(&[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)]);
    let style = StyleContext::filled().with_winding_rule(Some(WindingRule::NonZero));
    let (report, sink) = draw(&path, &style);

    assert!(report.diagnostics.is_empty());
    let batch = sink.batches().next().unwrap();
    assert!(batch.vertices.iter().any(FlattenedVertex::is_synthesized));
    assert!((triangles_area(batch) - 50.0).abs() < 1e-9);
}

#[test]
fn contours_as_authored() {
    let path = polygon(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
    let (report, sink) = draw(&path, &StyleContext::filled().with_winding_rule(None));

    assert!(report.diagnostics.is_empty());
    let kinds: Vec<_> = sink.batches().map(|b| (b.kind, b.vertices.len())).collect();
    assert_eq!(kinds, vec![(PrimitiveKind::Polygon, 4)]);
}

#[test]
fn nothing_to_draw() {
    let path = polygon(&[(0.0, 0.0), (10.0, 0.0), (5.0, 10.0)]);
    let (report, sink) = draw(&path, &StyleContext::default().with_depth(5.0));

    assert!(report.passes.is_empty());
    assert!(sink.commands.is_empty());

    let (report, sink) = draw(&Path::new(), &StyleContext::filled().with_line(1.0));
    assert_eq!(report.passes, vec![Pass::Fill, Pass::Line]);
    assert!(sink.commands.is_empty());
}

#[test]
fn texture_coordinates() {
    let path = polygon(&[(0.0, 0.0), (40.0, 0.0), (40.0, 20.0), (0.0, 20.0)]);
    let (_, sink) = draw(&path, &StyleContext::filled().with_texture_units(1));

    let in_unit_square = |p: Point3| (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y);
    let batch = sink.batches().next().unwrap();
    assert!(batch.vertices.iter().all(|v| in_unit_square(v.texture)));
    assert!(batch
        .vertices
        .iter()
        .any(|v| v.texture == point3(1.0, 1.0, 0.0)));

    let (_, sink) = draw(&path, &StyleContext::filled());
    let batch = sink.batches().next().unwrap();
    assert!(batch.vertices.iter().all(|v| v.texture == Point3::origin()));
}

#[test]
fn non_flat_line() {
    let mut path = Path::new();
    path.move_to(point3(0.0, 0.0, 0.0));
    path.line_to(point3(10.0, 0.0, 5.0));

    let (report, sink) = draw(&path, &StyleContext::stroked(1.0));

    assert_eq!(
        report.diagnostics,
        vec![(Pass::Line, GeometryError::NonFlatStrokeFallback)]
    );
    assert_eq!(report.warnings().count(), 1);

    let batches: Vec<_> = sink.batches().collect();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].kind, PrimitiveKind::LineStrip);
    assert_eq!(batches[0].vertices.len(), 2);
}

#[test]
fn parsed_path() {
    // Two nested squares with the same orientation.
    let path = parse_path("M 0 0 L 10 0 L 10 10 L 0 10 Z m 2 2 h 6 v 6 h -6 z").unwrap();
    let (report, sink) = draw(&path, &StyleContext::filled());

    assert!(report.diagnostics.is_empty());
    let area: f64 = sink.batches().map(triangles_area).sum();
    assert!((area - 100.0).abs() < 1e-9);

    let (_, sink) = draw(
        &path,
        &StyleContext::filled().with_winding_rule(Some(WindingRule::Odd)),
    );
    let area: f64 = sink.batches().map(triangles_area).sum();
    assert!((area - 64.0).abs() < 1e-9);
}

struct FailingSink {
    submits_before_failure: usize,
}

impl RenderSink for FailingSink {
    fn submit(&mut self, _: PrimitiveKind, _: &[FlattenedVertex]) -> Result<(), SinkError> {
        if self.submits_before_failure == 0 {
            return Err(SinkError::new("device lost"));
        }
        self.submits_before_failure -= 1;
        Ok(())
    }

    fn set_front_face(&mut self, _: FrontFace) -> Result<(), SinkError> {
        Ok(())
    }

    fn push_transform(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    fn pop_transform(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    fn translate(&mut self, _: f64, _: f64, _: f64) -> Result<(), SinkError> {
        Ok(())
    }

    fn scale(&mut self, _: f64, _: f64, _: f64) -> Result<(), SinkError> {
        Ok(())
    }
}

#[test]
fn sink_errors_abort_the_draw() {
    let path = polygon(&[(0.0, 0.0), (10.0, 0.0), (5.0, 10.0)]);
    let mut renderer = PathRenderer::new();

    for submits in 0..3 {
        let mut sink = FailingSink {
            submits_before_failure: submits,
        };
        let result = renderer.draw(&path, &StyleContext::filled().with_depth(1.0), &mut sink);
        assert_eq!(result, Err(DrawError::Sink(SinkError::new("device lost"))));
        assert_eq!(renderer.pass(), Pass::Idle);
    }

    // The renderer is still usable.
    let mut sink = RecordingSink::new();
    renderer
        .draw(&path, &StyleContext::filled(), &mut sink)
        .unwrap();
    assert_eq!(sink.submit_count(), 1);
}

#[derive(Default)]
struct FailingTessellator {
    polygons: usize,
}

impl Tessellator for FailingTessellator {
    fn begin_polygon(&mut self, _: WindingRule) {
        self.polygons += 1;
    }

    fn begin_contour(&mut self) {}

    fn vertex(&mut self, _: [f64; 3], _: VertexHandle) {}

    fn end_contour(&mut self) {}

    fn end_polygon(&mut self, _: &mut dyn TessellationSink) -> Result<(), TessellationError> {
        Err(InternalError::NonFiniteCoordinates.into())
    }
}

#[test]
fn tessellator_failure_aborts_the_pass() {
    let mut path = polygon(&[(0.0, 0.0), (10.0, 0.0), (5.0, 10.0)]);
    path.end_style = EndpointStyle::Arrowhead;

    let mut renderer =
        PathRenderer::with_services(FailingTessellator::default(), OutlineStroker::new());
    let mut sink = RecordingSink::new();
    let report = renderer
        .draw(
            &path,
            &StyleContext::filled().with_line(1.0).with_depth(2.0),
            &mut sink,
        )
        .unwrap();

    assert_eq!(renderer.tessellator().polygons, 2);
    assert_eq!(report.passes, vec![Pass::Fill, Pass::Line]);
    let warnings: Vec<_> = report.warnings().cloned().collect();
    assert_eq!(
        warnings,
        vec![
            (
                Pass::Fill,
                GeometryError::TessellatorFailure(InternalError::NonFiniteCoordinates)
            ),
            (
                Pass::Line,
                GeometryError::TessellatorFailure(InternalError::NonFiniteCoordinates)
            ),
        ]
    );
    assert!(sink.commands.is_empty());
}

#[test]
fn bounds_of_extruded_path() {
    let path = polygon(&[(0.0, 0.0), (10.0, 0.0), (5.0, 10.0)]);
    let bounds = compute_bounds(&path, vector3(0.0, 0.0, -4.0));

    assert_eq!(bounds.min, point3(0.0, 0.0, -4.0));
    assert_eq!(bounds.max, point3(10.0, 10.0, 0.0));
}

#[test]
fn stroke_walls_form_one_strip() {
    let mut path = Path::new();
    path.move_to(point3(0.0, 0.0, 0.0));
    path.line_to(point3(10.0, 0.0, 0.0));
    path.line_to(point3(10.0, 10.0, 0.0));
    path.line_to(point3(20.0, 10.0, 0.0));

    let (report, sink) = draw(&path, &StyleContext::stroked(2.0).with_depth(1.0));

    assert_eq!(report.warnings().count(), 0);
    let strips = sink
        .batches()
        .filter(|b| b.kind == PrimitiveKind::TriangleStrip)
        .count();
    assert_eq!(strips, 1);
}
