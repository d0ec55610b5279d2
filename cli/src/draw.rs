use crate::commands::DrawCmd;
use crate::CliError;
use relief::tessellation::{DrawCommand, PathRenderer, PrimitiveKind, RecordingSink};
use std::io::Write;

pub fn draw(mut cmd: DrawCmd) -> Result<(), CliError> {
    let mut renderer = PathRenderer::new();
    let mut sink = RecordingSink::new();
    let report = renderer.draw(&cmd.path, &cmd.style, &mut sink)?;

    let output = &mut *cmd.output;

    if !cmd.count {
        for command in &sink.commands {
            match command {
                DrawCommand::Submit(batch) => {
                    let count = batch.vertices.len();
                    writeln!(output, "submit {:?} ({} vertices)", batch.kind, count)?;
                    for v in &batch.vertices {
                        writeln!(
                            output,
                            "    ({}, {}, {}) normal ({}, {}, {})",
                            v.position.x,
                            v.position.y,
                            v.position.z,
                            v.normal.x,
                            v.normal.y,
                            v.normal.z
                        )?;
                    }
                }
                DrawCommand::SetFrontFace(face) => writeln!(output, "front face {:?}", face)?,
                DrawCommand::PushTransform => writeln!(output, "push transform")?,
                DrawCommand::PopTransform => writeln!(output, "pop transform")?,
                DrawCommand::Translate([x, y, z]) => {
                    writeln!(output, "translate {} {} {}", x, y, z)?
                }
                DrawCommand::Scale([x, y, z]) => writeln!(output, "scale {} {} {}", x, y, z)?,
                DrawCommand::ColorWrite(enabled) => writeln!(output, "color write {}", enabled)?,
            }
        }
    }

    writeln!(output, "passes: {:?}", report.passes)?;
    writeln!(output, "batches: {}", report.batches)?;
    for kind in &[
        PrimitiveKind::Triangles,
        PrimitiveKind::TriangleStrip,
        PrimitiveKind::TriangleFan,
        PrimitiveKind::Polygon,
        PrimitiveKind::LineStrip,
    ] {
        let count = sink.batches().filter(|b| b.kind == *kind).count();
        if count > 0 {
            writeln!(output, "    {:?}: {}", kind, count)?;
        }
    }
    writeln!(output, "vertices: {}", report.vertices)?;
    writeln!(output, "triangles: {}", sink.triangle_count())?;
    for (pass, err) in report.warnings() {
        writeln!(output, "warning ({:?} pass): {}", pass, err)?;
    }

    Ok(())
}
