use relief::math::Point3;
use relief::path::{Path, PathEvent};
use std::io::{self, Write};

/// Writes a path in the syntax read by the parser.
///
/// The z coordinate is only written if some point of the path is off the `z = 0` plane.
pub fn write_path(output: &mut dyn Write, path: &Path) -> io::Result<()> {
    let with_z = !path.is_flat();
    let point = |output: &mut dyn Write, p: Point3| -> io::Result<()> {
        if with_z {
            write!(output, " {} {} {}", p.x, p.y, p.z)
        } else {
            write!(output, " {} {}", p.x, p.y)
        }
    };

    for evt in path.iter() {
        match evt {
            PathEvent::Begin { at } => {
                write!(output, "M")?;
                point(&mut *output, at)?;
            }
            PathEvent::Line { to, .. } => {
                write!(output, " L")?;
                point(&mut *output, to)?;
            }
            PathEvent::Quadratic { ctrl, to, .. } => {
                write!(output, " Q")?;
                point(&mut *output, ctrl)?;
                point(&mut *output, to)?;
            }
            PathEvent::Cubic {
                ctrl1, ctrl2, to, ..
            } => {
                write!(output, " C")?;
                point(&mut *output, ctrl1)?;
                point(&mut *output, ctrl2)?;
                point(&mut *output, to)?;
            }
            PathEvent::Unsupported { to, .. } => {
                log::warn!("unsupported curve written as a line");
                write!(output, " L")?;
                point(&mut *output, to)?;
            }
            PathEvent::End { close, .. } => {
                write!(output, "{}", if close { " Z\n" } else { "\n" })?;
            }
        }
    }

    Ok(())
}
