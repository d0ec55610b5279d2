use crate::commands::FlattenCmd;
use crate::CliError;
use relief::tessellation::flatten_path;
use std::io::Write;

pub fn flatten(mut cmd: FlattenCmd) -> Result<(), CliError> {
    let flattened = flatten_path(&cmd.path, &cmd.flattening, false);
    let output = &mut *cmd.output;

    if cmd.count {
        writeln!(output, "vertices: {}", flattened.vertex_count())?;
        writeln!(output, "contours: {}", flattened.contours.len())?;

        return Ok(());
    }

    for contour in &flattened.contours {
        let mut verb = "M";
        for v in &contour.vertices {
            write!(output, "{} {} {} ", verb, v.position.x, v.position.y)?;
            verb = "L";
        }
        writeln!(output, "{}", if contour.closed { "Z" } else { "" })?;
    }
    for err in &flattened.diagnostics {
        writeln!(output, "# warning: {}", err)?;
    }

    Ok(())
}
