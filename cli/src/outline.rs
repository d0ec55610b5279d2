use crate::commands::OutlineCmd;
use crate::format::write_path;
use crate::CliError;
use relief::tessellation::{Outline, OutlineStroker, StrokeOptions};
use std::io::Write;

pub fn outline(mut cmd: OutlineCmd) -> Result<(), CliError> {
    let options = StrokeOptions::line_width(cmd.line_width).with_dash(cmd.path.line_style);
    let outline = Outline::compute(&cmd.path, &options, &OutlineStroker::new());

    write_path(&mut *cmd.output, &outline.path)?;
    if let Some(centerline) = &outline.centerline {
        writeln!(cmd.output, "# centerline")?;
        write_path(&mut *cmd.output, centerline)?;
    }
    for err in &outline.diagnostics {
        writeln!(cmd.output, "# warning: {}", err)?;
    }

    Ok(())
}
