//! Contact sheet rendering with graphicsmagick.

use crate::command::Pipeline;
use crate::{CancelToken, Error, Result, ToolCommand};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Tile geometry of a contact sheet page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetLayout {
    /// Edge length of one tile in pixels.
    pub size: u32,
    /// Horizontal gap around each tile; also the outer border width.
    pub border_w: u32,
    /// Vertical gap around each tile.
    pub border_h: u32,
    pub tiles_x: u32,
    pub tiles_y: u32,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            size: 500,
            border_w: 30,
            border_h: 8,
            tiles_x: 8,
            tiles_y: 5,
        }
    }
}

impl SheetLayout {
    /// Images per page.
    pub fn per_page(&self) -> usize {
        (self.tiles_x as usize) * (self.tiles_y as usize)
    }

    fn montage_args(&self, inputs: &[PathBuf]) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "montage".to_string(),
            "-pointsize".to_string(),
            "30".to_string(),
            "-label".to_string(),
            "%t".to_string(),
            "-geometry".to_string(),
            format!(
                "{}x{}+{}+{}",
                self.size, self.size, self.border_w, self.border_h
            ),
            "-tile".to_string(),
            format!("{}x{}", self.tiles_x, self.tiles_y),
            "-background".to_string(),
            "white".to_string(),
            "-depth".to_string(),
            "8".to_string(),
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.extend(inputs.iter().map(OsString::from));
        args.push("miff:-".into());
        args
    }

    fn border_args(&self, output: &Path) -> Vec<OsString> {
        // Outer border is taller than wide so labels under the last row
        // do not touch the page edge.
        let vertical = (2 * self.border_w).saturating_sub(self.border_h);
        vec![
            "convert".into(),
            "-".into(),
            "-bordercolor".into(),
            "white".into(),
            "-border".into(),
            format!("{}x{}", self.border_w, vertical).into(),
            output.into(),
        ]
    }
}

/// Tile `inputs` into one page written to `output`.
///
/// Runs `gm montage … miff:- | gm convert - -border … output`.
pub fn render_sheet(
    gm: &Path,
    inputs: &[PathBuf],
    output: &Path,
    layout: &SheetLayout,
    cancel: &CancelToken,
) -> Result<()> {
    if inputs.is_empty() {
        return Err(Error::InvalidInput("contact sheet without images".to_string()));
    }

    let mut montage = ToolCommand::new(gm);
    montage.args(layout.montage_args(inputs));
    let mut border = ToolCommand::new(gm);
    border.args(layout.border_args(output));

    Pipeline::new(&montage, &border).execute(cancel)?;
    Ok(())
}
