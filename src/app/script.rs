// SPDX-License-Identifier: GPL-3.0-only

//! Replayable annotation gestures
//!
//! An edit script is a JSON list of steps that drives an [`EditSession`]
//! exactly as pointer input would:
//!
//! ```json
//! [
//!   { "op": "tool", "tool": "rect" },
//!   { "op": "drag", "from": { "x": 10, "y": 10 }, "to": { "x": 200, "y": 120 },
//!     "display": { "width": 960, "height": 540 } },
//!   { "op": "apply_crop" }
//! ]
//! ```

use crate::errors::{AppError, AppResult};
use crate::pipelines::photo::{AnnotationTool, EditSession, Point, Size};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

fn default_moves() -> u32 {
    8
}

/// One scripted action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditStep {
    /// Select a tool, or deselect it if already active
    Tool { tool: AnnotationTool },
    /// Pointer down at `from`, `moves` evenly spaced moves ending at `to`,
    /// pointer up. Coordinates are in display space of size `display`.
    Drag {
        from: Point,
        to: Point,
        display: Size,
        #[serde(default = "default_moves")]
        moves: u32,
    },
    ApplyCrop,
    /// Remove all annotations and tool state
    Clear,
}

/// Ordered list of steps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditScript {
    pub steps: Vec<EditStep>,
}

impl EditScript {
    pub fn from_json(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Replay every step against `editor`
    pub fn apply(&self, editor: &mut EditSession) {
        for step in &self.steps {
            debug!(?step, "Replaying edit step");
            match step {
                EditStep::Tool { tool } => {
                    editor.select_tool(*tool);
                }
                EditStep::Drag {
                    from,
                    to,
                    display,
                    moves,
                } => {
                    editor.pointer_down(*from, *display);
                    let moves = (*moves).max(1);
                    for i in 1..=moves {
                        let t = i as f32 / moves as f32;
                        editor.pointer_move(from.lerp(*to, t), *display);
                    }
                    editor.pointer_up();
                }
                EditStep::ApplyCrop => {
                    editor.apply_crop();
                }
                EditStep::Clear => editor.clear(),
            }
        }
    }
}
