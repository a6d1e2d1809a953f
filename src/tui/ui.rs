//! Screen layout. Pure text; the renderer decides how it reaches the terminal.

use crate::store::{EntityInfo, MobId};

pub const HELP_LINES: [&str; 2] = [
    "WASD to move, X to shoot, Q to quit,",
    " 1-9 to switch view to player with that ID, 0 to watch yourself",
];

pub const VIEW_HEADING: &str = "=== Game View ===";

/// Lines of one frame, top to bottom.
pub fn compose_frame(viewer_id: MobId, entity: &EntityInfo, viewport: &[String]) -> Vec<String> {
    let mut lines: Vec<String> = HELP_LINES.iter().map(|l| l.to_string()).collect();
    lines.push(String::new());
    lines.push(format!("Viewing player {}: {}", viewer_id, entity.name));
    lines.push(String::new());
    // dir is a float column; keep the trailing ".0" on whole angles
    lines.push(format!(
        "x={:.2}, y={:.2}, dir={:?}",
        entity.x, entity.y, entity.dir
    ));
    lines.push(String::new());
    lines.push(VIEW_HEADING.to_string());
    lines.extend(viewport.iter().cloned());
    lines.push(String::new());
    lines
}
