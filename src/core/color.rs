// src/core/color.rs

use colored::{ColoredString, Colorize};

/// Background colours handed out, in order, to the members of a concurrent
/// group. Names follow the `concurrently` prefix-colour syntax.
pub const PREFIX_PALETTE: [&str; 8] = [
    "bgBlue", "bgGreen", "bgMagenta", "bgCyan", "bgWhite", "bgRed", "bgBlack", "bgYellow",
];

fn palette_name(position: usize) -> &'static str {
    PREFIX_PALETTE
        .get(position % PREFIX_PALETTE.len())
        .copied()
        .unwrap_or("bgBlue")
}

/// The `--prefix-colors` entry for the member at `position`.
pub fn prefix_color_spec(position: usize) -> String {
    format!("{}.bold.reset", palette_name(position))
}

/// Renders `[label]` with the background colour of the member at `position`.
pub fn paint_prefix(label: &str, position: usize) -> ColoredString {
    let text = format!("[{}]", label);
    let painted = match palette_name(position) {
        "bgGreen" => text.on_green(),
        "bgMagenta" => text.on_magenta(),
        "bgCyan" => text.on_cyan(),
        "bgWhite" => text.on_white(),
        "bgRed" => text.on_red(),
        "bgBlack" => text.on_black(),
        "bgYellow" => text.on_yellow(),
        _ => text.on_blue(),
    };
    painted.bold()
}
