/// Colors for the construction-line overlay, one per interpolation level.
/// Levels beyond the palette cycle back to the start.
pub const LEVEL_COLORS: [&str; 6] = [
    "#e46b49", "#49a8e4", "#5bbd6e", "#b05be4", "#e4b449", "#49e4c3",
];

pub fn level_color(level: usize) -> &'static str {
    LEVEL_COLORS[level % LEVEL_COLORS.len()]
}
