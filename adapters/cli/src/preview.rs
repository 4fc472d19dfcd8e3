use std::collections::HashMap;

use isleweave_core::{CellPos, ConnectionMask, GridSpec, Layout};

const EMPTY_CELL: char = '·';

/// Light box-drawing glyphs indexed by connection mask bits (N=1, E=2, S=4, W=8).
const LIGHT_GLYPHS: [char; 16] = [
    '○', '╵', '╶', '└', '╷', '│', '┌', '├', '╴', '┘', '─', '┴', '┐', '┤', '┬', '┼',
];

/// Heavy variants used to highlight the origin.
const HEAVY_GLYPHS: [char; 16] = [
    '●', '╹', '╺', '┗', '╻', '┃', '┏', '┣', '╸', '┛', '━', '┻', '┓', '┫', '┳', '╋',
];

/// Widest stretch of cells drawn on either side of the origin.
pub(crate) const MAX_PREVIEW_RADIUS: i64 = 64;

/// Inclusive bounds of the drawn area on both axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Window {
    low: i64,
    high: i64,
}

impl Window {
    /// Grid bounds clipped to [`MAX_PREVIEW_RADIUS`] around the origin.
    fn for_grid(grid: &GridSpec) -> Self {
        let low = -i64::from(grid.centre());
        let high = low + i64::from(grid.side()) - 1;
        Self {
            low: low.max(-MAX_PREVIEW_RADIUS),
            high: high.min(MAX_PREVIEW_RADIUS),
        }
    }

    fn contains(self, position: CellPos) -> bool {
        let inside = |value: i32| (self.low..=self.high).contains(&i64::from(value));
        inside(position.x()) && inside(position.y())
    }
}

/// Renders one character per grid cell, north at the top.
///
/// Large grids are clipped to [`MAX_PREVIEW_RADIUS`] cells around the origin.
/// Connections come from the layout's bridges, so a link to a dropped
/// parent is not drawn.
pub(crate) fn render(grid: &GridSpec, layout: &Layout) -> String {
    let masks = connection_masks(layout);
    let origin = layout.origin().map(|cell| cell.position);
    let window = Window::for_grid(grid);

    let mut out = String::new();
    for y in (window.low..=window.high).rev() {
        for x in window.low..=window.high {
            let position = CellPos::new(clamp_i32(x), clamp_i32(y));
            let glyph = match masks.get(&position) {
                Some(mask) if Some(position) == origin => HEAVY_GLYPHS[usize::from(mask.bits())],
                Some(mask) => LIGHT_GLYPHS[usize::from(mask.bits())],
                None => EMPTY_CELL,
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

/// Number of layout cells the clipped preview leaves out.
pub(crate) fn hidden_cells(grid: &GridSpec, layout: &Layout) -> usize {
    let window = Window::for_grid(grid);
    layout
        .iter()
        .filter(|cell| !window.contains(cell.position))
        .count()
}

fn connection_masks(layout: &Layout) -> HashMap<CellPos, ConnectionMask> {
    let mut masks: HashMap<CellPos, ConnectionMask> = layout
        .iter()
        .map(|cell| (cell.position, ConnectionMask::EMPTY))
        .collect();

    for bridge in layout.bridges() {
        let Some(from) = masks.get_mut(&bridge.from) else {
            continue;
        };
        from.insert(bridge.direction);
        if let Some(mask) = masks.get_mut(&bridge.to) {
            mask.insert(bridge.direction.opposite());
        }
    }
    masks
}

fn clamp_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

#[cfg(test)]
mod tests {
    use isleweave_core::{GroupId, ResolvedCell, Rotation, TileId};

    use super::*;

    fn cell(x: i32, y: i32, parent: Option<(i32, i32)>) -> ResolvedCell {
        ResolvedCell {
            position: CellPos::new(x, y),
            level: u32::from(parent.is_some()),
            group: GroupId::new(0),
            tile: TileId::new(0),
            rotation: Rotation::new(0),
            parent: parent.map(|(px, py)| CellPos::new(px, py)),
        }
    }

    #[test]
    fn renders_connections_with_origin_highlighted() {
        let layout = Layout::new(vec![
            cell(0, 0, None),
            cell(0, 1, Some((0, 0))),
            cell(1, 0, Some((0, 0))),
        ]);

        let rendered = render(&GridSpec::with_radius(1), &layout);
        assert_eq!(rendered, "·╷·\n·┗╴\n···\n");
    }

    #[test]
    fn empty_layout_renders_blank_grid() {
        let rendered = render(&GridSpec::with_radius(1), &Layout::default());
        assert_eq!(rendered, "···\n···\n···\n");
    }

    #[test]
    fn dropped_parents_leave_children_unlinked() {
        // (0,1) is missing, so (0,2) has nothing to draw toward.
        let layout = Layout::new(vec![cell(0, 0, None), cell(0, 2, Some((0, 1)))]);
        let rendered = render(&GridSpec::with_radius(2), &layout);
        let rows: Vec<&str> = rendered.lines().collect();
        assert_eq!(rows[0], "··○··");
        assert_eq!(rows[2], "··●··");
    }

    #[test]
    fn huge_grids_render_a_bounded_window() {
        let far = (MAX_PREVIEW_RADIUS + 1) as i32;
        let layout = Layout::new(vec![cell(0, 0, None), cell(far, 0, Some((far - 1, 0)))]);
        let grid = GridSpec::new(u32::MAX, 1.0).expect("grid");

        let rendered = render(&grid, &layout);
        let width = (2 * MAX_PREVIEW_RADIUS + 1) as usize;
        let rows: Vec<&str> = rendered.lines().collect();
        assert_eq!(rows.len(), width);
        assert!(rows.iter().all(|row| row.chars().count() == width));
        assert_eq!(rows[width / 2].chars().nth(width / 2), Some('●'));
        assert_eq!(hidden_cells(&grid, &layout), 1);
    }

    #[test]
    fn even_sides_reach_further_negative() {
        let layout = Layout::new(vec![cell(0, 0, None), cell(-1, 0, Some((0, 0)))]);
        let rendered = render(&GridSpec::new(2, 1.0).expect("grid"), &layout);
        assert_eq!(rendered, "╶╸\n··\n");
    }
}
