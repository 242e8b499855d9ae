use turtlemesh_canvas::{Region, Symbol};

use crate::grid::{nudge_into_region, Grid};

/// What a drawing pass hands back to the coordinator: either "I left
/// the region" or "I finished the slice" — both cases are
/// reported identically as an updated cursor plus a consumed count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawOutcome {
    pub x: f32,
    pub y: f32,
    pub heading_deg: f32,
    pub consumed: u16,
}

/// Walk `slice` starting from `(x, y, heading_deg)`, marking cells in
/// `grid` until either the slice is exhausted or the turtle steps
/// outside `region`.
pub fn draw_slice(
    region: &Region,
    turn_angle_deg: i32,
    grid: &mut Grid,
    start: (f32, f32, f32),
    slice: &[u8],
) -> DrawOutcome {
    let (mut x, mut y) = nudge_into_region(region, start.0, start.1);
    let mut heading_deg = start.2;

    // Mark the cell the turtle occupies on entry — this is either the
    // configured start point or the cell a prior HANDOVER moved it
    // into, which by construction belongs to this region.
    let (ex, ey) = (x.floor() as i64, y.floor() as i64);
    if region.contains(ex, ey) {
        let (lx, ly) = region.local(ex, ey);
        grid.mark(lx, ly);
    }

    for (i, &byte) in slice.iter().enumerate() {
        match Symbol::classify(byte) {
            Symbol::DrawForward => {
                let rad = heading_deg.to_radians();
                let next_x = x + rad.cos();
                let next_y = y - rad.sin(); // y grows downward

                let (ix, iy) = (next_x.floor() as i64, next_y.floor() as i64);
                if !region.contains(ix, iy) {
                    return DrawOutcome {
                        x: next_x,
                        y: next_y,
                        heading_deg,
                        consumed: (i + 1) as u16,
                    };
                }

                let (lx, ly) = region.local(ix, iy);
                grid.mark(lx, ly);
                x = next_x;
                y = next_y;
            }
            Symbol::TurnLeft => heading_deg += turn_angle_deg as f32,
            Symbol::TurnRight => heading_deg -= turn_angle_deg as f32,
            Symbol::NoOp => {}
        }
    }

    DrawOutcome {
        x,
        y,
        heading_deg,
        consumed: slice.len() as u16,
    }
}
