//! Tiling algorithms
//!
//! Pure geometry in area-relative coordinates: the area's top-left corner is
//! always `(0, 0)`. Translating the result onto an output (after reserved
//! space has been subtracted) is the caller's job.
//!
//! Each algorithm exists twice: a `compute_*` function returning rectangles
//! in input order, and an `apply`-style entry point writing them back through
//! [`LayoutTarget`].

use serde::{Deserialize, Serialize};

use crate::client::Rectangle;

/// Anything whose geometry a layout can write
pub trait LayoutTarget {
    fn apply_geometry(&mut self, rect: Rectangle);

    fn current_geometry(&self) -> Rectangle;
}

impl<T: LayoutTarget + ?Sized> LayoutTarget for &mut T {
    fn apply_geometry(&mut self, rect: Rectangle) {
        (**self).apply_geometry(rect);
    }

    fn current_geometry(&self) -> Rectangle {
        (**self).current_geometry()
    }
}

impl LayoutTarget for Rectangle {
    fn apply_geometry(&mut self, rect: Rectangle) {
        *self = rect;
    }

    fn current_geometry(&self) -> Rectangle {
        *self
    }
}

/// Tiling parameters read from a tag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutParams {
    pub master_count: usize,
    pub master_ratio: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            master_count: 1,
            master_ratio: 0.55,
        }
    }
}

/// Stateless tiling algorithms
#[derive(Debug, Clone, Copy, Default)]
pub struct TilingLayout;

/// Height (or width) of each of `count` equal cells along `extent`, with
/// `gap` before, between and after them.
fn cell_extent(extent: i32, count: i32, gap: i32) -> i32 {
    (extent - (count + 1) * gap) / count
}

/// `count` equal-height bands stacked in a column at `x`
fn column(x: i32, width: i32, count: usize, height: i32, gap: i32) -> Vec<Rectangle> {
    if count == 0 {
        return Vec::new();
    }
    let band = cell_extent(height, count as i32, gap);
    (0..count as i32)
        .map(|i| Rectangle::new(x, gap + i * (band + gap), width, band))
        .collect()
}

impl TilingLayout {
    /// Master column on the left, stack column on the right.
    pub fn compute_master_stack(
        n: usize,
        params: LayoutParams,
        width: i32,
        height: i32,
        gap: i32,
    ) -> Vec<Rectangle> {
        let gap = gap.max(0);
        match n {
            0 => Vec::new(),
            1 => vec![Rectangle::new(gap, gap, width - 2 * gap, height - 2 * gap)],
            _ => {
                let master_count = params.master_count.min(n);
                if master_count == n || master_count == 0 {
                    // A single column spanning the whole width
                    return column(gap, width - 2 * gap, n, height, gap);
                }

                let inner_width = (width - 2 * gap) as f64;
                let master_width = (inner_width * params.master_ratio).floor() as i32 - gap;
                let stack_width = width - master_width - 3 * gap;

                let mut rects = column(gap, master_width, master_count, height, gap);
                rects.extend(column(
                    master_width + 2 * gap,
                    stack_width,
                    n - master_count,
                    height,
                    gap,
                ));
                rects
            }
        }
    }

    /// Every view covers the whole area; stacking decides what is seen
    pub fn compute_monocle(n: usize, width: i32, height: i32) -> Vec<Rectangle> {
        vec![Rectangle::new(0, 0, width, height); n]
    }

    /// Near-square grid, filled row-major
    pub fn compute_grid(n: usize, width: i32, height: i32, gap: i32) -> Vec<Rectangle> {
        if n == 0 {
            return Vec::new();
        }
        let gap = gap.max(0);
        let (cols, rows) = Self::grid_dimensions(n);

        let cell_width = cell_extent(width, cols as i32, gap);
        let cell_height = cell_extent(height, rows as i32, gap);

        (0..n)
            .map(|idx| {
                let row = (idx / cols) as i32;
                let col = (idx % cols) as i32;
                Rectangle::new(
                    gap + col * (cell_width + gap),
                    gap + row * (cell_height + gap),
                    cell_width,
                    cell_height,
                )
            })
            .collect()
    }

    /// `(cols, rows)` for a grid of `n` cells
    pub fn grid_dimensions(n: usize) -> (usize, usize) {
        if n == 0 {
            return (0, 0);
        }
        let cols = (n as f64).sqrt().ceil() as usize;
        let rows = n.div_ceil(cols);
        (cols, rows)
    }

    pub fn master_stack<T: LayoutTarget>(
        views: &mut [T],
        params: LayoutParams,
        width: i32,
        height: i32,
        gap: i32,
    ) {
        let rects = Self::compute_master_stack(views.len(), params, width, height, gap);
        write_back(views, rects);
    }

    pub fn monocle<T: LayoutTarget>(views: &mut [T], width: i32, height: i32) {
        let rects = Self::compute_monocle(views.len(), width, height);
        write_back(views, rects);
    }

    pub fn grid<T: LayoutTarget>(views: &mut [T], width: i32, height: i32, gap: i32) {
        let rects = Self::compute_grid(views.len(), width, height, gap);
        write_back(views, rects);
    }
}

fn write_back<T: LayoutTarget>(views: &mut [T], rects: Vec<Rectangle>) {
    for (view, rect) in views.iter_mut().zip(rects) {
        view.apply_geometry(rect);
    }
}

#[cfg(test)]
mod tests;
