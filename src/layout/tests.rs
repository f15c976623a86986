//! Unit tests for the tiling algorithms

use super::*;

fn params(master_count: usize, master_ratio: f64) -> LayoutParams {
    LayoutParams {
        master_count,
        master_ratio,
    }
}

#[test]
fn test_master_stack_empty_is_noop() {
    let mut views: Vec<Rectangle> = Vec::new();
    TilingLayout::master_stack(&mut views, LayoutParams::default(), 1000, 800, 10);
    assert!(views.is_empty());
    assert!(TilingLayout::compute_master_stack(0, LayoutParams::default(), 1000, 800, 10).is_empty());
}

#[test]
fn test_master_stack_single_window_fills_area() {
    let rects = TilingLayout::compute_master_stack(1, params(1, 0.6), 1000, 800, 10);
    assert_eq!(rects, vec![Rectangle::new(10, 10, 980, 780)]);
}

#[test]
fn test_master_stack_reference_geometry() {
    let mut views = vec![Rectangle::default(); 3];
    TilingLayout::master_stack(&mut views, params(1, 0.6), 1000, 800, 10);

    assert_eq!(views[0], Rectangle::new(10, 10, 578, 780));
    assert_eq!(views[1], Rectangle::new(598, 10, 392, 385));
    assert_eq!(views[2], Rectangle::new(598, 405, 392, 385));
}

#[test]
fn test_master_stack_all_masters_makes_bands() {
    let rects = TilingLayout::compute_master_stack(3, params(5, 0.6), 1000, 800, 10);

    // (800 - 4 * 10) / 3 = 253
    assert_eq!(rects.len(), 3);
    for (i, rect) in rects.iter().enumerate() {
        assert_eq!(rect.x, 10);
        assert_eq!(rect.width, 980);
        assert_eq!(rect.height, 253);
        assert_eq!(rect.y, 10 + i as i32 * 263);
    }
}

#[test]
fn test_master_stack_two_masters() {
    let rects = TilingLayout::compute_master_stack(4, params(2, 0.5), 1000, 800, 0);

    assert_eq!(rects[0], Rectangle::new(0, 0, 500, 400));
    assert_eq!(rects[1], Rectangle::new(0, 400, 500, 400));
    assert_eq!(rects[2].x, 500);
    assert_eq!(rects[2].width, 500);
    assert_eq!(rects[2].height, 400);
    assert_eq!(rects[3].y, 400);
}

#[test]
fn test_master_stack_zero_masters_uses_one_column() {
    let rects = TilingLayout::compute_master_stack(2, params(0, 0.6), 1000, 800, 10);
    assert_eq!(rects[0], Rectangle::new(10, 10, 980, 385));
    assert_eq!(rects[1], Rectangle::new(10, 405, 980, 385));
}

#[test]
fn test_negative_gap_is_treated_as_zero() {
    let rects = TilingLayout::compute_master_stack(1, params(1, 0.6), 1000, 800, -5);
    assert_eq!(rects, vec![Rectangle::new(0, 0, 1000, 800)]);

    let grid = TilingLayout::compute_grid(4, 100, 100, -3);
    assert_eq!(grid[3], Rectangle::new(50, 50, 50, 50));
}

#[test]
fn test_monocle_gives_everyone_the_full_area() {
    let mut views = vec![Rectangle::new(5, 5, 5, 5); 4];
    TilingLayout::monocle(&mut views, 1920, 1080);
    for view in &views {
        assert_eq!(*view, Rectangle::new(0, 0, 1920, 1080));
    }
}

#[test]
fn test_monocle_empty() {
    assert!(TilingLayout::compute_monocle(0, 100, 100).is_empty());
}

#[test]
fn test_grid_dimensions() {
    assert_eq!(TilingLayout::grid_dimensions(0), (0, 0));
    assert_eq!(TilingLayout::grid_dimensions(1), (1, 1));
    assert_eq!(TilingLayout::grid_dimensions(2), (2, 1));
    assert_eq!(TilingLayout::grid_dimensions(3), (2, 2));
    assert_eq!(TilingLayout::grid_dimensions(5), (3, 2));
    assert_eq!(TilingLayout::grid_dimensions(9), (3, 3));
    assert_eq!(TilingLayout::grid_dimensions(10), (4, 3));
}

#[test]
fn test_grid_row_major_placement() {
    let rects = TilingLayout::compute_grid(3, 1000, 800, 10);

    // 2 cols x 2 rows: (1000 - 30) / 2 = 485, (800 - 30) / 2 = 385
    assert_eq!(rects[0], Rectangle::new(10, 10, 485, 385));
    assert_eq!(rects[1], Rectangle::new(505, 10, 485, 385));
    assert_eq!(rects[2], Rectangle::new(10, 405, 485, 385));
}

#[test]
fn test_writes_go_through_targets_by_reference() {
    let mut a = Rectangle::default();
    let mut b = Rectangle::default();
    {
        let mut targets: Vec<&mut Rectangle> = vec![&mut a, &mut b];
        TilingLayout::grid(&mut targets, 200, 100, 0);
    }
    assert_eq!(a, Rectangle::new(0, 0, 100, 100));
    assert_eq!(b, Rectangle::new(100, 0, 100, 100));
}
