//! Two-pass box layout, run once per axis.
//!
//! Pass 1 (post-order, upward): `ChildrenSum` boxes accumulate their
//! children's resolved sizes. Pass 2 (pre-order, downward): `PctParent`
//! boxes resolve against the parent's now-known size. `Pixels` is literal
//! and `Custom` asks the box kind's measure capability.
//!
//! A `PctParent` child inside a `ChildrenSum` parent contributes zero to the
//! upward pass; the projection is one pass in each direction, never a
//! fixpoint iteration.
//!
//! Floating boxes are excluded from flow accumulation and positioning; they
//! sit at their explicit offset from the parent origin.

use crate::geom::{Axis, Rect, Vec2};
use crate::style::SizeSpec;
use crate::ui::BoxNode;

/// Measure callback for `SizeSpec::Custom` boxes.
type MeasureFn<'a> = dyn FnMut(&BoxNode, Axis) -> f32 + 'a;

/// Solves sizes and positions for the whole tree. The root is pinned at the
/// origin; its own size spec resolves against the viewport.
pub(crate) fn solve(
    nodes: &mut [BoxNode],
    root: usize,
    viewport: Vec2,
    measure: &mut MeasureFn<'_>,
) {
    for axis in [Axis::X, Axis::Y] {
        size_upward(nodes, root, axis, measure);
        let viewport_size = match axis {
            Axis::X => viewport.x,
            Axis::Y => viewport.y,
        };
        size_downward(nodes, root, axis, viewport_size);
    }

    nodes[root].rect = Rect::new(0.0, 0.0, nodes[root].size_px[0], nodes[root].size_px[1]);
    place(nodes, root);
}

fn size_upward(nodes: &mut [BoxNode], idx: usize, axis: Axis, measure: &mut MeasureFn<'_>) {
    for i in 0..nodes[idx].children.len() {
        let child = nodes[idx].children[i];
        size_upward(nodes, child, axis, measure);
    }

    let padding = nodes[idx].style.padding;
    let spacing = nodes[idx].style.spacing;
    let direction = nodes[idx].style.direction;

    let size = match nodes[idx].style.size[axis.idx()] {
        SizeSpec::Pixels(v) => v,
        SizeSpec::Custom => measure(&nodes[idx], axis) + padding * 2.0,
        SizeSpec::PctParent(_) => 0.0,
        SizeSpec::ChildrenSum => {
            let mut sum = 0.0f32;
            let mut max = 0.0f32;
            let mut flow_count = 0usize;
            for i in 0..nodes[idx].children.len() {
                let child = nodes[idx].children[i];
                if nodes[child].floating.is_some() {
                    continue;
                }
                let child_size = nodes[child].size_px[axis.idx()];
                sum += child_size;
                max = max.max(child_size);
                flow_count += 1;
            }
            if axis == direction {
                let gaps = flow_count.saturating_sub(1) as f32;
                sum + spacing * gaps + padding * 2.0
            } else {
                max + padding * 2.0
            }
        }
    };
    nodes[idx].size_px[axis.idx()] = size;
}

fn size_downward(nodes: &mut [BoxNode], idx: usize, axis: Axis, parent_size: f32) {
    if let SizeSpec::PctParent(fraction) = nodes[idx].style.size[axis.idx()] {
        nodes[idx].size_px[axis.idx()] = parent_size * fraction;
    }

    let my_size = nodes[idx].size_px[axis.idx()];
    for i in 0..nodes[idx].children.len() {
        let child = nodes[idx].children[i];
        size_downward(nodes, child, axis, my_size);
    }
}

fn place(nodes: &mut [BoxNode], idx: usize) {
    let rect = nodes[idx].rect;
    let padding = nodes[idx].style.padding;
    let spacing = nodes[idx].style.spacing;
    let direction = nodes[idx].style.direction;

    let mut cursor = match direction {
        Axis::X => rect.min.x + padding,
        Axis::Y => rect.min.y + padding,
    };

    for i in 0..nodes[idx].children.len() {
        let child = nodes[idx].children[i];
        let size = nodes[child].size_px;

        let min = if let Some(offset) = nodes[child].floating {
            Vec2::new(rect.min.x + offset.x, rect.min.y + offset.y)
        } else {
            let min = match direction {
                Axis::X => Vec2::new(cursor, rect.min.y + padding),
                Axis::Y => Vec2::new(rect.min.x + padding, cursor),
            };
            cursor += size[direction.idx()] + spacing;
            min
        };

        nodes[child].rect = Rect {
            min,
            max: Vec2::new(min.x + size[0], min.y + size[1]),
        };
        place(nodes, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Style, StylePatch};
    use crate::ui::{BoxKind, BoxNode};

    fn node(parent: Option<usize>, size_x: SizeSpec, size_y: SizeSpec) -> BoxNode {
        BoxNode {
            key: 0,
            id: String::new(),
            tag: "test",
            kind: BoxKind::Container,
            parent,
            children: Vec::new(),
            patch: StylePatch::default(),
            style: Style {
                size: [size_x, size_y],
                ..Default::default()
            },
            rect: Rect::default(),
            size_px: [0.0, 0.0],
            reactive: false,
            focusable: false,
            floating: None,
        }
    }

    fn link(nodes: &mut [BoxNode], parent: usize, child: usize) {
        nodes[parent].children.push(child);
    }

    fn no_measure(_: &BoxNode, _: Axis) -> f32 {
        0.0
    }

    #[test]
    fn test_children_sum_accumulates_pixel_children() {
        // Parent sums two children of 30 and 40 along its stacking axis.
        let mut nodes = vec![
            node(None, SizeSpec::ChildrenSum, SizeSpec::ChildrenSum),
            node(Some(0), SizeSpec::Pixels(30.0), SizeSpec::Pixels(10.0)),
            node(Some(0), SizeSpec::Pixels(40.0), SizeSpec::Pixels(10.0)),
        ];
        nodes[0].style.direction = Axis::X;
        nodes[0].style.padding = 2.0;
        link(&mut nodes, 0, 1);
        link(&mut nodes, 0, 2);

        solve(&mut nodes, 0, Vec2::new(800.0, 600.0), &mut no_measure);
        assert!(nodes[0].rect.width() >= 70.0);
        assert_eq!(nodes[0].rect.width(), 74.0); // 30 + 40 + padding both sides
        assert_eq!(nodes[0].rect.height(), 14.0); // max child + padding
    }

    #[test]
    fn test_pct_parent_resolves_downward() {
        let mut nodes = vec![
            node(None, SizeSpec::Pixels(200.0), SizeSpec::Pixels(100.0)),
            node(Some(0), SizeSpec::PctParent(0.25), SizeSpec::PctParent(1.0)),
        ];
        link(&mut nodes, 0, 1);

        solve(&mut nodes, 0, Vec2::new(800.0, 600.0), &mut no_measure);
        assert_eq!(nodes[1].rect.width(), 50.0);
        assert_eq!(nodes[1].rect.height(), 100.0);
    }

    #[test]
    fn test_flow_positions_children_sequentially() {
        let mut nodes = vec![
            node(None, SizeSpec::Pixels(100.0), SizeSpec::Pixels(100.0)),
            node(Some(0), SizeSpec::Pixels(100.0), SizeSpec::Pixels(20.0)),
            node(Some(0), SizeSpec::Pixels(100.0), SizeSpec::Pixels(30.0)),
        ];
        nodes[0].style.direction = Axis::Y;
        nodes[0].style.spacing = 5.0;
        link(&mut nodes, 0, 1);
        link(&mut nodes, 0, 2);

        solve(&mut nodes, 0, Vec2::new(800.0, 600.0), &mut no_measure);
        assert_eq!(nodes[1].rect.min.y, 0.0);
        assert_eq!(nodes[2].rect.min.y, 25.0); // 20 + spacing
    }

    #[test]
    fn test_floating_excluded_from_flow() {
        let mut nodes = vec![
            node(None, SizeSpec::ChildrenSum, SizeSpec::ChildrenSum),
            node(Some(0), SizeSpec::Pixels(50.0), SizeSpec::Pixels(10.0)),
            node(Some(0), SizeSpec::Pixels(400.0), SizeSpec::Pixels(400.0)),
        ];
        nodes[0].style.direction = Axis::Y;
        nodes[2].floating = Some(Vec2::new(7.0, 9.0));
        link(&mut nodes, 0, 1);
        link(&mut nodes, 0, 2);

        solve(&mut nodes, 0, Vec2::new(800.0, 600.0), &mut no_measure);
        // The float neither grows the parent nor shifts flow siblings.
        assert_eq!(nodes[0].rect.width(), 50.0);
        assert_eq!(nodes[0].rect.height(), 10.0);
        assert_eq!(nodes[2].rect.min, Vec2::new(7.0, 9.0));
        assert_eq!(nodes[1].rect.min, Vec2::new(0.0, 0.0));
    }

    #[test]
    fn test_custom_uses_measure_callback() {
        let mut nodes = vec![node(None, SizeSpec::Custom, SizeSpec::Custom)];
        let mut measure = |_: &BoxNode, axis: Axis| match axis {
            Axis::X => 64.0,
            Axis::Y => 16.0,
        };
        solve(&mut nodes, 0, Vec2::new(800.0, 600.0), &mut measure);
        assert_eq!(nodes[0].rect.width(), 64.0);
        assert_eq!(nodes[0].rect.height(), 16.0);
    }

    #[test]
    fn test_nested_children_sum() {
        let mut nodes = vec![
            node(None, SizeSpec::ChildrenSum, SizeSpec::ChildrenSum),
            node(Some(0), SizeSpec::ChildrenSum, SizeSpec::ChildrenSum),
            node(Some(1), SizeSpec::Pixels(25.0), SizeSpec::Pixels(8.0)),
            node(Some(1), SizeSpec::Pixels(25.0), SizeSpec::Pixels(8.0)),
        ];
        nodes[0].style.direction = Axis::Y;
        nodes[1].style.direction = Axis::X;
        link(&mut nodes, 0, 1);
        link(&mut nodes, 1, 2);
        link(&mut nodes, 1, 3);

        solve(&mut nodes, 0, Vec2::new(800.0, 600.0), &mut no_measure);
        assert_eq!(nodes[1].rect.width(), 50.0);
        assert_eq!(nodes[0].rect.width(), 50.0);
        assert_eq!(nodes[0].rect.height(), 8.0);
    }
}
