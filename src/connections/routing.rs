use crate::geo::Position3;
use crate::layout::EPSILON;

pub fn direct_path(from: Position3, to: Position3) -> Vec<Position3> {
    vec![from, to]
}

/// Two-bend orthogonal route with a deterministic lane offset.
///
/// Lane `index` falls in group `index / lanes` at slot `index % lanes`. The bend is offset
/// from the start by `(slot - (lanes - 1) / 2) * (2 + 1.4 * group) * 0.6`, and groups alternate
/// between bending along Z first or along X first. Bends happen at the start height. Coincident
/// endpoints give the two-point segment; otherwise consecutive points with the same plane
/// position are dropped.
pub fn orthogonal_path(
    from: Position3,
    to: Position3,
    index: usize,
    lanes: usize,
) -> Vec<Position3> {
    let dx = to.x - from.x;
    let dz = to.z - from.z;
    if dx.abs() < EPSILON && dz.abs() < EPSILON {
        return direct_path(from, to);
    }

    let lanes = lanes.max(1);
    let group = index / lanes;
    let slot = index % lanes;
    let magnitude = 2.0 + group as f32 * 1.4;
    let centered = slot as f32 - (lanes - 1) as f32 / 2.0;
    let offset = centered * magnitude * 0.6;

    let bends = if (group + slot) % 2 == 0 {
        let mid_z = from.z + offset;
        [
            Position3::new(from.x, from.y, mid_z),
            Position3::new(to.x, from.y, mid_z),
        ]
    } else {
        let mid_x = from.x + offset;
        [
            Position3::new(mid_x, from.y, from.z),
            Position3::new(mid_x, from.y, to.z),
        ]
    };

    let mut path: Vec<Position3> = Vec::with_capacity(4);
    for point in [from, bends[0], bends[1], to] {
        if path.last().is_none_or(|last| !last.planar_eq(point)) {
            path.push(point);
        }
    }
    path
}
