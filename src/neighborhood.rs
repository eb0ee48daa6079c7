//! 10-point 3-D periodic (wrap-around) voxel neighborhood.
//!
//! The neighbor order below is load-bearing: bucket assignment in the prior's
//! surrogate accumulation depends on it (indices 0-3 nearest in-plane, 4-5
//! interslice, 6-9 diagonal in-plane).

use crate::util::math::{wrap_next, wrap_prev};

/// One neighbor's voxel value and the bucket it belongs to for QGGMRF weighting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub value: f32,
    pub bucket: NeighborBucket,
}

/// Which QGGMRF coefficient bucket a neighbor contributes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NeighborBucket {
    /// The four in-plane axis neighbors (+x, -x, +y, -y).
    Nearest,
    /// The two through-slice neighbors (+z, -z).
    Interslice,
    /// The four in-plane diagonal neighbors.
    Diagonal,
}

/// Extracts the 10 wrap-around neighbors of voxel `(jx, jy, jz)` from `slice_at`,
/// a callback returning the in-plane value at `(x, y)` on a given slice.
///
/// Order: `+x, -x, +y, -y, +z, -z, +y+x, +y-x, -y+x, -y-x`, matching the bucket
/// layout nearest(0..4) / interslice(4..6) / diagonal(6..10).
pub fn extract_neighbors(
    jx: usize,
    jy: usize,
    jz: usize,
    nx: usize,
    ny: usize,
    nz: usize,
    mut value_at: impl FnMut(usize, usize, usize) -> f32,
) -> [Neighbor; 10] {
    let plus_x = wrap_next(jx, nx);
    let minus_x = wrap_prev(jx, nx);
    let plus_y = wrap_next(jy, ny);
    let minus_y = wrap_prev(jy, ny);
    let plus_z = wrap_next(jz, nz);
    let minus_z = wrap_prev(jz, nz);

    [
        Neighbor { value: value_at(plus_x, jy, jz), bucket: NeighborBucket::Nearest },
        Neighbor { value: value_at(minus_x, jy, jz), bucket: NeighborBucket::Nearest },
        Neighbor { value: value_at(jx, plus_y, jz), bucket: NeighborBucket::Nearest },
        Neighbor { value: value_at(jx, minus_y, jz), bucket: NeighborBucket::Nearest },
        Neighbor { value: value_at(jx, jy, plus_z), bucket: NeighborBucket::Interslice },
        Neighbor { value: value_at(jx, jy, minus_z), bucket: NeighborBucket::Interslice },
        Neighbor { value: value_at(plus_x, plus_y, jz), bucket: NeighborBucket::Diagonal },
        Neighbor { value: value_at(minus_x, plus_y, jz), bucket: NeighborBucket::Diagonal },
        Neighbor { value: value_at(plus_x, minus_y, jz), bucket: NeighborBucket::Diagonal },
        Neighbor { value: value_at(minus_x, minus_y, jz), bucket: NeighborBucket::Diagonal },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_at_all_six_boundary_corners() {
        // (0,0,0) in a 4x4x4 volume: every minus-direction should wrap to the far edge.
        let neighbors = extract_neighbors(0, 0, 0, 4, 4, 4, |x, y, z| {
            (x as f32) + 10.0 * (y as f32) + 100.0 * (z as f32)
        });
        assert_eq!(neighbors[0].value, 1.0); // +x
        assert_eq!(neighbors[1].value, 3.0); // -x wraps to 3
        assert_eq!(neighbors[2].value, 10.0); // +y
        assert_eq!(neighbors[3].value, 30.0); // -y wraps to 3
        assert_eq!(neighbors[4].value, 100.0); // +z
        assert_eq!(neighbors[5].value, 300.0); // -z wraps to 3
    }

    #[test]
    fn buckets_match_spec_order() {
        let neighbors = extract_neighbors(1, 1, 1, 4, 4, 4, |_, _, _| 0.0);
        let buckets: Vec<_> = neighbors.iter().map(|n| n.bucket).collect();
        use NeighborBucket::*;
        assert_eq!(
            buckets,
            vec![Nearest, Nearest, Nearest, Nearest, Interslice, Interslice, Diagonal, Diagonal, Diagonal, Diagonal]
        );
    }

    #[test]
    fn single_slice_wraps_z_onto_itself() {
        let neighbors = extract_neighbors(0, 0, 0, 4, 4, 1, |_, _, z| z as f32);
        assert_eq!(neighbors[4].value, 0.0);
        assert_eq!(neighbors[5].value, 0.0);
    }
}
