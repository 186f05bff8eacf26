//! Packed node layout and field accessors.
//!
//! Every node occupies [`UINT32_PER_NODE`] consecutive 32-bit slots of a root
//! buffer. Bounds are read through an `f32` view of the same words:
//!
//! | slot | view  | leaf                        | internal            |
//! |------|-------|-----------------------------|---------------------|
//! | 0..6 | `f32` | bounds min xyz, max xyz     | same                |
//! | 6    | `u32` | first triangle              | right child slot    |
//! | 7    | `u32` | flag `<< 16` \| count       | split axis          |
//!
//! The leaf word packs the 16-bit flag into the high half and the 16-bit
//! count into the low half with shifts, so the words mean the same on any
//! host. An internal node's axis is at most 2, which keeps its high half
//! clear of the flag.
//!
//! Nodes are addressed by `n32`, their first 32-bit slot. The left child
//! always follows its parent directly. Nothing here validates: buffers come
//! from a trusted builder.

use meshcast_geom::Aabb3;

/// Size of one node in bytes.
pub const BYTES_PER_NODE: usize = 32;

/// Size of one node in 32-bit slots.
pub const UINT32_PER_NODE: usize = BYTES_PER_NODE / 4;

/// Value of the 16-bit flag slot that marks a leaf.
pub const IS_LEAF_FLAG: u16 = 0xFFFF;

/// Whether the node at `n32` is a leaf.
#[inline]
pub fn is_leaf(n32: usize, uint32: &[u32]) -> bool {
    (uint32[n32 + 7] >> 16) as u16 == IS_LEAF_FLAG
}

/// First triangle of the leaf at `n32`.
#[inline]
pub fn offset(n32: usize, uint32: &[u32]) -> usize {
    uint32[n32 + 6] as usize
}

/// Triangle count of the leaf at `n32`.
#[inline]
pub fn count(n32: usize, uint32: &[u32]) -> usize {
    (uint32[n32 + 7] & 0xFFFF) as usize
}

/// Left child of the internal node at `n32`.
#[inline]
pub fn left_node(n32: usize) -> usize {
    n32 + UINT32_PER_NODE
}

/// Right child of the internal node at `n32`.
#[inline]
pub fn right_node(n32: usize, uint32: &[u32]) -> usize {
    uint32[n32 + 6] as usize
}

/// Split axis of the internal node at `n32`.
#[inline]
pub fn split_axis(n32: usize, uint32: &[u32]) -> usize {
    uint32[n32 + 7] as usize
}

/// Start of the node's six bounding floats.
#[inline]
pub fn bounding_data_index(n32: usize) -> usize {
    n32
}

/// Read the bounds stored at `index` in the float view.
#[inline]
pub fn array_to_box(index: usize, float32: &[f32]) -> Aabb3 {
    Aabb3::from_f32_slice(&float32[index..index + 6])
}

/// Write one leaf node into the eight slots of `node`.
pub(crate) fn write_leaf(node: &mut [u32], bounds: &Aabb3, offset: u32, count: u16) {
    write_bounds(node, bounds);
    node[6] = offset;
    node[7] = ((IS_LEAF_FLAG as u32) << 16) | count as u32;
}

/// Write one internal node into the eight slots of `node`.
pub(crate) fn write_internal(node: &mut [u32], bounds: &Aabb3, right: u32, axis: u32) {
    write_bounds(node, bounds);
    node[6] = right;
    node[7] = axis;
}

fn write_bounds(node: &mut [u32], bounds: &Aabb3) {
    let values = [
        bounds.min.x,
        bounds.min.y,
        bounds.min.z,
        bounds.max.x,
        bounds.max.y,
        bounds.max.z,
    ];
    for (slot, v) in node.iter_mut().zip(values) {
        *slot = (v as f32).to_bits();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshcast_math::Point3;

    fn bounds() -> Aabb3 {
        Aabb3::new(Point3::new(-1.0, -2.0, -3.0), Point3::new(1.0, 2.0, 3.0))
    }

    #[test]
    fn test_leaf_round_trip_through_views() {
        let mut words = vec![0u32; UINT32_PER_NODE];
        write_leaf(&mut words, &bounds(), 42, 7);

        let float32: &[f32] = bytemuck::cast_slice(&words);
        assert!(is_leaf(0, &words));
        assert_eq!(offset(0, &words), 42);
        assert_eq!(count(0, &words), 7);
        assert_eq!(array_to_box(bounding_data_index(0), float32), bounds());
    }

    #[test]
    fn test_leaf_word_packs_flag_above_count() {
        let mut words = vec![0u32; UINT32_PER_NODE];
        write_leaf(&mut words, &bounds(), 3, 7);
        assert_eq!(words[7], 0xFFFF_0007);

        write_leaf(&mut words, &bounds(), 3, u16::MAX);
        assert_eq!(words[7], 0xFFFF_FFFF);
        assert_eq!(count(0, &words), 65535);
    }

    #[test]
    fn test_internal_node_is_not_leaf() {
        let mut words = vec![0u32; UINT32_PER_NODE * 3];
        write_internal(&mut words[..8], &bounds(), 16, 2);
        write_leaf(&mut words[8..16], &bounds(), 0, 1);
        write_leaf(&mut words[16..], &bounds(), 1, 1);

        assert!(!is_leaf(0, &words));
        assert_eq!(left_node(0), 8);
        assert_eq!(right_node(0, &words), 16);
        assert_eq!(split_axis(0, &words), 2);
        assert!(is_leaf(8, &words));
        assert!(is_leaf(16, &words));
        assert_eq!(offset(16, &words), 1);
    }
}
