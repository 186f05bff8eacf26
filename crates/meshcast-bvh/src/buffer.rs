//! Buffer context: which packed root a traversal is currently reading.
//!
//! A traversal of one hierarchy may, at a leaf, start a traversal of a second
//! hierarchy. [`BufferStack`] keeps the bindings as a stack so the inner
//! traversal can bind its own root and restore the outer one on the way out.
//! Each query owns its stack; nothing here is global.

use crate::node;
use meshcast_geom::Aabb3;

/// Typed views of one packed root buffer.
#[derive(Debug, Clone, Copy)]
pub struct BufferView<'a> {
    /// Bounding data.
    pub float32: &'a [f32],
    /// Offsets, child slots, split axes, packed leaf words.
    pub uint32: &'a [u32],
}

impl<'a> BufferView<'a> {
    /// View a packed root buffer.
    pub fn new(words: &'a [u32]) -> Self {
        Self {
            float32: bytemuck::cast_slice(words),
            uint32: words,
        }
    }

    /// Whether the node at `n32` is a leaf.
    #[inline]
    pub fn is_leaf(&self, n32: usize) -> bool {
        node::is_leaf(n32, self.uint32)
    }

    /// Triangle range `[offset, offset + count)` of the leaf at `n32`.
    #[inline]
    pub fn leaf_range(&self, n32: usize) -> std::ops::Range<usize> {
        let offset = node::offset(n32, self.uint32);
        offset..offset + node::count(n32, self.uint32)
    }

    /// Left and right children of the internal node at `n32`.
    #[inline]
    pub fn children(&self, n32: usize) -> (usize, usize) {
        (node::left_node(n32), node::right_node(n32, self.uint32))
    }

    /// Split axis of the node at `n32`, or `None` for a leaf.
    #[inline]
    pub fn split_axis(&self, n32: usize) -> Option<usize> {
        (!self.is_leaf(n32)).then(|| node::split_axis(n32, self.uint32))
    }

    /// Bounds of the node at `n32`.
    #[inline]
    pub fn bounds(&self, n32: usize) -> Aabb3 {
        node::array_to_box(node::bounding_data_index(n32), self.float32)
    }

    /// Number of nodes in the buffer.
    pub fn node_count(&self) -> usize {
        self.uint32.len() / node::UINT32_PER_NODE
    }
}

/// Stack of active root bindings for one query.
#[derive(Debug, Default)]
pub struct BufferStack<'a> {
    current: Option<BufferView<'a>>,
    saved: Vec<BufferView<'a>>,
}

impl<'a> BufferStack<'a> {
    /// An empty stack with nothing bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `view`, shadowing the current binding until the matching
    /// [`Self::clear_buffer`].
    pub fn set_buffer(&mut self, view: BufferView<'a>) {
        if let Some(previous) = self.current.replace(view) {
            self.saved.push(previous);
        }
    }

    /// Drop the current binding and restore the one it shadowed.
    pub fn clear_buffer(&mut self) {
        self.current = self.saved.pop();
    }

    /// The active binding, if any.
    #[inline]
    pub fn current(&self) -> Option<BufferView<'a>> {
        self.current
    }

    /// Number of bindings, counting the active one.
    pub fn depth(&self) -> usize {
        self.saved.len() + usize::from(self.current.is_some())
    }
}
