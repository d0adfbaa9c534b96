//! Retained scene graph.
//!
//! The tree is an arena: a `HashMap<NodeId, Node>` is the only owner of
//! node data, and parent/child links are ids. This makes reference
//! cycles impossible by construction and makes `destroy` a matter of
//! removing table entries.
//!
//! The tree also coordinates with the layout engine: geometry requests
//! are pushed into the engine as they change, and [`SceneTree::flush_layout`]
//! runs a full constraint solve only when the engine reports itself
//! dirty. Absolute-position changes take a fast path that patches the
//! stored position directly and defers the engine update to the next
//! full solve.

use std::collections::HashMap;
use std::fmt;

use crate::buffer::CellBuffer;
use crate::error::{Error, Result};
use crate::geometry::{Dimension, Edge, Offsets, PositionMode, Rect};
use crate::layout::{LayoutEngine, LayoutId};
use crate::log::{LogLevel, emit_log};
use crate::widget::Widget;

/// Off-screen buffers above this cell count are refused and the node
/// degrades to painting directly into the ambient target.
pub const MAX_BUFFER_CELLS: u64 = 1 << 22;

/// Identity of a scene node. Monotonically increasing per tree, never
/// reused for the lifetime of the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Raw id value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Construct from a raw id value.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Initial configuration for a scene node.
pub struct NodeOptions {
    pub visible: bool,
    pub selectable: bool,
    pub focusable: bool,
    pub z_index: i32,
    pub width: Dimension,
    pub height: Dimension,
    pub position: PositionMode,
    pub offsets: Offsets,
    /// Give the node its own off-screen buffer, composited into the
    /// parent target each frame.
    pub buffered: bool,
    pub widget: Option<Box<dyn Widget>>,
}

impl Default for NodeOptions {
    fn default() -> Self {
        Self {
            visible: true,
            selectable: false,
            focusable: false,
            z_index: 0,
            width: Dimension::Auto,
            height: Dimension::Auto,
            position: PositionMode::Static,
            offsets: Offsets::default(),
            buffered: false,
            widget: None,
        }
    }
}

/// One entity in the scene graph.
pub struct Node {
    id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) visible: bool,
    pub(crate) selectable: bool,
    pub(crate) focusable: bool,
    pub(crate) z_index: i32,
    /// Set on the parent when a child's z-index changed; children are
    /// re-sorted lazily at traversal time.
    pub(crate) needs_z_sort: bool,
    pub(crate) width: Dimension,
    pub(crate) height: Dimension,
    pub(crate) position: PositionMode,
    pub(crate) offsets: Offsets,
    /// Parent-relative resolved geometry, dimensions always >= 1.
    pub(crate) computed: Rect,
    /// False when `computed.x/y` holds a patched position the layout
    /// engine has not seen yet.
    pub(crate) position_synced: bool,
    pub(crate) buffered: bool,
    pub(crate) buffer: Option<CellBuffer>,
    pub(crate) layout_id: LayoutId,
    pub(crate) widget: Option<Box<dyn Widget>>,
}

impl Node {
    /// Node identity.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Parent id, if attached.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child ids in current paint order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether the node (and its subtree) is painted.
    #[must_use]
    pub const fn visible(&self) -> bool {
        self.visible
    }

    /// Whether the node participates in text selection.
    #[must_use]
    pub const fn selectable(&self) -> bool {
        self.selectable
    }

    /// Whether the node can take keyboard focus.
    #[must_use]
    pub const fn focusable(&self) -> bool {
        self.focusable
    }

    /// Paint-order bias among siblings.
    #[must_use]
    pub const fn z_index(&self) -> i32 {
        self.z_index
    }

    /// Parent-relative resolved geometry.
    #[must_use]
    pub const fn computed(&self) -> Rect {
        self.computed
    }

    /// Whether the node paints into its own off-screen buffer.
    #[must_use]
    pub const fn is_buffered(&self) -> bool {
        self.buffered
    }

    /// The node's widget, if any.
    pub fn widget_mut(&mut self) -> Option<&mut (dyn Widget + 'static)> {
        self.widget.as_deref_mut()
    }

    /// Allocate or reallocate the off-screen buffer for the current
    /// computed size. Oversized requests degrade the node to direct
    /// painting.
    fn allocate_buffer(&mut self) {
        let cells = u64::from(self.computed.width) * u64::from(self.computed.height);
        if cells > MAX_BUFFER_CELLS {
            self.buffer = None;
            self.buffered = false;
            emit_log(
                LogLevel::Warn,
                &format!(
                    "node {} buffer request {}x{} exceeds cap, painting direct",
                    self.id, self.computed.width, self.computed.height
                ),
            );
            return;
        }
        self.buffer = Some(CellBuffer::new(self.computed.width, self.computed.height));
    }
}

/// The scene graph: arena of nodes plus the layout-engine seam.
pub struct SceneTree {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    next_id: u32,
    layout: Box<dyn LayoutEngine>,
    root_size: (u32, u32),
}

impl SceneTree {
    /// Create a tree with a root node sized by the viewport.
    pub fn new(mut layout: Box<dyn LayoutEngine>) -> Result<Self> {
        let layout_id = layout.create_node()?;
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            Self::build_node(root, layout_id, NodeOptions::default()),
        );
        Ok(Self {
            nodes,
            root,
            next_id: 1,
            layout,
            root_size: (0, 0),
        })
    }

    fn build_node(id: NodeId, layout_id: LayoutId, options: NodeOptions) -> Node {
        Node {
            id,
            parent: None,
            children: Vec::new(),
            visible: options.visible,
            selectable: options.selectable,
            focusable: options.focusable,
            z_index: options.z_index,
            needs_z_sort: false,
            width: options.width,
            height: options.height,
            position: options.position,
            offsets: options.offsets,
            computed: Rect::default(),
            position_synced: true,
            buffered: options.buffered,
            buffer: None,
            layout_id,
            widget: options.widget,
        }
    }

    /// The root node id.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds only the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Iterator over live node ids, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Look up a node.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Look up a node mutably.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or(Error::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(&id).ok_or(Error::UnknownNode(id))
    }

    /// Create a detached node.
    pub fn create(&mut self, options: NodeOptions) -> Result<NodeId> {
        let layout_id = self.layout.create_node()?;
        self.layout.set_width(layout_id, options.width)?;
        self.layout.set_height(layout_id, options.height)?;
        self.layout.set_position_mode(layout_id, options.position)?;
        for edge in [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left] {
            if let Some(value) = options.offsets.get(edge) {
                self.layout.set_position(layout_id, edge, Some(value))?;
            }
        }
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Self::build_node(id, layout_id, options));
        Ok(id)
    }

    /// Attach `child` under `parent` at `index` (default: end).
    ///
    /// Fails with [`Error::Cycle`] when the parent is the child itself or
    /// one of its descendants, and with [`Error::InvalidIndex`] when the
    /// index is past the end of the child list. The tree is unchanged on
    /// failure.
    pub fn attach(&mut self, child: NodeId, parent: NodeId, index: Option<usize>) -> Result<()> {
        self.node(child)?;
        let parent_len = self.node(parent)?.children.len();
        if child == parent || self.is_ancestor(child, parent) {
            return Err(Error::Cycle {
                node: child,
                parent,
            });
        }
        let reattach = self.node(child)?.parent == Some(parent);
        let effective_len = if reattach { parent_len - 1 } else { parent_len };
        let index = index.unwrap_or(effective_len);
        if index > effective_len {
            return Err(Error::InvalidIndex {
                index,
                len: effective_len,
            });
        }

        self.detach(child)?;
        let child_layout = self.node(child)?.layout_id;
        let parent_node = self.node_mut(parent)?;
        parent_node.children.insert(index, child);
        parent_node.needs_z_sort = true;
        let parent_layout = parent_node.layout_id;
        self.node_mut(child)?.parent = Some(parent);
        self.layout.insert_child(parent_layout, child_layout, index)?;
        Ok(())
    }

    /// Detach a node from its parent. No-op if already detached.
    pub fn detach(&mut self, child: NodeId) -> Result<()> {
        let node = self.node(child)?;
        let Some(parent_id) = node.parent else {
            return Ok(());
        };
        let child_layout = node.layout_id;
        let parent = self.node_mut(parent_id)?;
        parent.children.retain(|&c| c != child);
        let parent_layout = parent.layout_id;
        self.node_mut(child)?.parent = None;
        self.layout.remove_child(parent_layout, child_layout)?;
        Ok(())
    }

    /// Destroy a node and its whole subtree, children first. Calling
    /// this twice is a no-op, not an error.
    pub fn destroy(&mut self, id: NodeId) -> Result<()> {
        if !self.nodes.contains_key(&id) {
            return Ok(());
        }
        self.detach(id)?;
        // Preorder walk; reversed it visits every child before its
        // parent.
        let mut stack = vec![id];
        let mut order = Vec::new();
        while let Some(current) = stack.pop() {
            order.push(current);
            if let Some(node) = self.nodes.get(&current) {
                stack.extend(node.children.iter().copied());
            }
        }
        for current in order.into_iter().rev() {
            if let Some(node) = self.nodes.remove(&current) {
                self.layout.free(node.layout_id)?;
            }
        }
        Ok(())
    }

    /// Set the width request.
    pub fn set_width(&mut self, id: NodeId, value: Dimension) -> Result<()> {
        let node = self.node_mut(id)?;
        node.width = value;
        let layout_id = node.layout_id;
        self.layout.set_width(layout_id, value)
    }

    /// Set the height request.
    pub fn set_height(&mut self, id: NodeId, value: Dimension) -> Result<()> {
        let node = self.node_mut(id)?;
        node.height = value;
        let layout_id = node.layout_id;
        self.layout.set_height(layout_id, value)
    }

    /// Set or clear one edge offset.
    ///
    /// For an absolute node with a fixed left/top value this patches the
    /// stored position directly instead of dirtying the layout engine;
    /// the engine is brought up to date at the start of the next full
    /// solve. Repositioning (cursor-follow widgets, drag feedback)
    /// happens far more often than structural change, so this avoids
    /// most full solves.
    pub fn set_offset(&mut self, id: NodeId, edge: Edge, value: Option<Dimension>) -> Result<()> {
        let node = self.node_mut(id)?;
        node.offsets.set(edge, value);
        if node.position == PositionMode::Absolute {
            if let (Edge::Left | Edge::Top, Some(Dimension::Cells(n))) = (edge, value) {
                match edge {
                    Edge::Left => node.computed.x = n as i32,
                    Edge::Top => node.computed.y = n as i32,
                    Edge::Right | Edge::Bottom => {}
                }
                node.position_synced = false;
                return Ok(());
            }
        }
        let layout_id = node.layout_id;
        self.layout.set_position(layout_id, edge, value)
    }

    /// Set visibility. Invisible nodes and their subtrees are skipped by
    /// the render pass and the hit grid.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<()> {
        self.node_mut(id)?.visible = visible;
        Ok(())
    }

    /// Set the z-index and mark the parent for a lazy re-sort.
    pub fn set_z_index(&mut self, id: NodeId, z_index: i32) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.z_index == z_index {
            return Ok(());
        }
        node.z_index = z_index;
        if let Some(parent) = node.parent {
            self.node_mut(parent)?.needs_z_sort = true;
        }
        Ok(())
    }

    /// Set the position mode.
    pub fn set_position_mode(&mut self, id: NodeId, mode: PositionMode) -> Result<()> {
        let node = self.node_mut(id)?;
        node.position = mode;
        let layout_id = node.layout_id;
        self.layout.set_position_mode(layout_id, mode)
    }

    /// Children of `id` in paint order, re-sorting lazily if a child's
    /// z-index changed. The sort is stable, so siblings with equal
    /// z-index keep insertion order across repeated sorts.
    pub fn sorted_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let Some(node) = self.nodes.get(&id) else {
            return Vec::new();
        };
        if !node.needs_z_sort {
            return node.children.clone();
        }
        let mut children = node.children.clone();
        children.sort_by_key(|c| self.nodes.get(c).map_or(0, |n| n.z_index));
        if let Some(node) = self.nodes.get_mut(&id) {
            node.children = children.clone();
            node.needs_z_sort = false;
        }
        children
    }

    /// Whether `ancestor` is a strict ancestor of `node`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.nodes.get(&node).and_then(|n| n.parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    /// Whether `node` is `container` itself or inside it.
    #[must_use]
    pub fn contains(&self, container: NodeId, node: NodeId) -> bool {
        node == container || self.is_ancestor(container, node)
    }

    /// The node's parent, or the root for detached/top-level nodes.
    #[must_use]
    pub fn parent_or_root(&self, id: NodeId) -> NodeId {
        self.nodes
            .get(&id)
            .and_then(|n| n.parent)
            .unwrap_or(self.root)
    }

    /// The node's rectangle in absolute (viewport) coordinates.
    pub fn absolute_rect(&self, id: NodeId) -> Result<Rect> {
        let node = self.node(id)?;
        let mut rect = node.computed;
        let mut current = node.parent;
        while let Some(parent_id) = current {
            let parent = self.node(parent_id)?;
            rect = rect.translated(parent.computed.x, parent.computed.y);
            current = parent.parent;
        }
        Ok(rect)
    }

    /// Synchronize geometry with the layout engine for a viewport of the
    /// given size.
    ///
    /// A full constraint solve runs only when the engine reports dirty.
    /// Patched absolute positions are pushed into the engine first so
    /// the two stay consistent. After the solve, resolved geometry is
    /// read back with dimensions clamped to >= 1; nodes whose size
    /// changed get `Widget::on_resize` and an off-screen buffer
    /// reallocation.
    pub fn flush_layout(&mut self, width: u32, height: u32) -> Result<()> {
        let root_layout = self.node(self.root)?.layout_id;
        if self.root_size != (width, height) {
            self.root_size = (width, height);
            self.layout.set_width(root_layout, Dimension::Cells(width))?;
            self.layout.set_height(root_layout, Dimension::Cells(height))?;
        }
        if !self.layout.is_dirty(root_layout) {
            return Ok(());
        }

        for node in self.nodes.values_mut() {
            if !node.position_synced {
                let x = node.computed.x.max(0) as u32;
                let y = node.computed.y.max(0) as u32;
                self.layout
                    .set_position(node.layout_id, Edge::Left, Some(Dimension::Cells(x)))?;
                self.layout
                    .set_position(node.layout_id, Edge::Top, Some(Dimension::Cells(y)))?;
                node.position_synced = true;
            }
            if node.width.is_auto() || node.height.is_auto() {
                if let Some((w, h)) = node.widget.as_deref().and_then(Widget::measure) {
                    if node.width.is_auto() {
                        self.layout
                            .set_width(node.layout_id, Dimension::Cells(w))?;
                    }
                    if node.height.is_auto() {
                        self.layout
                            .set_height(node.layout_id, Dimension::Cells(h))?;
                    }
                }
            }
        }

        self.layout.calculate(root_layout, width, height)?;

        for node in self.nodes.values_mut() {
            let layout = self.layout.computed(node.layout_id)?;
            let resolved = Rect {
                x: layout.x.round() as i32,
                y: layout.y.round() as i32,
                width: (layout.width.round() as u32).max(1),
                height: (layout.height.round() as u32).max(1),
            };
            let size_changed = resolved.width != node.computed.width
                || resolved.height != node.computed.height;
            node.computed = resolved;
            if size_changed {
                if let Some(widget) = node.widget.as_deref_mut() {
                    widget.on_resize(resolved.width, resolved.height);
                }
            }
            if node.buffered && (size_changed || node.buffer.is_none()) {
                node.allocate_buffer();
            }
        }
        Ok(())
    }

    /// Whether a full solve is pending.
    #[must_use]
    pub fn layout_dirty(&self) -> bool {
        self.nodes
            .get(&self.root)
            .is_some_and(|n| self.layout.is_dirty(n.layout_id))
    }
}
