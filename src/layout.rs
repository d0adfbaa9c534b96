//! Flexbox layout engine seam.
//!
//! The scene tree talks to the constraint solver through the narrow
//! [`LayoutEngine`] trait. [`TaffyEngine`] is the production
//! implementation over [`taffy::TaffyTree`]; tests can substitute a stub
//! to observe call patterns (e.g., that the absolute-position fast path
//! avoids full solves).

use std::collections::HashMap;

use taffy::{
    AvailableSpace, Dimension as TaffyDimension, LengthPercentageAuto, NodeId as TaffyNodeId,
    Position as TaffyPosition, Size, Style as TaffyStyle, TaffyTree, TraversePartialTree,
};

use crate::error::{Error, Result};
use crate::geometry::{Dimension, Edge, PositionMode};

/// Opaque handle to a layout-engine node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayoutId(u64);

impl LayoutId {
    /// Raw handle value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Construct from a raw handle value.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

/// Computed geometry for one node, parent-relative.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ComputedLayout {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// The constraint-solver collaborator interface.
///
/// One handle per scene node. Structural and request mutations mark the
/// engine dirty; [`LayoutEngine::calculate`] resolves the whole tree for
/// the root's dimensions.
pub trait LayoutEngine {
    /// Allocate a new layout node.
    fn create_node(&mut self) -> Result<LayoutId>;

    /// Insert `child` under `parent` at `index`; returns the index used.
    fn insert_child(&mut self, parent: LayoutId, child: LayoutId, index: usize) -> Result<usize>;

    /// Remove `child` from `parent` (the child node itself survives).
    fn remove_child(&mut self, parent: LayoutId, child: LayoutId) -> Result<()>;

    /// Set the width request.
    fn set_width(&mut self, node: LayoutId, value: Dimension) -> Result<()>;

    /// Set the height request.
    fn set_height(&mut self, node: LayoutId, value: Dimension) -> Result<()>;

    /// Set the position mode (relative vs. absolute flow).
    fn set_position_mode(&mut self, node: LayoutId, mode: PositionMode) -> Result<()>;

    /// Set or clear one edge offset.
    fn set_position(&mut self, node: LayoutId, edge: Edge, value: Option<Dimension>) -> Result<()>;

    /// Solve constraints for the root at the given dimensions.
    fn calculate(&mut self, root: LayoutId, width: u32, height: u32) -> Result<()>;

    /// Read back the computed, parent-relative geometry of a node.
    fn computed(&self, node: LayoutId) -> Result<ComputedLayout>;

    /// Whether anything changed since the last [`Self::calculate`].
    fn is_dirty(&self, root: LayoutId) -> bool;

    /// Release a layout node.
    fn free(&mut self, node: LayoutId) -> Result<()>;
}

fn to_taffy_dimension(dim: Dimension) -> TaffyDimension {
    match dim {
        Dimension::Auto => TaffyDimension::Auto,
        Dimension::Cells(n) => TaffyDimension::Length(n as f32),
        Dimension::Percent(p) => TaffyDimension::Percent(p / 100.0),
    }
}

fn to_taffy_lpa(dim: Option<Dimension>) -> LengthPercentageAuto {
    match dim {
        None | Some(Dimension::Auto) => LengthPercentageAuto::Auto,
        Some(Dimension::Cells(n)) => LengthPercentageAuto::Length(n as f32),
        Some(Dimension::Percent(p)) => LengthPercentageAuto::Percent(p / 100.0),
    }
}

fn to_taffy_position(mode: PositionMode) -> TaffyPosition {
    match mode {
        // Static is relative flow with no offsets applied by the caller.
        PositionMode::Static | PositionMode::Relative => TaffyPosition::Relative,
        PositionMode::Absolute => TaffyPosition::Absolute,
    }
}

fn layout_err(e: taffy::TaffyError) -> Error {
    Error::Layout(e.to_string())
}

/// Production layout engine backed by `taffy`'s flexbox solver.
pub struct TaffyEngine {
    tree: TaffyTree<()>,
    handles: HashMap<LayoutId, TaffyNodeId>,
    next_id: u64,
}

impl TaffyEngine {
    /// Create an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: TaffyTree::new(),
            handles: HashMap::new(),
            next_id: 0,
        }
    }

    fn taffy_id(&self, node: LayoutId) -> Result<TaffyNodeId> {
        self.handles
            .get(&node)
            .copied()
            .ok_or_else(|| Error::Layout(format!("unknown layout handle {}", node.raw())))
    }

    fn update_style<F>(&mut self, node: LayoutId, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut TaffyStyle),
    {
        let id = self.taffy_id(node)?;
        let mut style = self.tree.style(id).map_err(layout_err)?.clone();
        mutate(&mut style);
        self.tree.set_style(id, style).map_err(layout_err)
    }
}

impl Default for TaffyEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEngine for TaffyEngine {
    fn create_node(&mut self) -> Result<LayoutId> {
        let taffy_id = self
            .tree
            .new_leaf(TaffyStyle::default())
            .map_err(layout_err)?;
        let id = LayoutId(self.next_id);
        self.next_id += 1;
        self.handles.insert(id, taffy_id);
        Ok(id)
    }

    fn insert_child(&mut self, parent: LayoutId, child: LayoutId, index: usize) -> Result<usize> {
        let parent_id = self.taffy_id(parent)?;
        let child_id = self.taffy_id(child)?;
        let count = self.tree.child_count(parent_id);
        let index = index.min(count);
        self.tree
            .insert_child_at_index(parent_id, index, child_id)
            .map_err(layout_err)?;
        Ok(index)
    }

    fn remove_child(&mut self, parent: LayoutId, child: LayoutId) -> Result<()> {
        let parent_id = self.taffy_id(parent)?;
        let child_id = self.taffy_id(child)?;
        self.tree
            .remove_child(parent_id, child_id)
            .map_err(layout_err)?;
        Ok(())
    }

    fn set_width(&mut self, node: LayoutId, value: Dimension) -> Result<()> {
        self.update_style(node, |style| {
            style.size.width = to_taffy_dimension(value);
        })
    }

    fn set_height(&mut self, node: LayoutId, value: Dimension) -> Result<()> {
        self.update_style(node, |style| {
            style.size.height = to_taffy_dimension(value);
        })
    }

    fn set_position_mode(&mut self, node: LayoutId, mode: PositionMode) -> Result<()> {
        self.update_style(node, |style| {
            style.position = to_taffy_position(mode);
        })
    }

    fn set_position(&mut self, node: LayoutId, edge: Edge, value: Option<Dimension>) -> Result<()> {
        self.update_style(node, |style| {
            let lpa = to_taffy_lpa(value);
            match edge {
                Edge::Top => style.inset.top = lpa,
                Edge::Right => style.inset.right = lpa,
                Edge::Bottom => style.inset.bottom = lpa,
                Edge::Left => style.inset.left = lpa,
            }
        })
    }

    fn calculate(&mut self, root: LayoutId, width: u32, height: u32) -> Result<()> {
        let root_id = self.taffy_id(root)?;
        let available = Size {
            width: AvailableSpace::Definite(width as f32),
            height: AvailableSpace::Definite(height as f32),
        };
        self.tree
            .compute_layout(root_id, available)
            .map_err(layout_err)
    }

    fn computed(&self, node: LayoutId) -> Result<ComputedLayout> {
        let id = self.taffy_id(node)?;
        let layout = self.tree.layout(id).map_err(layout_err)?;
        Ok(ComputedLayout {
            x: layout.location.x,
            y: layout.location.y,
            width: layout.size.width,
            height: layout.size.height,
        })
    }

    fn is_dirty(&self, root: LayoutId) -> bool {
        let Ok(id) = self.taffy_id(root) else {
            return false;
        };
        self.tree.dirty(id).unwrap_or(false)
    }

    fn free(&mut self, node: LayoutId) -> Result<()> {
        if let Some(id) = self.handles.remove(&node) {
            self.tree.remove(id).map_err(layout_err)?;
        }
        Ok(())
    }
}
