//! Octree-specific debug visualization
//!
//! Turns an [`OctantTree`] into one frame of wireframe cubes, in one of a
//! few display modes that can be cycled at runtime.

use crate::debug::draw::DebugDrawSystem;
use crate::foundation::math::{colors, Vec4};
use crate::spatial::{BoundsStore, OctantTree};

/// Color scheme for octree visualization
#[derive(Clone, Debug)]
pub struct OctreeDebugColors {
    /// Every node in [`DisplayMode::AllNodes`]
    pub nodes: Vec4,

    /// Occupied leaves in [`DisplayMode::Leaves`]
    pub leaves: Vec4,

    /// The node picked by [`DisplayMode::Single`]
    pub selected: Vec4,

    /// Center points of leaf members
    pub members: Vec4,
}

impl Default for OctreeDebugColors {
    fn default() -> Self {
        Self {
            nodes: colors::yellow(),
            leaves: colors::cyan(),
            selected: colors::red(),
            members: colors::white(),
        }
    }
}

/// Which octants get drawn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Draw nothing
    Hidden,
    /// Every node, children before parents
    #[default]
    AllNodes,
    /// Occupied leaves only
    Leaves,
    /// The single node with this id
    Single(u32),
}

impl DisplayMode {
    /// Step forward: hidden, all nodes, leaves, then each id in turn
    pub fn next(self, octant_count: u32) -> Self {
        match self {
            Self::Hidden => Self::AllNodes,
            Self::AllNodes => Self::Leaves,
            Self::Leaves if octant_count > 0 => Self::Single(0),
            Self::Single(id) => match id.checked_add(1) {
                Some(next) if next < octant_count => Self::Single(next),
                _ => Self::Hidden,
            },
            Self::Leaves => Self::Hidden,
        }
    }

    /// Step backward through the same cycle as [`Self::next`]
    pub fn previous(self, octant_count: u32) -> Self {
        match self {
            Self::AllNodes => Self::Hidden,
            Self::Leaves => Self::AllNodes,
            Self::Single(0) => Self::Leaves,
            // ids past the end after a rebuild shrank the tree snap back in range
            Self::Single(id) => Self::Single((id - 1).min(octant_count.saturating_sub(1))),
            Self::Hidden if octant_count > 0 => Self::Single(octant_count - 1),
            Self::Hidden => Self::Leaves,
        }
    }
}

/// Octree debug visualizer
///
/// Owns a [`DebugDrawSystem`] and feeds it the cubes picked by the
/// current [`DisplayMode`].
#[derive(Debug, Default)]
pub struct OctreeDebugVisualizer {
    debug_draw: DebugDrawSystem,
    colors: OctreeDebugColors,

    /// Current display mode
    pub mode: DisplayMode,

    /// Also mark the center of each leaf member
    pub show_members: bool,
}

impl OctreeDebugVisualizer {
    /// Create a new octree debug visualizer
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom color scheme
    pub fn with_colors(mut self, colors: OctreeDebugColors) -> Self {
        self.colors = colors;
        self
    }

    /// Start in a given mode
    pub fn with_mode(mut self, mode: DisplayMode) -> Self {
        self.mode = mode;
        self
    }

    /// Queue this frame's cubes; returns how many were queued
    pub fn draw(&mut self, tree: &OctantTree) -> usize {
        let before = self.debug_draw.shape_count();

        match self.mode {
            DisplayMode::Hidden => {}
            DisplayMode::AllNodes => tree.display(&mut self.debug_draw, self.colors.nodes),
            DisplayMode::Leaves => tree.display_leaves(&mut self.debug_draw, self.colors.leaves),
            DisplayMode::Single(id) => {
                if !tree.display_id(id, &mut self.debug_draw, self.colors.selected) {
                    log::trace!("No octant with id {} to display", id);
                }
            }
        }

        self.debug_draw.shape_count() - before
    }

    /// Queue a point at the center of every member of every occupied leaf
    ///
    /// Objects straddling leaves get one point per leaf.
    pub fn draw_members<S: BoundsStore + ?Sized>(&mut self, tree: &OctantTree, store: &S) -> usize {
        if !self.show_members || self.mode == DisplayMode::Hidden {
            return 0;
        }

        let before = self.debug_draw.shape_count();
        for leaf in tree.leaves() {
            for aabb in leaf.members().iter().filter_map(|&index| store.bounds_of(index)) {
                self.debug_draw.draw_point(aabb.center(), self.colors.members, 3.0, 0.0);
            }
        }
        self.debug_draw.shape_count() - before
    }

    /// Advance shape lifetimes; call once per frame before drawing
    pub fn update(&mut self, delta_time: f32) {
        self.debug_draw.update(delta_time);
    }

    /// Shapes queued so far
    pub fn debug_draw(&self) -> &DebugDrawSystem {
        &self.debug_draw
    }

    /// Drop every queued shape
    pub fn clear(&mut self) {
        self.debug_draw.clear();
    }
}
