//! Octree spatial partitioning structure
//!
//! Divides the cube enclosing every object in a [`BoundsStore`] into
//! hierarchical octants. A node splits into 8 children while more than
//! `ideal_occupancy` objects overlap it, up to `max_level`. The tree is
//! never adjusted in place: every change goes through a full rebuild.
//!
//! Nodes live in a slotmap arena owned by [`OctantTree`]. Children, parent
//! and root links are [`OctantKey`] handles into that arena, so a key from a
//! torn-down subtree simply stops resolving.

use slotmap::{new_key_type, SlotMap};

use crate::foundation::math::{Vec3, Vec4};
use crate::spatial::{BoundsStore, OctreeConfig, AABB};

new_key_type! {
    /// Handle to a node in an [`OctantTree`]
    pub struct OctantKey;
}

/// Number of children of a subdivided node
pub const OCTANT_CHILDREN: usize = 8;

/// Receives wireframe cubes from the display traversals
pub trait WireCubeRenderer {
    /// Draw the outline of an axis-aligned cube
    fn draw_wire_cube(&mut self, center: Vec3, size: f32, color: Vec4);
}

/// Direction of octant `index` from its parent's center
///
/// Octant layout:
/// 0: -X, -Y, -Z
/// 1: +X, -Y, -Z
/// 2: -X, +Y, -Z
/// 3: +X, +Y, -Z
/// 4: -X, -Y, +Z
/// 5: +X, -Y, +Z
/// 6: -X, +Y, +Z
/// 7: +X, +Y, +Z
pub fn octant_direction(index: usize) -> Vec3 {
    let sign = |bit: usize| if index & bit != 0 { 1.0 } else { -1.0 };
    Vec3::new(sign(1), sign(2), sign(4))
}

/// Single cube-shaped node in the octree hierarchy
#[derive(Debug, Clone)]
pub struct OctantNode {
    id: u32,
    level: u32,
    center: Vec3,
    size: f32,
    min: Vec3,
    max: Vec3,
    parent: Option<OctantKey>,
    root: OctantKey,
    children: Option<[OctantKey; OCTANT_CHILDREN]>,
    members: Vec<u32>,
}

impl OctantNode {
    fn cube(id: u32, center: Vec3, size: f32, root: OctantKey) -> Self {
        let half = Vec3::repeat(size * 0.5);
        Self {
            id,
            level: 0,
            center,
            size,
            min: center - half,
            max: center + half,
            parent: None,
            root,
            children: None,
            members: Vec::new(),
        }
    }

    /// Sequence number assigned when the node was created
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Depth in the tree (0 = root)
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Center of the cube
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Edge length of the cube
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Minimum corner
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// Maximum corner
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// The cube as an [`AABB`]
    pub fn bounds(&self) -> AABB {
        AABB::new(self.min, self.max)
    }

    /// Parent node, `None` at the root
    pub fn parent(&self) -> Option<OctantKey> {
        self.parent
    }

    /// Root of the tree this node belongs to; the root points at itself
    pub fn root(&self) -> OctantKey {
        self.root
    }

    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// 0 for a leaf, 8 otherwise
    pub fn child_count(&self) -> u32 {
        if self.children.is_some() { OCTANT_CHILDREN as u32 } else { 0 }
    }

    /// Child in octant `index`, `None` for a leaf or an index above 7
    pub fn child(&self, index: usize) -> Option<OctantKey> {
        self.children.as_ref().and_then(|children| children.get(index).copied())
    }

    /// All children in octant order; empty for a leaf
    pub fn children(&self) -> impl Iterator<Item = OctantKey> + '_ {
        self.children.iter().flatten().copied()
    }

    /// Indices of the objects overlapping this leaf
    pub fn members(&self) -> &[u32] {
        &self.members
    }

    fn overlaps(&self, aabb: &AABB) -> bool {
        self.bounds().intersects(aabb)
    }
}

/// Octree over the objects of a [`BoundsStore`]
///
/// Cloning deep-copies the whole arena; keys taken from the source tree resolve
/// to the matching nodes of the clone.
#[derive(Debug, Clone)]
pub struct OctantTree {
    nodes: SlotMap<OctantKey, OctantNode>,
    root: OctantKey,
    config: OctreeConfig,
    octant_count: u32,
    leaf_registry: Vec<OctantKey>,
    degenerate: bool,
}

impl OctantTree {
    /// Build a tree around every object in `store`
    ///
    /// The root is the cube centered on the box enclosing all objects, with
    /// an edge length of twice that box's largest half-extent. An empty store
    /// yields a degenerate zero-size root at the origin that overlaps nothing.
    pub fn new<S: BoundsStore + ?Sized>(store: &mut S, config: OctreeConfig) -> Self {
        let world = AABB::enclosing(
            (0..store.count())
                .filter_map(|index| store.bounds_of(index))
                .flat_map(|aabb| [aabb.min, aabb.max]),
        );

        let (center, size, degenerate) = match world {
            Some(world) => (world.center(), world.max_extent() * 2.0, false),
            None => (Vec3::zeros(), 0.0, true),
        };

        let mut nodes = SlotMap::with_key();
        let root = nodes.insert_with_key(|key| OctantNode::cube(0, center, size, key));

        let mut tree = Self {
            nodes,
            root,
            config,
            octant_count: 1,
            leaf_registry: Vec::new(),
            degenerate,
        };

        log::debug!(
            "Octree root at {:?}, size {}, over {} objects",
            center, size, store.count()
        );

        tree.construct_tree(root, store, config.max_level);
        tree
    }

    /// Build with [`OctreeConfig::default`]
    pub fn with_defaults<S: BoundsStore + ?Sized>(store: &mut S) -> Self {
        Self::new(store, OctreeConfig::default())
    }

    /// Rebuild the subtree from scratch inside the current root cube
    ///
    /// Only valid on the root; any other key is ignored. Steps: adopt
    /// `max_level`, restart ids, drop memberships and every child, clear the
    /// leaf registry, subdivide by occupancy, assign members to leaves and
    /// rebuild the registry.
    pub fn construct_tree<S: BoundsStore + ?Sized>(&mut self, at: OctantKey, store: &mut S, max_level: u32) {
        if at != self.root {
            log::trace!("construct_tree ignored on non-root octant {:?}", at);
            return;
        }

        self.config.max_level = max_level;
        self.octant_count = 1;
        self.clear_members(self.root);
        self.kill_branches(self.root);
        self.leaf_registry.clear();

        if self.contains_more_than(self.root, &*store, self.config.ideal_occupancy) {
            self.subdivide(self.root, &*store);
        }

        self.assign_members(self.root, store);
        self.build_leaf_registry(self.root);

        log::debug!(
            "Octree rebuilt: {} octants, {} occupied leaves (max level {}, ideal occupancy {})",
            self.octant_count,
            self.leaf_registry.len(),
            self.config.max_level,
            self.config.ideal_occupancy
        );
    }

    /// Rebuild inside the current root cube with the current settings
    pub fn rebuild<S: BoundsStore + ?Sized>(&mut self, store: &mut S) {
        self.construct_tree(self.root, store, self.config.max_level);
    }

    /// Re-measure the world and rebuild everything, like constructing a new root
    pub fn rebuild_world<S: BoundsStore + ?Sized>(&mut self, store: &mut S) {
        *self = Self::new(store, self.config);
    }

    /// Split a leaf into 8 half-size children, recursing while crowded
    ///
    /// Ignored when the node is already split, sits at `max_level`, or the
    /// key is stale. All 8 children get their ids before any of them
    /// recurses.
    ///
    /// Splitting an occupied leaf drops its members and its registry entry;
    /// the new leaves stay empty until the next [`Self::rebuild`].
    pub fn subdivide<S: BoundsStore + ?Sized>(&mut self, key: OctantKey, store: &S) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        if node.level >= self.config.max_level || !node.is_leaf() {
            return;
        }
        if !node.members.is_empty() {
            node.members.clear();
            self.leaf_registry.retain(|leaf| *leaf != key);
        }
        let node = &self.nodes[key];

        let (center, size, level, root) = (node.center, node.size, node.level, node.root);
        let quarter = size * 0.25;

        let children: [OctantKey; OCTANT_CHILDREN] = std::array::from_fn(|octant| {
            let mut child = OctantNode::cube(
                self.octant_count,
                center + octant_direction(octant) * quarter,
                size * 0.5,
                root,
            );
            child.level = level + 1;
            child.parent = Some(key);
            self.octant_count += 1;
            self.nodes.insert(child)
        });
        self.nodes[key].children = Some(children);

        for child in children {
            if self.contains_more_than(child, store, self.config.ideal_occupancy) {
                self.subdivide(child, store);
            }
        }
    }

    /// Whether object `index` overlaps node `key`
    ///
    /// False for an out-of-range index, a stale key, or a degenerate tree.
    pub fn is_colliding<S: BoundsStore + ?Sized>(&self, key: OctantKey, store: &S, index: u32) -> bool {
        if self.degenerate || index >= store.count() {
            return false;
        }
        let Some(node) = self.nodes.get(key) else {
            return false;
        };
        store.bounds_of(index).is_some_and(|aabb| node.overlaps(&aabb))
    }

    /// Whether more than `threshold` objects overlap node `key`
    ///
    /// Stops counting as soon as the threshold is passed. Objects overlapping
    /// several siblings count towards each of them.
    pub fn contains_more_than<S: BoundsStore + ?Sized>(&self, key: OctantKey, store: &S, threshold: u32) -> bool {
        let mut hits = 0u32;
        for index in 0..store.count() {
            if self.is_colliding(key, store, index) {
                hits += 1;
                if hits > threshold {
                    return true;
                }
            }
        }
        false
    }

    fn assign_members<S: BoundsStore + ?Sized>(&mut self, key: OctantKey, store: &mut S) {
        let Some(node) = self.nodes.get(key) else {
            return;
        };

        if let Some(children) = node.children {
            for child in children {
                self.assign_members(child, store);
            }
            return;
        }

        let hits: Vec<u32> = (0..store.count())
            .filter(|&index| self.is_colliding(key, &*store, index))
            .collect();

        let node = &mut self.nodes[key];
        for &index in &hits {
            store.assign_cell(index, node.id);
        }
        node.members.extend(hits);
    }

    fn build_leaf_registry(&mut self, key: OctantKey) {
        let Some(node) = self.nodes.get(key) else {
            return;
        };
        let children = node.children;
        let occupied = !node.members.is_empty();

        for child in children.iter().flatten() {
            self.build_leaf_registry(*child);
        }
        if occupied {
            self.leaf_registry.push(key);
        }
    }

    /// Empty the membership lists of `key` and everything below it
    pub fn clear_members(&mut self, key: OctantKey) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        node.members.clear();
        let children = node.children;

        for child in children.iter().flatten() {
            self.clear_members(*child);
        }
    }

    /// Destroy every descendant of `key`, turning it back into a leaf
    ///
    /// Keys of the removed nodes stop resolving and are dropped from the
    /// leaf registry.
    pub fn kill_branches(&mut self, key: OctantKey) {
        self.remove_descendants(key);
        let nodes = &self.nodes;
        self.leaf_registry.retain(|leaf| nodes.contains_key(*leaf));
    }

    fn remove_descendants(&mut self, key: OctantKey) {
        let Some(children) = self.nodes.get_mut(key).and_then(|node| node.children.take()) else {
            return;
        };
        for child in children {
            self.remove_descendants(child);
            self.nodes.remove(child);
        }
    }

    /// Tear the tree down to an empty zero-size root
    ///
    /// Every descendant key stops resolving and all queries report no
    /// overlap until [`Self::rebuild_world`] measures a world again.
    pub fn release(&mut self) {
        self.kill_branches(self.root);
        if let Some(root) = self.nodes.get_mut(self.root) {
            root.members.clear();
            root.size = 0.0;
            root.min = root.center;
            root.max = root.center;
        }
        self.leaf_registry.clear();
        self.degenerate = true;
        log::trace!("Octree released");
    }

    /// Key of the root node
    pub fn root_key(&self) -> OctantKey {
        self.root
    }

    /// The root node
    pub fn root(&self) -> &OctantNode {
        &self.nodes[self.root]
    }

    /// Look up a node, `None` once it has been destroyed
    pub fn node(&self, key: OctantKey) -> Option<&OctantNode> {
        self.nodes.get(key)
    }

    /// Child `index` of `key`; `None` for leaves, stale keys and indices above 7
    pub fn child(&self, key: OctantKey, index: usize) -> Option<OctantKey> {
        self.nodes.get(key).and_then(|node| node.child(index))
    }

    /// Parent of `key`; `None` at the root
    pub fn parent(&self, key: OctantKey) -> Option<OctantKey> {
        self.nodes.get(key).and_then(OctantNode::parent)
    }

    /// Whether `key` has no children; stale keys are not leaves
    pub fn is_leaf(&self, key: OctantKey) -> bool {
        self.nodes.get(key).is_some_and(OctantNode::is_leaf)
    }

    /// Nodes created since the last construction, root included
    pub fn octant_count(&self) -> u32 {
        self.octant_count
    }

    /// Every live node, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (OctantKey, &OctantNode)> {
        self.nodes.iter()
    }

    /// Keys of all nodes holding members, children before parents
    pub fn leaf_registry(&self) -> &[OctantKey] {
        &self.leaf_registry
    }

    /// Occupied leaves in registry order
    pub fn leaves(&self) -> impl Iterator<Item = &OctantNode> {
        self.leaf_registry.iter().filter_map(|key| self.nodes.get(*key))
    }

    /// Ids of every leaf holding object `index`
    pub fn cells_of(&self, index: u32) -> Vec<u32> {
        self.leaves()
            .filter(|leaf| leaf.members.contains(&index))
            .map(OctantNode::id)
            .collect()
    }

    /// Find a node by id, depth-first from the root
    pub fn find_by_id(&self, id: u32) -> Option<OctantKey> {
        self.find_from(self.root, id)
    }

    fn find_from(&self, key: OctantKey, id: u32) -> Option<OctantKey> {
        let node = self.nodes.get(key)?;
        if node.id == id {
            return Some(key);
        }
        node.children().find_map(|child| self.find_from(child, id))
    }

    /// Current settings
    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    /// True when built from an empty store or released
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Offer every node to `renderer`, children before their parent
    pub fn display<R: WireCubeRenderer + ?Sized>(&self, renderer: &mut R, color: Vec4) {
        self.display_from(self.root, renderer, color);
    }

    fn display_from<R: WireCubeRenderer + ?Sized>(&self, key: OctantKey, renderer: &mut R, color: Vec4) {
        let Some(node) = self.nodes.get(key) else {
            return;
        };
        for child in node.children() {
            self.display_from(child, renderer, color);
        }
        renderer.draw_wire_cube(node.center, node.size, color);
    }

    /// Offer every occupied leaf to `renderer`, in registry order
    pub fn display_leaves<R: WireCubeRenderer + ?Sized>(&self, renderer: &mut R, color: Vec4) {
        for leaf in self.leaves() {
            renderer.draw_wire_cube(leaf.center, leaf.size, color);
        }
    }

    /// Offer only the node with `id`; returns false when no node has it
    pub fn display_id<R: WireCubeRenderer + ?Sized>(&self, id: u32, renderer: &mut R, color: Vec4) -> bool {
        match self.find_by_id(id).and_then(|key| self.nodes.get(key)) {
            Some(node) => {
                renderer.draw_wire_cube(node.center, node.size, color);
                true
            }
            None => false,
        }
    }
}
