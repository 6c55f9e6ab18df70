//! Whole-tree scenarios and structural properties of the octree

use std::collections::HashSet;

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::foundation::math::{Vec3, Vec4};
use crate::spatial::{
    AabbStore, BoundsStore, OctantKey, OctantNode, OctantTree, OctreeConfig, WireCubeRenderer, AABB,
};

/// Store that remembers every `assign_cell` call
#[derive(Default)]
struct RecordingStore {
    inner: AabbStore,
    assignments: Vec<(u32, u32)>,
}

impl RecordingStore {
    fn new(boxes: impl IntoIterator<Item = AABB>) -> Self {
        Self {
            inner: boxes.into_iter().collect(),
            assignments: Vec::new(),
        }
    }

    fn assignments_for(&self, index: u32) -> Vec<u32> {
        self.assignments
            .iter()
            .filter(|(object, _)| *object == index)
            .map(|(_, cell)| *cell)
            .collect()
    }
}

impl BoundsStore for RecordingStore {
    fn count(&self) -> u32 {
        self.inner.count()
    }

    fn bounds_of(&self, index: u32) -> Option<AABB> {
        self.inner.bounds_of(index)
    }

    fn assign_cell(&mut self, index: u32, cell_id: u32) {
        self.assignments.push((index, cell_id));
        self.inner.assign_cell(index, cell_id);
    }
}

/// Renderer that keeps every cube it is handed
#[derive(Default)]
struct CubeLog {
    cubes: Vec<(Vec3, f32, Vec4)>,
}

impl WireCubeRenderer for CubeLog {
    fn draw_wire_cube(&mut self, center: Vec3, size: f32, color: Vec4) {
        self.cubes.push((center, size, color));
    }
}

fn cube_at(x: f32, y: f32, z: f32, size: f32) -> AABB {
    AABB::cube(Vec3::new(x, y, z), size)
}

fn random_store(seed: u64, count: usize, spread: f32) -> AabbStore {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let center = Vec3::new(
                rng.gen_range(-spread..spread),
                rng.gen_range(-spread..spread),
                rng.gen_range(-spread..spread),
            );
            let extents = Vec3::new(
                rng.gen_range(0.1..1.5),
                rng.gen_range(0.1..1.5),
                rng.gen_range(0.1..1.5),
            );
            AABB::from_center_extents(center, extents)
        })
        .collect()
}

fn overlap_volume(a: &AABB, b: &AABB) -> f32 {
    let low = a.min.sup(&b.min);
    let high = a.max.inf(&b.max);
    let span = (high - low).map(|v| v.max(0.0));
    span.x * span.y * span.z
}

fn volume(node: &OctantNode) -> f32 {
    node.size().powi(3)
}

/// Everything observable about a tree, ordered by node id
fn snapshot(tree: &OctantTree) -> Vec<(u32, u32, [f32; 3], f32, Vec<u32>)> {
    let mut nodes: Vec<_> = tree
        .iter()
        .map(|(_, node)| {
            let c = node.center();
            (node.id(), node.level(), [c.x, c.y, c.z], node.size(), node.members().to_vec())
        })
        .collect();
    nodes.sort_by_key(|entry| entry.0);
    nodes
}

fn registry_ids(tree: &OctantTree) -> Vec<u32> {
    tree.leaves().map(OctantNode::id).collect()
}

#[test]
fn test_empty_store_builds_degenerate_root() {
    let mut store = AabbStore::new();
    let tree = OctantTree::with_defaults(&mut store);

    assert!(tree.is_degenerate());
    assert_relative_eq!(tree.root().size(), 0.0);
    assert_relative_eq!(tree.root().center(), Vec3::zeros());
    assert_eq!(tree.octant_count(), 1);
    assert_eq!(tree.iter().count(), 1);
    assert!(tree.is_leaf(tree.root_key()));
    assert!(tree.leaf_registry().is_empty());
    assert!(tree.root().members().is_empty());

    // objects appearing later still see no containment until a new root
    store.push(cube_at(0.0, 0.0, 0.0, 1.0));
    assert!(!tree.is_colliding(tree.root_key(), &store, 0));
    assert!(!tree.contains_more_than(tree.root_key(), &store, 0));
}

#[test]
fn test_exactly_ideal_occupancy_does_not_split() {
    let mut store = RecordingStore::new((0..5).map(|i| cube_at(1.0 + 0.3 * i as f32, 1.0, 1.0, 0.5)));
    let tree = OctantTree::new(&mut store, OctreeConfig::new(3, 5));

    assert_eq!(tree.octant_count(), 1);
    assert!(tree.is_leaf(tree.root_key()));
    assert_eq!(tree.root().members(), &[0, 1, 2, 3, 4]);
    assert_eq!(tree.leaf_registry(), &[tree.root_key()]);
    assert_eq!(store.assignments, (0..5).map(|i| (i, 0)).collect::<Vec<_>>());
}

#[test]
fn test_clustered_objects_split_only_their_octant() {
    // six boxes packed near the -X -Y -Z corner, one anchor at the far corner
    let cluster = (0..6).map(|i| cube_at(-7.0 + 0.25 * i as f32, -7.0, -7.0, 0.5));
    let mut store = RecordingStore::new(cluster.chain([cube_at(7.0, 7.0, 7.0, 0.5)]));
    let tree = OctantTree::new(&mut store, OctreeConfig::new(3, 5));
    let root = tree.root_key();

    assert!(!tree.is_leaf(root));
    let split: Vec<usize> = (0..8)
        .filter(|&i| !tree.is_leaf(tree.child(root, i).unwrap()))
        .collect();
    assert_eq!(split, vec![0]);

    let expected: HashSet<OctantKey> = tree
        .iter()
        .filter(|(_, node)| !node.members().is_empty())
        .map(|(key, _)| key)
        .collect();
    let registered: HashSet<OctantKey> = tree.leaf_registry().iter().copied().collect();
    assert_eq!(registered, expected);
    assert!(tree.leaves().all(OctantNode::is_leaf));

    // the anchor lives alone in the far octant
    let far = tree.node(tree.child(root, 7).unwrap()).unwrap();
    assert_eq!(far.members(), &[6]);
    assert_eq!(store.assignments_for(6), vec![far.id()]);
}

#[test]
fn test_straddling_object_reported_in_both_siblings() {
    let mut store = RecordingStore::new([
        cube_at(-7.5, -7.5, -7.5, 1.0),
        cube_at(7.5, 7.5, 7.5, 1.0),
        // spans x = -1..1 across the root's YZ plane, inside -Y -Z
        AABB::new(Vec3::new(-1.0, -4.5, -4.5), Vec3::new(1.0, -3.5, -3.5)),
        cube_at(7.5, -7.5, -7.5, 1.0),
        cube_at(-7.5, 7.5, 7.5, 1.0),
        cube_at(7.5, 7.5, -7.5, 1.0),
    ]);
    let tree = OctantTree::new(&mut store, OctreeConfig::new(1, 5));
    let root = tree.root_key();

    let left = tree.node(tree.child(root, 0).unwrap()).unwrap();
    let right = tree.node(tree.child(root, 1).unwrap()).unwrap();
    assert!(left.members().contains(&2));
    assert!(right.members().contains(&2));

    let mut reported = store.assignments_for(2);
    reported.sort_unstable();
    assert_eq!(reported, vec![left.id(), right.id()]);
    assert_eq!(store.inner.cells(2).len(), 2);
    assert_eq!(tree.cells_of(2).len(), 2);
}

#[test]
fn test_max_level_zero_never_splits() {
    let mut store = random_store(7, 64, 20.0);
    let tree = OctantTree::new(&mut store, OctreeConfig::new(0, 5));

    assert_eq!(tree.octant_count(), 1);
    assert!(tree.is_leaf(tree.root_key()));
    assert_eq!(tree.root().members().len(), 64);
    assert_eq!(tree.leaf_registry(), &[tree.root_key()]);
}

#[test]
fn test_child_index_out_of_range() {
    let mut store = random_store(3, 40, 10.0);
    let tree = OctantTree::with_defaults(&mut store);
    let root = tree.root_key();
    assert!(!tree.is_leaf(root));

    assert!(tree.child(root, 7).is_some());
    assert!(tree.child(root, 8).is_none());
    assert!(tree.child(root, 100).is_none());
    assert!(tree.parent(root).is_none());

    let leaf = tree.leaf_registry()[0];
    assert!(tree.child(leaf, 0).is_none());
    assert!(tree.child(leaf, 8).is_none());
    assert_eq!(tree.node(leaf).unwrap().child_count(), 0);
    assert_eq!(tree.root().child_count(), 8);
}

#[test]
fn test_children_partition_parent_volume() {
    let mut store = random_store(11, 200, 30.0);
    let tree = OctantTree::new(&mut store, OctreeConfig::new(4, 3));
    let mut interior = 0;

    for (key, node) in tree.iter() {
        let children: Vec<&OctantNode> = node.children().map(|child| tree.node(child).unwrap()).collect();
        if children.is_empty() {
            continue;
        }
        interior += 1;
        assert_eq!(children.len(), 8);

        let parent_bounds = node.bounds();
        let mut total = 0.0;
        for (i, child) in children.iter().enumerate() {
            assert_relative_eq!(child.size(), node.size() * 0.5, max_relative = 1e-5);
            assert_eq!(child.level(), node.level() + 1);
            assert_eq!(child.parent(), Some(key));
            assert_eq!(child.root(), tree.root_key());
            assert_relative_eq!(
                overlap_volume(&parent_bounds, &child.bounds()),
                volume(child),
                max_relative = 1e-4
            );
            for other in &children[i + 1..] {
                assert!(overlap_volume(&child.bounds(), &other.bounds()) <= volume(child) * 1e-5);
            }
            total += volume(child);
        }
        assert_relative_eq!(total, volume(node), max_relative = 1e-4);
    }

    assert!(interior > 1, "scenario should produce a multi-level tree");
}

#[test]
fn test_depth_and_occupancy_bounds() {
    let mut store = random_store(5, 300, 25.0);
    let config = OctreeConfig::new(3, 4);
    let tree = OctantTree::new(&mut store, config);

    for (key, node) in tree.iter() {
        assert!(node.level() <= config.max_level);
        if node.level() == config.max_level {
            assert!(node.is_leaf());
        }
        if node.is_leaf() {
            if node.level() < config.max_level {
                assert!(!tree.contains_more_than(key, &store, config.ideal_occupancy));
            }
        } else {
            assert!(tree.contains_more_than(key, &store, config.ideal_occupancy));
            assert!(node.members().is_empty());
        }
    }
    assert_eq!(tree.iter().count(), tree.octant_count() as usize);
}

#[test]
fn test_membership_is_exact_per_leaf() {
    let mut store = random_store(21, 150, 15.0);
    let tree = OctantTree::with_defaults(&mut store);

    for (key, node) in tree.iter().filter(|(_, node)| node.is_leaf()) {
        let expected: Vec<u32> = (0..store.count())
            .filter(|&index| tree.is_colliding(key, &store, index))
            .collect();
        assert_eq!(node.members(), expected.as_slice());
    }

    for index in 0..store.count() {
        assert!(!store.cells(index).is_empty(), "object {index} landed in no leaf");
    }
}

#[test]
fn test_object_outside_root_recorded_nowhere() {
    let mut store = random_store(9, 30, 5.0);
    let mut tree = OctantTree::with_defaults(&mut store);
    let outside = store.push(cube_at(500.0, 500.0, 500.0, 1.0));

    store.clear_cells();
    tree.rebuild(&mut store);

    assert!(tree.cells_of(outside).is_empty());
    assert!(store.cells(outside).is_empty());
    assert!(tree.iter().all(|(_, node)| !node.members().contains(&outside)));

    // a new root re-measures the world and picks it up
    store.clear_cells();
    tree.rebuild_world(&mut store);
    assert!(!tree.cells_of(outside).is_empty());
}

#[test]
fn test_registry_has_no_duplicates_and_no_omissions() {
    let mut store = random_store(17, 120, 12.0);
    let tree = OctantTree::new(&mut store, OctreeConfig::new(4, 2));

    let registry = tree.leaf_registry();
    let unique: HashSet<OctantKey> = registry.iter().copied().collect();
    assert_eq!(unique.len(), registry.len());

    let occupied: HashSet<OctantKey> = tree
        .iter()
        .filter(|(_, node)| !node.members().is_empty())
        .map(|(key, _)| key)
        .collect();
    assert_eq!(unique, occupied);

    assert!(registry.iter().all(|key| tree.is_leaf(*key)));

    let mut expected_order = Vec::new();
    occupied_depth_first(&tree, tree.root_key(), &mut expected_order);
    assert_eq!(registry, expected_order.as_slice());
}

fn occupied_depth_first(tree: &OctantTree, key: OctantKey, out: &mut Vec<OctantKey>) {
    let node = tree.node(key).unwrap();
    for child in node.children() {
        occupied_depth_first(tree, child, out);
    }
    if !node.members().is_empty() {
        out.push(key);
    }
}

#[test]
fn test_rebuild_is_idempotent() {
    let mut store = random_store(42, 180, 18.0);
    let first = OctantTree::with_defaults(&mut store);
    let second = OctantTree::with_defaults(&mut store);

    assert_eq!(snapshot(&first), snapshot(&second));
    assert_eq!(registry_ids(&first), registry_ids(&second));
    assert_eq!(first.octant_count(), second.octant_count());

    let mut rebuilt = first.clone();
    rebuilt.rebuild(&mut store);
    assert_eq!(snapshot(&first), snapshot(&rebuilt));
    assert_eq!(registry_ids(&first), registry_ids(&rebuilt));
}

#[test]
fn test_release_leaves_nothing_reachable() {
    let mut store = random_store(8, 90, 10.0);
    let mut tree = OctantTree::with_defaults(&mut store);
    let old_keys: Vec<OctantKey> = tree.iter().map(|(key, _)| key).filter(|key| *key != tree.root_key()).collect();

    tree.release();

    let mut renderer = CubeLog::default();
    tree.display(&mut renderer, Vec4::new(1.0, 1.0, 0.0, 1.0));
    tree.display_leaves(&mut renderer, Vec4::new(1.0, 1.0, 0.0, 1.0));
    assert_eq!(renderer.cubes.len(), 1);
    assert_relative_eq!(renderer.cubes[0].1, 0.0);

    assert!(old_keys.iter().all(|key| tree.node(*key).is_none() && tree.child(*key, 0).is_none()));
    assert!(tree.cells_of(0).is_empty());
}

#[test]
fn test_display_traversals() {
    let mut store = random_store(13, 100, 12.0);
    let tree = OctantTree::with_defaults(&mut store);
    let color = Vec4::new(0.0, 1.0, 0.0, 1.0);

    let mut all = CubeLog::default();
    tree.display(&mut all, color);
    assert_eq!(all.cubes.len(), tree.octant_count() as usize);
    // children first: the root comes last
    let (center, size, drawn_color) = all.cubes.last().copied().unwrap();
    assert_relative_eq!(center, tree.root().center());
    assert_relative_eq!(size, tree.root().size());
    assert_eq!(drawn_color, color);

    let mut leaves = CubeLog::default();
    tree.display_leaves(&mut leaves, color);
    assert_eq!(leaves.cubes.len(), tree.leaf_registry().len());
    for ((center, size, _), leaf) in leaves.cubes.iter().zip(tree.leaves()) {
        assert_relative_eq!(*center, leaf.center());
        assert_relative_eq!(*size, leaf.size());
    }

    let target = tree.octant_count() - 1;
    let node = tree.node(tree.find_by_id(target).unwrap()).unwrap();
    let mut single = CubeLog::default();
    assert!(tree.display_id(target, &mut single, color));
    assert_eq!(single.cubes.len(), 1);
    assert_relative_eq!(single.cubes[0].0, node.center());

    let mut missing = CubeLog::default();
    assert!(!tree.display_id(tree.octant_count(), &mut missing, color));
    assert!(missing.cubes.is_empty());
}

#[test]
fn test_deep_config_is_not_clamped() {
    // the tree trusts its caller; only validate() complains
    let config = OctreeConfig::new(12, 0);
    assert!(config.validate().is_err());

    // point-sized boxes on opposite corners keep the split to one path each
    let mut store: AabbStore = [cube_at(0.0, 0.0, 0.0, 0.0), cube_at(64.0, 64.0, 64.0, 0.0)]
        .into_iter()
        .collect();
    let tree = OctantTree::new(&mut store, config);

    assert_eq!(tree.config().max_level, 12);
    let deepest = tree.iter().map(|(_, node)| node.level()).max().unwrap();
    assert_eq!(deepest, 12);
}
