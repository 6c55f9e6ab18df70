//! Octree Visualization Demo
//!
//! Headless run of the octree over a field of moving boxes:
//! - Boxes drift and bounce off the world walls
//! - The tree is rebuilt from scratch every frame
//! - Wireframe cubes are queued for whichever display mode is active
//! - Tree statistics are logged once per display mode
//!
//! Pass a `.toml` or `.ron` file as the first argument to override the
//! default settings.

mod config;

use config::DemoConfig;
use octant::config::Config;
use octant::debug::{DisplayMode, OctreeDebugVisualizer};
use octant::foundation::logging;
use octant::foundation::math::Vec3;
use octant::spatial::{AabbStore, BoundsStore, OctantTree, AABB};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A box and the way it is moving
struct Mover {
    velocity: Vec3,
}

struct OctreeDemo {
    config: DemoConfig,
    store: AabbStore,
    movers: Vec<Mover>,
    tree: OctantTree,
    visualizer: OctreeDebugVisualizer,
}

impl OctreeDemo {
    fn new(config: DemoConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let half_bounds = config.world_size / 2.0;
        let speed = config.max_speed;

        let mut store = AabbStore::new();
        let mut movers = Vec::with_capacity(config.object_count as usize);
        for _ in 0..config.object_count {
            let position = Vec3::new(
                rng.gen_range(-half_bounds..=half_bounds),
                rng.gen_range(-half_bounds..=half_bounds),
                rng.gen_range(-half_bounds..=half_bounds),
            );
            store.push(AABB::cube(position, config.box_size));
            movers.push(Mover {
                velocity: Vec3::new(
                    rng.gen_range(-speed..=speed),
                    rng.gen_range(-speed..=speed),
                    rng.gen_range(-speed..=speed),
                ),
            });
        }

        let tree = OctantTree::new(&mut store, config.octree);
        log::info!(
            "Created {} boxes, initial tree has {} octants",
            store.count(),
            tree.octant_count()
        );

        let mut visualizer = OctreeDebugVisualizer::new().with_mode(DisplayMode::AllNodes);
        visualizer.show_members = true;

        Self {
            config,
            store,
            movers,
            tree,
            visualizer,
        }
    }

    fn update(&mut self, delta_time: f32) {
        let half_bounds = self.config.world_size / 2.0;

        for (aabb, mover) in self.store.iter_mut().zip(&mut self.movers) {
            let moved = aabb.translated(mover.velocity * delta_time);
            let center = moved.center();
            let mut push_back = Vec3::zeros();

            // Bounce off walls
            for axis in 0..3 {
                if center[axis] < -half_bounds || center[axis] > half_bounds {
                    mover.velocity[axis] = -mover.velocity[axis];
                    push_back[axis] = center[axis].clamp(-half_bounds, half_bounds) - center[axis];
                }
            }

            *aabb = moved.translated(push_back);
        }

        self.rebuild_octree();
    }

    fn rebuild_octree(&mut self) {
        self.store.clear_cells();
        self.tree.rebuild_world(&mut self.store);
    }

    /// Queue this frame's shapes, returns how many were queued
    fn render(&mut self, delta_time: f32) -> usize {
        self.visualizer.update(delta_time);
        self.visualizer.draw(&self.tree) + self.visualizer.draw_members(&self.tree, &self.store)
    }

    fn log_stats(&self, shapes: usize) {
        let straddling = (0..self.store.count())
            .filter(|&index| self.store.cells(index).len() > 1)
            .count();
        let deepest = self.tree.leaves().map(|leaf| leaf.level()).max().unwrap_or(0);

        log::info!(
            "{:?}: {} octants, {} occupied leaves, deepest level {}, {} straddling boxes, {} shapes queued",
            self.visualizer.mode,
            self.tree.octant_count(),
            self.tree.leaf_registry().len(),
            deepest,
            straddling,
            shapes
        );
    }

    fn run(mut self) {
        let delta_time = self.config.delta_time;
        let frames_per_mode = self.config.frames_per_mode.max(1);

        for frame in 0..self.config.frames {
            self.update(delta_time);
            let shapes = self.render(delta_time);

            if frame % frames_per_mode == 0 {
                self.log_stats(shapes);
            }
            if (frame + 1) % frames_per_mode == 0 {
                self.visualizer.mode = self.visualizer.mode.next(self.tree.octant_count());
            }
        }

        self.tree.release();
        log::info!("Released tree, {} octants remain", self.tree.octant_count());
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = match std::env::args().nth(1) {
        Some(path) => DemoConfig::load_from_file(&path)?,
        None => DemoConfig::default(),
    };

    println!("=== Octree Visualization Demo ===");
    println!(
        "{} boxes, max level {}, ideal occupancy {}, {} frames",
        config.object_count, config.octree.max_level, config.octree.ideal_occupancy, config.frames
    );
    println!("Set RUST_LOG=info to see per-mode statistics");
    println!();

    OctreeDemo::new(config).run();
    Ok(())
}
