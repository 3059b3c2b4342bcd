//! Headless frame-loop demo
//!
//! Builds an asteroid field around a ship with turrets and a shield, then
//! flies an orbiting camera through it for a fixed number of frames, logging
//! what each frame culls and draws. No window is opened; pipelines only
//! count their draw calls.
//!
//! Usage: `frame_demo [config.toml|config.ron] [frames]`

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use rand::Rng;
use scene_core::foundation::logging;
use scene_core::prelude::*;

const ASTEROID_COUNT: u32 = 400;
const FIELD_RADIUS: f32 = 120.0;
const DEFAULT_FRAMES: u32 = 600;
const FRAME_TIME: f32 = 1.0 / 60.0;

/// What a node stands for; handed back to pipelines as the payload
#[derive(Debug, Clone, Copy)]
enum Body {
    Asteroid(u32),
    Hull,
    Turret(u8),
    Shield,
}

pub struct FrameDemo {
    renderer: Renderer,
    scene: SceneId,
    camera: CameraId,
    ship: NodeId,
    turrets: Vec<NodeId>,
    asteroids: Vec<(NodeId, Vec3)>,
    draws: Rc<Cell<usize>>,
    destroyed: Rc<Cell<usize>>,
    elapsed: f32,
}

impl FrameDemo {
    pub fn new(config: EngineConfig) -> Result<Self, Box<dyn std::error::Error>> {
        log::info!("Creating frame demo...");
        let mut renderer = Renderer::new(config, || Viewport::new(1280, 720))?;
        let draws = Rc::new(Cell::new(0));
        let destroyed = Rc::new(Cell::new(0));

        let counter = Rc::clone(&draws);
        let solid = renderer.add_pipeline(
            Box::new(CallbackPipeline::new(
                |frame| log::trace!("solid batch from {:?}", frame.camera_position),
                move |payload, _| {
                    if let Some(body) = payload.downcast_ref::<Body>() {
                        log::trace!("draw {:?}", body);
                    }
                    counter.set(counter.get() + 1);
                },
                |_| {},
            )),
            false,
        )?;
        let counter = Rc::clone(&draws);
        let glow = renderer.add_pipeline(
            Box::new(CallbackPipeline::from_render(move |_, _| counter.set(counter.get() + 1))),
            true,
        )?;

        let scene = renderer.make_octree_scene();

        let ship = renderer.add_node(scene, Box::new(Body::Hull), Some(solid), None)?;
        renderer.set_bounding_sphere(ship, 4.0)?;
        let mut turrets = Vec::new();
        for (i, offset) in [Vec3::new(2.5, 1.0, 0.0), Vec3::new(-2.5, 1.0, 0.0)].into_iter().enumerate() {
            let turret = renderer.add_node(ship, Box::new(Body::Turret(i as u8)), Some(solid), None)?;
            renderer.set_node_position(turret, offset)?;
            renderer.set_bounding_sphere(turret, 0.8)?;
            turrets.push(turret);
        }
        let shield = renderer.add_node(ship, Box::new(Body::Shield), Some(glow), None)?;
        renderer.set_bounding_sphere(shield, 6.0)?;

        let mut rng = rand::thread_rng();
        let mut asteroids = Vec::new();
        for id in 0..ASTEROID_COUNT {
            let position = Vec3::new(
                rng.gen_range(-FIELD_RADIUS..FIELD_RADIUS),
                rng.gen_range(-FIELD_RADIUS * 0.25..FIELD_RADIUS * 0.25),
                rng.gen_range(-FIELD_RADIUS..FIELD_RADIUS),
            );
            let counter = Rc::clone(&destroyed);
            let asteroid = renderer.add_node(
                scene,
                Box::new(Body::Asteroid(id)),
                Some(solid),
                Some(Box::new(move |_: Payload| counter.set(counter.get() + 1))),
            )?;
            renderer.set_node_position(asteroid, position)?;
            renderer.set_node_rotation(asteroid, Vec3::new(rng.gen(), rng.gen(), rng.gen()), 0.0)?;
            renderer.set_bounding_sphere(asteroid, rng.gen_range(0.5..3.0))?;
            asteroids.push((asteroid, position));
        }
        log::info!("Spawned {} asteroids", asteroids.len());

        let camera = renderer.make_camera(scene, Projection::Perspective)?;
        renderer.set_camera_position(camera, Vec3::new(0.0, 10.0, 60.0))?;
        renderer.camera_look_at(camera, Vec3::zeros(), Vec3::y())?;

        Ok(Self {
            renderer,
            scene,
            camera,
            ship,
            turrets,
            asteroids,
            draws,
            destroyed,
            elapsed: 0.0,
        })
    }

    fn update(&mut self, frame: u32, frames: u32) -> Result<(), SceneError> {
        self.elapsed += FRAME_TIME;
        let t = self.elapsed;

        // Ship drifts along a slow figure eight; turrets sweep
        self.renderer
            .set_node_position(self.ship, Vec3::new((t * 0.3).sin() * 20.0, 0.0, (t * 0.6).sin() * 10.0))?;
        self.renderer.set_node_rotation(self.ship, Vec3::y(), t * 0.2)?;
        for (i, turret) in self.turrets.iter().enumerate() {
            let direction = if i % 2 == 0 { 1.0 } else { -1.0 };
            self.renderer.set_node_rotation(*turret, Vec3::y(), direction * t)?;
        }

        for (i, (asteroid, _)) in self.asteroids.iter().enumerate().step_by(7) {
            self.renderer.rotate_node(*asteroid, t * (1.0 + i as f32 * 0.01))?;
        }

        let orbit = t * 0.25;
        self.renderer
            .set_camera_position(self.camera, Vec3::new(orbit.sin() * 60.0, 10.0, orbit.cos() * 60.0))?;
        self.renderer.camera_look_at(self.camera, Vec3::zeros(), Vec3::y())?;

        // Clear out a batch of asteroids halfway through
        if frame == frames / 2 {
            let removed: Vec<(NodeId, Vec3)> = self.asteroids.drain(..self.asteroids.len() / 4).collect();
            for (asteroid, position) in &removed {
                log::debug!("Destroying asteroid at {:?}", position);
                self.renderer.delete_node(*asteroid)?;
            }
            log::info!("Destroyed {} asteroids", removed.len());
        }

        Ok(())
    }

    pub fn run(mut self, frames: u32) -> Result<(), Box<dyn std::error::Error>> {
        log::info!("Running {} frames...", frames);
        let start = Instant::now();
        let mut total = FrameStats::default();

        for frame in 0..frames {
            self.update(frame, frames)?;
            let stats = self.renderer.frame();
            total.merge(&stats);

            if frame % 60 == 0 {
                log::info!(
                    "Frame {:4}: {:3} opaque, {:2} alpha, {:2} batches, camera at {:?}",
                    frame,
                    stats.opaque,
                    stats.alpha,
                    stats.batches,
                    self.renderer.camera_position()
                );
            }
        }

        let seconds = start.elapsed().as_secs_f32();
        log::info!(
            "Rendered {} frames in {:.3}s ({:.1} fps), {} draw calls, {} skipped",
            frames,
            seconds,
            frames as f32 / seconds.max(f32::EPSILON),
            self.draws.get(),
            total.skipped
        );

        self.renderer.delete_scene(self.scene)?;
        self.renderer.release_free_scenes();
        log::info!("Scene deleted, {} asteroid destructors ran", self.destroyed.get());
        Ok(())
    }
}

fn load_config(path: Option<&str>) -> Result<EngineConfig, ConfigError> {
    match path {
        Some(path) => EngineConfig::load_from_file(path),
        None => Ok(EngineConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let config = load_config(args.get(1).map(String::as_str))?;
    let frames = match args.get(2) {
        Some(frames) => frames.parse()?,
        None => DEFAULT_FRAMES,
    };

    logging::init_with_level(&config.log_level);
    log::info!("Starting frame demo");
    if let Some(path) = args.get(1) {
        log::info!("Loaded configuration from {}", path);
    }

    let demo = FrameDemo::new(config)?;
    demo.run(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_run_still_destroys_asteroids() {
        let frames = 4;
        let mut demo = FrameDemo::new(EngineConfig::default()).unwrap();
        for frame in 0..frames {
            demo.update(frame, frames).unwrap();
        }

        let destroyed = (ASTEROID_COUNT / 4) as usize;
        assert_eq!(demo.destroyed.get(), destroyed);
        assert_eq!(demo.asteroids.len(), ASTEROID_COUNT as usize - destroyed);
    }
}
