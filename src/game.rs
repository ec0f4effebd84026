//! Scene construction and the per-frame update state machine.
//!
//! [`Game`] owns every object, light and camera. Each frame runs
//! [`Game::update`] once and then hands a read-only [`FrameSnapshot`] to the
//! renderer; nothing is mutated between the two.
//!
//! Update order is fixed, and later steps see what earlier steps wrote:
//!
//! 1. frame statistics
//! 2. launch trajectory
//! 3. engine light placement
//! 4. keyboard input
//! 5. rocket-mounted cameras
//! 6. collision, which may trigger an explosion
//! 7. transient particle ageing
//! 8. day/night orbit

use std::collections::VecDeque;
use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Vec3, Vec4};
use winit::keyboard::KeyCode;

use crate::camera::{Camera, CameraMode};
use crate::config::{GameConfig, TerrainSection};
use crate::geometry::GeometryKind;
use crate::input::Input;
use crate::light::{Light, rgb};
use crate::object::{GameObject, ShapeId};
use crate::shape::{Instance, Material, RenderMode, Shape, particle_line};
use crate::transform::Transform;

const FRAME_SAMPLES: usize = 50;
const CONE_RADIUS: f32 = 0.5;
const ENGINE_LIGHT_OFFSET: f32 = 5.0;
const DAY_NIGHT_RATE: f32 = -0.05;
const CAMERA_TURN_DEGREES: f32 = 10.0;
const PITCH_DEGREES: f32 = 5.0;
const TIME_SCALE_STEP: f32 = 0.1;

/// Objects that live for the whole session, in draw order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectSlot {
    Environment,
    Launcher,
    Terrain,
    Rocket,
}

impl ObjectSlot {
    /// Number of permanent objects. Anything past this is a transient
    /// explosion batch.
    pub const COUNT: usize = 4;

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightSlot {
    Sun,
    Moon,
    Engine,
    /// Only present after the first explosion.
    Explosion,
}

impl LightSlot {
    pub const ALL: [LightSlot; 4] = [
        LightSlot::Sun,
        LightSlot::Moon,
        LightSlot::Engine,
        LightSlot::Explosion,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            LightSlot::Sun => "Sun",
            LightSlot::Moon => "Moon",
            LightSlot::Engine => "Engine",
            LightSlot::Explosion => "Explosion",
        }
    }
}

/// The five cameras, selected with F1 to F5.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraSlot {
    Launcher,
    Terrain,
    Wide,
    RocketCone,
    RocketBody,
}

impl CameraSlot {
    pub const ALL: [CameraSlot; 5] = [
        CameraSlot::Launcher,
        CameraSlot::Terrain,
        CameraSlot::Wide,
        CameraSlot::RocketCone,
        CameraSlot::RocketBody,
    ];

    const KEYS: [KeyCode; 5] = [
        KeyCode::F1,
        KeyCode::F2,
        KeyCode::F3,
        KeyCode::F4,
        KeyCode::F5,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Handles to the shapes the controller drives directly.
#[derive(Clone, Copy, Debug)]
struct SceneShapes {
    launcher_pole: ShapeId,
    terrain_cubes: ShapeId,
    rocket_cone: ShapeId,
}

/// Everything the renderer reads for one frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameSnapshot<'a> {
    pub objects: &'a [GameObject],
    pub camera: &'a Camera,
    pub lights: &'a [Light],
    /// Elapsed time multiplied by the current time scale.
    pub scaled_time: f32,
}

pub struct Game {
    config: GameConfig,
    width: f32,
    height: f32,
    objects: Vec<GameObject>,
    shapes: SceneShapes,
    lights: Vec<Light>,
    cameras: Vec<Camera>,
    active_camera: CameraSlot,
    rocket_start: Vec3,
    rocket_speed: f32,
    /// Accumulated rotation about Z, including pitch input before launch.
    rocket_pitch: f32,
    launched: bool,
    time_scale: f32,
    time: f32,
    dt_samples: VecDeque<f32>,
    frame_rate: f32,
    cube_count: usize,
    particle_timer: f32,
    overlay_visible: bool,
    exit: bool,
}

impl Game {
    pub fn new(mut config: GameConfig, width: f32, height: f32) -> Self {
        config.terrain.clamp_dimensions();
        let (objects, shapes) = build_scene(&config);
        let lights = initial_lights(&config.terrain);
        let rocket_start = rocket_start(&config.terrain);

        let mut game = Self {
            rocket_speed: config.rocket.speed,
            time_scale: config.simulation.time_scale,
            config,
            width,
            height,
            objects,
            shapes,
            lights,
            cameras: Vec::new(),
            active_camera: CameraSlot::Launcher,
            rocket_start,
            rocket_pitch: 0.0,
            launched: false,
            time: 0.0,
            dt_samples: VecDeque::from(vec![0.0; FRAME_SAMPLES]),
            frame_rate: 0.0,
            cube_count: 0,
            particle_timer: 0.0,
            overlay_visible: true,
            exit: false,
        };
        game.cameras = game.initial_cameras();
        game.cube_count = game.terrain_instances().len();

        log::info!(
            "Scene built: {} objects, {} terrain cubes, {} lights",
            game.objects.len(),
            game.cube_count,
            game.lights.len()
        );
        game
    }

    /// Advances the simulation by `dt` seconds of wall-clock time.
    pub fn update(&mut self, dt: f32, input: &Input) {
        self.record_frame(dt);
        if self.launched {
            self.advance_launch(dt);
        }
        self.place_engine_light();
        self.handle_input(dt, input);
        self.follow_rocket();
        self.check_collision();
        self.age_particles(dt);
        self.advance_day_night(dt);
        log::trace!(
            "t={:.2} fps={:.1} cubes={} objects={}",
            self.time,
            self.frame_rate,
            self.cube_count,
            self.objects.len()
        );
    }

    pub fn snapshot(&self) -> FrameSnapshot<'_> {
        FrameSnapshot {
            objects: &self.objects,
            camera: self.active_camera(),
            lights: &self.lights,
            scaled_time: self.scaled_time(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn objects(&self) -> &[GameObject] {
        &self.objects
    }

    pub fn object(&self, slot: ObjectSlot) -> &GameObject {
        &self.objects[slot.index()]
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn light(&self, slot: LightSlot) -> Option<&Light> {
        self.lights.get(slot.index())
    }

    pub fn active_camera(&self) -> &Camera {
        &self.cameras[self.active_camera.index()]
    }

    pub fn active_camera_slot(&self) -> CameraSlot {
        self.active_camera
    }

    pub fn terrain_instances(&self) -> &[Instance] {
        self.object(ObjectSlot::Terrain)
            .shape(self.shapes.terrain_cubes)
            .instances()
    }

    pub fn cube_count(&self) -> usize {
        self.cube_count
    }

    pub fn rocket_position(&self) -> Vec3 {
        self.object(ObjectSlot::Rocket).position()
    }

    pub fn rocket_speed(&self) -> f32 {
        self.rocket_speed
    }

    pub fn rocket_pitch(&self) -> f32 {
        self.rocket_pitch
    }

    pub fn is_launched(&self) -> bool {
        self.launched
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Unscaled seconds since start.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn scaled_time(&self) -> f32 {
        self.time * self.time_scale
    }

    /// Reciprocal of the mean of the last 50 frame times.
    pub fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    pub fn screen_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn particle_timer(&self) -> f32 {
        self.particle_timer
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn exit_requested(&self) -> bool {
        self.exit
    }

    pub fn set_rocket_speed(&mut self, speed: f32) {
        self.rocket_speed = speed;
    }

    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.time_scale = time_scale;
    }

    /// Recolours a light. Does nothing for a slot that does not exist yet.
    pub fn set_light_colour(&mut self, slot: LightSlot, colour: Vec4) {
        if let Some(light) = self.lights.get_mut(slot.index()) {
            light.set_colour(colour);
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        for camera in &mut self.cameras {
            camera.resize(width, height);
        }
    }

    pub fn select_camera(&mut self, slot: CameraSlot) {
        if self.active_camera != slot {
            self.active_camera = slot;
            log::info!("Camera switched to {}", self.active_camera().name());
        }
    }

    /// Starts the launch. No effect while already in flight.
    pub fn launch(&mut self) {
        if !self.launched {
            self.launched = true;
            log::info!("Launch from {}", self.rocket_position());
        }
    }

    /// Puts the rocket back on the pad and levels the launcher pole.
    pub fn reset_rocket(&mut self) {
        self.launched = false;
        self.rocket_pitch = 0.0;
        let start = self.rocket_start;
        let rocket = self.object_mut(ObjectSlot::Rocket);
        rocket.reset();
        rocket.translate(start);
        let pole = self.shapes.launcher_pole;
        self.object_mut(ObjectSlot::Launcher)
            .set_shape_rotation(pole, Vec3::ZERO);
    }

    /// Restores the rocket, terrain, lights, cameras and time scale.
    pub fn reset_game(&mut self) {
        self.reset_rocket();
        let cubes = self.shapes.terrain_cubes;
        let grid = terrain_grid(&self.config.terrain);
        self.object_mut(ObjectSlot::Terrain)
            .set_shape_instances(cubes, grid);
        self.lights = initial_lights(&self.config.terrain);
        self.cameras = self.initial_cameras();
        self.active_camera = CameraSlot::Launcher;
        self.time_scale = self.config.simulation.time_scale;
        log::info!("Game reset");
    }

    fn object_mut(&mut self, slot: ObjectSlot) -> &mut GameObject {
        &mut self.objects[slot.index()]
    }

    fn cone_position(&self) -> Vec3 {
        self.object(ObjectSlot::Rocket)
            .shape_world(self.shapes.rocket_cone)
            .w_axis
            .truncate()
    }

    fn record_frame(&mut self, dt: f32) {
        self.cube_count = self.terrain_instances().len();
        self.time += dt;

        self.dt_samples.pop_front();
        self.dt_samples.push_back(dt);
        let average = self.dt_samples.iter().sum::<f32>() / FRAME_SAMPLES as f32;
        self.frame_rate = if average > 0.0 { 1.0 / average } else { 0.0 };
    }

    /// Climbs along the rocket's own up axis while bending the nose over,
    /// quickly at first and slowly near the end.
    fn advance_launch(&mut self, dt: f32) {
        let step = self.time_scale * dt;
        let distance = self.rocket_speed * step;
        let rocket = self.object_mut(ObjectSlot::Rocket);
        let up = rocket.up();
        rocket.translate(up * distance);

        let turn = if self.rocket_pitch > -(PI * 0.8) {
            (-2.5_f32).to_radians()
        } else if self.rocket_pitch > -PI {
            (-1.0_f32).to_radians()
        } else {
            return;
        };
        let delta = turn * step;
        self.object_mut(ObjectSlot::Rocket)
            .rotate(Vec3::new(0.0, 0.0, delta));
        self.rocket_pitch += delta;
    }

    fn place_engine_light(&mut self) {
        let rocket = self.object(ObjectSlot::Rocket);
        let position = rocket.position() - rocket.up() * ENGINE_LIGHT_OFFSET;
        if let Some(light) = self.lights.get_mut(LightSlot::Engine.index()) {
            light.set_translation(position);
        }
    }

    fn handle_input(&mut self, dt: f32, input: &Input) {
        if input.key_down(KeyCode::Escape) {
            self.exit = true;
        }
        if input.key_down(KeyCode::KeyR) {
            self.reset_game();
        }

        let step = self.config.simulation.camera_speed * dt;
        let camera = &mut self.cameras[self.active_camera.index()];
        if camera.is_controllable() {
            if input.ctrl() {
                let pans = [
                    (KeyCode::ArrowUp, camera.forward()),
                    (KeyCode::ArrowDown, -camera.forward()),
                    (KeyCode::ArrowRight, camera.right()),
                    (KeyCode::ArrowLeft, -camera.right()),
                    (KeyCode::PageUp, camera.up()),
                    (KeyCode::PageDown, -camera.up()),
                ];
                for (key, direction) in pans {
                    if input.key_down(key) {
                        camera.translate(direction * step);
                    }
                }
            } else {
                let turn = CAMERA_TURN_DEGREES.to_radians() * step;
                let turns = [
                    (KeyCode::ArrowUp, Vec3::new(-turn, 0.0, 0.0)),
                    (KeyCode::ArrowDown, Vec3::new(turn, 0.0, 0.0)),
                    (KeyCode::ArrowLeft, Vec3::new(0.0, -turn, 0.0)),
                    (KeyCode::ArrowRight, Vec3::new(0.0, turn, 0.0)),
                ];
                for (key, delta) in turns {
                    if input.key_down(key) {
                        camera.rotate(delta);
                    }
                }
            }
        }

        if input.key_pressed(KeyCode::KeyS) {
            self.overlay_visible = !self.overlay_visible;
        }

        // first held key wins, F1 before F5
        if let Some(i) = CameraSlot::KEYS.iter().position(|&key| input.key_down(key)) {
            self.select_camera(CameraSlot::ALL[i]);
        }

        if !self.launched && input.shift() {
            let pitch = PITCH_DEGREES.to_radians() * step;
            if input.key_down(KeyCode::Comma) {
                self.pitch_rocket(pitch);
            }
            if input.key_down(KeyCode::Period) {
                self.pitch_rocket(-pitch);
            }
        }

        if input.key_down(KeyCode::F11) {
            self.launch();
        }

        if input.key_down(KeyCode::KeyT) {
            self.time_scale += if input.shift() {
                TIME_SCALE_STEP
            } else {
                -TIME_SCALE_STEP
            };
            log::debug!("Time scale {:.1}", self.time_scale);
        }
    }

    /// Tilts the rocket about Z and mirrors the tilt onto the launcher pole.
    fn pitch_rocket(&mut self, angle: f32) {
        let delta = Vec3::new(0.0, 0.0, angle);
        self.object_mut(ObjectSlot::Rocket).rotate(delta);
        let pole = self.shapes.launcher_pole;
        self.object_mut(ObjectSlot::Launcher)
            .rotate_shape(pole, delta);
        self.rocket_pitch += angle;
    }

    fn follow_rocket(&mut self) {
        let rocket = self.rocket_position();
        let cone = self.cone_position();
        let slot = self.active_camera;
        let camera = &mut self.cameras[slot.index()];
        match slot {
            CameraSlot::RocketCone => {
                camera.look_at(cone);
                camera.set_eye(Vec3::new(cone.x + 1.0, cone.y, -1.0));
            }
            CameraSlot::RocketBody => {
                camera.look_at(rocket);
                camera.set_eye(Vec3::new(rocket.x, rocket.y, -2.0));
            }
            CameraSlot::Wide => camera.look_at(rocket),
            CameraSlot::Launcher | CameraSlot::Terrain => {}
        }
    }

    /// Tests the nose against every terrain cube and stops at the first hit.
    fn check_collision(&mut self) {
        let threshold = CONE_RADIUS + self.config.terrain.scale / 2.0;
        let impact = self.cone_position();
        let terrain = self.object(ObjectSlot::Terrain).transform().matrix();
        let hit = self
            .terrain_instances()
            .iter()
            .any(|cube| cube.world_position(terrain).distance(impact) < threshold);

        if hit {
            log::info!("Rocket hit the terrain at {impact}");
            self.reset_rocket();
            self.explode(impact);
        }
    }

    /// Lights the impact, spawns a particle batch there and removes every
    /// terrain cube strictly inside the explosion radius.
    fn explode(&mut self, impact: Vec3) {
        let flash = Light::new("Explosion", impact, rgb(0.6, 0.2, 0.1));
        match self.lights.get_mut(LightSlot::Explosion.index()) {
            Some(light) => light.set_translation(impact),
            None => self.lights.push(flash),
        }

        let sim = &self.config.simulation;
        let origin = impact - Vec3::new(0.0, 3.0, 0.0);
        let mut particles = GameObject::new("Explosion")
            .with_transform(Transform::new().with_translation(origin));
        particles.add_shape(
            Shape::new(
                "Particles",
                GeometryKind::Quad,
                Material::new("explosion_particles").diffuse("flame.dds"),
            )
            .with_mode(RenderMode::Blended)
            .with_instances(particle_line(sim.particle_count)),
        );
        self.particle_timer = sim.particle_lifetime;
        self.objects.truncate(ObjectSlot::COUNT);
        self.objects.push(particles);

        let radius = self.config.rocket.explosion_radius;
        let cubes = self.shapes.terrain_cubes;
        let terrain = self.object_mut(ObjectSlot::Terrain);
        let world = terrain.transform().matrix();
        let doomed: Vec<Instance> = terrain
            .shape(cubes)
            .instances()
            .iter()
            .filter(|cube| cube.world_position(world).distance(impact) < radius)
            .copied()
            .collect();
        terrain.remove_instances_from_shape(cubes, &doomed);
        log::info!("Explosion removed {} terrain cubes", doomed.len());
    }

    fn age_particles(&mut self, dt: f32) {
        if self.particle_timer > 0.0 {
            self.particle_timer -= dt * self.time_scale;
        }
        if self.particle_timer < 0.0 && self.objects.len() > ObjectSlot::COUNT {
            self.objects.pop();
            log::debug!("Explosion particles expired");
        }
    }

    fn advance_day_night(&mut self, dt: f32) {
        let delta = Vec3::new(0.0, 0.0, DAY_NIGHT_RATE * self.time_scale * dt);
        for slot in [LightSlot::Sun, LightSlot::Moon] {
            if let Some(light) = self.lights.get_mut(slot.index()) {
                light.orbit(delta);
            }
        }
    }

    fn initial_cameras(&self) -> Vec<Camera> {
        let (w, h) = (self.width, self.height);
        let launcher = self.object(ObjectSlot::Launcher).position();
        let rocket = self.rocket_position();
        let cone = self.cone_position();
        vec![
            Camera::new(
                "LauncherCam",
                CameraMode::FreeFly,
                Vec3::new(launcher.x, launcher.y, -5.0),
                Vec3::ZERO,
                w,
                h,
            ),
            Camera::new(
                "TerrainCam",
                CameraMode::FreeFly,
                Vec3::new(0.0, 50.0, 0.0),
                Vec3::new(FRAC_PI_2, 0.0, 0.0),
                w,
                h,
            ),
            Camera::new(
                "WideCam",
                CameraMode::Fixed,
                Vec3::new(0.0, 1.0, -20.0),
                Vec3::ZERO,
                w,
                h,
            ),
            Camera::new(
                "RocketConeCam",
                CameraMode::Fixed,
                Vec3::new(cone.x + 1.0, cone.y, -1.0),
                Vec3::ZERO,
                w,
                h,
            ),
            Camera::new(
                "RocketBodyCam",
                CameraMode::Fixed,
                Vec3::new(rocket.x, rocket.y, -2.0),
                Vec3::ZERO,
                w,
                h,
            ),
        ]
    }
}

fn launch_x(terrain: &TerrainSection) -> f32 {
    -(terrain.scale * terrain.x as f32) * 0.4
}

fn rocket_start(terrain: &TerrainSection) -> Vec3 {
    Vec3::new(launch_x(terrain), 3.0, 0.0)
}

/// One instance per grid cell, x outermost.
pub fn terrain_grid(terrain: &TerrainSection) -> Vec<Instance> {
    let mut instances = Vec::with_capacity(terrain.cube_count());
    for x in 0..terrain.x {
        for y in 0..terrain.y {
            for z in 0..terrain.z {
                instances.push(Instance::new(x as f32, y as f32, z as f32));
            }
        }
    }
    instances
}

fn build_scene(config: &GameConfig) -> (Vec<GameObject>, SceneShapes) {
    let terrain_cfg = &config.terrain;
    let s = terrain_cfg.scale;

    let mut environment = GameObject::new("Environment");
    environment.add_shape(
        Shape::new(
            "EnvironmentMap",
            GeometryKind::Box,
            Material::new("environment").diffuse("desertSkybox.dds"),
        )
        .with_mode(RenderMode::Environment),
    );

    let metal = Material::new("default").diffuse("corrugated_metal.dds");
    let launch_at = Vec3::new(launch_x(terrain_cfg), 0.0, 0.0);
    let mut launcher = GameObject::new("Launcher")
        .with_transform(Transform::new().with_translation(launch_at));
    let base = Transform::new()
        .with_scale(Vec3::new(4.0, 2.0, 4.0))
        .with_translation(Vec3::new(0.0, -0.5, 0.0));
    let base = Shape::new("LauncherBase", GeometryKind::Box, metal.clone()).with_transform(base);
    launcher.add_shape(base);
    let pole = Transform::new()
        .with_scale(Vec3::new(0.2, 4.0, 0.2))
        .with_translation(Vec3::new(0.0, 2.5, 0.0));
    let pole = Shape::new("LauncherPole", GeometryKind::Box, metal).with_transform(pole);
    let launcher_pole = launcher.add_shape(pole);

    let terrain_origin = Vec3::new(
        -(s * terrain_cfg.x as f32) / 2.0,
        -(s * terrain_cfg.y as f32),
        -(s * terrain_cfg.z as f32) / 2.0,
    );
    let terrain_transform = Transform::new()
        .with_scale(Vec3::splat(s))
        .with_translation(terrain_origin);
    let mut terrain = GameObject::new("Terrain").with_transform(terrain_transform);
    let terrain_cubes = terrain.add_shape(
        Shape::new(
            "TerrainCube",
            GeometryKind::Box,
            Material::new("instanced_parallax")
                .diffuse("desert.dds")
                .normal("desert_norm.dds")
                .height("desert_height.dds"),
        )
        .with_instances(terrain_grid(terrain_cfg)),
    );

    let mut rocket = GameObject::new("Rocket")
        .with_transform(Transform::new().with_translation(rocket_start(terrain_cfg)));
    rocket.add_shape(
        Shape::new(
            "RocketBody",
            GeometryKind::Cylinder,
            Material::new("parallax")
                .diffuse("corrugated_metal.dds")
                .normal("corrugated_metal_norm.dds")
                .height("corrugated_metal_height.dds"),
        )
        .with_transform(Transform::new().with_scale(Vec3::new(0.5, 5.0, 0.5))),
    );
    let cone = Transform::new()
        .with_scale(Vec3::new(0.75, 2.0, 0.75))
        .with_translation(Vec3::new(0.0, 3.0, 0.0));
    let rocket_cone = rocket.add_shape(
        Shape::new(
            "RocketCone",
            GeometryKind::Cone,
            Material::new("chrome").diffuse("desertSkybox.dds"),
        )
        .with_transform(cone),
    );
    rocket.add_shape(
        Shape::new(
            "Particles",
            GeometryKind::Quad,
            Material::new("engine_particles").diffuse("stones.dds"),
        )
        .with_mode(RenderMode::Blended)
        .with_instances(particle_line(config.simulation.particle_count)),
    );

    let objects = vec![environment, launcher, terrain, rocket];
    let shapes = SceneShapes {
        launcher_pole,
        terrain_cubes,
        rocket_cone,
    };
    (objects, shapes)
}

fn initial_lights(terrain: &TerrainSection) -> Vec<Light> {
    let height = terrain.scale * terrain.x as f32 / 2.0 + 10.0;
    vec![
        Light::orbiting(
            "Sun",
            Vec3::ZERO,
            Vec3::new(0.0, height, 0.0),
            rgb(0.6, 0.4, 0.1),
        ),
        Light::orbiting(
            "Moon",
            Vec3::ZERO,
            Vec3::new(0.0, -height, 0.0),
            rgb(0.2, 0.2, 0.7),
        ),
        Light::new("Engine", Vec3::ZERO, rgb(0.4, 0.1, 0.1)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 10 x 2 x 10 unit cubes. Terrain origin is (-5, -2, -5), so cube
    /// centres sit at y = -2 and y = -1 and the rocket starts at (-4, 3, 0).
    fn small_game() -> Game {
        let mut config = GameConfig::default();
        config.terrain = TerrainSection {
            x: 10,
            y: 2,
            z: 10,
            scale: 1.0,
        };
        Game::new(config, 800.0, 600.0)
    }

    fn frame(game: &mut Game, input: &mut Input, dt: f32) {
        game.update(dt, input);
        input.begin_frame();
    }

    fn place_rocket(game: &mut Game, position: Vec3) {
        game.object_mut(ObjectSlot::Rocket)
            .set_translation(position);
    }

    #[test]
    fn zero_width_terrain_still_builds_cubes() {
        let mut config = GameConfig::default();
        config.terrain = TerrainSection {
            x: 0,
            y: 2,
            z: 10,
            scale: 1.0,
        };
        let game = Game::new(config, 800.0, 600.0);
        assert_eq!(game.config().terrain.x, 1);
        assert_eq!(game.cube_count(), 20);
        assert_eq!(game.terrain_instances().len(), 20);
    }

    #[test]
    fn terrain_grid_is_dense() {
        let tiny = TerrainSection {
            x: 2,
            y: 1,
            z: 1,
            scale: 1.0,
        };
        assert_eq!(
            terrain_grid(&tiny),
            vec![Instance::new(0.0, 0.0, 0.0), Instance::new(1.0, 0.0, 0.0)]
        );

        let t = TerrainSection {
            x: 3,
            y: 2,
            z: 4,
            scale: 1.5,
        };
        let grid = terrain_grid(&t);
        assert_eq!(grid.len(), 24);
        for x in 0..3 {
            for y in 0..2 {
                for z in 0..4 {
                    let cell = Instance::new(x as f32, y as f32, z as f32);
                    assert_eq!(grid.iter().filter(|i| **i == cell).count(), 1);
                }
            }
        }
    }

    #[test]
    fn scene_is_built_in_draw_order() {
        let game = small_game();
        let names: Vec<&str> = game.objects().iter().map(|o| o.name()).collect();
        assert_eq!(names, ["Environment", "Launcher", "Terrain", "Rocket"]);
        assert_eq!(game.cube_count(), 200);
        assert_eq!(game.lights().len(), 3);
        assert_eq!(game.rocket_position(), Vec3::new(-4.0, 3.0, 0.0));
        let cone = game.cone_position();
        assert!(cone.abs_diff_eq(Vec3::new(-4.0, 6.0, 0.0), 1e-5));
        assert_eq!(game.active_camera().name(), "LauncherCam");

        let environment = &game.object(ObjectSlot::Environment).shapes()[0];
        assert!(environment.is_environment());
        let particles = &game.object(ObjectSlot::Rocket).shapes()[2];
        assert!(particles.is_blended());
        assert_eq!(particles.instances().len(), 2000);
    }

    #[test]
    fn default_scene_matches_the_full_size_layout() {
        let game = Game::new(GameConfig::default(), 1280.0, 720.0);
        assert_eq!(game.cube_count(), 40_000);
        assert_eq!(game.rocket_position(), Vec3::new(-60.0, 3.0, 0.0));
        assert!(
            game.object(ObjectSlot::Terrain)
                .position()
                .abs_diff_eq(Vec3::new(-75.0, -30.0, -15.0), 1e-4)
        );
        let sun = game.light(LightSlot::Sun).unwrap();
        assert!(sun.position().abs_diff_eq(Vec3::new(0.0, 85.0, 0.0), 1e-4));
    }

    #[test]
    fn collision_triggers_exactly_one_explosion() {
        let mut game = small_game();
        let mut input = Input::new();
        // nose at (0, -1.5, 0): the cubes at y = -1 and y = -2 are both in range
        place_rocket(&mut game, Vec3::new(0.0, -4.5, 0.0));
        let impact = game.cone_position();
        assert!(impact.abs_diff_eq(Vec3::new(0.0, -1.5, 0.0), 1e-5));

        let world = game.object(ObjectSlot::Terrain).transform().matrix();
        let in_blast = game
            .terrain_instances()
            .iter()
            .filter(|c| c.world_position(world).distance(impact) < 5.0)
            .count();
        assert!(in_blast > 0);

        frame(&mut game, &mut input, 0.01);

        assert_eq!(game.objects().len(), ObjectSlot::COUNT + 1);
        assert_eq!(game.lights().len(), 4);
        assert_eq!(game.terrain_instances().len(), 200 - in_blast);
        assert!(!game.is_launched());
        assert_eq!(game.rocket_position(), Vec3::new(-4.0, 3.0, 0.0));

        let light = game.light(LightSlot::Explosion).unwrap();
        assert!(light.position().abs_diff_eq(impact, 1e-5));
        let batch = game.objects()[ObjectSlot::COUNT].position();
        assert!(batch.abs_diff_eq(impact - Vec3::new(0.0, 3.0, 0.0), 1e-5));
    }

    #[test]
    fn no_collision_outside_threshold() {
        let mut game = small_game();
        let mut input = Input::new();
        // nose exactly one threshold (0.5 + 0.5) above the top cube
        place_rocket(&mut game, Vec3::new(0.0, -3.0, 0.0));
        assert!(game.cone_position().abs_diff_eq(Vec3::ZERO, 1e-5));
        frame(&mut game, &mut input, 0.01);
        assert_eq!(game.objects().len(), ObjectSlot::COUNT);
        assert_eq!(game.cube_count(), 200);
    }

    #[test]
    fn explosion_removal_is_strictly_inside_the_radius() {
        let mut game = small_game();
        let on_boundary = [
            Instance::new(0.0, 1.0, 5.0), // world (-5, -1, 0), distance 5
            Instance::new(1.0, 1.0, 8.0), // world (-4, -1, 3), distance 5
        ];
        let inside = Instance::new(1.0, 1.0, 5.0); // world (-4, -1, 0), distance 4

        game.explode(Vec3::new(0.0, -1.0, 0.0));

        let left = game.terrain_instances();
        for cube in on_boundary {
            assert!(left.contains(&cube), "{cube:?} should survive");
        }
        assert!(!left.contains(&inside));
        let world = game.object(ObjectSlot::Terrain).transform().matrix();
        let centre = Vec3::new(0.0, -1.0, 0.0);
        for cube in left {
            assert!(cube.world_position(world).distance(centre) >= 5.0);
        }
    }

    #[test]
    fn second_explosion_replaces_the_particle_batch() {
        let mut game = small_game();
        game.explode(Vec3::new(0.0, -1.0, 0.0));
        game.particle_timer = 3.0;
        game.explode(Vec3::new(2.0, -1.0, 2.0));
        assert_eq!(game.objects().len(), ObjectSlot::COUNT + 1);
        assert_eq!(game.lights().len(), 4);
        assert_eq!(game.particle_timer(), 10.0);
        let light = game.light(LightSlot::Explosion).unwrap();
        assert_eq!(light.position(), Vec3::new(2.0, -1.0, 2.0));
    }

    #[test]
    fn particles_expire_once_the_timer_goes_negative() {
        let mut game = small_game();
        let mut input = Input::new();
        game.explode(Vec3::new(0.0, -1.0, 0.0));

        // time scale 5: 10 -> 4.5 -> -1
        frame(&mut game, &mut input, 1.1);
        assert_eq!(game.objects().len(), ObjectSlot::COUNT + 1);
        frame(&mut game, &mut input, 1.1);
        assert!(game.particle_timer() < 0.0);
        assert_eq!(game.objects().len(), ObjectSlot::COUNT);

        // the permanent objects are never popped
        frame(&mut game, &mut input, 1.1);
        assert_eq!(game.objects().len(), ObjectSlot::COUNT);
    }

    #[test]
    fn launch_climbs_along_up_and_bends_over() {
        let mut game = small_game();
        let mut input = Input::new();
        input.press(KeyCode::F11);
        frame(&mut game, &mut input, 0.0);
        assert!(game.is_launched());

        input.release(KeyCode::F11);
        frame(&mut game, &mut input, 0.1);
        assert!(game.rocket_position().y > 3.0);
        // 2.5 degrees per scaled second at time scale 5
        let expected = (-2.5_f32).to_radians() * 0.5;
        assert!((game.rocket_pitch() - expected).abs() < 1e-6);
    }

    #[test]
    fn launch_turn_rate_drops_past_the_fast_regime() {
        let mut game = small_game();
        game.launched = true;
        game.rocket_pitch = -(PI * 0.85);
        game.advance_launch(0.2);
        let slow = (-1.0_f32).to_radians();
        assert!((game.rocket_pitch() + PI * 0.85 - slow).abs() < 1e-5);

        game.rocket_pitch = -PI - 0.01;
        game.advance_launch(0.2);
        assert_eq!(game.rocket_pitch(), -PI - 0.01);
    }

    #[test]
    fn engine_light_trails_the_rocket() {
        let mut game = small_game();
        let mut input = Input::new();
        frame(&mut game, &mut input, 0.01);
        let engine = game.light(LightSlot::Engine).unwrap().position();
        assert!(engine.abs_diff_eq(Vec3::new(-4.0, -2.0, 0.0), 1e-5));
    }

    #[test]
    fn reset_restores_the_start_pose_and_terrain() {
        let mut game = small_game();
        let mut input = Input::new();
        game.explode(Vec3::new(0.0, -1.0, 0.0));
        assert!(game.terrain_instances().len() < 200);

        input.press(KeyCode::F11);
        input.press(KeyCode::KeyT);
        for _ in 0..5 {
            frame(&mut game, &mut input, 0.05);
        }
        input.release(KeyCode::F11);
        input.release(KeyCode::KeyT);
        assert!(game.rocket_position() != Vec3::new(-4.0, 3.0, 0.0));
        game.select_camera(CameraSlot::Wide);

        input.press(KeyCode::KeyR);
        frame(&mut game, &mut input, 0.05);

        let rocket = game.object(ObjectSlot::Rocket).transform();
        assert_eq!(rocket.translation(), Vec3::new(-4.0, 3.0, 0.0));
        assert!(rocket.rotation().abs_diff_eq(glam::Quat::IDENTITY, 1e-6));
        assert_eq!(rocket.scale(), Vec3::ONE);
        assert!(!game.is_launched());
        assert_eq!(game.rocket_pitch(), 0.0);
        assert_eq!(game.terrain_instances().len(), 200);
        assert_eq!(game.lights().len(), 3);
        assert_eq!(game.active_camera_slot(), CameraSlot::Launcher);
        assert_eq!(game.time_scale(), 5.0);
    }

    #[test]
    fn first_function_key_selects_the_camera() {
        let mut game = small_game();
        let mut input = Input::new();
        input.press(KeyCode::F5);
        input.press(KeyCode::F3);
        frame(&mut game, &mut input, 0.01);
        assert_eq!(game.active_camera_slot(), CameraSlot::Wide);
        assert_eq!(game.active_camera().name(), "WideCam");
    }

    #[test]
    fn fixed_cameras_ignore_movement_keys() {
        let mut game = small_game();
        let mut input = Input::new();
        game.select_camera(CameraSlot::Wide);
        let eye = game.active_camera().eye();
        input.press(KeyCode::ArrowUp);
        input.press(KeyCode::ControlLeft);
        frame(&mut game, &mut input, 0.1);
        assert_eq!(game.active_camera().eye(), eye);
    }

    #[test]
    fn ctrl_arrows_pan_the_free_camera() {
        let mut game = small_game();
        let mut input = Input::new();
        let eye = game.active_camera().eye();
        input.press(KeyCode::ControlRight);
        input.press(KeyCode::ArrowUp);
        frame(&mut game, &mut input, 0.5);
        // camera speed 8 for half a second along +Z
        let moved = game.active_camera().eye();
        assert!(moved.abs_diff_eq(eye + Vec3::new(0.0, 0.0, 4.0), 1e-5));
    }

    #[test]
    fn plain_arrows_turn_the_free_camera() {
        let mut game = small_game();
        let mut input = Input::new();
        input.press(KeyCode::ArrowRight);
        frame(&mut game, &mut input, 0.1);
        let forward = game.active_camera().forward();
        assert!(forward.x > 0.0);
        assert_eq!(game.active_camera().eye(), Vec3::new(-4.0, 0.0, -5.0));
    }

    #[test]
    fn rocket_cameras_follow_the_rocket() {
        let mut game = small_game();
        let mut input = Input::new();
        input.press(KeyCode::F5);
        frame(&mut game, &mut input, 0.01);
        assert_eq!(game.active_camera().eye(), Vec3::new(-4.0, 3.0, -2.0));
        assert_eq!(game.active_camera().target(), Vec3::new(-4.0, 3.0, 0.0));

        input.release(KeyCode::F5);
        input.press(KeyCode::F4);
        frame(&mut game, &mut input, 0.01);
        let eye = game.active_camera().eye();
        assert!(eye.abs_diff_eq(Vec3::new(-3.0, 6.0, -1.0), 1e-5));
    }

    #[test]
    fn time_scale_keys_apply_every_held_frame() {
        let mut game = small_game();
        let mut input = Input::new();
        input.press(KeyCode::KeyT);
        frame(&mut game, &mut input, 0.01);
        frame(&mut game, &mut input, 0.01);
        assert!((game.time_scale() - 4.8).abs() < 1e-5);

        input.press(KeyCode::ShiftLeft);
        frame(&mut game, &mut input, 0.01);
        assert!((game.time_scale() - 4.9).abs() < 1e-5);
    }

    #[test]
    fn time_scale_may_go_negative() {
        let mut game = small_game();
        let mut input = Input::new();
        input.press(KeyCode::KeyT);
        for _ in 0..60 {
            frame(&mut game, &mut input, 0.01);
        }
        assert!(game.time_scale() < 0.0);
    }

    #[test]
    fn pitch_input_tilts_rocket_and_pole_before_launch_only() {
        let mut game = small_game();
        let mut input = Input::new();
        input.press(KeyCode::ShiftLeft);
        input.press(KeyCode::Comma);
        frame(&mut game, &mut input, 0.1);

        let expected = 5.0_f32.to_radians() * 8.0 * 0.1;
        assert!((game.rocket_pitch() - expected).abs() < 1e-6);
        let pole = game
            .object(ObjectSlot::Launcher)
            .shape(game.shapes.launcher_pole);
        let pole_rotation = pole.transform().rotation();
        let rocket = game.object(ObjectSlot::Rocket).transform();
        assert!(pole_rotation.abs_diff_eq(rocket.rotation(), 1e-6));

        game.launched = true;
        let before = game.rocket_pitch();
        game.handle_input(0.1, &input);
        assert_eq!(game.rocket_pitch(), before);
    }

    #[test]
    fn overlay_toggle_is_edge_triggered() {
        let mut game = small_game();
        let mut input = Input::new();
        assert!(game.overlay_visible());
        input.press(KeyCode::KeyS);
        frame(&mut game, &mut input, 0.01);
        assert!(!game.overlay_visible());
        // still held
        frame(&mut game, &mut input, 0.01);
        assert!(!game.overlay_visible());
    }

    #[test]
    fn escape_requests_exit() {
        let mut game = small_game();
        let mut input = Input::new();
        frame(&mut game, &mut input, 0.01);
        assert!(!game.exit_requested());
        input.press(KeyCode::Escape);
        frame(&mut game, &mut input, 0.01);
        assert!(game.exit_requested());
    }

    #[test]
    fn day_night_orbits_sun_and_moon() {
        let mut game = small_game();
        let mut input = Input::new();
        frame(&mut game, &mut input, 1.0);
        for slot in [LightSlot::Sun, LightSlot::Moon] {
            let light = game.light(slot).unwrap();
            assert!((light.orbit_angles().z + 0.25).abs() < 1e-6);
        }
        let engine = game.light(LightSlot::Engine).unwrap();
        assert_eq!(engine.orbit_angles(), Vec3::ZERO);
    }

    #[test]
    fn frame_rate_averages_fifty_samples() {
        let mut game = small_game();
        let mut input = Input::new();
        frame(&mut game, &mut input, 0.02);
        // one sample among 49 zeros
        assert!((game.frame_rate() - 2500.0).abs() < 1.0);
        for _ in 0..49 {
            frame(&mut game, &mut input, 0.02);
        }
        assert!((game.frame_rate() - 50.0).abs() < 0.01);
        assert!((game.scaled_time() - game.time() * 5.0).abs() < 1e-5);
    }

    #[test]
    fn setters_reach_the_scene() {
        let mut game = small_game();
        game.set_rocket_speed(2.5);
        game.set_time_scale(1.0);
        game.set_light_colour(LightSlot::Moon, rgb(1.0, 1.0, 1.0));
        game.set_light_colour(LightSlot::Explosion, rgb(1.0, 0.0, 0.0));
        assert_eq!(game.rocket_speed(), 2.5);
        assert_eq!(game.time_scale(), 1.0);
        assert_eq!(game.light(LightSlot::Moon).unwrap().colour(), Vec4::ONE);
        assert!(game.light(LightSlot::Explosion).is_none());
    }

    #[test]
    fn snapshot_exposes_the_active_camera() {
        let mut game = small_game();
        game.select_camera(CameraSlot::Terrain);
        let snapshot = game.snapshot();
        assert_eq!(snapshot.camera.name(), "TerrainCam");
        assert_eq!(snapshot.objects.len(), 4);
        assert_eq!(snapshot.lights.len(), 3);
    }
}
