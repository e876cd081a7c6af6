use anyhow::{anyhow, Result};
use color_economy::geometry::point_in_polygon;
use color_economy::{
    Hsl, PatchView, Point, PopulationStats, SharedSimulation, SimConfig, Simulation,
    WorldSnapshot,
};
use ggez::{
    event,
    graphics::{self, Color, DrawMode, DrawParam, Mesh, Rect},
    input::keyboard::{KeyCode, KeyInput},
    input::mouse::MouseButton,
    Context, GameResult,
};
use rand::Rng;
use tracing::{info, warn};

//////////////////////////////////////////////////////////////////////////////
// Rendering Helpers
//////////////////////////////////////////////////////////////////////////////

#[inline]
fn to_color(hsl: Hsl, alpha: f32) -> Color {
    let (r, g, b) = hsl.to_rgb();
    Color::new(r, g, b, alpha)
}

fn patch_under(patches: &[PatchView], position: Point) -> Option<&PatchView> {
    patches
        .iter()
        .find(|p| point_in_polygon(position, &p.vertices))
}

//////////////////////////////////////////////////////////////////////////////
// Game State Implementation
//////////////////////////////////////////////////////////////////////////////

/// Drives the simulation from the frame loop and renders its snapshots.
struct GameState {
    sim: SharedSimulation,
    paused: bool,
}

impl GameState {
    fn new(sim: Simulation) -> Self {
        GameState {
            sim: sim.into_shared(),
            paused: false,
        }
    }

    fn draw_patches(&self, ctx: &mut Context, canvas: &mut graphics::Canvas, snapshot: &WorldSnapshot) {
        for patch in &snapshot.patches {
            if patch.vertices.len() < 3 {
                continue;
            }
            let points: Vec<[f32; 2]> = patch.vertices.iter().map(|v| [v.x, v.y]).collect();
            match Mesh::new_polygon(ctx, DrawMode::fill(), &points, to_color(patch.color, 1.0)) {
                Ok(mesh) => canvas.draw(&mesh, DrawParam::default()),
                Err(err) => warn!(%err, "skipping patch mesh"),
            }
        }
    }

    fn draw_creatures(
        &self,
        ctx: &mut Context,
        canvas: &mut graphics::Canvas,
        snapshot: &WorldSnapshot,
        config: &SimConfig,
    ) -> GameResult {
        let mut rng = rand::thread_rng();
        let wiggle = config.wiggle_radius;

        for creature in &snapshot.creatures {
            // Tint by the ground underfoot, fade as energy runs low.
            let tinted = match patch_under(&snapshot.patches, creature.position) {
                Some(patch) => creature.color.blend(&patch.color, 0.5),
                None => creature.color,
            };
            let sickness = if config.base_energy > 0.0 {
                1.0 - creature.energy / config.base_energy
            } else {
                0.0
            };
            let fill = to_color(tinted.sickened(sickness), 1.0);

            let (outline, width) = if creature.colliding {
                (Color::RED, 3.0)
            } else if creature.recently_cloned {
                (Color::YELLOW, 3.0)
            } else {
                (Color::BLACK, 1.0)
            };

            if creature.shape.len() < 3 {
                let body = Mesh::new_circle(
                    ctx,
                    DrawMode::fill(),
                    [creature.position.x, creature.position.y],
                    config.creature_radius * 0.5,
                    0.1,
                    fill,
                )?;
                canvas.draw(&body, DrawParam::default());
                continue;
            }

            let points: Vec<[f32; 2]> = creature
                .shape
                .iter()
                .map(|p| {
                    let jx = if wiggle > 0.0 { rng.gen_range(-wiggle..wiggle) } else { 0.0 };
                    let jy = if wiggle > 0.0 { rng.gen_range(-wiggle..wiggle) } else { 0.0 };
                    [creature.position.x + p.x + jx, creature.position.y + p.y + jy]
                })
                .collect();

            if let Ok(body) = Mesh::new_polygon(ctx, DrawMode::fill(), &points, fill) {
                canvas.draw(&body, DrawParam::default());
            }
            if let Ok(edge) = Mesh::new_polygon(ctx, DrawMode::stroke(width), &points, outline) {
                canvas.draw(&edge, DrawParam::default());
            }
        }
        Ok(())
    }

    fn draw_stats(
        &self,
        ctx: &mut Context,
        canvas: &mut graphics::Canvas,
        stats: &PopulationStats,
        config: &SimConfig,
    ) -> GameResult {
        let panel = Rect::new(5.0, 5.0, 260.0, 190.0);
        let bg = Mesh::new_rectangle(ctx, DrawMode::fill(), panel, Color::new(0.1, 0.1, 0.2, 0.8))?;
        canvas.draw(&bg, DrawParam::default());
        let border = Mesh::new_rectangle(ctx, DrawMode::stroke(2.0), panel, Color::new(0.3, 0.3, 0.4, 1.0))?;
        canvas.draw(&border, DrawParam::default());

        let lines = [
            (format!("Total Population: {}", stats.total), Color::WHITE),
            (format!("Predators: {}", stats.predators), Color::new(1.0, 0.4, 0.4, 1.0)),
            (format!("Prey: {}", stats.herbivores), Color::new(0.4, 1.0, 0.4, 1.0)),
            (
                format!(
                    "Avg Creature Energy: {:.1}/{}",
                    stats.mean_energy_fraction * config.max_energy_threshold,
                    config.max_energy_threshold
                ),
                Color::WHITE,
            ),
            (
                format!("Avg Plant Energy: {:.1}/100", stats.mean_resource_fraction * 100.0),
                Color::WHITE,
            ),
            (
                format!("Biodiversity (distinct types): {}", stats.distinct_vertex_counts),
                Color::WHITE,
            ),
            (format!("Vertex Variation: {:.1}", stats.vertex_std_dev), Color::WHITE),
        ];
        for (i, (line, color)) in lines.into_iter().enumerate() {
            let text = graphics::Text::new(line);
            canvas.draw(
                &text,
                DrawParam::default()
                    .dest([15.0, 15.0 + i as f32 * 24.0])
                    .color(color),
            );
        }
        if self.paused {
            let text = graphics::Text::new("PAUSED  [space] resume  [r] reset");
            canvas.draw(&text, DrawParam::default().dest([15.0, 15.0 + 7.0 * 24.0]));
        }
        Ok(())
    }
}

impl event::EventHandler<ggez::GameError> for GameState {
    fn update(&mut self, _ctx: &mut Context) -> GameResult {
        if !self.paused {
            self.sim.lock().tick();
        }
        Ok(())
    }

    fn draw(&mut self, ctx: &mut Context) -> GameResult {
        // Copy out under the lock so rendering never sees a half-finished tick.
        let (snapshot, stats, config) = {
            let sim = self.sim.lock();
            (sim.snapshot(), sim.stats(), sim.config().clone())
        };

        let mut canvas = graphics::Canvas::from_frame(ctx, Color::from_rgb(10, 10, 20));
        self.draw_patches(ctx, &mut canvas, &snapshot);
        self.draw_creatures(ctx, &mut canvas, &snapshot, &config)?;
        self.draw_stats(ctx, &mut canvas, &stats, &config)?;
        canvas.finish(ctx)?;
        Ok(())
    }

    fn mouse_button_down_event(
        &mut self,
        _ctx: &mut Context,
        button: MouseButton,
        x: f32,
        y: f32,
    ) -> GameResult {
        if button == MouseButton::Left {
            let replaced = self.sim.lock().replace_near(Point::new(x, y));
            info!(x, y, replaced, "click replacement");
        }
        Ok(())
    }

    fn key_down_event(&mut self, _ctx: &mut Context, input: KeyInput, _repeated: bool) -> GameResult {
        match input.keycode {
            Some(KeyCode::Space) => self.paused = !self.paused,
            Some(KeyCode::R) => self.sim.lock().reset(),
            _ => {}
        }
        Ok(())
    }
}

//////////////////////////////////////////////////////////////////////////////
// Main Function
//////////////////////////////////////////////////////////////////////////////

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// First CLI argument, if any, names a JSON configuration file.
fn load_config() -> Result<SimConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            info!(%path, "loading configuration");
            Ok(SimConfig::load(&path)?)
        }
        None => Ok(SimConfig::default()),
    }
}

fn main() -> Result<()> {
    init_tracing();
    let config = load_config()?;
    let (width, height) = (config.world_width, config.world_height);
    let sim = Simulation::new(config)?;

    let cb = ggez::ContextBuilder::new("color_economy", "color_economy")
        .window_setup(ggez::conf::WindowSetup::default().title("Color Economy"))
        .window_mode(ggez::conf::WindowMode::default().dimensions(width, height));

    let (ctx, event_loop) = cb.build().map_err(|e| anyhow!("failed to open window: {e}"))?;
    let state = GameState::new(sim);
    event::run(ctx, event_loop, state)
}
