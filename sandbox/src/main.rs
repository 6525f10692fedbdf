//! Sandbox demo
//!
//! Drifting rocks, a GUI toggle that pauses spawning and a `sandbox.spawn`
//! console command. Runs headless for a fixed number of frames:
//!
//! ```text
//! sandbox [frames] [config.toml]
//! ```

use rand::Rng;
use tack_engine::prelude::*;

const SPAWN_INTERVAL: u64 = 30;

fn spawn_rock(ctx: &mut EngineContext, position: Vec2) {
    let mut rng = rand::thread_rng();
    let velocity = Vec2::new(rng.gen_range(-60.0..60.0), rng.gen_range(-60.0..60.0));
    let size = rng.gen_range(12.0..40.0);

    let body = match PhysicsBody::new(size / 10.0, 1.0, 0.1) {
        Ok(body) => body.with_velocity(velocity),
        Err(err) => {
            log::error!("Rock rejected: {}", err);
            return;
        }
    };

    let rock = ctx.objects.create("rock", position, Vec2::new(size, size));
    ctx.objects.attach_component(&rock, QuadRenderer::colour(Colour4::rgb(150, 140, 130)));
    ctx.objects.attach_component(&rock, body);
}

fn spawn_command(ctx: &mut EngineContext, args: &[String]) {
    let count = args.get(1).and_then(|arg| arg.parse::<usize>().ok()).unwrap_or(1);
    for _ in 0..count {
        spawn_rock(ctx, Vec2::zeros());
    }
    log::info!("Spawned {} rocks", count);
}

struct Sandbox {
    spawning: Option<GuiId>,
    frames: u64,
}

impl Sandbox {
    fn new() -> Self {
        Self { spawning: None, frames: 0 }
    }

    fn spawning_enabled(&self, ctx: &EngineContext) -> bool {
        self.spawning
            .and_then(|id| ctx.gui.get::<GuiToggle>(id))
            .is_some_and(GuiToggle::is_selected)
    }
}

impl TackGame for Sandbox {
    fn register_commands(&mut self, registry: &mut CommandRegistry<EngineContext>) {
        if let Err(err) = registry.register("sandbox.spawn", &["", "<count>"], "Spawn drifting rocks", spawn_command) {
            log::error!("Failed to register sandbox commands: {}", err);
        }
    }

    fn on_start(&mut self, ctx: &mut EngineContext) -> Result<(), GameError> {
        let screen = ctx.renderer.screen_size();
        let camera = ctx.objects.create("camera", Vec2::zeros(), Vec2::new(1.0, 1.0));
        ctx.objects.attach_component(&camera, Camera::new(screen));

        let toggle = GuiToggle::new(UiRect::new(10.0, 10.0, 140.0, 28.0), "Spawning").with_selected(true);
        self.spawning = Some(ctx.gui.add(toggle));
        ctx.gui.add(GuiBox::new(UiRect::new(10.0, 46.0, 140.0, 28.0)).with_text("` for console"));

        for _ in 0..4 {
            spawn_rock(ctx, Vec2::zeros());
        }
        log::info!("Sandbox started with {} objects", ctx.objects.get_all().len());
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut EngineContext) -> Result<(), GameError> {
        self.frames += 1;
        for event in ctx.gui.drain_events() {
            if let GuiEvent::Toggled { selected, .. } = event {
                log::info!("Spawning {}", if selected { "resumed" } else { "paused" });
            }
        }

        if self.frames % SPAWN_INTERVAL == 0 && self.spawning_enabled(ctx) {
            spawn_rock(ctx, Vec2::zeros());
        }

        // Rocks leaving the screen are removed
        let screen = ctx.renderer.screen_size();
        for object in ctx.objects.get_all() {
            let position = object.position();
            if object.name() == "rock"
                && (position.x.abs() > screen.half_width() + 50.0 || position.y.abs() > screen.half_height() + 50.0)
            {
                ctx.objects.remove(&object);
            }
        }
        Ok(())
    }

    fn on_close(&mut self, ctx: &mut EngineContext) -> Result<(), GameError> {
        log::info!(
            "Sandbox closing after {} updates, {} objects alive",
            self.frames,
            ctx.objects.get_all().len()
        );
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let frames = args.next().and_then(|arg| arg.parse().ok()).unwrap_or(600);
    let config = match args.next() {
        Some(path) => EngineConfig::load_from_file(path)?,
        None => EngineConfig::new("Tack Sandbox", 800, 600),
    };

    let mut window = GameWindow::headless(config, Sandbox::new(), Some(frames))?;
    window.run()?;
    Ok(())
}
