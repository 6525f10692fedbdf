use super::{engine_lock, headless_window, record, recorded_backend, test_config, EventLog};
use crate::audio::SilentAudioBackend;
use crate::foundation::math::{Colour4, Vec2};
use crate::objects::{Capabilities, ObjectState, TackComponent};
use crate::render::{TackRenderer, WorldQuad, OBJECT_SHADER};
use crate::{ComponentContext, EngineContext, EngineError, GameError, GameWindow, Phase, TackGame};
use approx::assert_relative_eq;

struct Tracer {
    log: EventLog,
}

impl TackComponent for Tracer {
    fn capabilities(&self) -> Capabilities {
        Capabilities::RENDER
    }

    fn on_start(&mut self, _state: &mut ObjectState, _ctx: &mut ComponentContext<'_>) {
        record(&self.log, "component.start");
    }

    fn on_update(&mut self, state: &mut ObjectState, _ctx: &mut ComponentContext<'_>) {
        record(&self.log, "component.update");
        state.position.x += 10.0;
    }

    fn on_render(&mut self, state: &ObjectState, renderer: &mut TackRenderer) {
        record(&self.log, "component.render");
        renderer.submit(WorldQuad {
            position: state.position,
            scale: state.scale,
            rotation: state.rotation,
            colour: Colour4::WHITE,
            sprite: crate::render::Sprite::INVALID,
            layer: 0,
        });
    }

    fn on_close(&mut self, _state: &mut ObjectState, _ctx: &mut ComponentContext<'_>) {
        record(&self.log, "component.close");
    }
}

struct TracingGame {
    log: EventLog,
    fail_update: bool,
}

impl TracingGame {
    fn new() -> Self {
        Self {
            log: EventLog::default(),
            fail_update: false,
        }
    }
}

impl TackGame for TracingGame {
    fn on_start(&mut self, ctx: &mut EngineContext) -> Result<(), GameError> {
        record(&self.log, "game.start");
        let object = ctx.objects.create("traced", Vec2::zeros(), Vec2::new(20.0, 20.0));
        ctx.objects.attach_component(&object, Tracer { log: self.log.clone() });
        Ok(())
    }

    fn on_update(&mut self, _ctx: &mut EngineContext) -> Result<(), GameError> {
        record(&self.log, "game.update");
        if self.fail_update {
            return Err(GameError::Logic("boom".to_string()));
        }
        Ok(())
    }

    fn on_gui_render(&mut self, _ctx: &mut EngineContext) -> Result<(), GameError> {
        record(&self.log, "game.gui_render");
        Ok(())
    }

    fn on_close(&mut self, _ctx: &mut EngineContext) -> Result<(), GameError> {
        record(&self.log, "game.close");
        Ok(())
    }
}

fn take(log: &EventLog) -> Vec<String> {
    std::mem::take(&mut *log.borrow_mut())
}

#[test]
fn test_phase_ordering() {
    let _lock = engine_lock();
    let mut window = GameWindow::headless(test_config(), TracingGame::new(), None).unwrap();
    let log = window.game().log.clone();
    assert_eq!(window.phase(), Phase::Created);

    window.load().unwrap();
    assert_eq!(take(&log), vec!["game.start", "component.start"]);
    assert!(window.context().physics.is_running());

    window.update_frame().unwrap();
    assert_eq!(take(&log), vec!["game.update", "component.update"]);

    window.render_frame().unwrap();
    assert_eq!(take(&log), vec!["component.render", "game.gui_render"]);

    window.unload().unwrap();
    assert_eq!(take(&log), vec!["game.close", "component.close"]);
    assert_eq!(window.phase(), Phase::Closed);
    assert!(!window.context().physics.is_running());

    // Second unload does nothing
    window.unload().unwrap();
    assert!(take(&log).is_empty());
}

#[test]
fn test_render_observes_same_frame_update() {
    let _lock = engine_lock();
    let mut window = GameWindow::headless(test_config(), TracingGame::new(), None).unwrap();
    window.load().unwrap();
    window.update_frame().unwrap();
    window.update_frame().unwrap();
    window.render_frame().unwrap();

    let object_program = window.context().renderer.get_shader(OBJECT_SHADER).handle();
    let draws = recorded_backend(&mut window).take_draws();
    let world: Vec<_> = draws.iter().filter(|draw| draw.program == object_program).collect();
    assert_eq!(world.len(), 1);

    // Two updates moved the object 20 units right; centre x in NDC is 20 / 400
    let centre_x: f32 = world[0].vertices.iter().map(|v| v.position[0]).sum::<f32>() / 4.0;
    assert_relative_eq!(centre_x, 0.05, epsilon = 1e-6);
}

#[test]
fn test_unload_releases_subsystems() {
    let _lock = engine_lock();
    let mut window = GameWindow::headless(test_config(), TracingGame::new(), None).unwrap();
    window.load().unwrap();
    window.render_frame().unwrap();
    window.unload().unwrap();

    assert_eq!(recorded_backend(&mut window).live_textures(), 0);
    assert_eq!(recorded_backend(&mut window).live_programs(), 0);
    let audio = window
        .context()
        .audio
        .backend()
        .as_any()
        .downcast_ref::<SilentAudioBackend>()
        .map(SilentAudioBackend::is_shut_down);
    assert_eq!(audio, Some(true));
}

#[test]
fn test_second_window_rejected_while_first_alive() {
    let _lock = engine_lock();
    let first = GameWindow::headless(test_config(), TracingGame::new(), None).unwrap();
    let second = GameWindow::headless(test_config(), TracingGame::new(), None);
    assert!(matches!(second, Err(EngineError::WindowAlreadyExists)));

    drop(first);
    assert!(GameWindow::headless(test_config(), TracingGame::new(), None).is_ok());
}

#[test]
fn test_run_stops_at_frame_limit() {
    let _lock = engine_lock();
    let mut window = GameWindow::headless(test_config(), TracingGame::new(), Some(3)).unwrap();
    window.run().unwrap();

    assert_eq!(headless_window(&mut window).swap_count(), 3);
    assert_eq!(window.context().time.render_count, 3);
    assert!(window.context().time.update_count >= 1);
    assert_eq!(window.phase(), Phase::Closed);

    let log = window.game().log.borrow().clone();
    assert_eq!(log.first().map(String::as_str), Some("game.start"));
    assert_eq!(log.last().map(String::as_str), Some("component.close"));
}

#[test]
fn test_game_error_stops_loop_and_still_unloads() {
    let _lock = engine_lock();
    let mut game = TracingGame::new();
    game.fail_update = true;
    let mut window = GameWindow::headless(test_config(), game, None).unwrap();

    let result = window.run();
    assert!(matches!(result, Err(EngineError::Game(GameError::Logic(_)))));
    assert_eq!(window.phase(), Phase::Closed);
    assert!(window.game().log.borrow().iter().any(|event| event == "game.close"));
}

#[test]
fn test_vsync_change_reaches_window() {
    let _lock = engine_lock();
    let mut window = GameWindow::headless(test_config(), TracingGame::new(), None).unwrap();
    window.load().unwrap();
    window.render_frame().unwrap();
    assert_eq!(headless_window(&mut window).vsync(), Some(false));

    window.context_mut().renderer.set_vsync(true);
    window.render_frame().unwrap();
    window.render_frame().unwrap();
    assert_eq!(headless_window(&mut window).vsync(), Some(true));
    assert_eq!(headless_window(&mut window).vsync_changes(), 2);
}

#[test]
fn test_close_request_and_resize_events() {
    let _lock = engine_lock();
    let mut window = GameWindow::headless(test_config(), TracingGame::new(), None).unwrap();
    headless_window(&mut window).queue_event(crate::input::PlatformEvent::Resized { width: 1024, height: 768 });
    window.pump_events();
    assert_relative_eq!(window.context().renderer.screen_size().width, 1024.0);
    assert!(!window.should_close());

    headless_window(&mut window).queue_event(crate::input::PlatformEvent::CloseRequested);
    window.pump_events();
    assert!(window.should_close());
}

#[test]
fn test_window_creation_starts_logging() {
    let _lock = engine_lock();
    let mut config = test_config();
    config.window.title = "logged_window_7c2".to_string();
    config.logging.level = "nonsense".to_string();

    let window = GameWindow::headless(config, TracingGame::new(), None).unwrap();
    assert_eq!(window.context().config.logging.level, "info");
    let sink = crate::foundation::logging::sink();
    assert!(sink.contains("Creating game window 'logged_window_7c2'"));
    assert!(sink.contains("log level 'nonsense' replaced with 'info'"));
}
