//! Commands every game gets

use super::{CommandHandler, CommandRegistry};
use crate::context::EngineContext;
use crate::foundation::math::{Colour4, Vec2};

/// Register the engine's own commands
pub fn register_builtin_commands(registry: &mut CommandRegistry<EngineContext>) {
    let builtins: [(&str, &[&str], &str, CommandHandler<EngineContext>); 9] = [
        ("help", &["", "<command>"], "List commands or describe one", help),
        ("console.clear", &[""], "Clear the console log", clear),
        ("engine.quit", &[""], "Close the game window", quit),
        ("renderer.setVSync", &["", "<true|false>"], "Toggle or set vertical sync", set_vsync),
        (
            "renderer.setBackgroundColour",
            &["<r> <g> <b>"],
            "Set the clear colour from 0-255 channels",
            set_background_colour,
        ),
        ("renderer.stats", &[""], "Show last frame's render statistics", stats),
        ("objects.list", &[""], "List live objects", list_objects),
        ("objects.find", &["<name>"], "Find an object by name", find_object),
        ("physics.setGravity", &["<x> <y>"], "Set world gravity", set_gravity),
    ];

    for (call, signatures, description, handler) in builtins {
        // Failures are logged by the registry
        let _ = registry.register(call, signatures, description, handler);
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "1" => Some(true),
        "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn parse_args<T: std::str::FromStr>(args: &[String], count: usize, usage: &str) -> Option<Vec<T>> {
    let values: Option<Vec<T>> = args.iter().skip(1).take(count).map(|arg| arg.parse().ok()).collect();
    match values {
        Some(values) if values.len() == count => Some(values),
        _ => {
            log::error!("Usage: {}", usage);
            None
        }
    }
}

fn help(ctx: &mut EngineContext, args: &[String]) {
    let summaries = ctx.console.command_summaries();
    if let Some(name) = args.get(1) {
        match summaries.iter().find(|summary| &summary.call == name) {
            Some(summary) => log::info!("{} - {}", summary.usage(), summary.description),
            None => log::error!("No command named '{}'", name),
        }
        return;
    }

    log::info!("{} commands:", summaries.len());
    for summary in summaries {
        log::info!("  {} - {}", summary.usage(), summary.description);
    }
}

fn clear(ctx: &mut EngineContext, _args: &[String]) {
    ctx.console.clear();
}

fn quit(ctx: &mut EngineContext, _args: &[String]) {
    log::info!("Quit requested from console");
    ctx.quit();
}

fn set_vsync(ctx: &mut EngineContext, args: &[String]) {
    let enabled = match args.get(1) {
        None => !ctx.renderer.vsync(),
        Some(value) => match parse_bool(value) {
            Some(enabled) => enabled,
            None => {
                log::error!("Expected true or false, got '{}'", value);
                return;
            }
        },
    };
    ctx.renderer.set_vsync(enabled);
    log::info!("VSync {}", if enabled { "enabled" } else { "disabled" });
}

fn set_background_colour(ctx: &mut EngineContext, args: &[String]) {
    let Some(channels) = parse_args::<u8>(args, 3, "renderer.setBackgroundColour <r> <g> <b>") else {
        return;
    };
    let colour = Colour4::rgb(channels[0], channels[1], channels[2]);
    ctx.renderer.set_background_colour(colour);
    log::info!("Background colour set to {:?}", colour);
}

fn stats(ctx: &mut EngineContext, _args: &[String]) {
    let stats = ctx.renderer.stats();
    log::info!(
        "{:.1} fps, {} updates, {} renders",
        ctx.time.fps,
        ctx.time.update_count,
        ctx.time.render_count
    );
    log::info!(
        "{} draw calls ({} world, {} gui), {} sprites, {} pooled buffers, {} cached strings",
        stats.draw_calls,
        stats.world_quads,
        stats.gui_quads,
        stats.live_sprites,
        stats.pooled_buffers,
        stats.cached_text
    );
}

fn list_objects(ctx: &mut EngineContext, _args: &[String]) {
    let objects = ctx.objects.get_all();
    log::info!("{} objects:", objects.len());
    for object in objects {
        let position = object.position();
        log::info!(
            "  {} [{}] at ({:.2}, {:.2}), {} components",
            object.name(),
            object.hash(),
            position.x,
            position.y,
            object.component_count()
        );
    }
}

fn find_object(ctx: &mut EngineContext, args: &[String]) {
    if args.len() < 2 {
        log::error!("Usage: objects.find <name>");
        return;
    }
    let name = args[1..].join(" ");
    match ctx.objects.find_by_name(&name) {
        Some(object) => {
            let position = object.position();
            log::info!(
                "{} [{}] at ({:.2}, {:.2}) rotation {:.1}",
                object.name(),
                object.hash(),
                position.x,
                position.y,
                object.rotation()
            );
        }
        None => log::warn!("No object named '{}'", name),
    }
}

fn set_gravity(ctx: &mut EngineContext, args: &[String]) {
    let Some(values) = parse_args::<f32>(args, 2, "physics.setGravity <x> <y>") else {
        return;
    };
    let gravity = Vec2::new(values[0], values[1]);
    ctx.physics.set_gravity(gravity);
    log::info!("Gravity set to ({}, {})", gravity.x, gravity.y);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_forms() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_parse_args_requires_count() {
        let args: Vec<String> = ["cmd", "1", "2"].iter().map(ToString::to_string).collect();
        assert_eq!(parse_args::<u8>(&args, 2, "cmd"), Some(vec![1, 2]));
        assert_eq!(parse_args::<u8>(&args, 3, "cmd"), None);

        let bad: Vec<String> = ["cmd", "1", "x"].iter().map(ToString::to_string).collect();
        assert_eq!(parse_args::<u8>(&bad, 2, "cmd"), None);
    }
}
