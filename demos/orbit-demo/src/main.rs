use glam::Vec2;
use log::{error, info};

use sprig_engine::renderer::shapes;
use sprig_engine::{
    Color, DrawCommand, FunctionRegistry, InputEvent, InputQueue, InputState, MouseButton, Node,
    NodeContext, NodeId, OnDone, RecordingBackend, Scene, UpdateHook,
};

const FRAME_DT: f32 = 1.0 / 60.0;
const FRAMES: u32 = 240;

const KEY_S: u32 = 83;
const KEY_D: u32 = 68;

fn spin(ctx: &mut NodeContext<'_>, dt: f32) {
    if let Some(node) = ctx.node_mut() {
        node.rotate(90.0 * dt);
    }
}

/// Hold D to drift right; press S to grow, then snap back to the corner.
fn player(ctx: &mut NodeContext<'_>, dt: f32) {
    let id = ctx.id();
    let grow = ctx.input.is_key_pressed(KEY_S);
    let drift = ctx.input.is_key_down(KEY_D);

    if drift {
        if let Some(node) = ctx.node_mut() {
            node.translate(Vec2::new(120.0 * dt, 0.0));
        }
    }
    if grow {
        let snap_back: OnDone = Box::new(|scene: &mut Scene, id: NodeId| {
            info!("{} finished growing, snapping to corner", id);
            for path in ["pos.x", "pos.y"] {
                if let Err(e) = scene.schedule_tween(id, path, 0.0, -1.0, None) {
                    error!("snap tween failed: {e}");
                }
            }
        });
        if let Err(e) = ctx.scene.schedule_tween(id, "size.x", 300.0, 2.0, Some(snap_back)) {
            error!("grow tween failed: {e}");
        }
    }
}

/// Turn toward the pointer while the left button is held.
fn tracker(ctx: &mut NodeContext<'_>, dt: f32) {
    if !ctx.input.is_mouse_button_down(MouseButton::Left) {
        return;
    }
    let target = ctx.input.mouse_position();
    if let Some(node) = ctx.node_mut() {
        node.look_at(target, 180.0 * dt);
        node.to = target;
    }
}

fn registry() -> FunctionRegistry {
    let mut reg = FunctionRegistry::with_builtins();
    reg.register_update("spin", spin);
    reg.register_update("player", player);
    reg.register_update("tracker", tracker);
    reg
}

fn build(scene: &mut Scene) -> sprig_engine::Result<()> {
    let sun = scene.spawn(
        Node::new()
            .with_name("sun")
            .with_pos(Vec2::new(300.0, 300.0))
            .with_size(Vec2::splat(80.0))
            .with_color(Color::rgb(250, 200, 0))
            .with_draw(shapes::circle())
            .with_update(UpdateHook::new("spin", spin)),
    );
    let planet = scene.spawn(
        Node::new()
            .with_name("planet")
            .with_pos(Vec2::new(150.0, 0.0))
            .with_size(Vec2::splat(30.0))
            .with_color(Color::BLUE)
            .with_draw(shapes::circle())
            .with_update(UpdateHook::new("spin", spin)),
    );
    let moon = scene.spawn(
        Node::new()
            .with_name("moon")
            .with_pos(Vec2::new(40.0, 0.0))
            .with_size(Vec2::splat(10.0))
            .with_color(Color::rgb(200, 200, 200))
            .with_draw(shapes::circle()),
    );
    scene.add_node(sun)?;
    scene.add_child(sun, planet)?;
    scene.add_child(planet, moon)?;

    let hero = scene.spawn(
        Node::new()
            .with_name("hero")
            .with_tag("player")
            .with_pos(Vec2::new(300.0, 300.0))
            .with_size(Vec2::splat(100.0))
            .with_color(Color::RED)
            .with_order(1)
            .with_draw(shapes::rectangle())
            .with_update(UpdateHook::new("player", player)),
    );
    scene.add_node(hero)?;

    let pointer = scene.spawn(
        Node::new()
            .with_name("pointer")
            .with_pos(Vec2::new(50.0, 550.0))
            .with_line(Vec2::new(50.0, 550.0), 4.0)
            .with_color(Color::BLACK)
            .with_order(-1)
            .with_draw(shapes::line())
            .with_update(UpdateHook::new("tracker", tracker)),
    );
    scene.add_node(pointer)?;
    Ok(())
}

/// Scripted host input for frame `frame`.
fn script(frame: u32, queue: &mut InputQueue) {
    match frame {
        10 => queue.push(InputEvent::KeyDown { key_code: KEY_S }),
        11 => queue.push(InputEvent::KeyUp { key_code: KEY_S }),
        30 => queue.push(InputEvent::KeyDown { key_code: KEY_D }),
        90 => queue.push(InputEvent::KeyUp { key_code: KEY_D }),
        120 => queue.push(InputEvent::PointerDown { button: MouseButton::Left, x: 500.0, y: 100.0 }),
        180 => queue.push(InputEvent::PointerUp { button: MouseButton::Left, x: 500.0, y: 100.0 }),
        _ => {}
    }
}

fn summarize(commands: &[DrawCommand]) -> String {
    commands
        .iter()
        .map(|c| match c {
            DrawCommand::Rectangle { dest, .. } => format!("rect@({:.0},{:.0})", dest.x, dest.y),
            DrawCommand::Circle { center, .. } => format!("circle@({:.0},{:.0})", center.x, center.y),
            DrawCommand::Line { to, .. } => format!("line->({:.0},{:.0})", to.x, to.y),
            DrawCommand::Texture { dest, .. } => format!("tex@({:.0},{:.0})", dest.x, dest.y),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn run() -> sprig_engine::Result<()> {
    let mut scene = Scene::new();
    build(&mut scene)?;

    let mut queue = InputQueue::new();
    let mut input = InputState::new();
    let mut backend = RecordingBackend::new();

    for frame in 0..FRAMES {
        script(frame, &mut queue);
        input.begin_frame(queue.drain());

        scene.update_with_input(FRAME_DT, &input);
        backend.clear();
        scene.draw(&mut backend);

        if frame % 30 == 0 {
            info!("frame {frame:>3}: {} tweens | {}", scene.tween_count(), summarize(&backend.commands));
        }
    }

    let json = scene.save_json()?;
    let mut restored = Scene::new();
    let roots = restored.load_json(&json, &registry())?;
    info!("restored {} nodes under {} roots", restored.len(), roots.len());

    if let Some(hero) = restored.find_by_tag("player").and_then(|id| restored.get(id)) {
        info!("hero at {:?}, size {:?}", hero.position, hero.size);
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run() {
        error!("orbit demo failed: {e}");
        std::process::exit(1);
    }
}
