//! Neon Snake entry point
//!
//! Wires the browser to the core: canvas drawing, keyboard/touch input,
//! LocalStorage persistence and the requestAnimationFrame loop. All
//! gameplay decisions happen in `neon_snake::sim`.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_host {
    use std::cell::RefCell;
    use std::f64::consts::FRAC_PI_4;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, TouchEvent};

    use neon_snake::driver::{FrameHandle, FrameScheduler, LoopDriver};
    use neon_snake::sim::{
        Direction, GameConfig, GamePhase, GameSession, OrbKind, ParticleKind, RenderSnapshot,
    };
    use neon_snake::storage::KvStore;

    const DEFAULT_GRID_SIZE: u32 = 20;
    /// Minimum finger travel before a swipe registers as a turn
    const MIN_SWIPE_PX: f64 = 15.0;

    /// LocalStorage-backed store
    struct LocalStore;

    impl KvStore for LocalStore {
        fn get(&self, key: &str) -> Option<String> {
            let storage = web_sys::window()?.local_storage().ok()??;
            storage.get_item(key).ok()?
        }

        fn set(&mut self, key: &str, value: &str) {
            if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok()).flatten()
            {
                let _ = storage.set_item(key, value);
            }
        }
    }

    /// requestAnimationFrame-backed frame scheduler. The callback closure
    /// is installed once and shared across frames.
    struct RafScheduler {
        callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
    }

    impl FrameScheduler for RafScheduler {
        fn request_frame(&mut self) -> FrameHandle {
            let window = web_sys::window().expect("no window");
            let callback = self.callback.borrow();
            let closure = callback.as_ref().expect("frame callback installed");
            let id = window
                .request_animation_frame(closure.as_ref().unchecked_ref())
                .expect("requestAnimationFrame failed");
            FrameHandle(id)
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(handle.0);
            }
        }
    }

    struct Host {
        session: GameSession,
        ctx: CanvasRenderingContext2d,
        canvas_px: f64,
        driver: LoopDriver,
        scheduler: RafScheduler,
        touch_start: Option<(f64, f64)>,
    }

    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0)
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("failed to init logger");

        log::info!("Neon Snake starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let grid_size = canvas
            .get_attribute("data-grid-size")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_GRID_SIZE);

        let config = GameConfig::new(grid_size, canvas.width());
        // Snap the canvas to a whole number of cells
        let extent = config.grid.pixel_extent() as u32;
        canvas.set_width(extent);
        canvas.set_height(extent);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .expect("no 2d context")
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let seed = js_sys::Date::now() as u64;
        let mut session = GameSession::new(config, seed, Box::new(LocalStore));
        session.start(now_ms());

        log::info!("game initialized: grid {grid_size}x{grid_size}, seed {seed}");

        let host = Rc::new(RefCell::new(Host {
            session,
            ctx,
            canvas_px: f64::from(extent),
            driver: LoopDriver::new(),
            scheduler: RafScheduler {
                callback: Rc::new(RefCell::new(None)),
            },
            touch_start: None,
        }));

        install_frame_callback(&host);
        setup_keyboard(&host);
        setup_touch(&canvas, &host);
        setup_auto_pause(&host);

        let mut h = host.borrow_mut();
        let h = &mut *h;
        h.driver.start(&mut h.scheduler);

        log::info!("Neon Snake running!");
    }

    fn install_frame_callback(host: &Rc<RefCell<Host>>) {
        let callback_slot = host.borrow().scheduler.callback.clone();
        let host = host.clone();
        let closure = Closure::<dyn FnMut(f64)>::new(move |time: f64| {
            let mut h = host.borrow_mut();
            let h = &mut *h;
            // Keep the chain going first; a stop() mid-frame stays stopped
            h.driver.on_frame_fired(&mut h.scheduler);
            let snapshot = h.session.frame(time);
            draw(&h.ctx, h.canvas_px, &snapshot, time);
        });
        callback_slot.borrow_mut().replace(closure);
    }

    fn setup_keyboard(host: &Rc<RefCell<Host>>) {
        let window = web_sys::window().expect("no window");
        let host = host.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let mut h = host.borrow_mut();
            let now = now_ms();
            let direction = match event.key().as_str() {
                "ArrowUp" | "w" | "W" => Some(Direction::Up),
                "ArrowDown" | "s" | "S" => Some(Direction::Down),
                "ArrowLeft" | "a" | "A" => Some(Direction::Left),
                "ArrowRight" | "d" | "D" => Some(Direction::Right),
                _ => None,
            };
            if let Some(dir) = direction {
                event.prevent_default();
                h.session.request_direction(dir, now);
                return;
            }
            match event.key().as_str() {
                "Escape" => match h.session.phase() {
                    GamePhase::Running => h.session.pause(),
                    GamePhase::Paused => h.session.resume(now),
                    _ => {}
                },
                "Enter" => {
                    if h.session.phase() == GamePhase::GameOver {
                        h.session.restart(now);
                    }
                }
                " " => {
                    if h.session.phase() == GamePhase::GameOver
                        && h.session.revive_with_crystals(now)
                    {
                        log::info!("crystal revive");
                    }
                }
                _ => {}
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_touch(canvas: &HtmlCanvasElement, host: &Rc<RefCell<Host>>) {
        // Swipe start
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    host.borrow_mut().touch_start =
                        Some((f64::from(touch.client_x()), f64::from(touch.client_y())));
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Swipe direction resolves on the fly for fast reactions; the
        // anchor resets after each accepted swipe so a held finger can
        // chain turns.
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut h = host.borrow_mut();
                let Some((start_x, start_y)) = h.touch_start else {
                    return;
                };
                let Some(touch) = event.touches().get(0) else {
                    return;
                };
                let (x, y) = (f64::from(touch.client_x()), f64::from(touch.client_y()));
                let (dx, dy) = (x - start_x, y - start_y);
                if dx.abs() < MIN_SWIPE_PX && dy.abs() < MIN_SWIPE_PX {
                    return;
                }
                let dir = if dx.abs() > dy.abs() {
                    if dx > 0.0 { Direction::Right } else { Direction::Left }
                } else if dy > 0.0 {
                    Direction::Down
                } else {
                    Direction::Up
                };
                h.session.request_direction(dir, now_ms());
                h.touch_start = Some((x, y));
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                host.borrow_mut().touch_start = None;
            });
            let _ = canvas
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(host: &Rc<RefCell<Host>>) {
        let document = web_sys::window()
            .expect("no window")
            .document()
            .expect("no document");
        let host = host.clone();
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                let mut h = host.borrow_mut();
                if h.session.phase() == GamePhase::Running {
                    h.session.pause();
                    log::info!("auto-paused (tab hidden)");
                }
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn orb_color(kind: OrbKind) -> &'static str {
        match kind {
            OrbKind::Negative => "#ff0000",
            OrbKind::Positive => "#00ff00",
            OrbKind::SpeedUp => "#ffff00",
            OrbKind::SlowDown => "#0000ff",
            OrbKind::Crystal => "#9932CC",
        }
    }

    fn particle_color(kind: ParticleKind) -> &'static str {
        match kind {
            ParticleKind::Food => "#ff00ff",
            ParticleKind::Tail => "#00ffff",
            ParticleKind::Orb(orb) => orb_color(orb),
        }
    }

    fn draw(ctx: &CanvasRenderingContext2d, canvas_px: f64, snap: &RenderSnapshot, time: f64) {
        ctx.set_fill_style_str("#000000");
        ctx.fill_rect(0.0, 0.0, canvas_px, canvas_px);

        let cell = f64::from(snap.cell_size);

        // Particles under everything else
        for particle in &snap.particles {
            ctx.set_global_alpha(f64::from(particle.alpha));
            ctx.set_fill_style_str(particle_color(particle.kind));
            ctx.begin_path();
            let _ = ctx.arc(
                f64::from(particle.pos.x),
                f64::from(particle.pos.y),
                3.0,
                0.0,
                std::f64::consts::TAU,
            );
            ctx.fill();
        }
        ctx.set_global_alpha(1.0);

        // Snake
        ctx.set_fill_style_str("#00ffff");
        for pos in &snap.segments {
            ctx.fill_rect(
                f64::from(pos.x) - cell / 2.0 + 2.0,
                f64::from(pos.y) - cell / 2.0 + 2.0,
                cell - 4.0,
                cell - 4.0,
            );
        }

        // Food
        ctx.set_fill_style_str("#ff00ff");
        ctx.begin_path();
        let _ = ctx.arc(
            f64::from(snap.food.x),
            f64::from(snap.food.y),
            cell / 3.0,
            0.0,
            std::f64::consts::TAU,
        );
        ctx.fill();

        // Orbs, pulsing when close to expiry
        for orb in &snap.orbs {
            let scale = match orb.expires_in_ms {
                Some(left) if left < 5_000.0 => 0.8 + (time / 100.0).sin() * 0.2,
                _ => 1.0,
            };
            ctx.set_fill_style_str(orb_color(orb.kind));
            if orb.kind == OrbKind::Crystal {
                ctx.save();
                let _ = ctx.translate(f64::from(orb.pos.x), f64::from(orb.pos.y));
                let _ = ctx.rotate(FRAC_PI_4);
                let size = cell / 1.8 * scale;
                ctx.fill_rect(-size / 2.0, -size / 2.0, size, size);
                ctx.restore();
            } else {
                ctx.begin_path();
                let _ = ctx.arc(
                    f64::from(orb.pos.x),
                    f64::from(orb.pos.y),
                    cell / 3.0 * scale,
                    0.0,
                    std::f64::consts::TAU,
                );
                ctx.fill();
            }
        }

        // Speed-effect countdown bar
        if let Some(effect) = snap.speed_effect {
            ctx.set_fill_style_str(if effect.is_boost { "#ffff00" } else { "#0000ff" });
            ctx.set_global_alpha(0.5);
            ctx.fill_rect(
                10.0,
                10.0,
                (canvas_px - 20.0) * f64::from(effect.remaining),
                5.0,
            );
            ctx.set_global_alpha(1.0);
        }

        // HUD
        ctx.set_fill_style_str("#00ffff");
        ctx.set_font("12px monospace");
        let _ = ctx.fill_text(&format!("SCORE {}", snap.score), 10.0, canvas_px - 28.0);
        let _ = ctx.fill_text(&format!("BEST {}", snap.high_score), 10.0, canvas_px - 14.0);
        ctx.set_fill_style_str("#9932CC");
        let _ = ctx.fill_text(&format!("CRYSTALS {}", snap.crystals), 120.0, canvas_px - 14.0);

        match snap.phase {
            GamePhase::GameOver => {
                ctx.set_fill_style_str("#ff0066");
                ctx.set_font("24px monospace");
                let _ = ctx.fill_text("GAME OVER", canvas_px / 2.0 - 64.0, canvas_px / 2.0);
                ctx.set_font("12px monospace");
                let _ = ctx.fill_text(
                    "Enter: restart   Space: revive (10 crystals)",
                    canvas_px / 2.0 - 140.0,
                    canvas_px / 2.0 + 24.0,
                );
            }
            GamePhase::Paused => {
                ctx.set_fill_style_str("#00ffff");
                ctx.set_font("24px monospace");
                let _ = ctx.fill_text("PAUSED", canvas_px / 2.0 - 42.0, canvas_px / 2.0);
            }
            _ => {}
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_host::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use neon_snake::sim::{Direction, GameConfig, GamePhase, GameSession};
    use neon_snake::storage::MemStore;

    env_logger::init();
    log::info!("Neon Snake (native) starting...");
    log::info!("Native mode is headless - build with trunk/wasm-pack for the browser version");

    // Headless smoke run: drive a session for a few simulated seconds
    let mut session = GameSession::new(GameConfig::new(20, 400), 1234, Box::new(MemStore::new()));
    session.start(0.0);
    let turns = [
        (1_000.0, Direction::Down),
        (2_000.0, Direction::Left),
        (3_000.0, Direction::Up),
        (4_000.0, Direction::Right),
    ];
    let mut time = 0.0;
    while session.phase() == GamePhase::Running && time < 10_000.0 {
        time += 16.0;
        for &(at, dir) in &turns {
            if time >= at && time - at < 16.0 {
                session.request_direction(dir, time);
            }
        }
        session.frame(time);
    }
    println!(
        "smoke run finished: phase {:?}, score {}, length {}",
        session.phase(),
        session.state().score,
        session.state().snake.len()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
