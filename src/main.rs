//! Tilliman entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

    use tilliman::consts::SIM_DT;
    use tilliman::platform::{CanvasContext, ImageAssets, KeyboardInput};
    use tilliman::sim::GameEvent;
    use tilliman::{Engine, Progress, Settings};

    /// Sprites looked up under `assets/`
    const SPRITES: &[&str] = &[
        "player_idle",
        "player_jump",
        "player_fall",
        "player_dash",
        "player_hit",
        "platform",
        "moving_platform",
        "enemy_tickspike",
        "enemy_rustling",
        "enemy_cuckooshadow",
        "gear",
        "goal_locked",
        "goal_open",
        "checkpoint",
        "checkpoint_active",
        "trap",
    ];

    /// Game instance holding all state
    struct Game {
        engine: Engine<KeyboardInput>,
        ctx: CanvasRenderingContext2d,
        images: ImageAssets,
        progress: Progress,
        last_time: f64,
    }

    impl Game {
        fn update(&mut self, dt: f32) -> bool {
            let running = self.engine.frame(dt);
            for event in self.engine.drain_events(&mut self.progress) {
                match event {
                    GameEvent::LevelLoaded { index, name } => {
                        log::info!("Level {}: {}", index + 1, name);
                    }
                    GameEvent::CatalogComplete { score } => {
                        log::info!("All levels cleared with {} points", score);
                    }
                    _ => {}
                }
            }
            running
        }

        fn render(&self) {
            let mut ctx = CanvasContext::new(&self.ctx, &self.images);
            self.engine.render(&mut ctx, &self.images);
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Tilliman starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let settings = Settings::load();
        canvas.set_width(settings.viewport_width as u32);
        canvas.set_height(settings.viewport_height as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let input = KeyboardInput::attach(window.clone(), settings.key_bindings.clone())?;
        let game = Rc::new(RefCell::new(Game {
            engine: Engine::with_builtin_levels(input, settings),
            ctx,
            images: ImageAssets::load("assets", SPRITES),
            progress: Progress::load(),
            last_time: 0.0,
        }));

        setup_auto_pause(&window, &document, game.clone())?;
        setup_teardown(&window, game.clone())?;

        // Start game loop
        request_animation_frame(game);

        log::info!("Tilliman running!");
        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let running = {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            let running = g.update(dt);
            if running {
                g.render();
            }
            running
        };

        if running {
            request_animation_frame(game);
        }
    }

    fn setup_auto_pause(
        window: &web_sys::Window,
        document: &web_sys::Document,
        game: Rc<RefCell<Game>>,
    ) -> Result<(), JsValue> {
        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    g.engine.input().release_all();
                    g.engine.focus_lost();
                }
            });
            document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                g.engine.input().release_all();
                g.engine.focus_lost();
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn setup_teardown(window: &web_sys::Window, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut g = game.borrow_mut();
            g.engine.destroy();
            g.progress.save();
        });
        window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Tilliman (native) starting...");
    log::info!("Native mode runs a headless demo - serve the wasm build for the playable version");

    run_headless_demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted run through the built-in levels with a recording draw context
#[cfg(not(target_arch = "wasm32"))]
fn run_headless_demo() {
    use tilliman::consts::SIM_DT;
    use tilliman::input::{InputState, ScriptedInput};
    use tilliman::render::{NoAssets, RecordingContext};
    use tilliman::sim::GameEvent;
    use tilliman::{Engine, Progress, Settings};

    const DEMO_TICKS: usize = 3600;

    // Run right, hopping every second
    let script = (0..DEMO_TICKS).map(|i| InputState {
        right: true,
        jump: i % 60 < 20,
        ..Default::default()
    });
    let mut engine = Engine::with_builtin_levels(ScriptedInput::new(script), Settings::default());
    let mut progress = Progress::new();
    let mut ctx = RecordingContext::new();

    engine.start();
    for _ in 0..DEMO_TICKS {
        if !engine.frame(SIM_DT) {
            break;
        }
        for event in engine.drain_events(&mut progress) {
            match event {
                GameEvent::LevelLoaded { index, name } => println!("Level {}: {}", index + 1, name),
                GameEvent::EnemyStomped => println!("  stomped an enemy"),
                GameEvent::CheckpointActivated => println!("  checkpoint"),
                GameEvent::LivesChanged(lives) => println!("  lives: {}", lives),
                GameEvent::LevelComplete { index, score } => {
                    println!("Level {} complete, score {}", index + 1, score)
                }
                GameEvent::GameOver { score, .. } => println!("Game over, score {}", score),
                GameEvent::CatalogComplete { score } => println!("All levels cleared, score {}", score),
                _ => {}
            }
        }
        if engine.input().remaining() == 0 {
            break;
        }
    }

    ctx.clear();
    let camera_x = engine.render(&mut ctx, &NoAssets);
    let player = engine.state().player();
    println!(
        "\nFinished in phase {:?} at x={:.0} (camera {:.0}), score {}, lives {}, gears {}",
        engine.state().phase,
        player.pos.x,
        camera_x,
        player.score,
        player.lives,
        player.gears
    );
    println!(
        "Last frame: {} draw calls; best score {}",
        ctx.commands.len(),
        progress.best_score
    );
    engine.destroy();
}
