//! Touch Racer entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement, HtmlElement, TouchEvent, TouchList};

    use touch_racer::controls::{ControlScheme, Pedal, Surface, SurfaceRect, TouchPoint};
    use touch_racer::hud::HudSnapshot;
    use touch_racer::renderer::SceneRenderState;
    use touch_racer::{ControlMode, FrameDriver, Settings, WorldMode};

    const PEDAL_IDLE: &str = "#555";
    const THROTTLE_ACTIVE: &str = "#4caf50";
    const BRAKE_ACTIVE: &str = "#f44336";

    /// Game instance holding all state
    struct Game {
        driver: FrameDriver,
        controls: ControlScheme,
        render_state: Option<SceneRenderState>,
    }

    impl Game {
        fn new(settings: &Settings, seed: u64) -> Self {
            Self {
                driver: FrameDriver::from_settings(settings, seed),
                controls: ControlScheme::for_mode(settings.controls),
                render_state: None,
            }
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(self.driver.state(), time) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Touch Racer starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let (width, height) = fit_canvas(&window, &canvas);

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(&settings, seed)));
        apply_layout(&document, &settings);

        // Initialize WebGPU, falling back to WebGL2
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match SceneRenderState::new(surface, &adapter, width, height).await {
            Ok(mut render_state) => {
                render_state.set_start_time(js_sys::Date::now());
                game.borrow_mut().render_state = Some(render_state);
            }
            Err(e) => log::error!("Failed to create device: {:?}", e),
        }

        let surfaces = game.borrow().controls.surfaces();
        for &surface in surfaces {
            setup_surface(&document, surface, game.clone());
        }
        setup_document_handlers(&document, game.clone());
        setup_resize(&canvas, game.clone());
        setup_restart_button(&document, game.clone());

        request_animation_frame(game);

        log::info!("Touch Racer running!");
    }

    /// Size the backing store to the canvas's CSS box at device pixel ratio
    fn fit_canvas(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let width = ((canvas.client_width() as f64 * dpr) as u32).max(1);
        let height = ((canvas.client_height() as f64 * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height)
    }

    /// Show the controls and HUD rows that belong to the chosen variants
    fn apply_layout(document: &Document, settings: &Settings) {
        let show = |id: &str, visible: bool| {
            if let Some(el) = document.get_element_by_id(id) {
                let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
            }
        };
        show("wheel-controls", settings.controls == ControlMode::Wheel);
        show("joystick-controls", settings.controls == ControlMode::Joystick);
        show("hud-lap", settings.world == WorldMode::Circuit);
        show("hud-time", settings.world == WorldMode::Circuit);
        show("hud-score", settings.world == WorldMode::Gauntlet);
    }

    fn touch_points(list: &TouchList) -> Vec<TouchPoint> {
        (0..list.length())
            .filter_map(|i| list.get(i))
            .map(|t| TouchPoint::new(t.identifier(), t.client_x() as f32, t.client_y() as f32))
            .collect()
    }

    fn surface_rect(element: &Element) -> SurfaceRect {
        let rect = element.get_bounding_client_rect();
        let center = Vec2::new(
            (rect.left() + rect.width() / 2.0) as f32,
            (rect.top() + rect.height() / 2.0) as f32,
        );
        SurfaceRect::new(center, (rect.width() / 2.0) as f32)
    }

    fn setup_surface(document: &Document, surface: Surface, game: Rc<RefCell<Game>>) {
        let Some(element) = document.get_element_by_id(surface.element_id()) else {
            log::warn!("Missing control element #{}", surface.element_id());
            return;
        };

        // Touch start
        {
            let game = game.clone();
            let target = element.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let touches = touch_points(&event.changed_touches());
                let rect = surface_rect(&target);
                game.borrow_mut()
                    .controls
                    .touch_start(surface, &touches, rect);
            });
            let _ = element
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let touches = touch_points(&event.touches());
                game.borrow_mut().controls.touch_move(surface, &touches);
            });
            let _ = element
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end / cancel on the element
        for kind in ["touchend", "touchcancel"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let changed = touch_points(&event.changed_touches());
                game.borrow_mut().controls.touch_end(surface, &changed);
            });
            let _ = element.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_document_handlers(document: &Document, game: Rc<RefCell<Game>>) {
        // Any lifted finger releases the wheel pedals
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
                game.borrow_mut().controls.document_touch_end();
            });
            let _ = document
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // The browser took the touches away
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
                game.borrow_mut().controls.release_all();
            });
            let _ = document
                .add_event_listener_with_callback("touchcancel", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur (app switch): no touch-end will arrive
        if let Some(window) = web_sys::window() {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().controls.release_all();
                log::info!("Controls released (window blur)");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let (width, height) = fit_canvas(&window, &canvas);
            if let Some(ref mut render_state) = game.borrow_mut().render_state {
                render_state.resize(width, height);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_restart_button(document: &Document, game: Rc<RefCell<Game>>) {
        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let seed = js_sys::Date::now() as u64;
                let mut g = game.borrow_mut();
                g.driver.restart(seed);
                g.controls.release_all();
                log::info!("Race restarted with seed: {}", seed);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
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
        {
            let mut g = game.borrow_mut();
            let control = g.controls.signal();
            let hud = g.driver.frame(time, &control);
            g.render(time);

            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                update_hud(&document, &hud);
                update_control_feedback(&document, &g.controls);
            }
        }

        request_animation_frame(game);
    }

    /// Update HUD elements in DOM
    fn update_hud(document: &Document, hud: &HudSnapshot) {
        let set_text = |id: &str, text: &str| {
            if let Some(el) = document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        };
        set_text("speed", &hud.speed);
        set_text("gear", &hud.gear);
        set_text("lap-time", &hud.lap_time);
        set_text("lap", &hud.lap);
        set_text("score", &hud.score);

        if let Some(el) = document.get_element_by_id("finish") {
            let _ = el.set_attribute("class", if hud.finished { "" } else { "hidden" });
        }
    }

    fn set_style(document: &Document, selector: &str, property: &str, value: &str) {
        if let Some(el) = document
            .query_selector(selector)
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        {
            let _ = el.style().set_property(property, value);
        }
    }

    fn pedal_colour(held: bool, active: &'static str) -> &'static str {
        if held { active } else { PEDAL_IDLE }
    }

    /// Wheel rotation, knob positions and pedal colours
    fn update_control_feedback(document: &Document, controls: &ControlScheme) {
        match controls {
            ControlScheme::Wheel(wheel) => {
                set_style(
                    document,
                    "#steering-wheel",
                    "transform",
                    &format!("rotate({:.1}deg)", wheel.wheel_rotation_deg()),
                );
                set_style(
                    document,
                    "#throttle-pedal",
                    "background-color",
                    pedal_colour(wheel.pedal_active(Pedal::Throttle), THROTTLE_ACTIVE),
                );
                set_style(
                    document,
                    "#brake-pedal",
                    "background-color",
                    pedal_colour(wheel.pedal_active(Pedal::Brake), BRAKE_ACTIVE),
                );
            }
            ControlScheme::Joystick(sticks) => {
                for (selector, stick) in [
                    ("#left-stick .knob", &sticks.steer),
                    ("#right-stick .knob", &sticks.drive),
                ] {
                    let offset = stick.knob_offset();
                    set_style(
                        document,
                        selector,
                        "transform",
                        &format!("translate({:.1}px, {:.1}px)", offset.x, offset.y),
                    );
                }
                set_style(
                    document,
                    "#brake-button",
                    "background-color",
                    pedal_colour(sticks.brake_held(), BRAKE_ACTIVE),
                );
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

/// Frames in the headless demo race (30 s at 60 fps)
#[cfg(not(target_arch = "wasm32"))]
const HEADLESS_FRAMES: u32 = 1800;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use touch_racer::{Settings, WorldMode};

    env_logger::init();

    log::info!("Touch Racer (native) starting...");
    log::info!("Rendering needs a browser - build for wasm32 and serve index.html");

    let settings = Settings::load();
    let seed = settings.seed.unwrap_or(42);
    for world in [WorldMode::Circuit, WorldMode::Gauntlet] {
        run_headless(world, seed);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Drive a scripted lap without a display and print the final state
#[cfg(not(target_arch = "wasm32"))]
fn run_headless(world: touch_racer::WorldMode, seed: u64) {
    use touch_racer::FrameDriver;
    use touch_racer::controls::ControlSignal;
    use touch_racer::sim::RaceState;

    let mut driver = FrameDriver::new(RaceState::new(world, seed));
    let mut hud = None;

    for frame in 0..HEADLESS_FRAMES {
        let t = frame as f32 / 60.0;
        let control = ControlSignal {
            steering: (t * 0.5).sin() * 0.3,
            pedal: 1.0,
            brake: false,
        };
        hud = Some(driver.frame(frame as f64 * 1000.0 / 60.0, &control));
    }

    if let Some(hud) = hud {
        log::info!(
            "{}: speed {} gear {} time {} lap {} score {}",
            world.as_str(),
            hud.speed,
            hud.gear,
            hud.lap_time,
            hud.lap,
            hud.score
        );
    }

    match serde_json::to_string_pretty(&driver.state().snapshot()) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize race state: {}", e),
    }
}
