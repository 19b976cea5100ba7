//! Orb Row entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent, TouchEvent};

    use glam::Vec2;
    use orb_row::renderer::OrbRenderState;
    use orb_row::scene::{self, WorldView};
    use orb_row::sim::{FieldEvent, OrbField, TickInput, tick};
    use orb_row::tuning::Tuning;

    /// Game instance holding all state
    struct Game {
        field: OrbField,
        tuning: Tuning,
        render_state: Option<OrbRenderState>,
        input: TickInput,
        events: Vec<FieldEvent>,
        view: WorldView,
        /// Canvas size in CSS pixels; pointer coordinates arrive in these
        canvas_size: Vec2,
    }

    impl Game {
        fn new(tuning: Tuning, field: OrbField) -> Self {
            Self {
                field,
                tuning,
                render_state: None,
                input: TickInput::default(),
                events: Vec::new(),
                view: WorldView::fit_row(1.0, 1.0),
                canvas_size: Vec2::ONE,
            }
        }

        fn set_canvas_size(&mut self, w: f32, h: f32) {
            self.canvas_size = Vec2::new(w, h);
            let row_half = self.field.config().right_edge;
            self.view = WorldView::fit_row(row_half, w / h.max(1.0));
        }

        /// Convert a pointer position to a picked orb and queue the hit.
        fn queue_hit(&mut self, x: f32, y: f32) {
            let world = self
                .view
                .screen_to_world(Vec2::new(x, y), self.canvas_size);
            if let Some(index) = scene::pick_orb(world, &self.field) {
                log::debug!("picked orb {index} at {world:?}");
                self.input.hits.push(index);
            }
        }

        /// Run one simulation tick and drain its events to the log.
        fn update(&mut self) {
            tick(&mut self.field, &self.input, &mut self.events);
            self.input.hits.clear();

            for event in self.events.drain(..) {
                match event {
                    FieldEvent::OrbHalted { index } => log::info!("orb {index} halted"),
                    FieldEvent::OrbResumed { index } => log::info!("orb {index} resumed"),
                    FieldEvent::ColorCycled { index, state } => {
                        log::debug!("orb {index} cycled to color {state}")
                    }
                }
            }
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            let sprites = scene::orb_sprites(&self.field, &self.tuning);
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&sprites, &self.view, time) {
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

    /// Read tuning overrides from the `tuning` URL query parameter.
    fn tuning_from_query() -> Tuning {
        let search = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        let Ok(params) = web_sys::UrlSearchParams::new_with_str(&search) else {
            return Tuning::default();
        };
        match params.get("tuning") {
            Some(json) => match Tuning::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Tuning overridden from query: {tuning:?}");
                    tuning
                }
                Err(e) => {
                    log::warn!("Ignoring malformed tuning JSON: {e}");
                    Tuning::default()
                }
            },
            None => Tuning::default(),
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Orb Row starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // Initialize the field; a rejected tuning falls back to defaults
        let tuning = tuning_from_query();
        let (tuning, field) = match OrbField::new(tuning.field_config()) {
            Ok(field) => (tuning, field),
            Err(e) => {
                log::warn!("Rejected field config ({e}), using defaults");
                let tuning = Tuning::default();
                let field = OrbField::new(tuning.field_config())
                    .expect("default field config is valid");
                (tuning, field)
            }
        };
        log::info!(
            "Field: {} orbs, speed {}, halt {} ticks",
            field.config().orb_count,
            field.config().speed_increment,
            field.config().wait_ticks
        );

        let game = Rc::new(RefCell::new(Game::new(tuning, field)));
        game.borrow_mut()
            .set_canvas_size(client_w as f32, client_h as f32);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
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

        let render_state = OrbRenderState::new(surface, &adapter, width, height).await;
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(&canvas, game.clone());

        // Start frame loop
        request_animation_frame(game);

        log::info!("Orb Row running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse down - pick and halt
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let w = canvas_clone.client_width() as f32;
                let h = canvas_clone.client_height() as f32;
                g.set_canvas_size(w, h);
                g.queue_hit(event.offset_x() as f32, event.offset_y() as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start - every touch point may pick an orb
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                let w = canvas_clone.client_width() as f32;
                let h = canvas_clone.client_height() as f32;
                g.set_canvas_size(w, h);
                let rect = canvas_clone.get_bounding_client_rect();
                let touches = event.touches();
                for i in 0..touches.length() {
                    if let Some(touch) = touches.get(i) {
                        let x = touch.client_x() as f32 - rect.left() as f32;
                        let y = touch.client_y() as f32 - rect.top() as f32;
                        g.queue_hit(x, y);
                    }
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update();
            g.render(time);
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Orb Row (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    run_headless_demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Drive the sim without a renderer: halt two orbs on a shared position and
/// watch them cycle until both resume.
#[cfg(not(target_arch = "wasm32"))]
fn run_headless_demo() {
    use orb_row::Tuning;
    use orb_row::sim::{FieldEvent, OrbField, TickInput, tick};

    let tuning = Tuning::default();
    let mut field = OrbField::new(tuning.field_config()).expect("default field config is valid");
    let wait = field.config().wait_ticks;

    // Park two orbs on the same spot so they cycle while halted
    field.orbs[2].position = 0.0;
    field.orbs[7].position = 0.0;

    let mut events = Vec::new();
    tick(&mut field, &TickInput { hits: vec![2, 7] }, &mut events);

    for _ in 0..wait {
        tick(&mut field, &TickInput::default(), &mut events);
    }

    let cycles = events
        .iter()
        .filter(|e| matches!(e, FieldEvent::ColorCycled { .. }))
        .count();
    let resumed = events
        .iter()
        .filter(|e| matches!(e, FieldEvent::OrbResumed { .. }))
        .count();
    assert_eq!(resumed, 2, "both halted orbs should resume");
    assert!(cycles > 0, "coincident halted orbs should cycle");

    println!(
        "✓ {} ticks simulated, {} color cycles, both orbs resumed",
        field.ticks, cycles
    );
}
