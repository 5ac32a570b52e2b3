// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod error;
pub mod logging;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
    use web_sys::{Document, Event, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent, Window};

    use crate::config::SceneConfig;
    use crate::controller::input::{self, InputEvent, InputState, KeyBindings};
    use crate::controller::loader::{self, AssetLoader, FetchLoader};
    use crate::controller::FrameLoopContext;
    use crate::view::{GpuContext, Renderer};
    use crate::{logging, ui};

    #[wasm_bindgen(start)]
    pub async fn start() -> Result<(), JsValue> {
        logging::init();
        let (window, document, canvas) = init_canvas()?;
        setup_app(&window, &document, &canvas).await
    }

    fn window_size(window: &Window) -> (u32, u32) {
        let dim = |v: Result<JsValue, JsValue>, fallback: u32| {
            v.ok().and_then(|v| v.as_f64()).map(|v| v as u32).unwrap_or(fallback)
        };
        (dim(window.inner_width(), 800), dim(window.inner_height(), 600))
    }

    /// Main application setup for WASM
    async fn setup_app(window: &Window, document: &Document, canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
        let (width, height) = (canvas.width(), canvas.height());
        let gpu = GpuContext::new(canvas, width, height)
            .await
            .map_err(|e| js_error(format!("GPU init failed: {e}")))?;
        let mut renderer = Renderer::new(gpu);

        let config = SceneConfig::default();
        let (publisher, vehicle_slot) = loader::load_slot();
        FetchLoader.load(&config.model_path, loader::log_progress(&config.model_path), publisher);

        let input_state = Rc::new(RefCell::new(InputState::new()));
        let egui_events: Rc<RefCell<Vec<egui::Event>>> = Rc::new(RefCell::new(Vec::new()));
        let pending_resize: Rc<Cell<Option<(u32, u32)>>> = Rc::new(Cell::new(None));

        setup_input_listeners(
            document,
            window,
            canvas,
            input_state.clone(),
            config.bindings.clone(),
            egui_events.clone(),
            pending_resize.clone(),
        )?;

        let mut frame_ctx = FrameLoopContext::new(config, width, height, input_state, vehicle_slot);
        tracing::info!(width, height, "scene ready");

        let performance = window.performance();
        let canvas = canvas.clone();
        let f = RcCellCallback::new(window.clone(), move || {
            if let Some((w, h)) = pending_resize.take() {
                canvas.set_width(w);
                canvas.set_height(h);
                renderer.resize(w, h);
                frame_ctx.resize(w, h);
            }

            let now = performance.as_ref().map(|p| p.now()).unwrap_or(0.0);
            let (w, h) = renderer.size();
            let events = std::mem::take(&mut *egui_events.borrow_mut());
            renderer.set_ui_input(ui::raw_input(w, h, now, events), 1.0);
            frame_ctx.frame(now, &mut renderer);
        });
        f.start();

        Ok(())
    }

    /// Feed one event into the shared input state
    fn push(input_state: &Rc<RefCell<InputState>>, bindings: &KeyBindings, event: InputEvent) {
        input_state.borrow_mut().process_event(&event, bindings);
    }

    /// Setup all input event listeners
    fn setup_input_listeners(
        document: &Document,
        window: &Window,
        canvas: &HtmlCanvasElement,
        input_state: Rc<RefCell<InputState>>,
        bindings: KeyBindings,
        egui_events: Rc<RefCell<Vec<egui::Event>>>,
        pending_resize: Rc<Cell<Option<(u32, u32)>>>,
    ) -> Result<(), JsValue> {
        // Keyboard down
        {
            let input_state = input_state.clone();
            let bindings = bindings.clone();
            let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                // Keep arrow keys from scrolling the page
                if bindings.is_bound(&e.key()) {
                    e.prevent_default();
                }
                push(&input_state, &bindings, input::wasm::keyboard_event_to_input(&e, true));
            }) as Box<dyn FnMut(KeyboardEvent)>);
            document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
            keydown.forget();
        }

        // Keyboard up
        {
            let input_state = input_state.clone();
            let bindings = bindings.clone();
            let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                push(&input_state, &bindings, input::wasm::keyboard_event_to_input(&e, false));
            }) as Box<dyn FnMut(KeyboardEvent)>);
            document.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
            keyup.forget();
        }

        // Focus loss - release all keys
        {
            let input_state = input_state.clone();
            let bindings = bindings.clone();
            let blur = Closure::wrap(Box::new(move |_e: Event| {
                push(&input_state, &bindings, InputEvent::FocusLost);
            }) as Box<dyn FnMut(Event)>);
            window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
            blur.forget();
        }

        // Visibility change - release all keys
        {
            let input_state = input_state.clone();
            let bindings = bindings.clone();
            let doc = document.clone();
            let visibility = Closure::wrap(Box::new(move |_e: Event| {
                push(&input_state, &bindings, InputEvent::VisibilityChanged { visible: !doc.hidden() });
            }) as Box<dyn FnMut(Event)>);
            document.add_event_listener_with_callback("visibilitychange", visibility.as_ref().unchecked_ref())?;
            visibility.forget();
        }

        // Pointer position for hover picking, drag deltas for the camera rig
        {
            let input_state = input_state.clone();
            let bindings = bindings.clone();
            let egui_events = egui_events.clone();
            let canvas_mm = canvas.clone();
            let mm = Closure::wrap(Box::new(move |e: MouseEvent| {
                let (w, h) = (canvas_mm.width() as f32, canvas_mm.height() as f32);
                push(&input_state, &bindings, input::wasm::pointer_move_to_input(&e, w, h));
                push(&input_state, &bindings, input::wasm::mouse_move_to_input(&e));
                egui_events
                    .borrow_mut()
                    .push(egui::Event::PointerMoved(egui::pos2(e.client_x() as f32, e.client_y() as f32)));
            }) as Box<dyn FnMut(MouseEvent)>);
            document.add_event_listener_with_callback("mousemove", mm.as_ref().unchecked_ref())?;
            mm.forget();
        }

        // Mouse buttons
        for (name, is_down) in [("mousedown", true), ("mouseup", false)] {
            let input_state = input_state.clone();
            let bindings = bindings.clone();
            let egui_events = egui_events.clone();
            let handler = Closure::wrap(Box::new(move |e: MouseEvent| {
                push(&input_state, &bindings, input::wasm::mouse_button_to_input(&e, is_down));
                if e.button() == 0 {
                    egui_events.borrow_mut().push(egui::Event::PointerButton {
                        pos: egui::pos2(e.client_x() as f32, e.client_y() as f32),
                        button: egui::PointerButton::Primary,
                        pressed: is_down,
                        modifiers: egui::Modifiers::default(),
                    });
                }
            }) as Box<dyn FnMut(MouseEvent)>);
            document.add_event_listener_with_callback(name, handler.as_ref().unchecked_ref())?;
            handler.forget();
        }

        // Mouse wheel zooms the camera rig
        {
            let input_state = input_state.clone();
            let bindings = bindings.clone();
            let wheel = Closure::wrap(Box::new(move |e: WheelEvent| {
                push(&input_state, &bindings, input::wasm::wheel_to_input(&e));
                e.prevent_default();
            }) as Box<dyn FnMut(WheelEvent)>);
            canvas.add_event_listener_with_callback("wheel", wheel.as_ref().unchecked_ref())?;
            wheel.forget();
        }

        // Window resize - applied at the start of the next frame
        {
            let window_rs = window.clone();
            let resize = Closure::wrap(Box::new(move |_e: Event| {
                pending_resize.set(Some(window_size(&window_rs)));
            }) as Box<dyn FnMut(Event)>);
            window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;
            resize.forget();
        }

        Ok(())
    }

    fn init_canvas() -> Result<(Window, Document, HtmlCanvasElement), JsValue> {
        let window = web_sys::window().ok_or_else(|| js_error("no global `window`"))?;
        let document = window.document().ok_or_else(|| js_error("no document on window"))?;
        let body = document.body().ok_or_else(|| js_error("no body on document"))?;
        body.set_attribute("style", "margin: 0; overflow: hidden;")?;
        let canvas_el = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| js_error("failed to create canvas"))?;
        let (width, height) = window_size(&window);
        canvas_el.set_width(width);
        canvas_el.set_height(height);
        canvas_el.set_attribute("style", "display: block;")?;
        body.append_child(&canvas_el)?;
        Ok((window, document, canvas_el))
    }

    fn js_error<E: Into<String>>(msg: E) -> JsValue {
        JsValue::from_str(&msg.into())
    }

    struct RcCellCallback {
        inner: Rc<RefCell<Box<dyn FnMut()>>>,
        window: Window,
    }

    impl RcCellCallback {
        fn new(window: Window, f: impl FnMut() + 'static) -> Self {
            Self {
                inner: Rc::new(RefCell::new(Box::new(f))),
                window,
            }
        }

        fn start(self) {
            let inner = self.inner.clone();
            let window = self.window.clone();

            let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
            let callback_clone = callback.clone();

            *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                inner.borrow_mut().as_mut()();

                // Schedule next frame
                if let Some(cb) = callback_clone.borrow().as_ref() {
                    if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        tracing::error!(error = ?e, "requestAnimationFrame failed, frame loop stopped");
                    }
                }
            }) as Box<dyn FnMut()>));

            if let Some(cb) = callback.borrow().as_ref() {
                if let Err(e) = self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    tracing::error!(error = ?e, "requestAnimationFrame failed, frame loop not started");
                }
            }

            // Leak the closure to keep it alive
            std::mem::forget(callback);
        }
    }
}
