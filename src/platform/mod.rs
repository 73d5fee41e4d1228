//! Browser platform layer
//!
//! Keyboard input with removable listeners, image assets and a 2D canvas
//! drawing context.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement, KeyboardEvent, Window};

use crate::input::{InputSource, InputState};
use crate::render::{AssetProvider, Color, DrawContext, Drawable};
use crate::settings::KeyBindings;
use crate::sim::aabb::Rect;

type KeyListener = Closure<dyn FnMut(KeyboardEvent)>;

/// Keyboard state fed by window keydown/keyup listeners
pub struct KeyboardInput {
    window: Window,
    held: Rc<RefCell<InputState>>,
    keydown: Option<KeyListener>,
    keyup: Option<KeyListener>,
}

impl KeyboardInput {
    /// Register listeners on the window
    pub fn attach(window: Window, bindings: KeyBindings) -> Result<Self, JsValue> {
        let held = Rc::new(RefCell::new(InputState::default()));
        let bindings = Rc::new(bindings);

        let keydown = Self::listener(held.clone(), bindings.clone(), true);
        window.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
        let keyup = Self::listener(held.clone(), bindings, false);
        window.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;

        Ok(Self {
            window,
            held,
            keydown: Some(keydown),
            keyup: Some(keyup),
        })
    }

    fn listener(held: Rc<RefCell<InputState>>, bindings: Rc<KeyBindings>, down: bool) -> KeyListener {
        Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if let Some(action) = bindings.action_for(&event.key()) {
                event.prevent_default();
                held.borrow_mut().set(action, down);
            }
        })
    }

    /// Forget held keys (keyup events are lost while unfocused)
    pub fn release_all(&self) {
        *self.held.borrow_mut() = InputState::default();
    }
}

impl InputSource for KeyboardInput {
    fn poll(&mut self) -> InputState {
        *self.held.borrow()
    }

    fn detach(&mut self) {
        if self.keydown.is_none() && self.keyup.is_none() {
            return;
        }
        for (event, listener) in [("keydown", self.keydown.take()), ("keyup", self.keyup.take())] {
            if let Some(listener) = listener {
                let _ = self
                    .window
                    .remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref());
            }
        }
        self.release_all();
        log::info!("Keyboard listeners removed");
    }
}

impl Drop for KeyboardInput {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Sprites loaded from `<base_url>/<name>.png`
#[derive(Default)]
pub struct ImageAssets {
    images: HashMap<String, HtmlImageElement>,
}

impl ImageAssets {
    /// Start loading `names`. Images not yet decoded draw as placeholders.
    pub fn load(base_url: &str, names: &[&str]) -> Self {
        let mut images = HashMap::new();
        for name in names {
            match HtmlImageElement::new() {
                Ok(img) => {
                    img.set_src(&format!("{}/{}.png", base_url, name));
                    images.insert(name.to_string(), img);
                }
                Err(e) => log::warn!("Could not create image for '{}': {:?}", name, e),
            }
        }
        Self { images }
    }

    fn element(&self, name: &str) -> Option<&HtmlImageElement> {
        self.images
            .get(name)
            .filter(|img| img.complete() && img.natural_width() > 0)
    }
}

impl AssetProvider for ImageAssets {
    fn get_asset(&self, name: &str) -> Option<Drawable> {
        self.element(name).map(|img| Drawable {
            name: name.to_string(),
            size: Vec2::new(img.natural_width() as f32, img.natural_height() as f32),
        })
    }
}

fn css(color: Color) -> String {
    format!(
        "rgba({}, {}, {}, {})",
        (color[0] * 255.0).round() as u8,
        (color[1] * 255.0).round() as u8,
        (color[2] * 255.0).round() as u8,
        color[3]
    )
}

/// `DrawContext` over a canvas 2D context
pub struct CanvasContext<'a> {
    ctx: &'a CanvasRenderingContext2d,
    images: &'a ImageAssets,
}

impl<'a> CanvasContext<'a> {
    pub fn new(ctx: &'a CanvasRenderingContext2d, images: &'a ImageAssets) -> Self {
        ctx.set_font("18px monospace");
        Self { ctx, images }
    }
}

impl DrawContext for CanvasContext<'_> {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ctx.set_fill_style_str(&css(color));
        self.ctx.fill_rect(
            rect.pos.x as f64,
            rect.pos.y as f64,
            rect.size.x as f64,
            rect.size.y as f64,
        );
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32) {
        self.ctx.set_stroke_style_str(&css(color));
        self.ctx.set_line_width(line_width as f64);
        self.ctx.stroke_rect(
            rect.pos.x as f64,
            rect.pos.y as f64,
            rect.size.x as f64,
            rect.size.y as f64,
        );
    }

    fn draw_image(&mut self, image: &Drawable, rect: Rect) {
        let Some(element) = self.images.element(&image.name) else {
            return;
        };
        let _ = self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
            element,
            rect.pos.x as f64,
            rect.pos.y as f64,
            rect.size.x as f64,
            rect.size.y as f64,
        );
    }

    fn draw_text(&mut self, text: &str, pos: Vec2, color: Color) {
        self.ctx.set_fill_style_str(&css(color));
        let _ = self.ctx.fill_text(text, pos.x as f64, pos.y as f64);
    }
}
