pub mod input;

use self::input::KeyState;
use crate::browser;
use anyhow::{anyhow, Error, Result};
// wasm is single threaded, so Rc RefCell instead of Arc Mutex
use async_trait::async_trait;
use futures::channel::oneshot::channel;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::{
    // unchecked_ref casts the closure to a js Function without a runtime check
    // - we build the closure ourselves with the signature the DOM expects
    JsCast,
    JsValue,
};
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    fn update(&mut self, keystate: &KeyState);
    fn draw(&self, renderer: &Renderer);

    /// Length of one fixed update step in milliseconds
    fn step_ms(&self) -> f64 {
        DEFAULT_STEP_MS
    }
}

// 60 updates per second unless the game asks otherwise
pub const DEFAULT_STEP_MS: f64 = 1.0 / 60.0 * 1000.0;

// backlog beyond this many steps is dropped (tab was hidden, debugger, ...)
const MAX_STEPS_PER_FRAME: u32 = 8;

/// Turns animation frame timestamps into whole fixed steps.
///
/// ┌──────────── one animation frame ────────────┐
/// │ accumulated += now - last_frame             │
/// │ while accumulated >= step : one update      │
/// │ remainder carries over to the next frame    │
/// └─────────────────────────────────────────────┘
#[derive(Debug, Clone)]
pub struct FixedStep {
    step_ms: f64,
    last_frame: f64,
    accumulated: f64,
}

impl FixedStep {
    pub fn new(step_ms: f64, now: f64) -> Self {
        FixedStep {
            step_ms,
            last_frame: now,
            accumulated: 0.0,
        }
    }

    /// Number of updates to run for the frame at `now`
    pub fn advance(&mut self, now: f64) -> u32 {
        self.accumulated += (now - self.last_frame).max(0.0);
        self.last_frame = now;

        let mut steps = 0;
        while self.accumulated >= self.step_ms {
            self.accumulated -= self.step_ms;
            steps += 1;
            if steps == MAX_STEPS_PER_FRAME {
                self.accumulated = 0.0;
                break;
            }
        }
        steps
    }

    #[cfg(test)]
    pub fn accumulated(&self) -> f64 {
        self.accumulated
    }
}

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

pub struct GameLoop;

/// Owns the running loop. Stopping (or dropping) it cancels the pending
/// animation frame and frees the loop closure along with the game and its
/// input listeners.
pub struct LoopHandle {
    closure: SharedLoopClosure,
    frame_id: Rc<Cell<Option<i32>>>,
}

impl LoopHandle {
    pub fn stop(&self) {
        if let Some(frame_id) = self.frame_id.take() {
            if let Err(err) = browser::cancel_animation_frame(frame_id) {
                error!("GameLoop: {:#?}", err);
            }
        }
        if self.closure.borrow_mut().take().is_some() {
            log!("GameLoop: stopped");
        }
    }
}

impl Drop for LoopHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl GameLoop {
    pub async fn start(game: impl Game + 'static) -> Result<LoopHandle> {
        let mut game = game.initialize().await?;
        let mut step = FixedStep::new(game.step_ms(), browser::now()?);
        let renderer = Renderer {
            context: browser::context()?,
        };
        let (mut receiver, listener) = input::prepare_input()?;
        let mut keystate = KeyState::new();

        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        let frame_id = Rc::new(Cell::new(None));
        let next_frame = frame_id.clone();
        *g.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
            // dropped together with the closure
            let _ = &listener;
            input::process_input(&mut keystate, &mut receiver);
            for _ in 0..step.advance(perf) {
                game.update(&keystate);
                keystate.end_step();
            }
            game.draw(&renderer);
            if let Some(closure) = f.borrow().as_ref() {
                match browser::request_animation_frame(closure) {
                    Ok(id) => next_frame.set(Some(id)),
                    Err(err) => error!("GameLoop: {:#?}", err),
                }
            }
        }));

        let first = browser::request_animation_frame(
            g.borrow()
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?,
        )?;
        frame_id.set(Some(first));
        log!("GameLoop: started");

        Ok(LoopHandle {
            closure: g,
            frame_id,
        })
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Rect {
    pub position: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(position: Point, size: Size) -> Self {
        Rect { position, size }
    }

    pub fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect::new(Point { x, y }, Size { width, height })
    }
}

pub struct Renderer {
    context: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn clear(&self, rect: &Rect) {
        self.context.clear_rect(
            rect.position.x.into(),
            rect.position.y.into(),
            rect.size.width.into(),
            rect.size.height.into(),
        );
    }

    pub fn draw_image(&self, image: &HtmlImageElement, destination: &Rect) {
        if let Err(err) = self.context.draw_image_with_html_image_element_and_dw_and_dh(
            image,
            destination.position.x.into(),
            destination.position.y.into(),
            destination.size.width.into(),
            destination.size.height.into(),
        ) {
            error!("Renderer: cannot draw image : {:#?}", err);
        }
    }

    /// Same as draw_image, upside down
    pub fn draw_image_flipped(&self, image: &HtmlImageElement, destination: &Rect) {
        self.context.save();
        let bottom = destination.position.y + destination.size.height;
        if let Err(err) = self.context.scale(1.0, -1.0) {
            error!("Renderer: cannot flip : {:#?}", err);
        }
        self.draw_image(
            image,
            &Rect::from_xywh(
                destination.position.x,
                -bottom,
                destination.size.width,
                destination.size.height,
            ),
        );
        self.context.restore();
    }

    pub fn fill_rect(&self, rect: &Rect, color: &str) {
        self.context.set_fill_style_str(color);
        self.context.fill_rect(
            rect.position.x.into(),
            rect.position.y.into(),
            rect.size.width.into(),
            rect.size.height.into(),
        );
    }

    pub fn draw_text(&self, text: &str, location: &Point, font: &str, color: &str) {
        self.context.set_font(font);
        self.context.set_fill_style_str(color);
        if let Err(err) = self
            .context
            .fill_text(text, location.x.into(), location.y.into())
        {
            error!("Renderer: cannot draw text : {:#?}", err);
        }
    }
}

/// Asynchronously load an image from a given source path
/// # Arguments
/// * `source` - string slice to path/url
/// # Returns
/// * `Ok(HtmlImageElement)` - on load success
/// * `Err` - on load fail
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = browser::create_html_image_element()?;
    let (tx, rx) = channel::<Result<(), Error>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = success_tx.clone();

    let success_callback = browser::closure_once(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });

    let error_callback = browser::closure_once(move |err: JsValue| {
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(anyhow!(
                "[engine.rs::load_image] Error loading image: {:#?}",
                err
            )));
        }
    });

    image.set_onload(Some(success_callback.as_ref().unchecked_ref()));
    image.set_onerror(Some(error_callback.as_ref().unchecked_ref()));
    image.set_src(source);

    // keep callbacks alive until the image loads or errors
    success_callback.forget();
    error_callback.forget();

    // Result<Result<(), Error>, oneshot::Canceled>
    // - first ? : channel result
    // - second ? : image load result
    rx.await??;

    Ok(image)
}
