//! Keyboard and pointer input.
//!
//! DOM callbacks only push into a channel; the game loop drains it once per
//! animation frame into a [`KeyState`] snapshot, so the tick never sees a
//! half-applied event.
use crate::browser;
use anyhow::{anyhow, Result};
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use std::collections::HashSet;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, Window};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    Click,
}

/// Held keys by `KeyboardEvent.code`, plus a one-shot click flag
#[derive(Debug, Default)]
pub struct KeyState {
    pressed: HashSet<String>,
    clicked: bool,
}

impl KeyState {
    pub fn new() -> Self {
        KeyState::default()
    }

    pub fn is_pressed(&self, code: &str) -> bool {
        self.pressed.contains(code)
    }

    pub fn set_pressed(&mut self, code: &str) {
        self.pressed.insert(code.to_string());
    }

    pub fn set_released(&mut self, code: &str) {
        self.pressed.remove(code);
    }

    pub fn click(&mut self) {
        self.clicked = true;
    }

    pub fn clicked(&self) -> bool {
        self.clicked
    }

    /// Called after every fixed step so a click is seen by one step only
    pub fn end_step(&mut self) {
        self.clicked = false;
    }

    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(code) => self.set_pressed(&code),
            InputEvent::KeyUp(code) => self.set_released(&code),
            InputEvent::Click => self.click(),
        }
    }
}

/// Drain everything queued since the last frame
pub fn process_input(state: &mut KeyState, receiver: &mut UnboundedReceiver<InputEvent>) {
    // Err : queue empty or all senders gone
    while let Ok(event) = receiver.try_recv() {
        state.apply(event);
    }
}

type KeyClosure = Closure<dyn FnMut(KeyboardEvent)>;
type ClickClosure = Closure<dyn FnMut(MouseEvent)>;

/// Owns the registered DOM listeners and removes them on drop
pub struct InputListener {
    window: Window,
    canvas: HtmlCanvasElement,
    keydown: KeyClosure,
    keyup: KeyClosure,
    click: ClickClosure,
}

impl InputListener {
    fn key_closure(
        sender: UnboundedSender<InputEvent>,
        event: fn(String) -> InputEvent,
    ) -> KeyClosure {
        browser::closure_wrap(Box::new(move |evt: KeyboardEvent| {
            let _ = sender.unbounded_send(event(evt.code()));
        }) as Box<dyn FnMut(KeyboardEvent)>)
    }
}

impl Drop for InputListener {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("keydown", self.keydown.as_ref().unchecked_ref());
        let _ = self
            .window
            .remove_event_listener_with_callback("keyup", self.keyup.as_ref().unchecked_ref());
        let _ = self
            .canvas
            .remove_event_listener_with_callback("click", self.click.as_ref().unchecked_ref());
    }
}

/// Keys are listened to on the window, clicks on the canvas only
pub fn prepare_input() -> Result<(UnboundedReceiver<InputEvent>, InputListener)> {
    let (sender, receiver) = unbounded();
    let window = browser::window()?;
    let canvas = browser::canvas()?;

    let keydown = InputListener::key_closure(sender.clone(), InputEvent::KeyDown);
    let keyup = InputListener::key_closure(sender.clone(), InputEvent::KeyUp);
    let click = browser::closure_wrap(Box::new(move |_evt: MouseEvent| {
        let _ = sender.unbounded_send(InputEvent::Click);
    }) as Box<dyn FnMut(MouseEvent)>);

    window
        .add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Cannot listen to keydown : {:#?}", err))?;
    window
        .add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Cannot listen to keyup : {:#?}", err))?;
    canvas
        .add_event_listener_with_callback("click", click.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Cannot listen to click : {:#?}", err))?;

    Ok((
        receiver,
        InputListener {
            window,
            canvas,
            keydown,
            keyup,
            click,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_queued_events_in_order() {
        let (sender, mut receiver) = unbounded();
        sender.unbounded_send(InputEvent::KeyDown("KeyW".into())).unwrap();
        sender.unbounded_send(InputEvent::KeyDown("KeyS".into())).unwrap();
        sender.unbounded_send(InputEvent::KeyUp("KeyW".into())).unwrap();

        let mut state = KeyState::new();
        process_input(&mut state, &mut receiver);

        assert!(!state.is_pressed("KeyW"));
        assert!(state.is_pressed("KeyS"));
    }

    #[test]
    fn empty_queue_leaves_state_alone() {
        let (_sender, mut receiver) = unbounded::<InputEvent>();
        let mut state = KeyState::new();
        state.set_pressed("KeyW");
        process_input(&mut state, &mut receiver);
        assert!(state.is_pressed("KeyW"));
    }

    #[test]
    fn click_lasts_one_step() {
        let (sender, mut receiver) = unbounded();
        sender.unbounded_send(InputEvent::Click).unwrap();

        let mut state = KeyState::new();
        process_input(&mut state, &mut receiver);
        assert!(state.clicked());
        state.end_step();
        assert!(!state.clicked());
    }

    #[test]
    fn keys_survive_end_step() {
        let mut state = KeyState::new();
        state.apply(InputEvent::KeyDown("KeyW".into()));
        state.end_step();
        assert!(state.is_pressed("KeyW"));
    }
}
