// ==================== Imports ====================
use std::cell::RefCell;
use wasm_bindgen::prelude::*;

#[macro_use]
mod browser;
pub mod bird;
pub mod collision;
pub mod config;
pub mod effect;
pub mod engine;
pub mod game;
pub mod obstacle;
pub mod round;
pub mod score;

use engine::{GameLoop, LoopHandle};
use game::Flappy;

// the running loop lives here so it outlives the spawn_local future
thread_local! {
    static ACTIVE_LOOP: RefCell<Option<LoopHandle>> = RefCell::new(None);
}

// ==================== Main Functions ====================
/// Main entry for Webassembly module
/// - installs the panic hook
/// - loads config and sprites
/// - starts the fixed step loop on the canvas
#[wasm_bindgen]
pub fn main_js() -> Result<(), JsValue> {
    // better panic messages in the console
    console_error_panic_hook::set_once();

    browser::spawn_local(async move {
        match GameLoop::start(Flappy::new()).await {
            Ok(handle) => ACTIVE_LOOP.with(|slot| {
                // a second main_js call replaces (and stops) the first loop
                slot.borrow_mut().replace(handle);
            }),
            Err(err) => error!("Could not start game : {:#?}", err),
        }
    });

    Ok(())
}

/// Stops the loop and removes the input listeners
#[wasm_bindgen]
pub fn stop_js() {
    ACTIVE_LOOP.with(|slot| slot.borrow_mut().take());
}
