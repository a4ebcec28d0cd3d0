use crate::browser;
use anyhow::Result;
use std::cell::Cell;
use std::rc::Rc;

/// Real-time one-shot timer, independent of the game loop
pub trait EffectTimer {
    fn schedule(&self, delay_ms: i32, callback: Box<dyn FnOnce()>) -> Result<()>;
}

/// `window.setTimeout`
pub struct BrowserTimer;

impl EffectTimer for BrowserTimer {
    fn schedule(&self, delay_ms: i32, callback: Box<dyn FnOnce()>) -> Result<()> {
        browser::set_timeout(delay_ms, move || callback())?;
        Ok(())
    }
}

/// White flash shown when a round ends, cleared by the timer.
///
/// Each trigger bumps a generation number, so a timer left over from an
/// earlier flash cannot hide a newer one.
pub struct CollisionFlash {
    visible: Rc<Cell<bool>>,
    generation: Rc<Cell<u64>>,
    clip: Option<String>,
    duration_ms: i32,
    timer: Box<dyn EffectTimer>,
}

impl CollisionFlash {
    pub fn new(duration_ms: i32, timer: Box<dyn EffectTimer>) -> Self {
        CollisionFlash {
            visible: Rc::new(Cell::new(false)),
            generation: Rc::new(Cell::new(0)),
            clip: None,
            duration_ms,
            timer,
        }
    }

    pub fn trigger(&mut self, clip: Option<String>) {
        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);
        self.visible.set(true);
        if clip.is_some() {
            self.clip = clip;
        }

        let visible = self.visible.clone();
        let current = self.generation.clone();
        let clear = Box::new(move || {
            if current.get() == generation {
                visible.set(false);
            }
        });
        if let Err(err) = self.timer.schedule(self.duration_ms, clear) {
            // without a timer the flash would never go away
            error!("CollisionFlash: {:#?}", err);
            self.visible.set(false);
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    /// Last clip picked, kept after the flash clears
    pub fn clip(&self) -> Option<&str> {
        self.clip.as_deref()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ManualTimer;
    use super::*;

    #[test]
    fn flash_clears_when_timer_fires() {
        let timer = ManualTimer::default();
        let mut flash = CollisionFlash::new(3000, Box::new(timer.clone()));
        assert!(!flash.is_visible());

        flash.trigger(Some("clips/crash-2.mp4".into()));
        assert!(flash.is_visible());
        assert_eq!(timer.pending(), vec![3000]);

        timer.fire_oldest();
        assert!(!flash.is_visible());
        assert_eq!(flash.clip(), Some("clips/crash-2.mp4"));
    }

    #[test]
    fn stale_timer_keeps_newer_flash() {
        let timer = ManualTimer::default();
        let mut flash = CollisionFlash::new(3000, Box::new(timer.clone()));

        flash.trigger(None);
        flash.trigger(None);
        timer.fire_oldest();
        assert!(flash.is_visible());
        timer.fire_oldest();
        assert!(!flash.is_visible());
    }

    #[test]
    fn missing_timer_does_not_leave_flash_on() {
        let mut flash = CollisionFlash::new(3000, Box::new(ManualTimer::broken()));
        flash.trigger(None);
        assert!(!flash.is_visible());
    }
}
