use crate::bird::InputState;
use crate::browser;
use crate::config::GameConfig;
use crate::effect::{BrowserTimer, CollisionFlash, EffectTimer};
use crate::engine::input::KeyState;
use crate::engine::{self, Game, Point, Rect, Renderer};
use crate::round::{Event, RoundStateMachine, RoundSummary};
use crate::score::{CookieStore, ScoreStore};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::join;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use web_sys::HtmlImageElement;

/// TABLE
/// ┌───────────────────── Game Architecture Overview ────────────────────────┐
/// │                                                                         │
/// │    ┌─────────────┐          ┌─────────────┐          ┌─────────────┐    │
/// │    │  engine.rs  │  update  │   game.rs   │transition│   round/    │    │
/// │    │  GameLoop   ├─────────►│   Flight    ├─────────►│ StateMachine│    │
/// │    │  FixedStep  │          │  update()   │          │  tick()     │    │
/// │    └──────┬──────┘          └──────┬──────┘          └──────┬──────┘    │
/// │           │                        │                        │           │
/// │     ┌─────┴──────┐          ┌──────┴──────┐        ┌────────┴───────┐   │
/// │     │  KeyState  │          │ ScoreStore  │        │ obstacle, bird │   │
/// │     │  snapshot  │          │ Flash timer │        │ collision      │   │
/// │     └────────────┘          └─────────────┘        └────────────────┘   │
/// │                                                                         │
/// ├──────────────────────── Call Sequence (one step) ───────────────────────┤
/// │  1. click while idle      → Event::Start                                │
/// │  2. held keys             → Event::Tick(InputState)                     │
/// │     └─► obstacle → bird → collision                                     │
/// │  3. round ended           → save best, flash, pick clip                 │
/// └─────────────────────────────────────────────────────────────────────────┘
pub enum Flappy {
    /// Config and images still loading
    Loading,

    Loaded(Box<Stage>),
}

impl Flappy {
    const CONFIG_PATH: &'static str = "flappy.json";

    pub fn new() -> Self {
        Flappy::Loading
    }

    async fn load_config() -> GameConfig {
        let config = match browser::fetch_json::<GameConfig>(Self::CONFIG_PATH).await {
            Ok(config) => config,
            Err(err) => {
                log!("Using default config, {} not loaded : {:#}", Self::CONFIG_PATH, err);
                GameConfig::default()
            }
        };
        match config.validate() {
            Ok(()) => config,
            Err(err) => {
                error!("Invalid {}, using defaults : {:#}", Self::CONFIG_PATH, err);
                GameConfig::default()
            }
        }
    }

    async fn load_sprite(path: &str) -> Result<HtmlImageElement> {
        engine::load_image(path)
            .await
            .with_context(|| format!("Failed to load sprite image from : {}", path))
    }
}

impl Default for Flappy {
    fn default() -> Self {
        Flappy::new()
    }
}

#[async_trait(?Send)]
impl Game for Flappy {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            Flappy::Loading => {
                let config = Self::load_config().await;
                // images load in parallel, total time is the slowest one
                let (background, bird, obstacle) = join!(
                    Self::load_sprite(&config.assets.background),
                    Self::load_sprite(&config.assets.bird),
                    Self::load_sprite(&config.assets.obstacle),
                );
                let sprites = Sprites {
                    background: background?,
                    bird: bird?,
                    obstacle: obstacle?,
                };
                let store = CookieStore::new(&config.score_cookie);
                let flight = Flight::new(
                    config,
                    Box::new(store),
                    Box::new(BrowserTimer),
                    Box::new(StdRng::from_entropy()),
                );
                Ok(Box::new(Flappy::Loaded(Box::new(Stage { flight, sprites }))))
            }
            Flappy::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn update(&mut self, keystate: &KeyState) {
        if let Flappy::Loaded(stage) = self {
            stage.flight.update(keystate);
        }
    }

    fn draw(&self, renderer: &Renderer) {
        if let Flappy::Loaded(stage) = self {
            stage.draw(renderer);
        }
    }

    fn step_ms(&self) -> f64 {
        match self {
            Flappy::Loaded(stage) => stage.flight.config().tick_ms,
            Flappy::Loading => engine::DEFAULT_STEP_MS,
        }
    }
}

pub struct Sprites {
    background: HtmlImageElement,
    bird: HtmlImageElement,
    obstacle: HtmlImageElement,
}

pub struct Stage {
    flight: Flight,
    sprites: Sprites,
}

impl Stage {
    fn draw(&self, renderer: &Renderer) {
        let view = self.flight.view();
        let field = Rect::from_xywh(0, 0, view.field_width, view.field_height);

        // background -> obstacles and bird -> HUD -> flash
        renderer.clear(&field);
        renderer.draw_image(&self.sprites.background, &field);
        renderer.draw_image_flipped(
            &self.sprites.obstacle,
            &Rect::from_xywh(view.obstacle_left, 0, view.obstacle_width, view.top_height),
        );
        renderer.draw_image(
            &self.sprites.bird,
            &Rect::from_xywh(view.bird_left, view.bird_top, view.bird_width, view.bird_height),
        );
        renderer.draw_image(
            &self.sprites.obstacle,
            &Rect::from_xywh(
                view.obstacle_left,
                view.bottom_top,
                view.obstacle_width,
                view.bottom_height,
            ),
        );

        renderer.draw_text(
            &format!("Score: {}    Highest: {}", view.score, view.best_score),
            &Point {
                x: view.field_width - 320,
                y: 36,
            },
            "bold 20px Arial",
            "white",
        );

        if !view.running {
            let board = Rect::from_xywh(
                view.field_width / 2 - 110,
                view.field_height / 2 - 35,
                220,
                70,
            );
            renderer.fill_rect(&board, "rgba(0, 0, 0, 0.7)");
            renderer.draw_text(
                "Click To Start",
                &Point {
                    x: board.position.x + 38,
                    y: board.position.y + 43,
                },
                "bold 22px Arial",
                "white",
            );
        }

        if view.flash {
            renderer.fill_rect(&field, "white");
        }
    }
}

/// What the rendering surface needs for one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameView {
    pub field_width: i32,
    pub field_height: i32,
    pub bird_left: i32,
    pub bird_top: i32,
    pub bird_width: i32,
    pub bird_height: i32,
    pub obstacle_left: i32,
    pub obstacle_width: i32,
    pub top_height: i32,
    pub bottom_top: i32,
    pub bottom_height: i32,
    pub score: u32,
    pub best_score: u32,
    pub running: bool,
    pub flash: bool,
    pub clip: Option<String>,
}

/// The playable game without any DOM: round machine plus its collaborators
pub struct Flight {
    config: GameConfig,
    machine: RoundStateMachine,
    store: Box<dyn ScoreStore>,
    flash: CollisionFlash,
    rng: Box<dyn RngCore>,
}

impl Flight {
    pub fn new(
        config: GameConfig,
        store: Box<dyn ScoreStore>,
        timer: Box<dyn EffectTimer>,
        rng: Box<dyn RngCore>,
    ) -> Self {
        let best_score = store.load().unwrap_or(0);
        log!("Loaded best score {}", best_score);
        let machine = RoundStateMachine::new(&config, best_score);
        let flash = CollisionFlash::new(config.effect_ms, timer);
        Flight {
            config,
            machine,
            store,
            flash,
            rng,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.machine.is_running()
    }

    /// One fixed step of the game loop. A click while idle only starts the
    /// round, the first tick runs on the next step.
    pub fn update(&mut self, keystate: &KeyState) -> Option<RoundSummary> {
        if keystate.clicked() && !self.is_running() {
            self.start();
            return None;
        }
        self.tick(InputState::from_keys(keystate, &self.config.keys))
    }

    /// Ignored unless idle
    pub fn start(&mut self) {
        if !self.machine.is_running() {
            self.apply(Event::Start);
            log!("Round started");
        }
    }

    pub fn tick(&mut self, input: InputState) -> Option<RoundSummary> {
        let summary = self.apply(Event::Tick(input))?;
        self.on_round_end(&summary);
        Some(summary)
    }

    fn apply(&mut self, event: Event) -> Option<RoundSummary> {
        let (machine, summary) = self.machine.transition(event, &self.config, &mut *self.rng);
        self.machine = machine;
        summary
    }

    fn on_round_end(&mut self, summary: &RoundSummary) {
        log!(
            "Round ended by {:?} with score {} (best {})",
            summary.cause,
            summary.score,
            summary.best_score
        );
        if summary.new_best {
            if let Err(err) = self.store.save(summary.best_score) {
                error!("Could not save best score {} : {:#}", summary.best_score, err);
            }
        }
        let clip = self.pick_clip();
        self.flash.trigger(clip);
    }

    fn pick_clip(&mut self) -> Option<String> {
        if self.config.clips.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..self.config.clips.len());
        self.config.clips.get(index).cloned()
    }

    pub fn view(&self) -> FrameView {
        let config = &self.config;
        let context = self.machine.context();
        let obstacle = context.obstacle;
        FrameView {
            field_width: config.field.width,
            field_height: config.field.height,
            bird_left: config.bird.left,
            bird_top: context.bird.position,
            bird_width: config.bird.width,
            bird_height: config.bird.height,
            obstacle_left: obstacle.position,
            obstacle_width: config.obstacle_width,
            top_height: obstacle.top_height(),
            bottom_top: obstacle.bottom_top(config),
            bottom_height: obstacle.bottom_height(config),
            score: context.score,
            best_score: context.best_score,
            running: self.machine.is_running(),
            flash: self.flash.is_visible(),
            clip: self.flash.clip().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::Collision;
    use crate::effect::testing::ManualTimer;
    use crate::score::testing::MemoryStore;
    use rand_chacha::ChaCha8Rng;

    fn flight_with(config: GameConfig, store: MemoryStore, timer: ManualTimer) -> Flight {
        Flight::new(
            config,
            Box::new(store),
            Box::new(timer),
            Box::new(ChaCha8Rng::seed_from_u64(11)),
        )
    }

    fn flight(store: MemoryStore, timer: ManualTimer) -> Flight {
        flight_with(GameConfig::default(), store, timer)
    }

    /// Collision window out of the obstacle's reach, only walls can end a round
    fn walls_only() -> GameConfig {
        GameConfig {
            bird: crate::config::BirdConfig {
                width: 5_000,
                ..Default::default()
            },
            ..GameConfig::default()
        }
    }

    fn hold(code: &str) -> KeyState {
        let mut keystate = KeyState::new();
        keystate.set_pressed(code);
        keystate
    }

    fn click() -> KeyState {
        let mut keystate = KeyState::new();
        keystate.click();
        keystate
    }

    /// Holds `code` until the round ends
    fn crash(flight: &mut Flight, code: &str) -> RoundSummary {
        let keystate = hold(code);
        for _ in 0..1_000 {
            if let Some(summary) = flight.update(&keystate) {
                return summary;
            }
        }
        panic!("round never ended");
    }

    /// Ticks without input until the obstacle has been recycled `points` times
    fn score(flight: &mut Flight, points: u32) {
        for _ in 0..10_000 {
            assert!(flight.tick(InputState::default()).is_none());
            if flight.view().score == points {
                return;
            }
        }
        panic!("never reached {} points", points);
    }

    #[test]
    fn best_score_is_loaded_from_store() {
        let flight = flight(MemoryStore::new(Some(17)), ManualTimer::default());
        let view = flight.view();
        assert_eq!(view.best_score, 17);
        assert_eq!(view.score, 0);
        assert!(!view.running);
        assert!(!view.flash);
    }

    #[test]
    fn ticks_do_nothing_before_click() {
        let mut flight = flight(MemoryStore::default(), ManualTimer::default());
        let before = flight.view();
        assert!(flight.update(&hold("KeyW")).is_none());
        assert_eq!(flight.view(), before);
    }

    #[test]
    fn click_starts_a_round() {
        let mut flight = flight(MemoryStore::default(), ManualTimer::default());
        assert!(flight.update(&click()).is_none());
        let view = flight.view();
        assert!(view.running);
        assert_eq!(view.score, 0);
        assert_eq!(view.bird_top, 275);
        assert!(view.top_height < 600 - 80);
    }

    #[test]
    fn crash_recentres_and_flashes() {
        let timer = ManualTimer::default();
        let mut flight = flight(MemoryStore::new(Some(5)), timer.clone());
        flight.update(&click());

        let summary = crash(&mut flight, "KeyW");
        assert!(!summary.new_best);

        let view = flight.view();
        assert!(!view.running);
        assert_eq!(view.bird_top, 275);
        assert_eq!(view.score, 0);
        assert_eq!(view.best_score, 5);
        assert!(view.flash);
        assert!(view.clip.is_some());
        assert_eq!(timer.pending(), vec![3000]);

        timer.fire_oldest();
        assert!(!flight.view().flash);
    }

    #[test]
    fn holding_up_hits_the_ceiling() {
        let mut flight = flight_with(walls_only(), MemoryStore::default(), ManualTimer::default());
        flight.update(&click());
        let summary = crash(&mut flight, "KeyW");
        assert_eq!(summary.cause, Collision::Wall);
    }

    #[test]
    fn low_score_does_not_overwrite_stored_best() {
        let store = MemoryStore::new(Some(5));
        let mut flight = flight_with(walls_only(), store.clone(), ManualTimer::default());
        flight.update(&click());
        score(&mut flight, 2);
        let summary = crash(&mut flight, "KeyS");
        assert_eq!(summary.score, 2);
        assert!(!summary.new_best);
        assert_eq!(store.value(), Some(5));
    }

    #[test]
    fn new_best_is_saved() {
        let store = MemoryStore::new(None);
        let mut flight = flight_with(walls_only(), store.clone(), ManualTimer::default());
        flight.update(&click());
        score(&mut flight, 3);

        let summary = crash(&mut flight, "KeyW");
        assert!(summary.new_best);
        assert_eq!(summary.score, 3);
        assert_eq!(store.value(), Some(3));
        assert_eq!(flight.view().best_score, 3);
    }

    #[test]
    fn failed_save_still_ends_the_round() {
        let store = MemoryStore::read_only(Some(0));
        let mut flight = flight_with(walls_only(), store.clone(), ManualTimer::default());
        flight.update(&click());
        score(&mut flight, 1);

        let summary = crash(&mut flight, "KeyW");
        assert!(summary.new_best);
        assert!(!flight.is_running());
        assert_eq!(flight.view().best_score, 1);
        assert_eq!(store.value(), Some(0));
    }

    #[test]
    fn next_round_starts_from_zero() {
        let mut flight = flight_with(walls_only(), MemoryStore::default(), ManualTimer::default());
        flight.update(&click());
        score(&mut flight, 1);
        crash(&mut flight, "KeyW");

        flight.update(&click());
        let view = flight.view();
        assert!(view.running);
        assert_eq!(view.score, 0);
        assert_eq!(view.best_score, 1);
    }

    #[test]
    fn view_derives_bottom_segment_from_gap() {
        let mut flight = flight(MemoryStore::default(), ManualTimer::default());
        flight.update(&click());
        let view = flight.view();
        assert_eq!(view.bottom_height, 600 - 80 - view.top_height);
        assert_eq!(view.bottom_top, 600 - view.bottom_height);
        assert_eq!(view.bird_left, 100);
    }
}
