//! Aim Trainer entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, MouseEvent, TouchEvent};

    use aim_trainer::audio::{AudioManager, SoundEffect};
    use aim_trainer::consts::COUNTDOWN_INTERVAL_MS;
    use aim_trainer::highscores::{format_relative_date, format_score};
    use aim_trainer::persistence::{Leaderboard, RemoteScore};
    use aim_trainer::platform::input::{mouse_to_surface, touch_to_surface};
    use aim_trainer::platform::{PlatformStore, now_ms};
    use aim_trainer::renderer::SdfRenderState;
    use aim_trainer::sim::{FinalStats, Session};
    use aim_trainer::{HighScores, Settings};

    /// Entries shown on each board
    const BOARD_ROWS: usize = 5;

    /// Which overlay is visible
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Screen {
        Start,
        Playing,
        GameOver,
    }

    /// Game instance holding all state
    struct Game {
        session: Session,
        render_state: Option<SdfRenderState>,
        audio: AudioManager,
        store: PlatformStore,
        settings: Settings,
        high_scores: HighScores,
        leaderboard: Leaderboard,
        screen: Screen,
        last_stats: Option<FinalStats>,
        canvas: HtmlCanvasElement,
        /// Play surface in CSS pixels
        surface: Vec2,
        /// `setInterval` callback and the handle of the running countdown
        tick_fn: Option<js_sys::Function>,
        countdown: Option<i32>,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(seed: u64, canvas: HtmlCanvasElement, surface: Vec2) -> Self {
            let store = PlatformStore::new();
            let settings = Settings::load(&store);
            let high_scores = HighScores::load(&store);
            let session =
                Session::new(seed, surface).with_duration(settings.effective_session_secs());
            let mut audio = AudioManager::new();
            audio.set_volume(settings.effective_volume());

            Self {
                session,
                render_state: None,
                audio,
                store,
                settings,
                high_scores,
                leaderboard: Leaderboard::from_build_env(),
                screen: Screen::Start,
                last_stats: None,
                canvas,
                surface,
                tick_fn: None,
                countdown: None,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        fn start_session(&mut self) {
            self.session.start(now_ms());
            self.last_stats = None;
            self.screen = Screen::Playing;
            self.start_countdown();
            self.show_screen();
            log::info!("Session started ({}s)", self.session.state().session_secs);
        }

        fn start_countdown(&mut self) {
            self.stop_countdown();
            let (Some(window), Some(tick_fn)) = (web_sys::window(), self.tick_fn.as_ref()) else {
                return;
            };
            match window.set_interval_with_callback_and_timeout_and_arguments_0(
                tick_fn,
                COUNTDOWN_INTERVAL_MS as i32,
            ) {
                Ok(handle) => self.countdown = Some(handle),
                Err(e) => log::error!("Failed to start countdown: {:?}", e),
            }
        }

        fn stop_countdown(&mut self) {
            if let (Some(window), Some(handle)) = (web_sys::window(), self.countdown.take()) {
                window.clear_interval_with_handle(handle);
            }
        }

        /// One countdown tick
        fn on_second(&mut self) {
            if let Some(stats) = self.session.tick_second() {
                self.finish(stats);
            }
        }

        fn finish(&mut self, stats: FinalStats) {
            self.stop_countdown();
            let rank = self.high_scores.record(&self.store, &stats, now_ms());
            if rank == Some(1) && stats.score > 0 {
                self.audio.play(SoundEffect::HighScore);
            }
            log::info!(
                "Session over: score {} accuracy {:.1}% max combo {} (rank {:?})",
                stats.score,
                stats.accuracy,
                stats.max_combo,
                rank
            );

            self.last_stats = Some(stats);
            self.screen = Screen::GameOver;
            self.show_game_over(&stats);
            self.show_screen();
            self.show_local_board();
        }

        /// Abort a running session and go back to the start screen
        fn quit_to_menu(&mut self) {
            if self.session.stop() {
                log::info!("Session stopped");
            }
            self.stop_countdown();
            self.screen = Screen::Start;
            self.show_screen();
            self.show_local_board();
        }

        fn handle_click(&mut self, point: Option<Vec2>) {
            if self.screen != Screen::Playing {
                return;
            }
            if let Some(point) = point {
                self.session.click(point);
            }
        }

        fn toggle_sound(&mut self) {
            let enabled = self.settings.toggle_sound();
            self.settings.save(&self.store);
            self.audio.set_volume(self.settings.effective_volume());
            self.update_sound_button();
            log::info!("Sound {}", if enabled { "on" } else { "off" });
        }

        /// Match the canvas backing store to its CSS size
        fn resize(&mut self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let dpr = window.device_pixel_ratio();
            let client_w = self.canvas.client_width();
            let client_h = self.canvas.client_height();
            if client_w <= 0 || client_h <= 0 {
                return;
            }
            let width = (client_w as f64 * dpr) as u32;
            let height = (client_h as f64 * dpr) as u32;
            self.canvas.set_width(width);
            self.canvas.set_height(height);

            self.surface = Vec2::new(client_w as f32, client_h as f32);
            self.session.set_surface(self.surface);
            if let Some(ref mut render_state) = self.render_state {
                render_state.resize(width, height, dpr as f32);
            }
        }

        /// Advance the session and play sounds for its events
        fn update(&mut self, time: f64) {
            self.session.frame(now_ms());
            for event in self.session.drain_events() {
                if let Some(effect) = SoundEffect::for_event(&event) {
                    self.audio.play(effect);
                }
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 && time > oldest_time {
                self.fps = (60000.0 / (time - oldest_time)).round() as u32;
            }
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(self.session.targets(), time) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        let (w, h) = render_state.size;
                        let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
                        render_state.resize(w, h, dpr as f32);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            if self.screen != Screen::Playing {
                return;
            }
            let Some(document) = document() else { return };
            let stats = self.session.live_stats();

            set_text(&document, "hud-score", &format!("Score: {}", stats.score));
            set_text(&document, "hud-time", &format!("Time: {}s", stats.time_left));
            set_text(
                &document,
                "hud-accuracy",
                &format!("Accuracy: {:.1}%", stats.accuracy),
            );
            set_text(&document, "hud-combo", &format!("Combo: {}x", stats.combo));

            set_hidden(&document, "hud-fps", !self.settings.show_fps);
            if self.settings.show_fps {
                set_text(&document, "hud-fps", &format!("{} fps", self.fps));
            }
        }

        fn update_sound_button(&self) {
            if let Some(document) = document() {
                let label = if self.settings.sound_enabled {
                    "🔊"
                } else {
                    "🔇"
                };
                set_text(&document, "sound-btn", label);
            }
        }

        fn show_screen(&self) {
            let Some(document) = document() else { return };
            set_hidden(&document, "start-screen", self.screen != Screen::Start);
            set_hidden(&document, "hud", self.screen != Screen::Playing);
            set_hidden(&document, "game-over", self.screen != Screen::GameOver);
        }

        fn show_game_over(&self, stats: &FinalStats) {
            let Some(document) = document() else { return };
            set_text(&document, "final-score", &format_score(stats.score));
            set_text(&document, "final-accuracy", &format!("{:.1}%", stats.accuracy));
            set_text(&document, "final-combo", &format!("{}x", stats.max_combo));
            set_text(
                &document,
                "final-hits",
                &format!("{}/{}", stats.hits, stats.total_clicks),
            );
            set_text(&document, "save-status", "");
            if let Some(btn) = document.get_element_by_id("save-global-btn") {
                if self.leaderboard.is_enabled() {
                    let _ = btn.remove_attribute("disabled");
                } else {
                    let _ = btn.set_attribute("disabled", "");
                }
            }
        }

        fn show_local_board(&self) {
            let Some(document) = document() else { return };
            let now = now_ms();
            let rows: Vec<String> = self
                .high_scores
                .entries
                .iter()
                .take(BOARD_ROWS)
                .enumerate()
                .map(|(i, e)| {
                    board_row(
                        i + 1,
                        e.score,
                        e.accuracy,
                        &format_relative_date(now, e.timestamp),
                    )
                })
                .collect();
            set_board(&document, "local-scores", &rows, "No scores yet");
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    fn board_row(rank: usize, score: u64, accuracy: f64, detail: &str) -> String {
        format!(
            "<div class=\"board-entry\"><span>#{}</span><span>{}</span><span>{:.1}%</span><span class=\"detail\">{}</span></div>",
            rank,
            format_score(score),
            accuracy,
            detail
        )
    }

    fn set_board(document: &Document, id: &str, rows: &[String], empty: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            if rows.is_empty() {
                el.set_inner_html(&format!("<div class=\"board-empty\">{}</div>", empty));
            } else {
                el.set_inner_html(&rows.concat());
            }
        }
    }

    fn show_global_board(rows: &[RemoteScore]) {
        let Some(document) = document() else { return };
        let rows: Vec<String> = rows
            .iter()
            .take(BOARD_ROWS)
            .enumerate()
            .map(|(i, r)| board_row(i + 1, r.score, r.accuracy, &format!("{}x", r.max_combo)))
            .collect();
        set_board(&document, "global-scores", &rows, "No global scores");
    }

    /// Fetch and show the global top scores in the background
    fn refresh_global_board(leaderboard: Leaderboard) {
        let Some(document) = document() else { return };
        if !leaderboard.is_enabled() {
            set_board(&document, "global-scores", &[], "Global leaderboard unavailable");
            return;
        }
        set_board(&document, "global-scores", &[], "Loading...");
        wasm_bindgen_futures::spawn_local(async move {
            let rows = leaderboard.fetch_top().await;
            show_global_board(&rows);
        });
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Aim Trainer starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        set_hidden(&document, "loading", true);

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

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let surface = Vec2::new(client_w as f32, client_h as f32);
        let game = Rc::new(RefCell::new(Game::new(seed, canvas.clone(), surface)));

        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU (WebGL2 fallback for browsers without it)
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

        let mut render_state =
            SdfRenderState::new(surface, &adapter, width, height, dpr as f32).await;
        render_state.set_start_time(js_sys::Date::now());
        game.borrow_mut().render_state = Some(render_state);

        setup_countdown(game.clone());
        setup_input_handlers(&canvas, game.clone());
        setup_buttons(game.clone());
        setup_resize(game.clone());

        {
            let g = game.borrow();
            g.show_screen();
            g.show_local_board();
            g.update_sound_button();
            refresh_global_board(g.leaderboard.clone());
        }

        // Start game loop
        request_animation_frame(game);

        log::info!("Aim Trainer running!");
    }

    /// Build the `setInterval` callback once; sessions reuse it
    fn setup_countdown(game: Rc<RefCell<Game>>) {
        let tick_game = game.clone();
        let closure = Closure::<dyn FnMut()>::new(move || {
            tick_game.borrow_mut().on_second();
        });
        let tick_fn: js_sys::Function = closure.into_js_value().unchecked_into();
        game.borrow_mut().tick_fn = Some(tick_fn);
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse press
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let point = mouse_to_surface(&event, &canvas_clone, g.surface);
                g.handle_click(point);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start (first touch only)
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                let point = touch_to_surface(&event, &canvas_clone, g.surface);
                g.handle_click(point);
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match (event.key().as_str(), g.screen) {
                    ("Escape", Screen::Playing) => g.quit_to_menu(),
                    (" " | "Enter", Screen::Start | Screen::GameOver) => g.start_session(),
                    ("m" | "M", _) => g.toggle_sound(),
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn on_click<F>(document: &Document, id: &str, mut handler: F)
    where
        F: FnMut() + 'static,
    {
        if let Some(btn) = document.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| handler());
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = document() else { return };

        {
            let game = game.clone();
            on_click(&document, "start-btn", move || game.borrow_mut().start_session());
        }
        {
            let game = game.clone();
            on_click(&document, "play-again-btn", move || {
                game.borrow_mut().start_session()
            });
        }
        {
            let game = game.clone();
            on_click(&document, "menu-btn", move || {
                let mut g = game.borrow_mut();
                g.quit_to_menu();
                refresh_global_board(g.leaderboard.clone());
            });
        }
        {
            let game = game.clone();
            on_click(&document, "sound-btn", move || game.borrow_mut().toggle_sound());
        }

        // Save to global leaderboard
        on_click(&document, "save-global-btn", move || {
            let (leaderboard, stats) = {
                let g = game.borrow();
                match g.last_stats {
                    Some(stats) => (g.leaderboard.clone(), stats),
                    None => return,
                }
            };
            let Some(document) = self::document() else { return };
            if let Some(btn) = document.get_element_by_id("save-global-btn") {
                let _ = btn.set_attribute("disabled", "");
            }
            set_text(&document, "save-status", "Saving...");

            wasm_bindgen_futures::spawn_local(async move {
                let saved = leaderboard.save(&stats).await;
                let message = if saved {
                    "Score saved to global leaderboard!"
                } else {
                    "Failed to save score. Please try again."
                };
                if let Some(document) = self::document() {
                    set_text(&document, "save-status", message);
                    if !saved {
                        if let Some(btn) = document.get_element_by_id("save-global-btn") {
                            let _ = btn.remove_attribute("disabled");
                        }
                    }
                }
                if saved {
                    refresh_global_board(leaderboard);
                }
            });
        });
    }

    fn setup_resize(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().resize();
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
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
            g.update(time);
            g.render(time);
            g.update_hud();
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
    use aim_trainer::highscores::{format_relative_date, format_score};
    use aim_trainer::platform::{PlatformStore, now_ms};
    use aim_trainer::{HighScores, Settings};

    env_logger::init();
    log::info!("Aim Trainer (native) starting...");
    log::info!("Native mode plays a headless bot session - run with `trunk serve` for the web version");

    let store = PlatformStore::new();
    let settings = Settings::load(&store);
    let seed = now_ms() as u64;

    let Some(stats) = headless::run_bot_session(seed, settings.effective_session_secs()) else {
        log::warn!("Session ended without final stats");
        return;
    };

    println!("\nSession over");
    println!("  Score:     {}", format_score(stats.score));
    println!("  Accuracy:  {:.1}%", stats.accuracy);
    println!("  Max combo: {}x", stats.max_combo);
    println!("  Hits:      {}/{}", stats.hits, stats.total_clicks);

    let mut high_scores = HighScores::load(&store);
    if let Some(rank) = high_scores.record(&store, &stats, now_ms()) {
        println!("  New local best #{rank}!");
    }

    println!("\nLocal best scores");
    let now = now_ms();
    for (i, entry) in high_scores.entries.iter().enumerate() {
        println!(
            "  #{:<2} {:>8}  {:>5.1}%  {}",
            i + 1,
            format_score(entry.score),
            entry.accuracy,
            format_relative_date(now, entry.timestamp)
        );
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// A bot playing one session against the threaded countdown
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::sync::mpsc::{self, RecvTimeoutError};
    use std::time::{Duration, Instant};

    use glam::Vec2;

    use aim_trainer::consts::{COUNTDOWN_INTERVAL_MS, TARGET_RADIUS};
    use aim_trainer::sim::{Countdown, FinalStats, GameEvent, Session, SharedSession};

    /// Simulated time runs this much faster than the wall clock
    const SPEEDUP: f64 = 10.0;
    /// Simulated ms the bot waits before shooting a new target
    const REACTION_MS: f64 = 350.0;
    /// Every Nth shot is pulled off target
    const MISS_EVERY: u32 = 6;
    const SURFACE: Vec2 = Vec2::new(1280.0, 720.0);

    pub fn run_bot_session(seed: u64, secs: u32) -> Option<FinalStats> {
        let shared = SharedSession::new(Session::new(seed, SURFACE).with_duration(secs));
        let origin = Instant::now();
        let sim_now = move || origin.elapsed().as_secs_f64() * 1000.0 * SPEEDUP;

        shared.start(sim_now());
        log::info!("Bot session started: {secs}s at {SPEEDUP}x speed, seed {seed}");

        let (end_tx, end_rx) = mpsc::channel();
        let interval = Duration::from_secs_f64(COUNTDOWN_INTERVAL_MS as f64 / 1000.0 / SPEEDUP);
        let countdown = Countdown::spawn(shared.clone(), interval, move |stats| {
            let _ = end_tx.send(stats);
        });

        let frame = Duration::from_secs_f64(1.0 / 60.0 / SPEEDUP);
        let mut shots = 0u32;
        let stats = loop {
            match end_rx.recv_timeout(frame) {
                Ok(stats) => break Some(stats),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break None,
            }

            let now = sim_now();
            let aim = {
                let mut session = shared.lock();
                session.frame(now);
                session
                    .targets()
                    .iter()
                    .find(|t| now - t.created_ms >= REACTION_MS)
                    .map(|t| t.pos)
            };

            if let Some(pos) = aim {
                shots += 1;
                let point = if shots % MISS_EVERY == 0 {
                    pos + Vec2::new(TARGET_RADIUS * 3.0, 0.0)
                } else {
                    pos
                };
                shared.click(point);
            }

            log_events(&shared);
        };

        countdown.cancel();
        log_events(&shared);
        stats
    }

    fn log_events(shared: &SharedSession) {
        for event in shared.drain_events() {
            match event {
                GameEvent::Hit { points, combo, .. } => {
                    log::debug!("Hit +{points} (combo {combo})")
                }
                GameEvent::Miss => log::debug!("Miss"),
                GameEvent::Ended(stats) => log::info!("Ended: {:?}", stats),
                other => log::trace!("{:?}", other),
            }
        }
    }
}
