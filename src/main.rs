//! Flappy Arcade entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::fmt::Write;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, KeyboardEvent, PointerEvent};

    use flappy_arcade::audio::AudioManager;
    use flappy_arcade::consts::SIM_DT;
    use flappy_arcade::highscores::{
        Leaderboard, LeaderboardEntry, format_age, rank_label, short_address,
    };
    use flappy_arcade::platform;
    use flappy_arcade::session::encouragement;
    use flappy_arcade::sim::Phase;
    use flappy_arcade::submission::{MockEndpoint, ScoreEndpoint, SubmissionStatus};
    use flappy_arcade::{Session, Settings, Tuning};

    /// Game instance holding all state
    struct Game {
        session: Session,
        settings: Settings,
        audio: AudioManager,
        endpoint: Rc<MockEndpoint>,
        /// Connected wallet address
        player: Option<String>,
        last_time: f64,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(settings: Settings) -> Self {
            let tuning = Tuning::with_policy(settings.policy);
            let seed = platform::run_seed();
            Self {
                session: Session::new(tuning, seed),
                audio: AudioManager::new(settings.mixer()),
                settings,
                endpoint: Rc::new(MockEndpoint::new(Leaderboard::load())),
                player: None,
                last_time: 0.0,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32, time: f64) {
            let events = self.session.update(dt);
            self.audio.play_events(&events);

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Space / tap: flap while playing, otherwise start a run
        fn primary_action(&mut self) {
            self.audio.resume();
            let events = match self.session.phase() {
                Phase::Playing => {
                    self.session.request_jump();
                    Vec::new()
                }
                Phase::Idle => self.session.start(),
                Phase::GameOver => {
                    self.session.reset();
                    self.session.start()
                }
                Phase::Countdown => Vec::new(),
            };
            self.audio.play_events(&events);
        }

        fn toggle_mute(&mut self) {
            let muted = self.settings.toggle_mute();
            self.audio.mixer.set_muted(muted);
            self.settings.save();
            log::info!("Muted: {}", muted);
        }

        fn render_world(&self, document: &Document) {
            let state = self.session.state();
            let tuning = self.session.tuning();

            if let Some(el) = document.get_element_by_id("bird") {
                let tilt = if self.settings.reduced_motion {
                    0.0
                } else {
                    (state.bird.velocity * 6.0).clamp(-25.0, 60.0)
                };
                let _ = el.set_attribute(
                    "style",
                    &format!(
                        "left:{}px;top:{}px;width:{}px;height:{}px;transform:rotate({}deg)",
                        tuning.bird_x, state.bird.y, tuning.bird_size, tuning.bird_size, tilt
                    ),
                );
            }

            if let Some(el) = document.get_element_by_id("world") {
                let mut html = String::new();
                for o in &state.obstacles {
                    let _ = write!(
                        html,
                        "<div class=\"pipe top\" style=\"left:{}px;width:{}px;height:{}px\"></div>\
                         <div class=\"pipe bottom\" style=\"left:{}px;width:{}px;top:{}px\"></div>",
                        o.x, tuning.obstacle_width, o.gap_top, o.x, tuning.obstacle_width, o.gap_bottom
                    );
                }
                for c in state.collectibles.iter().filter(|c| !c.collected) {
                    let _ = write!(
                        html,
                        "<div class=\"coin\" style=\"left:{}px;top:{}px;width:{}px;height:{}px\"></div>",
                        c.x, c.y, tuning.coin_size, tuning.coin_size
                    );
                }
                el.set_inner_html(&html);
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, document: &Document) {
            let state = self.session.state();

            set_text(document, "hud-score", &state.score.to_string());
            set_text(document, "hud-high", &state.high_score.to_string());
            set_text(document, "hud-fps", &self.fps.to_string());
            set_visible(document, "hud-fps", self.settings.show_fps);

            set_visible(document, "start-prompt", state.phase == Phase::Idle);
            set_visible(document, "countdown", state.phase == Phase::Countdown);
            if state.phase == Phase::Countdown {
                set_text(document, "countdown", &state.countdown_ticks.to_string());
            }

            set_visible(document, "game-over", state.phase == Phase::GameOver);
            if let Some(result) = self.session.last_result() {
                set_text(document, "final-score", &result.score.to_string());
                set_text(document, "final-message", encouragement(result.score));
                set_visible(document, "new-record", result.new_record);
                let rank = self.endpoint.board().potential_rank(result.score);
                let hint = rank.map(|r| format!("Would rank {}", rank_label(r)));
                set_text(document, "rank-hint", hint.as_deref().unwrap_or(""));
            }
            set_visible(
                document,
                "submit-btn",
                self.player.is_some() && !self.session.submission.is_submitting(),
            );

            let status = match &self.session.submission.status {
                SubmissionStatus::NotSubmitted if self.player.is_none() => {
                    "Connect wallet to submit".to_string()
                }
                SubmissionStatus::NotSubmitted => "Submit score".to_string(),
                SubmissionStatus::Submitting => "Submitting...".to_string(),
                SubmissionStatus::Submitted(s) => format!("Submitted ({})", short_address(&s.receipt)),
                SubmissionStatus::Failed(reason) => format!("Failed: {}", reason),
            };
            set_text(document, "submit-status", &status);

            if let Some(player) = &self.player {
                set_text(document, "wallet", &short_address(player));
                let best = self.endpoint.board().best_for(player).unwrap_or(0);
                set_text(document, "wallet-best", &best.to_string());
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", !visible);
        }
    }

    fn render_leaderboard(entries: &[LeaderboardEntry]) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let Some(el) = document.get_element_by_id("leaderboard") else {
            return;
        };
        let now = platform::now_ms();
        let mut html = String::new();
        for (i, e) in entries.iter().enumerate() {
            let _ = write!(
                html,
                "<li><span>{}</span><span>{}</span><span>{}</span><span>{}</span></li>",
                rank_label(i + 1),
                short_address(&e.player),
                e.score,
                format_age(now, e.timestamp)
            );
        }
        el.set_inner_html(&html);
    }

    fn refresh_leaderboard(endpoint: Rc<MockEndpoint>) {
        wasm_bindgen_futures::spawn_local(async move {
            let entries = endpoint.leaderboard().await;
            render_leaderboard(&entries);
        });
    }

    /// Hand the finished run to the endpoint without blocking the loop
    fn submit(game: Rc<RefCell<Game>>) {
        let (endpoint, player, pending) = {
            let mut g = game.borrow_mut();
            let state = g.session.state().clone();
            let player = g.player.clone();
            match g.session.submission.begin(&state, player.as_deref()) {
                Ok(pending) => (g.endpoint.clone(), player.unwrap_or_default(), pending),
                Err(e) => {
                    log::warn!("Score submission refused: {}", e);
                    return;
                }
            }
        };

        wasm_bindgen_futures::spawn_local(async move {
            let result = endpoint.submit(&player, pending.score).await;
            let accepted = game.borrow_mut().session.submission.finish(pending, result);
            if accepted {
                endpoint.board().save();
                refresh_leaderboard(endpoint);
            }
        });
    }

    fn connect_wallet(game: &Rc<RefCell<Game>>) {
        let address = format!(
            "0x{:016x}{:016x}{:08x}",
            rand::random::<u64>(),
            rand::random::<u64>(),
            rand::random::<u32>()
        );
        log::info!("Wallet connected: {}", short_address(&address));
        game.borrow_mut().player = Some(address);
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {}", e).into());
        }

        log::info!("Flappy Arcade starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document, not starting");
            return;
        };

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let game = Rc::new(RefCell::new(Game::new(Settings::load())));
        log::info!("Game initialized with seed: {:#x}", game.borrow().session.seed());

        refresh_leaderboard(game.borrow().endpoint.clone());
        setup_input_handlers(game.clone());
        setup_buttons(game.clone());
        setup_lifecycle(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Flappy Arcade running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.repeat() {
                    return;
                }
                let mut g = game.borrow_mut();
                match event.code().as_str() {
                    "Space" | "ArrowUp" | "Enter" => {
                        event.prevent_default();
                        g.primary_action();
                    }
                    "KeyM" => g.toggle_mute(),
                    "KeyF" => {
                        g.settings.show_fps = !g.settings.show_fps;
                        g.settings.save();
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse/touch/pen on the play field
        if let Some(field) = window.document().and_then(|d| d.get_element_by_id("game")) {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                game.borrow_mut().primary_action();
            });
            let _ = field
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("connect-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                connect_wallet(&game);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("submit-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                submit(game.clone());
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("play-again-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.session.reset();
                let events = g.session.start();
                g.audio.play_events(&events);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_lifecycle(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Tab hidden: forget the frame clock so the return frame is not one huge step
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().last_time = 0.0;
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Page going away: stop the loop for good
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().session.halt();
            });
            let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
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
            if g.session.is_halted() {
                log::info!("Game loop stopped");
                return;
            }

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt, time);
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.render_world(&document);
                g.update_hud(&document);
            }
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
    log::info!("Flappy Arcade (native) starting...");
    log::info!("Native mode runs a headless demo - build for wasm32 to play");

    let tuning = match std::env::args().nth(1) {
        Some(path) => match load_tuning(&path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Could not load tuning from {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => flappy_arcade::Tuning::default(),
    };

    demo::run(tuning);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn load_tuning(path: &str) -> Result<flappy_arcade::Tuning, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    Ok(flappy_arcade::Tuning::from_json(&json)?)
}

/// Autopiloted run, score submission and leaderboard printout
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::future::Future;
    use std::pin::pin;
    use std::task::{Context, Poll, Waker};

    use flappy_arcade::consts::SIM_DT;
    use flappy_arcade::highscores::{Leaderboard, format_age, rank_label, short_address};
    use flappy_arcade::platform;
    use flappy_arcade::session::encouragement;
    use flappy_arcade::sim::{Phase, SimEvent, SimState};
    use flappy_arcade::submission::{MockEndpoint, ScoreEndpoint, submit_score};
    use flappy_arcade::{Session, Tuning};

    const DEMO_PLAYER: &str = "0xdemo00000000000000000000000000000000beef";
    /// Give up after two minutes of play
    const MAX_FRAMES: u32 = 60 * 120;

    /// The mock endpoint never suspends
    fn poll_ready<F: Future>(fut: F) -> Option<F::Output> {
        let mut fut = pin!(fut);
        match fut.as_mut().poll(&mut Context::from_waker(Waker::noop())) {
            Poll::Ready(v) => Some(v),
            Poll::Pending => None,
        }
    }

    /// Flap when the bird sinks below the next gap's center
    fn wants_jump(state: &SimState, tuning: &Tuning) -> bool {
        let Some(next) = state
            .obstacles
            .iter()
            .find(|o| o.x + tuning.obstacle_width > tuning.bird_x)
        else {
            return state.bird.y > tuning.bird_start_y && state.bird.velocity > 0.0;
        };
        let target = next.gap_center() - tuning.bird_size / 2.0;
        state.bird.y > target + 10.0 && state.bird.velocity > 0.0
    }

    pub fn run(tuning: Tuning) {
        let mut session = Session::new(tuning, platform::run_seed());
        session.start();

        let mut frames = 0;
        while session.phase() != Phase::GameOver && frames < MAX_FRAMES {
            if session.phase() == Phase::Playing && wants_jump(session.state(), session.tuning()) {
                session.request_jump();
            }
            for event in session.update(SIM_DT) {
                match event {
                    SimEvent::CountdownTick { remaining } => log::info!("{}...", remaining),
                    SimEvent::GameStarted => log::info!("Go!"),
                    SimEvent::Collected { total, .. } => log::info!("Coin! score {}", total),
                    SimEvent::Scored { total, .. } => log::info!("Passed! score {}", total),
                    SimEvent::Collided { cause } => log::info!("Hit {:?}", cause),
                    SimEvent::Jumped | SimEvent::GameOverReached { .. } => {}
                }
            }
            frames += 1;
        }
        session.halt();

        let score = session.state().score;
        println!("\nFinal score: {}", score);
        println!("{}", encouragement(score));
        if session.last_result().is_some_and(|r| r.new_record) {
            println!("New high score!");
        }

        let endpoint = MockEndpoint::new(Leaderboard::sample(platform::now_ms()));
        let state = session.state().clone();
        let submitted = poll_ready(submit_score(
            &endpoint,
            &mut session.submission,
            &state,
            Some(DEMO_PLAYER),
        ))
        .unwrap_or(false);
        if !submitted {
            println!("Score not submitted");
        }

        let now = platform::now_ms();
        println!("\nLeaderboard");
        for (i, entry) in poll_ready(endpoint.leaderboard())
            .unwrap_or_default()
            .iter()
            .enumerate()
        {
            println!(
                "{:>4}  {:<14} {:>5}  {}",
                rank_label(i + 1),
                short_address(&entry.player),
                entry.score,
                format_age(now, entry.timestamp)
            );
        }
    }
}
