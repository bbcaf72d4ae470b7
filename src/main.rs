//! Arena Survivor headless runner
//!
//! Plays a scripted run against the simulation core, saving progress and
//! scores to a local save directory.
//!
//! Usage: `arena-survivor [--seed N] [--seconds S] [--tuning FILE] [--save-dir DIR]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::error::Error;
    use std::path::PathBuf;

    use clap::Parser;
    use glam::Vec2;

    use arena_survivor::highscores::{ScoreRecord, format_age};
    use arena_survivor::persistence::{JsonStore, ProgressRecord, unix_time_ms};
    use arena_survivor::sim::{
        Announcement, GameState, Hooks, ItemKind, TickInput, arena, items, progression, tick,
    };
    use arena_survivor::{Leaderboard, Tuning};

    const FRAME_DT: f32 = 1.0 / 60.0;

    /// Play a scripted run against the simulation core
    #[derive(Debug, Parser)]
    #[command(author, version, about, long_about = None)]
    struct Options {
        /// Run seed
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Time limit in in-game seconds
        #[arg(long, default_value_t = 180.0)]
        seconds: f32,
        /// Balance JSON overriding the defaults
        #[arg(long)]
        tuning: Option<PathBuf>,
        /// Directory holding progress and the leaderboard
        #[arg(long, default_value = "save")]
        save_dir: PathBuf,
    }

    /// Collaborator backed by the JSON save directory
    struct StoreHooks {
        store: JsonStore,
        board: Leaderboard,
        rank: Option<usize>,
    }

    impl Hooks for StoreHooks {
        fn announce(&mut self, announcement: Announcement) {
            log::debug!("{:?}", announcement);
        }

        fn save_progress(&mut self, record: &ProgressRecord) {
            if let Err(e) = self.store.save_progress(record) {
                log::warn!("Failed to save progress: {}", e);
            }
        }

        fn submit_score(&mut self, record: &ScoreRecord) {
            self.rank = self.board.add(record.clone());
            if let Err(e) = self.store.save_leaderboard(&self.board) {
                log::warn!("Failed to save leaderboard: {}", e);
            }
        }
    }

    /// Circle the arena center, shopping and using items along the way
    fn scripted_input(state: &mut GameState, frame: u64) -> TickInput {
        let angle = frame as f32 * FRAME_DT * 0.6;
        let mut input = TickInput {
            move_dir: Vec2::new(-angle.sin(), angle.cos()),
            ..Default::default()
        };

        for item in [ItemKind::Shockwave, ItemKind::RapidFire] {
            if items::buy_item(state, item).is_ok() {
                log::info!("Bought {:?}", item);
            }
        }

        let health_ratio = state.player.health as f32 / state.player.max_health as f32;
        if health_ratio < 0.4 && state.inventory.count(ItemKind::Heal50) == 0 {
            match items::buy_item(state, ItemKind::Heal50) {
                Ok(()) => log::info!("Bought {:?}", ItemKind::Heal50),
                Err(e) => log::debug!("Skipped heal: {}", e),
            }
        }
        input.use_item = if health_ratio < 0.4 && state.inventory.count(ItemKind::Heal50) > 0 {
            Some(ItemKind::Heal50)
        } else if state.alive_enemy_count() >= 12 && state.inventory.count(ItemKind::Shockwave) > 0
        {
            Some(ItemKind::Shockwave)
        } else if state.alive_enemy_count() >= 6 && state.inventory.count(ItemKind::RapidFire) > 0
        {
            Some(ItemKind::RapidFire)
        } else {
            None
        };
        input
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        let opts = Options::parse();
        let tuning = match &opts.tuning {
            Some(path) => Tuning::load(path)?,
            None => Tuning::default(),
        };

        let store = JsonStore::new(&opts.save_dir);
        let board = store.load_leaderboard()?;
        let mut state = GameState::with_world(opts.seed, tuning, arena::standard_arena());
        match store.load_progress() {
            Ok(Some(record)) => progression::apply_progress(&mut state, &record),
            Ok(None) => log::info!("No saved progress in {}", store.dir().display()),
            Err(e) => log::warn!("Ignoring unreadable progress: {}", e),
        }

        let mut hooks = StoreHooks {
            store,
            board,
            rank: None,
        };

        let frames = (opts.seconds.max(0.0) / FRAME_DT).ceil() as u64;
        for frame in 0..frames {
            let input = scripted_input(&mut state, frame);
            tick(&mut state, &mut hooks, &input, FRAME_DT);
            if state.is_over() {
                break;
            }
            if frame % 600 == 0 {
                log::info!(
                    "t={:.0}s score={} kills={} hp={} enemies={} level={}",
                    state.now_ms() / 1000.0,
                    state.scoring.score,
                    state.scoring.kills,
                    state.player.health,
                    state.alive_enemy_count(),
                    state.progression.level
                );
            }
        }

        hooks.save_progress(&ProgressRecord::from_state(&state));

        println!(
            "Run finished: score={} kills={} level={} survived={:.1} min{}",
            state.scoring.score,
            state.scoring.kills,
            state.progression.level,
            state.minutes(),
            if state.is_over() { "" } else { " (time limit)" }
        );
        if let Some(rank) = hooks.rank {
            println!("Leaderboard rank: #{}", rank);
        }
        let now = unix_time_ms();
        for (i, entry) in hooks.board.entries.iter().take(5).enumerate() {
            println!(
                "{:>2}. {:>8}  {:>4} kills  Lv {:<3} {}",
                i + 1,
                entry.score,
                entry.kills,
                entry.level,
                format_age(entry.timestamp_ms, now)
            );
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Arena Survivor (native) starting...");

    if let Err(e) = native::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is driven by the embedding front end on the web
}
