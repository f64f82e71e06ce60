use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::text_view::TextPresenter;
use gridjig_core::{Gesture, MoveReport, Presenter};

#[derive(clap::Subcommand)]
pub(super) enum BotCommand {
    /// Plays a level with random drags, mixing in hints.
    Run {
        #[arg(long, default_value_t = 0)]
        level: usize,
        /// Deal seed, hex (0x..) or decimal.
        #[arg(long)]
        deal_seed: Option<String>,
        /// Seed for the bot's own choices.
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 500)]
        max_moves: u32,
        #[arg(long, default_value_t = 0.25)]
        hint_rate: f64,
        #[arg(long, default_value_t = 0.05)]
        tap_rate: f64,
        #[arg(long)]
        verbose: bool,
    },
}

pub(super) fn run(
    catalog: &LevelCatalog,
    command: BotCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        BotCommand::Run {
            level,
            deal_seed,
            seed,
            max_moves,
            hint_rate,
            tap_rate,
            verbose,
        } => {
            let config = BotRunConfig {
                max_moves,
                hint_rate,
                tap_rate,
                verbose,
            };
            validate_bot_config(config)?;
            let deal_seed = match deal_seed.as_deref() {
                Some(raw) => Some(parse_seed_arg(raw)?),
                None => None,
            };
            let session = new_session(catalog, level, deal_seed)?;
            run_bot(session, config, seed)
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct BotRunConfig {
    max_moves: u32,
    hint_rate: f64,
    tap_rate: f64,
    verbose: bool,
}

#[derive(Debug, Default)]
struct BotStats {
    attempts: u32,
    hints: u32,
    moved: u32,
    unchanged: u32,
    connected_events: u32,
}

fn validate_bot_config(config: BotRunConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.max_moves == 0 {
        return Err(err_msg("max-moves must be positive"));
    }
    if !(0.0..=1.0).contains(&config.hint_rate) {
        return Err(err_msg("hint-rate must be between 0 and 1"));
    }
    if !(0.0..=1.0).contains(&config.tap_rate) {
        return Err(err_msg("tap-rate must be between 0 and 1"));
    }
    Ok(())
}

fn err_msg(message: &str) -> Box<dyn std::error::Error> {
    message.to_string().into()
}

fn run_bot(
    mut session: Session,
    config: BotRunConfig,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = {
        let base_seed = seed.unwrap_or_else(|| rand::rng().random());
        tracing::info!(base_seed, "bot: seeded");
        StdRng::seed_from_u64(base_seed)
    };
    let mut presenter = TextPresenter::new(&session, config.verbose);
    let mut stats = BotStats::default();

    println!(
        "level {} ({}x{}), deal seed {:#010x}",
        session.level(),
        session.grid().rows(),
        session.grid().cols(),
        session.seed()
    );

    while stats.attempts < config.max_moves && !session.is_solved() {
        stats.attempts += 1;
        let report = if rng.random_bool(config.hint_rate) {
            let hint = session.request_hint();
            if hint.is_none() {
                break;
            }
            stats.hints += 1;
            if config.verbose {
                presenter.show_hint(&hint);
            }
            session.apply_hint(&hint)
        } else {
            let gesture = random_gesture(&session, &mut rng, config.tap_rate);
            session.handle_gesture(gesture)
        };
        record(&mut stats, &report);
        session.present(&report, &mut presenter);
        session.settle(&report, &mut presenter);
    }

    if config.verbose {
        print!("{}", presenter.render());
    }
    let progress = session.progress();
    println!(
        "{} after {} attempts: {} moved, {} unchanged, {} hints, {} connect events",
        if session.is_solved() { "solved" } else { "unsolved" },
        stats.attempts,
        stats.moved,
        stats.unchanged,
        stats.hints,
        stats.connected_events
    );
    println!(
        "edges {}/{}, {} of {} pieces home, {} groups",
        progress.connected,
        progress.expected,
        session.correct_count(),
        session.pieces().len(),
        session.groups().len()
    );
    Ok(())
}

fn record(stats: &mut BotStats, report: &MoveReport) {
    if report.is_unchanged() {
        stats.unchanged += 1;
    } else {
        stats.moved += 1;
    }
    if !report.newly_connected.is_empty() {
        stats.connected_events += 1;
    }
}

/// Grabs a random piece and lets go over a random cell, sometimes with a
/// drag too short to count.
fn random_gesture(session: &Session, rng: &mut StdRng, tap_rate: f64) -> Gesture {
    let grid = session.grid();
    let piece = rng.random_range(0..session.pieces().len());
    let target = grid.cell_at(rng.random_range(0..grid.total()));
    let (cell_w, cell_h) = grid.cell_size();
    let (mut x, mut y) = grid.world_position(target);
    x += rng.random_range(-0.4f32..=0.4f32) * cell_w;
    y += rng.random_range(-0.4f32..=0.4f32) * cell_h;
    let drag_delta = if rng.random_bool(tap_rate) {
        (0.0, 0.0)
    } else {
        let start = session
            .piece(piece)
            .map(|p| grid.world_position(p.cell()))
            .unwrap_or((x, y));
        let delta = (x - start.0, y - start.1);
        if delta == (0.0, 0.0) {
            (cell_w, 0.0)
        } else {
            delta
        }
    };
    Gesture {
        piece,
        drag_delta,
        pointer_up: (x, y),
    }
}
