//! Demo driver: feed a position to the engine and play it forward.
//!
//! Usage: `luft [FEN] [plies]` — analyzes the starting position by default,
//! or plays up to `plies` engine moves from the given FEN.

use anyhow::{Context, Result};
use tracing::info;

use luft_core::{game_status, GameState, GameStatus};
use luft_engine::{choose_move_with_metrics, AiOptions, Difficulty};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let mut state = match args.next() {
        Some(fen) => fen.parse::<GameState>().context("invalid FEN")?,
        None => GameState::starting_position(),
    };
    let plies: u32 = args
        .next()
        .map(|s| s.parse())
        .transpose()
        .context("invalid ply count")?
        .unwrap_or(1);

    info!(position = %state, "starting");
    let mut recent = vec![state.position_key()];

    for _ in 0..plies {
        if !matches!(game_status(&state), GameStatus::Ongoing | GameStatus::Check) {
            break;
        }

        let opts = AiOptions {
            difficulty: Difficulty::Hard,
            max_time_ms: Some(2_000),
            play_for_win: true,
            recent_positions: recent.clone(),
            ..AiOptions::default()
        };
        let (mv, _, metrics) = choose_move_with_metrics(&state, &opts);
        let Some(mv) = mv else {
            break;
        };
        if let Some(metrics) = metrics {
            info!(
                mv = %mv,
                depth = metrics.depth_completed,
                nodes = metrics.nodes,
                nps = metrics.nps,
                duration_ms = metrics.duration_ms,
                "chose move"
            );
        }
        state.apply_move(mv)?;
        recent.push(state.position_key());
    }

    info!(status = ?game_status(&state), position = %state, "done");
    Ok(())
}
