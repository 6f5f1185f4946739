use std::path::PathBuf;

use clap::Parser;
use tabletop::{render, Board};
use tabletop_replay::{load_script, resolve_board_config};
use tracing::{debug, info, warn};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
struct Args {
    /// Path to the JSON script of steps to perform
    script: PathBuf,

    /// Path to a JSON board config, e.g. {"width": 8, "height": 8}
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Board width, overrides the config
    #[arg(long)]
    width: Option<i32>,

    /// Board height, overrides the config
    #[arg(long)]
    height: Option<i32>,

    /// Stop as soon as one step fails
    #[arg(short, long, default_value_t = false)]
    stop_on_error: bool,

    /// Print every state the board went through, not just the final one
    #[arg(short, long, default_value_t = false)]
    frames: bool,

    /// Also draw hidden tokens
    #[arg(long, default_value_t = false)]
    show_hidden: bool,

    /// Print the history log as JSON
    #[arg(long, default_value_t = false)]
    print_history: bool,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    initialize_logging(args.log_level);

    let config = resolve_board_config(args.config.as_deref(), args.width, args.height)?;
    info!(width = config.width, height = config.height, "Board");
    let mut board = Board::from_config(&config)?;

    let steps = load_script(&args.script)?;
    let mut failed_steps = 0;
    for (step_idx, step) in steps.iter().enumerate() {
        debug!(step_idx, ?step);
        if let Err(err) = step.run(&mut board) {
            warn!(step_idx, "Step failed");
            let mut err_dyn = &err as &dyn std::error::Error;
            while let Some(src_err) = err_dyn.source() {
                warn!("{}", err_dyn);
                err_dyn = src_err;
            }
            warn!("{}", err_dyn);
            if args.stop_on_error {
                anyhow::bail!("Step {} failed: {}", step_idx, err);
            }
            failed_steps += 1;
        }
    }
    info!(
        steps = steps.len(),
        failed_steps,
        history = board.history().len(),
        cursor = board.cursor(),
        "Script done"
    );

    if args.frames {
        for (frame_idx, frame) in board.replay_frames().iter().enumerate() {
            // Unrecorded moves are not replayed, so this frame can differ from the final board
            let marker = if frame_idx == board.cursor() { " (cursor)" } else { "" };
            println!("Frame {}{}:\n{}\n", frame_idx, marker, render(frame, args.show_hidden));
        }
    } else {
        println!("{}", render(&board.snapshot(), args.show_hidden));
    }

    if args.print_history {
        println!("{}", serde_json::to_string_pretty(board.history())?);
    }

    Ok(())
}

fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .event_format(format),
        )
        .with(filter)
        .init();
}
