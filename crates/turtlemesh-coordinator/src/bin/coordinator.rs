//! `turtlemesh-coordinator` entrypoint.
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use turtlemesh_canvas::{expand, LSystemConfig, Tiling, DEFAULT_WORD_CAP};
use turtlemesh_channel::{ReliableChannel, RetryPolicy};
use turtlemesh_coordinator::RunConfig;

/// TurtleMesh coordinator: drives a distributed L-system render across
/// a fixed set of region workers and prints the assembled canvas.
#[derive(Parser, Debug)]
#[command(name = "turtlemesh-coordinator", version, about)]
struct Args {
    /// Path to the L-system configuration file.
    config: PathBuf,

    /// Number of workers expected to register.
    #[arg(long)]
    nodes: u8,

    /// Address to bind the coordinator's well-known port to.
    #[arg(long, default_value = "0.0.0.0:8000")]
    bind: SocketAddr,

    /// Canvas width in cells.
    #[arg(long, default_value_t = 40)]
    canvas_width: u32,

    /// Canvas height in cells.
    #[arg(long, default_value_t = 40)]
    canvas_height: u32,

    /// Region tile size in cells.
    #[arg(long, default_value_t = 20)]
    tile: u32,

    /// Symbols sent per DATA frame.
    #[arg(long, default_value_t = 16)]
    chunk_size: u16,

    /// Per-attempt timeout in milliseconds before retrying.
    #[arg(long, default_value_t = 200)]
    retry_timeout_ms: u64,

    /// Number of retries before giving up on an unresponsive peer.
    #[arg(long, default_value_t = 5)]
    retries: u32,

    /// Log level filter, e.g. "info", "turtlemesh_coordinator=debug".
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    turtlemesh_core::logging::init(&args.log_level);

    let lsystem = LSystemConfig::load(&args.config)?;
    let outcome = expand(&lsystem, DEFAULT_WORD_CAP);
    if let Some(iteration) = outcome.truncated_at_iteration {
        tracing::warn!(iteration, "L-system expansion was truncated before the configured iteration count");
    }
    tracing::info!(word_len = outcome.word.len(), "L-system word expanded");

    let tiling = Tiling::new(args.canvas_width, args.canvas_height, args.tile)?;
    let retry = RetryPolicy::new(Duration::from_millis(args.retry_timeout_ms), args.retries);
    let channel = ReliableChannel::bind(args.bind).await?.with_retry(retry);

    let config = RunConfig {
        node_count: args.nodes,
        tiling,
        turn_angle_deg: lsystem.angle_deg as i8,
        step: lsystem.step as u8,
        chunk_size: args.chunk_size,
        start_x: lsystem.start_x,
        start_y: lsystem.start_y,
        start_heading_deg: 0.0,
        word: outcome.word.into_bytes(),
    };

    let canvas = turtlemesh_coordinator::run(&channel, &config).await?;
    print!("{}", canvas.render_text());
    Ok(())
}
