//! `turtlemesh-worker` entrypoint.
use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use turtlemesh_channel::RetryPolicy;
use turtlemesh_core::NodeId;

/// A TurtleMesh region worker: registers with a coordinator, waits for
/// a region assignment, then renders its slice of the L-system.
#[derive(Parser, Debug)]
#[command(name = "turtlemesh-worker", version, about)]
struct Args {
    /// This worker's 1-based node id.
    #[arg(long)]
    node_id: u8,

    /// Coordinator's address, e.g. 127.0.0.1:9000.
    #[arg(long)]
    coordinator: SocketAddr,

    /// Local address to bind the UDP socket to.
    #[arg(long, default_value = "0.0.0.0:0")]
    bind: SocketAddr,

    /// Per-attempt timeout in milliseconds before retrying.
    #[arg(long, default_value_t = 200)]
    retry_timeout_ms: u64,

    /// Number of retries before giving up on an unresponsive peer.
    #[arg(long, default_value_t = 5)]
    retries: u32,

    /// Log level filter, e.g. "info", "turtlemesh_worker=debug".
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    turtlemesh_core::logging::init(&args.log_level);

    let node_id = NodeId::new(args.node_id)
        .ok_or_else(|| anyhow::anyhow!("--node-id must be nonzero"))?;
    let retry = RetryPolicy::new(Duration::from_millis(args.retry_timeout_ms), args.retries);

    turtlemesh_worker::run(node_id, args.coordinator, args.bind, retry).await?;
    Ok(())
}
