use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;

use tracing::{info, warn};
use turtlemesh_canvas::{Canvas, Region, Tiling, TurtleState};
use turtlemesh_channel::ReliableChannel;
use turtlemesh_wire::{Frame, MessageType};

use crate::error::CoordinatorError;

/// Everything the router needs that doesn't come from the network:
/// the tiling, the expanded word, and the turtle's initial cursor.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub node_count: u8,
    pub tiling: Tiling,
    pub turn_angle_deg: i8,
    pub step: u8,
    pub chunk_size: u16,
    pub start_x: f32,
    pub start_y: f32,
    pub start_heading_deg: f32,
    pub word: Vec<u8>,
}

/// Run the full five-phase coordinator lifecycle to completion and
/// return the assembled canvas.
pub async fn run(channel: &ReliableChannel, config: &RunConfig) -> Result<Canvas, CoordinatorError> {
    if config.node_count == 0 {
        return Err(CoordinatorError::NoNodesConfigured);
    }

    let addrs = register_nodes(channel, config.node_count).await?;
    let mut active: HashSet<u8> = addrs.keys().copied().collect();
    assign_regions(channel, &addrs, &mut active, &config.tiling, config.turn_angle_deg, config.step).await?;

    let (start_x, start_y) = seed_origin(
        channel,
        &addrs,
        &active,
        &config.tiling,
        config.start_x,
        config.start_y,
    )
    .await?;

    simulate(
        channel,
        &addrs,
        &active,
        &config.tiling,
        &config.word,
        (start_x, start_y, config.start_heading_deg),
        config.chunk_size,
    )
    .await?;

    collect(channel, &addrs, &active, &config.tiling).await
}

// ── Phase 1: registration barrier ────────────────────────────────────

async fn register_nodes(
    channel: &ReliableChannel,
    expected: u8,
) -> Result<HashMap<u8, SocketAddr>, CoordinatorError> {
    let mut table: HashMap<u8, SocketAddr> = HashMap::new();
    while table.len() < expected as usize {
        let (frame, from) = channel.recv_frame().await?;
        match frame {
            Frame::Register { node_id } if node_id >= 1 && node_id <= expected => {
                let is_new = !table.contains_key(&node_id);
                table.entry(node_id).or_insert(from);
                channel.reply(from, &Frame::Ack { node_id }).await?;
                if is_new {
                    info!(node_id, %from, "registered");
                }
            }
            Frame::Register { node_id } => {
                warn!(node_id, "ignoring REGISTER with an id outside 1..=N");
            }
            other => warn!(?other, "ignoring non-REGISTER frame during the registration barrier"),
        }
    }
    Ok(table)
}

// ── Phase 2: assignment ──────────────────────────────────────────────

async fn assign_regions(
    channel: &ReliableChannel,
    addrs: &HashMap<u8, SocketAddr>,
    active: &mut HashSet<u8>,
    tiling: &Tiling,
    turn_angle_deg: i8,
    step: u8,
) -> Result<(), CoordinatorError> {
    for (&node_id, &addr) in addrs {
        let region = tiling.region_for_node(node_id);
        let frame = Frame::Assign {
            node_id,
            rx: region.rx as u8,
            ry: region.ry as u8,
            width: region.width as u8,
            height: region.height as u8,
            turn_angle_deg,
            step,
        };
        match channel.send_reliable(addr, &frame, MessageType::Ack).await {
            Ok(_) => info!(node_id, %addr, ?region, "assigned"),
            Err(e) => {
                warn!(node_id, error = %e, "ASSIGN failed after retries, marking node inactive");
                active.remove(&node_id);
            }
        }
    }
    Ok(())
}

// ── Phase 3: optional origin seed ────────────────────────────────────

async fn seed_origin(
    channel: &ReliableChannel,
    addrs: &HashMap<u8, SocketAddr>,
    active: &HashSet<u8>,
    tiling: &Tiling,
    configured_x: f32,
    configured_y: f32,
) -> Result<(f32, f32), CoordinatorError> {
    let owner = tiling.node_for_point(configured_x.floor() as i64, configured_y.floor() as i64);
    let Some(&addr) = addrs.get(&owner).filter(|_| active.contains(&owner)) else {
        info!("origin seed skipped: owning node is inactive, using configured start");
        return Ok((configured_x, configured_y));
    };

    let request = Frame::Request { node_id: 0, row: 0 };
    match channel.send_reliable(addr, &request, MessageType::Response).await {
        Ok(Frame::Response { cells, .. }) if cells.len() >= 4 => {
            let raw_x = u16::from_be_bytes([cells[0], cells[1]]);
            let raw_y = u16::from_be_bytes([cells[2], cells[3]]);
            let x = remap_sensor(raw_x, tiling.canvas_width);
            let y = remap_sensor(raw_y, tiling.canvas_height);
            info!(raw_x, raw_y, x, y, "origin seeded from sensor reading");
            Ok((x, y))
        }
        Ok(_) => {
            warn!("origin seed reply too short, using configured start");
            Ok((configured_x, configured_y))
        }
        Err(e) => {
            warn!(error = %e, "origin seed request failed, using configured start");
            Ok((configured_x, configured_y))
        }
    }
}

/// Remap a raw 16-bit sensor value onto `[0, dim)`.
fn remap_sensor(raw: u16, dim: u32) -> f32 {
    let scaled = (raw as f32 / u16::MAX as f32) * dim as f32;
    scaled.clamp(0.0, dim as f32 - 1.0)
}

// ── Phase 4: simulation streaming ────────────────────────────────────

async fn simulate(
    channel: &ReliableChannel,
    addrs: &HashMap<u8, SocketAddr>,
    active: &HashSet<u8>,
    tiling: &Tiling,
    word: &[u8],
    start: (f32, f32, f32),
    chunk_size: u16,
) -> Result<(), CoordinatorError> {
    let mut cursor = TurtleState::new(start.0, start.1, start.2);

    while cursor.index < word.len() {
        let (cx, cy) = cursor.cell();
        let owner = tiling.node_for_point(cx, cy);
        let remaining = word.len() - cursor.index;
        let slice_len = remaining.min(chunk_size as usize);

        if !active.contains(&owner) {
            warn!(owner, skipped = slice_len, "region owner is inactive, skipping chunk");
            cursor.index += slice_len;
            continue;
        }
        let addr = addrs[&owner];
        let slice = word[cursor.index..cursor.index + slice_len].to_vec();

        let frame = Frame::Data {
            node_id: 0,
            x: cursor.x,
            y: cursor.y,
            heading: cursor.heading_deg,
            slice,
        };
        match channel.send_reliable(addr, &frame, MessageType::Handover).await {
            Ok(Frame::Handover { x: nx, y: ny, heading: nh, consumed }) => {
                cursor.apply_handover(nx, ny, nh, consumed);
                if consumed == 0 {
                    warn!(owner, index = cursor.index, "zero-consumed handover, breaking livelock by skipping one symbol");
                    cursor.index += 1;
                }
            }
            Ok(_) => unreachable!("send_reliable only returns frames of the expected type"),
            Err(turtlemesh_channel::ChannelError::Unreachable) => {
                warn!(owner, skipped = slice_len, "worker unreachable mid-simulation, skipping chunk");
                cursor.index += slice_len;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

// ── Phase 5: collection ───────────────────────────────────────────────

async fn collect(
    channel: &ReliableChannel,
    addrs: &HashMap<u8, SocketAddr>,
    active: &HashSet<u8>,
    tiling: &Tiling,
) -> Result<Canvas, CoordinatorError> {
    let mut canvas = Canvas::new(tiling.canvas_width, tiling.canvas_height);

    for (&node_id, &addr) in addrs {
        if !active.contains(&node_id) {
            warn!(node_id, "skipping collection for inactive node");
            continue;
        }
        let region: Region = tiling.region_for_node(node_id);
        for local_row in 0..region.height {
            let request = Frame::Request { node_id: 0, row: local_row as u8 };
            match channel.send_reliable(addr, &request, MessageType::Response).await {
                Ok(Frame::Response { cells, .. }) => canvas.paint_row(&region, local_row, &cells),
                Ok(_) => unreachable!("send_reliable only returns frames of the expected type"),
                Err(e) => {
                    warn!(node_id, local_row, error = %e, "collection request failed, leaving row unset");
                    break;
                }
            }
        }
    }
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use turtlemesh_channel::RetryPolicy;
    use turtlemesh_core::NodeId;

    // ── Sensor remap ─────────────────────────────────────────────────

    #[test]
    fn remap_sensor_zero_maps_to_zero() {
        assert_eq!(remap_sensor(0, 40), 0.0);
    }

    #[test]
    fn remap_sensor_max_clamps_below_dim() {
        assert_eq!(remap_sensor(u16::MAX, 40), 39.0);
    }

    #[test]
    fn remap_sensor_midpoint_is_roughly_half_of_dim() {
        let mapped = remap_sensor(u16::MAX / 2, 40);
        assert!((mapped - 20.0).abs() < 1.0);
    }

    // ── End-to-end ─────────────────────

    fn spawn_worker(node_id: u8, coordinator: SocketAddr) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let id = NodeId::new(node_id).unwrap();
            let _ = turtlemesh_worker::run(id, coordinator, "127.0.0.1:0".parse().unwrap(), RetryPolicy::fast()).await;
        })
    }

    fn reference_config(word: &[u8]) -> RunConfig {
        RunConfig {
            node_count: 4,
            tiling: Tiling::new(40, 40, 20).unwrap(),
            turn_angle_deg: 90,
            step: 1,
            chunk_size: 16,
            start_x: 19.9,
            start_y: 19.9,
            start_heading_deg: 0.0,
            word: word.to_vec(),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn scenario_1_single_forward_draws_one_cell_on_worker_one() {
        let coordinator = ReliableChannel::bind("127.0.0.1:0").await.unwrap();
        let addr = coordinator.local_addr().unwrap();
        let workers: Vec<_> = (1..=4).map(|id| spawn_worker(id, addr)).collect();

        let canvas = run(&coordinator, &reference_config(b"F")).await.unwrap();

        assert_eq!(canvas.drawn_count(), 1);
        assert!(canvas.is_drawn(19, 19));

        for w in workers {
            w.abort();
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn scenario_3_square_draws_four_distinct_cells() {
        let coordinator = ReliableChannel::bind("127.0.0.1:0").await.unwrap();
        let addr = coordinator.local_addr().unwrap();
        let workers: Vec<_> = (1..=4).map(|id| spawn_worker(id, addr)).collect();

        let canvas = run(&coordinator, &reference_config(b"F-F-F-F")).await.unwrap();

        assert_eq!(canvas.drawn_count(), 4);

        for w in workers {
            w.abort();
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn duplicate_register_leaves_exactly_one_active_record() {
        let coordinator = ReliableChannel::bind("127.0.0.1:0").await.unwrap();
        let addr = coordinator.local_addr().unwrap();
        let config = reference_config(b"");

        let coordinator_task = tokio::spawn(async move { run(&coordinator, &config).await });

        // Node 1 registers five times before the others arrive once each.
        let spam = tokio::spawn(async move {
            let client = ReliableChannel::bind("127.0.0.1:0").await.unwrap().with_retry(RetryPolicy::fast());
            for _ in 0..5 {
                client
                    .send_reliable(addr, &Frame::Register { node_id: 1 }, MessageType::Ack)
                    .await
                    .unwrap();
            }
        });
        spam.await.unwrap();

        let workers: Vec<_> = (2..=4).map(|id| spawn_worker(id, addr)).collect();

        let canvas = coordinator_task.await.unwrap().unwrap();
        assert_eq!(canvas.drawn_count(), 0);

        for w in workers {
            w.abort();
        }
    }
}
