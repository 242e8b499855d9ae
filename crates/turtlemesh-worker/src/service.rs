use std::net::SocketAddr;

use tracing::{info, warn};
use turtlemesh_canvas::Region;
use turtlemesh_channel::{ReliableChannel, RetryPolicy};
use turtlemesh_core::NodeId;
use turtlemesh_wire::{Frame, MessageType};

use crate::draw::draw_slice;
use crate::error::WorkerError;
use crate::grid::Grid;

/// Run a worker to completion. Never returns under normal operation —
/// the worker serves requests indefinitely until the process is killed.
pub async fn run(
    node_id: NodeId,
    coordinator: SocketAddr,
    bind_addr: SocketAddr,
    retry: RetryPolicy,
) -> Result<(), WorkerError> {
    let channel = ReliableChannel::bind(bind_addr).await?.with_retry(retry);
    info!(%node_id, local = %channel.local_addr()?, "worker starting");

    // ── Phase 1: booting ─────────────────────────────────────────────
    channel
        .send_reliable(coordinator, &Frame::Register { node_id: node_id.get() }, MessageType::Ack)
        .await
        .map_err(|_| WorkerError::RegistrationFailed)?;
    info!(%node_id, "registered with coordinator");

    // ── Phase 2: awaiting assignment ─────────────────────────────────
    let (region, turn_angle_deg) = loop {
        let (frame, from) = channel.recv_frame().await?;
        match frame {
            Frame::Assign {
                rx, ry, width, height, turn_angle_deg, ..
            } => {
                channel.reply(from, &Frame::Ack { node_id: node_id.get() }).await?;
                let region = Region {
                    rx: rx as u32,
                    ry: ry as u32,
                    width: width as u32,
                    height: height as u32,
                };
                info!(%node_id, ?region, turn_angle_deg, "assigned region");
                break (region, turn_angle_deg as i32);
            }
            Frame::Register { .. } => {
                // Duplicate REGISTER while we wait — idempotent ACK.
                channel.reply(from, &Frame::Ack { node_id: node_id.get() }).await?;
            }
            other => {
                warn!(?other, "ignoring frame received before assignment");
            }
        }
    };

    let mut grid = Grid::new(region.width, region.height);

    // ── Phase 3: serving ──────────────────────────────────────────────
    loop {
        let (frame, from) = channel.recv_frame().await?;
        match frame {
            Frame::Data {
                x, y, heading, slice, ..
            } => {
                let outcome = draw_slice(&region, turn_angle_deg, &mut grid, (x, y, heading), &slice);
                channel
                    .reply(
                        from,
                        &Frame::Handover {
                            node_id: node_id.get(),
                            x: outcome.x,
                            y: outcome.y,
                            heading: outcome.heading_deg,
                            consumed: outcome.consumed,
                        },
                    )
                    .await?;
            }
            Frame::Request { row, .. } => match grid.row(row as u32) {
                Some(cells) => {
                    channel
                        .reply(from, &Frame::Response { node_id: node_id.get(), cells: cells.to_vec() })
                        .await?;
                }
                None => {
                    warn!(row, height = grid.height(), "dropping REQUEST for a row outside this region");
                }
            },
            Frame::Register { .. } => {
                channel.reply(from, &Frame::Ack { node_id: node_id.get() }).await?;
            }
            Frame::Assign { .. } => {
                // Duplicate ASSIGN: idempotent ACK, region is never re-read.
                channel.reply(from, &Frame::Ack { node_id: node_id.get() }).await?;
            }
            other => warn!(?other, "ignoring unexpected frame while serving"),
        }
    }
}
