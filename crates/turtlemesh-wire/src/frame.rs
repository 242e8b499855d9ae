use crate::checksum::checksum;
use crate::error::WireError;

pub const PROTOCOL_VERSION: u8 = 1;

const HEADER_LEN: usize = 4;

/// The 4-bit message type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Register,
    Assign,
    Data,
    Ack,
    Request,
    Response,
    Handover,
}

impl MessageType {
    fn nibble(self) -> u8 {
        match self {
            MessageType::Register => 0x1,
            MessageType::Assign => 0x2,
            MessageType::Data => 0x3,
            MessageType::Ack => 0x4,
            MessageType::Request => 0x5,
            MessageType::Response => 0x6,
            MessageType::Handover => 0x7,
        }
    }

    fn from_nibble(nibble: u8) -> Result<Self, WireError> {
        match nibble {
            0x1 => Ok(MessageType::Register),
            0x2 => Ok(MessageType::Assign),
            0x3 => Ok(MessageType::Data),
            0x4 => Ok(MessageType::Ack),
            0x5 => Ok(MessageType::Request),
            0x6 => Ok(MessageType::Response),
            0x7 => Ok(MessageType::Handover),
            other => Err(WireError::UnknownType(other)),
        }
    }
}

/// A fully decoded protocol frame, one variant per message type.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Register {
        node_id: u8,
    },
    Assign {
        node_id: u8,
        rx: u8,
        ry: u8,
        width: u8,
        height: u8,
        turn_angle_deg: i8,
        step: u8,
    },
    Data {
        node_id: u8,
        x: f32,
        y: f32,
        heading: f32,
        slice: Vec<u8>,
    },
    Ack {
        node_id: u8,
    },
    Request {
        node_id: u8,
        row: u8,
    },
    Response {
        node_id: u8,
        cells: Vec<u8>,
    },
    Handover {
        node_id: u8,
        x: f32,
        y: f32,
        heading: f32,
        consumed: u16,
    },
}

impl Frame {
    pub fn message_type(&self) -> MessageType {
        match self {
            Frame::Register { .. } => MessageType::Register,
            Frame::Assign { .. } => MessageType::Assign,
            Frame::Data { .. } => MessageType::Data,
            Frame::Ack { .. } => MessageType::Ack,
            Frame::Request { .. } => MessageType::Request,
            Frame::Response { .. } => MessageType::Response,
            Frame::Handover { .. } => MessageType::Handover,
        }
    }

    pub fn node_id(&self) -> u8 {
        match self {
            Frame::Register { node_id }
            | Frame::Assign { node_id, .. }
            | Frame::Data { node_id, .. }
            | Frame::Ack { node_id }
            | Frame::Request { node_id, .. }
            | Frame::Response { node_id, .. }
            | Frame::Handover { node_id, .. } => *node_id,
        }
    }

    fn payload(&self) -> Vec<u8> {
        match self {
            Frame::Register { .. } | Frame::Ack { .. } => Vec::new(),
            Frame::Assign {
                rx,
                ry,
                width,
                height,
                turn_angle_deg,
                step,
                ..
            } => vec![*rx, *ry, *width, *height, *turn_angle_deg as u8, *step],
            Frame::Data {
                x, y, heading, slice, ..
            } => {
                let mut buf = Vec::with_capacity(12 + slice.len());
                buf.extend_from_slice(&x.to_be_bytes());
                buf.extend_from_slice(&y.to_be_bytes());
                buf.extend_from_slice(&heading.to_be_bytes());
                buf.extend_from_slice(slice);
                buf
            }
            Frame::Request { row, .. } => vec![*row],
            Frame::Response { cells, .. } => cells.clone(),
            Frame::Handover {
                x, y, heading, consumed, ..
            } => {
                let mut buf = Vec::with_capacity(14);
                buf.extend_from_slice(&x.to_be_bytes());
                buf.extend_from_slice(&y.to_be_bytes());
                buf.extend_from_slice(&heading.to_be_bytes());
                buf.extend_from_slice(&consumed.to_be_bytes());
                buf
            }
        }
    }

    /// Encode this frame into a datagram ready for `send_to`.
    pub fn encode(&self) -> Vec<u8> {
        let payload = self.payload();
        let mut buf = Vec::with_capacity(HEADER_LEN + payload.len() + 1);
        buf.push((PROTOCOL_VERSION << 4) | self.message_type().nibble());
        buf.push(self.node_id());
        let len = payload.len() as u16;
        buf.extend_from_slice(&len.to_be_bytes());
        buf.extend_from_slice(&payload);
        buf.push(checksum(&buf));
        buf
    }

    /// Decode a received datagram. A bad checksum, length mismatch, or
    /// wrong version is dropped silently — callers treat `Err` the
    /// same as a lost datagram, never as fatal.
    pub fn decode(bytes: &[u8]) -> Result<Frame, WireError> {
        if bytes.len() < HEADER_LEN + 1 {
            return Err(WireError::TooShort { len: bytes.len() });
        }

        let (body, claimed) = bytes.split_at(bytes.len() - 1);
        let claimed = claimed[0];
        let computed = checksum(body);
        if computed != claimed {
            return Err(WireError::BadChecksum { computed, claimed });
        }

        let version = body[0] >> 4;
        if version != PROTOCOL_VERSION {
            return Err(WireError::WrongVersion { found: version });
        }
        let msg_type = MessageType::from_nibble(body[0] & 0x0F)?;
        let node_id = body[1];
        let declared_len = u16::from_be_bytes([body[2], body[3]]) as usize;
        let payload = &body[HEADER_LEN..];
        if payload.len() != declared_len {
            return Err(WireError::LengthMismatch {
                declared: declared_len,
                actual: payload.len(),
            });
        }

        decode_payload(msg_type, node_id, payload)
    }
}

fn decode_payload(msg_type: MessageType, node_id: u8, payload: &[u8]) -> Result<Frame, WireError> {
    match msg_type {
        MessageType::Register => Ok(Frame::Register { node_id }),
        MessageType::Ack => Ok(Frame::Ack { node_id }),
        MessageType::Assign => {
            if payload.len() != 6 {
                return Err(WireError::MalformedPayload("ASSIGN payload must be 6 bytes"));
            }
            Ok(Frame::Assign {
                node_id,
                rx: payload[0],
                ry: payload[1],
                width: payload[2],
                height: payload[3],
                turn_angle_deg: payload[4] as i8,
                step: payload[5],
            })
        }
        MessageType::Data => {
            if payload.len() < 12 {
                return Err(WireError::MalformedPayload(
                    "DATA payload must be at least 12 bytes",
                ));
            }
            let x = f32::from_be_bytes(payload[0..4].try_into().unwrap());
            let y = f32::from_be_bytes(payload[4..8].try_into().unwrap());
            let heading = f32::from_be_bytes(payload[8..12].try_into().unwrap());
            Ok(Frame::Data {
                node_id,
                x,
                y,
                heading,
                slice: payload[12..].to_vec(),
            })
        }
        MessageType::Request => {
            if payload.len() != 1 {
                return Err(WireError::MalformedPayload("REQUEST payload must be 1 byte"));
            }
            Ok(Frame::Request {
                node_id,
                row: payload[0],
            })
        }
        MessageType::Response => Ok(Frame::Response {
            node_id,
            cells: payload.to_vec(),
        }),
        MessageType::Handover => {
            if payload.len() != 14 {
                return Err(WireError::MalformedPayload(
                    "HANDOVER payload must be 14 bytes",
                ));
            }
            let x = f32::from_be_bytes(payload[0..4].try_into().unwrap());
            let y = f32::from_be_bytes(payload[4..8].try_into().unwrap());
            let heading = f32::from_be_bytes(payload[8..12].try_into().unwrap());
            let consumed = u16::from_be_bytes(payload[12..14].try_into().unwrap());
            Ok(Frame::Handover {
                node_id,
                x,
                y,
                heading,
                consumed,
            })
        }
    }
}
