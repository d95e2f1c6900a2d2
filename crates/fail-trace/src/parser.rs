use prost::Message;

use crate::proto;
use crate::types::*;

// Access type values on the wire.
const ACCESS_READ: i32 = proto::AccessType::Read as i32;
const ACCESS_WRITE: i32 = proto::AccessType::Write as i32;

/// Decode a single frame payload into a trace event.
///
/// The decoder is pure: the returned event carries the raw time delta and
/// accumulating it is left to the caller (see [`crate::TimeAccumulator`]).
/// Payloads with bytes the schema does not account for are rejected, so a
/// newer producer is noticed instead of being half-read.
pub fn decode(payload: &[u8]) -> Result<TraceEvent, DecodeError> {
    let wire = proto::TraceEvent::decode(payload)?;

    let consumed = wire.encoded_len();
    if consumed != payload.len() {
        return Err(DecodeError::TrailingBytes {
            consumed,
            len: payload.len(),
        });
    }

    let ip = wire.ip.ok_or(DecodeError::MissingField("ip"))?;
    let kind = match wire.memaddr {
        None => {
            if wire.width.is_some() {
                return Err(DecodeError::OrphanAccessField("width"));
            }
            if wire.accesstype.is_some() {
                return Err(DecodeError::OrphanAccessField("accesstype"));
            }
            EventKind::Instruction
        }
        Some(address) => {
            let direction = match wire.accesstype {
                Some(ACCESS_READ) => AccessDirection::Read,
                Some(ACCESS_WRITE) => AccessDirection::Write,
                Some(other) => return Err(DecodeError::UnknownAccessType(other)),
                None => return Err(DecodeError::MissingField("accesstype")),
            };
            let width = wire.width.ok_or(DecodeError::MissingField("width"))?;
            EventKind::Memory(MemoryAccess {
                direction,
                address,
                width,
            })
        }
    };

    let extension = wire.trace_ext.map(extension_from_wire).transpose()?;

    Ok(TraceEvent {
        ip,
        time_delta: wire.time_delta.and_then(non_zero_u64),
        kind,
        extension,
    })
}

/// Encode a trace event into a frame payload.
///
/// A zero time delta and an empty stack are left out of the encoding.
pub fn encode(event: &TraceEvent) -> Vec<u8> {
    to_wire(event).encode_to_vec()
}

// === Internal helpers ===

fn non_zero_u64(val: u64) -> Option<u64> {
    if val == 0 {
        None
    } else {
        Some(val)
    }
}

fn extension_from_wire(ext: proto::Extended) -> Result<Extension, DecodeError> {
    let data = ext.data.ok_or(DecodeError::MissingField("trace_ext.data"))?;
    let registers = ext
        .registers
        .into_iter()
        .map(|reg| {
            Ok(Register {
                id: reg.id.ok_or(DecodeError::MissingField("registers.id"))?,
                value: reg
                    .value
                    .ok_or(DecodeError::MissingField("registers.value"))?,
                value_deref: reg
                    .value_deref
                    .ok_or(DecodeError::MissingField("registers.value_deref"))?,
            })
        })
        .collect::<Result<Vec<_>, DecodeError>>()?;

    Ok(Extension {
        data,
        registers,
        stack: ext.stack.unwrap_or_default(),
    })
}

fn to_wire(event: &TraceEvent) -> proto::TraceEvent {
    let (memaddr, width, accesstype) = match &event.kind {
        EventKind::Instruction => (None, None, None),
        EventKind::Memory(access) => {
            let accesstype = match access.direction {
                AccessDirection::Read => ACCESS_READ,
                AccessDirection::Write => ACCESS_WRITE,
            };
            (Some(access.address), Some(access.width), Some(accesstype))
        }
    };

    proto::TraceEvent {
        ip: Some(event.ip),
        memaddr,
        width,
        accesstype,
        trace_ext: event.extension.as_ref().map(|ext| proto::Extended {
            data: Some(ext.data),
            registers: ext
                .registers
                .iter()
                .map(|reg| proto::extended::Register {
                    id: Some(reg.id),
                    value: Some(reg.value),
                    value_deref: Some(reg.value_deref),
                })
                .collect(),
            stack: if ext.stack.is_empty() {
                None
            } else {
                Some(ext.stack.clone())
            },
        }),
        time_delta: event.time_delta.and_then(non_zero_u64),
    }
}
