//! Key/value dictionaries and the datagram frames that carry them.
//!
//! An `AppMessage` is an ordered list of `(key, value)` tuples; the order is whatever
//! the sender wrote and receivers must not assume it is sorted. Every UDP datagram
//! holds exactly one [`Frame`], encoded with `bincode` (standard configuration).
use std::fmt;

use bincode::{Decode, Encode};

use crate::error::WatchError;
use crate::keys::{REFRESH_KEY, REFRESH_VALUE};
use crate::result::Result;

/// Value half of a dictionary tuple.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum TupleValue {
    /// Single unsigned byte.
    Uint8(u8),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Short text value, pre-formatted by the sender.
    CString(String),
}

impl fmt::Display for TupleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TupleValue::Uint8(v) => write!(f, "{}", v),
            TupleValue::Int32(v) => write!(f, "{}", v),
            TupleValue::CString(s) => f.write_str(s),
        }
    }
}

/// One key/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Tuple {
    /// Numeric key.
    pub key: u32,
    /// Attached value.
    pub value: TupleValue,
}

/// Ordered key/value dictionary exchanged between watch and companion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct AppMessage {
    tuples: Vec<Tuple>,
}

impl AppMessage {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// The "please refresh market data now" trigger.
    pub fn refresh_request() -> Self {
        let mut message = Self::new();
        message.write_uint8(REFRESH_KEY, REFRESH_VALUE);
        message
    }

    /// Appends a byte value.
    pub fn write_uint8(&mut self, key: u32, value: u8) -> &mut Self {
        self.push(key, TupleValue::Uint8(value))
    }

    /// Appends an integer value.
    pub fn write_int32(&mut self, key: u32, value: i32) -> &mut Self {
        self.push(key, TupleValue::Int32(value))
    }

    /// Appends a text value.
    pub fn write_cstring(&mut self, key: u32, value: &str) -> &mut Self {
        self.push(key, TupleValue::CString(value.to_string()))
    }

    fn push(&mut self, key: u32, value: TupleValue) -> &mut Self {
        self.tuples.push(Tuple { key, value });
        self
    }

    /// Tuples in delivery order.
    pub fn iter(&self) -> impl Iterator<Item = &Tuple> {
        self.tuples.iter()
    }

    /// First value stored under `key`.
    pub fn get(&self, key: u32) -> Option<&TupleValue> {
        self.tuples.iter().find(|t| t.key == key).map(|t| &t.value)
    }

    /// Number of tuples.
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    /// Returns `true` for a dictionary with no tuples.
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }
}

/// Datagram payload.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum Frame {
    /// A dictionary the receiver should act on and acknowledge.
    Message {
        /// Sender-chosen id echoed by the acknowledgement.
        transaction_id: u8,
        /// The dictionary itself.
        message: AppMessage,
    },
    /// Positive acknowledgement of a `Message`.
    Ack {
        /// Id of the acknowledged message.
        transaction_id: u8,
    },
    /// Negative acknowledgement: the receiver could not take the message.
    Nack {
        /// Id of the rejected message.
        transaction_id: u8,
    },
}

impl Frame {
    /// Transaction id the frame refers to.
    pub fn transaction_id(&self) -> u8 {
        match self {
            Frame::Message { transaction_id, .. }
            | Frame::Ack { transaction_id }
            | Frame::Nack { transaction_id } => *transaction_id,
        }
    }

    /// Encode the frame to datagram bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::encode_to_vec(self, bincode::config::standard())?)
    }

    /// Decode a frame from a whole datagram. Trailing bytes are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Frame> {
        let (frame, used): (Frame, usize) =
            bincode::decode_from_slice(bytes, bincode::config::standard())?;
        if used != bytes.len() {
            return Err(WatchError::Format(format!(
                "{} trailing bytes after frame",
                bytes.len() - used
            )));
        }
        Ok(frame)
    }
}
