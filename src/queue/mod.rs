//! Back-pressure safe delivery queues.
//!
//! Producers hand items to a [`Queue`] and return as soon as the item is
//! buffered. A dedicated manager thread relays buffered items to a single
//! consumer channel at whatever pace the consumer reads.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐  enq (rendezvous)  ┌─────────────────────┐  deq  ┌──────────┐
//! │ Producer │───────────────────▶│   Manager thread    │──────▶│ Consumer │
//! └──────────┘◀───────────────────│  ┌───────────────┐  │       └──────────┘
//!                done (ack)       │  │ Buffer (FIFO) │  │
//!                                 │  └───────────────┘  │
//!                                 └─────────────────────┘
//! ```
//!
//! [`PressureStream`] pairs two queues, one for data signals and one for
//! errors, behind public receivers.

mod buffer;
mod error;
mod pressure;
mod relay;

pub use buffer::Buffer;
pub use error::{BufferError, BufferResult, QueueError, QueueResult};
pub use pressure::PressureStream;
pub use relay::Queue;
