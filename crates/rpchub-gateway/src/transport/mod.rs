//! Transport layer.
//!
//! Socket upgrade plus read/write loops (`ws`), one-shot POST (`http`), and
//! the frame codec shared by the socket side.

pub mod codec;
pub mod http;
pub mod ws;
