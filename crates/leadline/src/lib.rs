#![doc = include_str!("../README.md")]

mod appender;
mod error;
mod lead;
mod pipeline;
mod response;
mod sequence;
mod store;
mod time;

pub use crate::appender::*;
pub use crate::error::*;
pub use crate::lead::*;
pub use crate::pipeline::*;
pub use crate::response::*;
pub use crate::sequence::*;
pub use crate::store::*;
pub use crate::time::*;
