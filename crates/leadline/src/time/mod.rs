mod interface;
mod zone;

pub use interface::*;
pub use zone::*;
