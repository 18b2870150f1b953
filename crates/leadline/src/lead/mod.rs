mod id;
mod record;
mod submission;

pub use id::*;
pub use record::*;
pub use submission::*;
