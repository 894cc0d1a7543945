//! Sample job payloads
//!
//! Neither of these is needed by the pool or the walker. They show the two
//! usual shapes of a job: one that moves data between queues and one that
//! only does something with a value it captured.

pub mod transform;
pub mod value;

pub use transform::TransformJob;
pub use value::ValueJob;
