//! Small shared utilities: resource identity tracking and warn-once latching.

pub mod latch;
pub mod tracked;

pub use latch::WarnLatch;
pub use tracked::Tracked;
