pub mod event;
#[cfg(target_os = "linux")]
pub mod futex;
pub mod sequence;

pub use event::Event;
pub use sequence::Sequence;
