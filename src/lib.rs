// Module naming follows project convention (capitalised component directories)
#[allow(non_snake_case)]
pub mod Core;
#[allow(non_snake_case)]
pub mod Buffer;
#[allow(non_snake_case)]
pub mod Worker;
#[allow(non_snake_case)]
mod Debug {
    #[allow(non_snake_case)]
    mod StructDebug;
}

pub mod error;
pub mod trace;

pub use error::{Error, Result};
pub use Core::{Event, Sequence};
pub use Buffer::{Batch, MpscQueue, MultiProducer, Queue, SpscQueue};
pub use Worker::{Activity, ActivityBuilder, SpscActivity};
