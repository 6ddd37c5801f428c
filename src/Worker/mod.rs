mod activity;
mod builder;

pub use activity::{Activity, SpscActivity};
pub use builder::ActivityBuilder;
