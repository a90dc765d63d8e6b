pub mod engine;
pub mod state;
pub mod timing;

pub use engine::PlaybackEngine;
