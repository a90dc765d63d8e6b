pub mod encoder;
pub mod table;

pub use encoder::{encode, EncodedMessage};
