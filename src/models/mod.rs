pub mod payload;

pub use payload::{InboundPayload, DEFAULT_TITLE};
