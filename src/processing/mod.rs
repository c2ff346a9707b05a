pub mod encode;
pub mod metadata;
pub mod pipeline;
pub mod resize;

pub use pipeline::convert_single;
