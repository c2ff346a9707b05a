pub mod error;
pub mod formats;

pub use error::{ConvertError, ConvertResult};
pub use formats::{is_supported_source, lowercase_extension, SUPPORTED_EXTENSIONS};
