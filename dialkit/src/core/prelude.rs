pub use crate::core::error::{DialError, Result};
pub use crate::core::logging::init_logger;
pub use crate::core::logging::{debug, error, info, trace, warn};
pub use crate::core::util::HashMap;
pub use crate::core::util::TWO_PI;
pub use crate::ternary;
