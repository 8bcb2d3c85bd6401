#[allow(unused_imports)]
pub use crate::control::*;
pub use crate::core::error::{DialError, Result};
pub use crate::core::logging::init_logger;
pub use crate::core::logging::{debug, error, info, trace, warn};
pub use crate::core::util::HashMap;
pub use crate::core::util::SelectOption;
pub use crate::core::util::round_value;
#[allow(unused_imports)]
pub use crate::motion::*;
pub use crate::runtime::serialization::{DialSettings, PanelState};
pub use crate::runtime::storage::{
    JsonFileStorage, MemoryStorage, PresetStorage,
};
pub use crate::ternary;
