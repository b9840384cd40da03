pub use std::{sync::Arc, time::Duration};

pub use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
pub use json::Value;
pub use tracing::{debug, info, trace, warn};

pub use crate::error::{Error, Result};
