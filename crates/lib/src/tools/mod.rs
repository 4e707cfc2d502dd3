//! Tool layer: package lookups the assistant can run, and their uniform outcome.

mod dispatch;
mod outcome;

pub use dispatch::{
    available_tools, ToolDispatcher, ToolInfo, FIND_PACKAGE_BY_ID, GET_USER_PACKAGES,
    TRACK_PACKAGE_BY_TRACKING_NUMBER,
};
pub use outcome::ToolOutcome;
