//! Gateway: HTTP API for chat, agent info, and direct tool access.
//!
//! Single port, JSON in and out. Each `/chat` call is one independent turn.

mod protocol;
mod server;

pub use protocol::{
    AgentCapabilities, AgentStatus, ChatRequest, ChatResponse, FindPackageQuery, ResetQuery,
    TrackPackageQuery, UserPackagesQuery,
};
pub use server::{build_assistant, router, run_gateway, GatewayState};
