//! Packaroo core library: intent routing, package directory lookups, reply generation,
//! and the HTTP gateway used by the CLI.

pub mod agent;
pub mod composer;
pub mod config;
pub mod directory;
pub mod gateway;
pub mod init;
pub mod intent;
pub mod llm;
pub mod system_prompt;
pub mod tools;
