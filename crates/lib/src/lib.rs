//! Denti core library — configuration, backend clients, dispatch core,
//! channel activity types, and the webhook gateway used by the CLI.

pub mod channels;
pub mod clients;
pub mod config;
pub mod dispatch;
pub mod gateway;
pub mod greeting;
pub mod init;
