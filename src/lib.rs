//! MiniVault - a local prompt gateway
//! MiniVault - 本地提示词网关

pub mod config;
pub mod vault;
