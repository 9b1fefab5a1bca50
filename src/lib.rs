//! bookshelf-mcp
//!
//! 個人用の本棚マネージャ。MCP Protocol (stdio) <-> application::Library

pub mod application;
pub mod domain;
pub mod infra;
pub mod interface;
