//! Integration test support for tvb-server.

pub mod common;
