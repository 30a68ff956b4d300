//! HTTP API: server configuration, routing, and the request pipeline.

pub mod app;
pub mod config;
pub mod middleware;
