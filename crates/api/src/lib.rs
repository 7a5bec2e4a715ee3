//! HTTP API: settings, request pipeline, routing and error mapping.

pub mod app;
pub mod context;
pub mod middleware;
pub mod pipeline;
pub mod settings;
