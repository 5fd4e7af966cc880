//! HTTP API: sale triggers, bundle checks, and response mapping.

pub mod app;
