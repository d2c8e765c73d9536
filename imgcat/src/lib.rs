// ABOUTME: Library exports for the imgcat binary's modules
// ABOUTME: Makes the viewer internals available to integration tests and benchmarks

pub mod app;
pub mod cli;
pub mod cli_output;
pub mod config;
pub mod keys;
pub mod terminal;
