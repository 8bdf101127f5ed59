pub mod app;
pub mod audio;
pub mod config;
pub mod engine;
pub mod food;
pub mod grid;
pub mod input;
pub mod logging;
pub mod renderer;
pub mod scheduler;
pub mod score;
pub mod session;
pub mod snake;
pub mod terminal_runtime;
pub mod ui;
