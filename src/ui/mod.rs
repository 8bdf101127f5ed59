pub mod backdrop;
pub mod hud;
pub mod menu;
