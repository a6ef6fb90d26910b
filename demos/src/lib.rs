pub mod app_setup_options;
pub mod character_control_systems;
pub mod level_mechanics;
pub mod levels_setup;
pub mod ui;
