mod app;
mod cli;
mod effects;
mod logging;
mod render;
mod selection;
mod settings;

pub use app::run;
