pub mod setup;
pub mod stages;
pub mod ui;
