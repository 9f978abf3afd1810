pub mod dashboard;
pub mod session;
pub mod setup;
pub mod show;
pub mod ui;
