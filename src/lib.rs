pub mod chat;
pub mod common;
pub mod dashboard;
pub mod goals;
pub mod gui;
pub mod logging;
pub mod settings;
pub mod store;
