//! Menu controller: panel navigation, persisted audio preferences, feedback cues, and the
//! control binding table that ties them to host widgets.

pub mod background;
pub mod config;
pub mod controller;
pub mod controls;
pub mod feedback;
pub mod panels;
pub mod preferences;

pub use config::MenuConfig;
pub use controller::{Command, Dispatch, MenuController, MenuHost};
