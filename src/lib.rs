pub mod app;
pub mod cli;
pub mod config;
pub mod highlight;
pub mod storage;
pub mod toolbar;
pub mod ui;
pub mod window;

pub use config::{AppConfig, ConfigLoader, ConfigPaths};
pub use storage::{NoteId, NoteRecord, NoteStore};
pub use toolbar::Toolbar;
