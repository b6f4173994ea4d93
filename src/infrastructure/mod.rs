pub mod config;
pub mod generator;
pub mod json_store;
pub mod math;
pub mod printer;

pub use config::Config;
pub use generator::CommandGenerator;
pub use json_store::JsonStore;
pub use math::MathRenderer;
pub use printer::{BrowserPrinter, DocumentViewer};
