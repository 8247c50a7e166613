mod file;
mod settings;

pub use file::{FileConfig, SearchFileConfig};
pub use settings::{Config, SearchSettings};
