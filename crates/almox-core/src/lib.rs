pub mod code;
pub mod config;
pub mod db;
pub mod diagnose;
pub mod error;
pub mod generator;
pub mod io;
pub mod item;
pub mod paths;
pub mod store;

pub use code::{Code, CodeFormat};
pub use error::{AlmoxError, Result};
pub use generator::{CodeGenerator, GeneratorSettings};
pub use store::{CodeStore, ItemStore, MemoryStore};
