pub mod model_store;
pub mod source;

pub use model_store::{ModelStore, MODEL_FORMAT_VERSION};
pub use source::{JsonTableSource, MemoryTableSource, TableSource};
