//! 基础设施层
//!
//! 持有稀缺资源（存储、编辑器），只暴露能力，不认识题目流程

pub mod editor;
pub mod store;
pub mod store_adapter;

pub use editor::{BufferEditor, CodeEditor};
pub use store::{JsonFileStore, KvStore, MemoryStore};
pub use store_adapter::StoreAdapter;
