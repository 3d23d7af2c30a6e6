pub mod kinds;
pub mod memory;

// Re-export commonly used types
pub use kinds::{AlgKind, PrimitiveKind, PropKind};
pub use memory::{DataType, MemoryDesc, MemoryFormat};
