// src/lib.rs

pub mod config;
pub mod core;
pub mod engine;
pub mod logging;
pub mod utils;

pub use crate::core::kinds;
pub use crate::core::memory;

// Re-exports para tener una API limpia desde fuera del crate
pub use config::{ConfigError, DescriptorRequest, RequestOp, ToolConfig};
pub use engine::{
    eltwise_backward_desc_init, eltwise_forward_desc_init, relu_backward_desc_init,
    relu_forward_desc_init, EltwiseDesc, EltwiseError, InvalidReason,
};
pub use kinds::{AlgKind, PrimitiveKind, PropKind, UnknownKind};
pub use memory::{DataType, MemoryDesc, MemoryDescError, MemoryFormat, MAX_NDIMS};
