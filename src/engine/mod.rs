pub mod eltwise;
pub mod error;

pub use eltwise::{
    eltwise_backward_desc_init, eltwise_forward_desc_init, relu_backward_desc_init,
    relu_forward_desc_init, EltwiseDesc,
};
pub use error::{EltwiseError, InvalidReason};
