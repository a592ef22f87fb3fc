//! Classification modules
//!
//! The model capability, majority-vote reduction and streaming sessions.
//! The ONNX runtime backend is optional (`ml` feature).

pub mod model;
pub mod session;

#[cfg(feature = "ml")]
pub mod onnx_model;
