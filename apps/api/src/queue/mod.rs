//! The live queue core: access gate, reorder engine, status machine,
//! persistence seam, and the orchestrating service.

pub mod access;
pub mod reorder;
pub mod service;
pub mod status;
pub mod store;
