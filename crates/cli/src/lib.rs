//! Adapter layer for `stocksync`: presentation and sample data.
//! The binary in `main.rs` wires these to the recon engine.

pub mod render;
pub mod sample;

mod util;
