#![no_std]

extern crate alloc;

mod types;
pub mod xdma;

pub use types::*;
pub use xdma::{PhyStatus, Xdma};
