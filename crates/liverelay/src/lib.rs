//! Top-level facade crate for liverelay.
//!
//! Re-exports the core protocol types and the bridge library so users can
//! depend on a single crate.

pub mod core {
    pub use liverelay_core::*;
}

pub mod bridge {
    pub use liverelay_bridge::*;
}
