//! Access gate for the tracker.
//!
//! The Store verifies a shared PIN (`POST /verify-pin`); a successful check
//! persists an opaque unlock flag next to the cached data so the session
//! stays unlocked offline. The PIN itself is never stored. This is an
//! access gate, not a credential system.

pub mod session;

pub use session::PinGate;
