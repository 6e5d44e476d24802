//! Entitlement & access gate.
//!
//! Three cooperating pieces: the session resolver (bearer token → verified
//! identity → user record, cached per email), the entitlement evaluator (a
//! pure expiry check), and the route gate that consumes both to allow or
//! redirect a request. The gate only ever sees a fully resolved session —
//! the resolver middleware runs to completion before any handler or gate.

pub mod cache;
pub mod entitlement;
pub mod gate;
pub mod resolver;
pub mod verifier;

pub use gate::{GateDecision, GatePolicy};
pub use resolver::SessionState;
