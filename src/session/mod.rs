//! Recognition session lifecycle.
//!
//! The session is split so the interesting logic stays synchronous and
//! timer-free: `controller` is the pure state machine, `backoff` computes
//! restart timing functionally, `events` is the typed listener bus, and
//! `driver` is the thin tokio task that owns the provider and the clock.

pub mod backoff;
pub mod controller;
pub mod driver;
pub mod events;
pub mod provider;
