//! Document integration tests
//!
//! Tests are organized by behaviour: the delete and list scenarios every
//! replica must agree on, causal buffering, and randomized convergence.

mod buffering;
mod convergence;
