/*! Integration tests for Replidoc.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - clock: Tests for the logical clock and timestamp merging
 * - operation: Tests for operation construction, cursors and the wire form
 * - crdt: Tests for the Node read and write API
 * - document: Tests for applying, buffering and converging replicas
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("replidoc=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod clock;
mod document;
mod operation;
