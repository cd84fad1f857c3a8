use crate::{span, testing::common_init};
use test_context::TestContext;
pub use test_context::test_context;
use tracing::{Level, span::EnteredSpan};

/// Installs the test subscriber and runs the test inside its own span, so
/// `RUST_LOG=trace` output can be told apart per test.
pub struct Traced {
    _span: EnteredSpan,
}

impl TestContext for Traced {
    fn setup() -> Self {
        common_init();
        Self {
            _span: span!(Level::DEBUG, "test").entered(),
        }
    }
}
