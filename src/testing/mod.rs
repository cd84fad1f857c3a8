#![cfg(test)]
crate::reexport!(context);
pub use rstest::*;

pub(crate) fn common_init() {
    use std::sync::Once;
    use tracing_subscriber::EnvFilter;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env()) // RUST_LOG
            .with_test_writer()
            .init();
    });
}

mod traced_tests {
    use super::*;
    use crate::{BoundaryDetector, line::LineTokenizer};

    #[test_context(Traced)]
    #[test]
    fn logs_while_scanning(_ctx: &mut Traced) {
        let tokens = LineTokenizer::new("echo hi > out.txt").tokenize().unwrap();
        assert_eq!(tokens.len(), 3);
        assert!(BoundaryDetector::default().detect("select 1;", 9).is_complete());
    }
}
