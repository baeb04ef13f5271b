#![allow(dead_code)]

use myt::{TransformationConfig, Translator};
use std::sync::Once;

static INIT: Once = Once::new();

/// Route `log` output through the test harness
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

pub fn translator() -> Translator {
    init_test_env();
    Translator::new(TransformationConfig::default()).expect("Failed to create translator")
}

pub fn translate(sql: &str) -> String {
    translator().translate(sql).sql
}
