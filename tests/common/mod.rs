#![allow(dead_code)]

pub use icebreak_test_utils::{init_tracing, with_timeout};
