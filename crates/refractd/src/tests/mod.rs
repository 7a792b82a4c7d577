//! Test suites for the daemon bootstrap and protocol loop.

mod support;
