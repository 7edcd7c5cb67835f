//! Shared test scaffolding. Compiled into the library so integration
//! tests under `tests/` can reuse it.

pub mod logging;
