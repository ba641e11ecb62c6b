// Application shell around winwin-core: value and league sources, league
// joining, report formatting and the weekly run. Exposed as a library so the
// integration tests can drive it.

pub mod fetch;
pub mod league;
pub mod report;
pub mod values;
pub mod weekly;
