//! Bulk Loader
//!
//! Seeds the backend from every remote key under the current prefix.
//! Runs once at attach, before any user code, and again on demand.

use crate::backend::RealBackend;
use crate::translator::CommandTranslator;

/// Summary of one load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Keys listed under the prefix
    pub listed: usize,

    /// Keys that ended up with a local value
    pub loaded: usize,
}

pub struct BulkLoader;

impl BulkLoader {
    /// Enumerate the namespace and `get` each bare name.
    ///
    /// Unlike every other operation, the load does not re-read the prefix
    /// per key: it is captured once before `KEYS`, and all the `GET`s use
    /// it. A prefix variable stored in the namespace itself therefore
    /// cannot move the rest of the load into another namespace.
    pub fn run<B: RealBackend>(translator: &mut CommandTranslator<B>) -> LoadReport {
        if !translator.is_connected() {
            return LoadReport::default();
        }

        let prefix = translator.prefix();
        let names = translator.list_namespace(&prefix);
        let mut report = LoadReport {
            listed: names.len(),
            loaded: 0,
        };

        for name in &names {
            if translator.get_in(&prefix, name).is_some() {
                report.loaded += 1;
            }
        }

        tracing::info!(
            "Loaded {} of {} remote variables under {:?}",
            report.loaded,
            report.listed,
            prefix
        );
        report
    }
}
