//! Template store owned by the serving component

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::concat::{Concatenation, Concatenator};
use super::error::Result;
use super::reader::SourceReader;
use super::registry::TemplateRegistry;

/// Registry and concatenator shared by every template-load request.
///
/// The registry lock is held for a whole load, so concurrent loads never
/// interleave their reads and appends.
pub struct TemplateStore<R> {
    concatenator: Concatenator<R>,
    registry: Mutex<TemplateRegistry>,
}

impl<R: SourceReader> TemplateStore<R> {
    pub fn new(reader: R) -> Self {
        Self {
            concatenator: Concatenator::new(reader),
            registry: Mutex::new(TemplateRegistry::new()),
        }
    }

    pub fn load<S: AsRef<str>>(&self, files: &[S]) -> Result<Concatenation> {
        let mut registry = self.lock();
        self.concatenator.concat(&mut registry, files)
    }

    pub fn template_count(&self) -> usize {
        self.lock().template_count()
    }

    pub fn file_count(&self) -> usize {
        self.lock().file_count()
    }

    // Inserts are single map operations, a poisoned registry is still usable
    fn lock(&self) -> MutexGuard<'_, TemplateRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
