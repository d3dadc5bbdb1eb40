//! Service context bundling all port trait objects.

use crate::adapters::live::{LiveClock, LiveFileSystem, LiveIdGenerator};
use crate::adapters::memory::{MemoryFileSystem, SequentialIdGenerator, SteppingClock};
use crate::ports::clock::Clock;
use crate::ports::filesystem::FileSystem;
use crate::ports::id_gen::IdGenerator;

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Constructors
/// wire up live or in-memory adapters.
pub struct ServiceContext {
    /// Clock for changelog and task timestamps.
    pub clock: Box<dyn Clock>,
    /// Filesystem for the store.
    pub fs: Box<dyn FileSystem>,
    /// ID generator for plan ids.
    pub id_gen: Box<dyn IdGenerator>,
}

impl ServiceContext {
    /// Creates a context from explicit adapters.
    #[must_use]
    pub fn new(
        clock: Box<dyn Clock>,
        fs: Box<dyn FileSystem>,
        id_gen: Box<dyn IdGenerator>,
    ) -> Self {
        Self { clock, fs, id_gen }
    }

    /// Creates a live context backed by the system clock and the real disk.
    #[must_use]
    pub fn live() -> Self {
        Self::new(Box::new(LiveClock), Box::new(LiveFileSystem), Box::new(LiveIdGenerator))
    }

    /// Creates a fully in-memory context with a deterministic clock and ids.
    ///
    /// Pass a clone of `fs` to keep a handle for inspection or failure
    /// injection.
    #[must_use]
    pub fn in_memory(fs: MemoryFileSystem) -> Self {
        Self::new(
            Box::new(SteppingClock::default()),
            Box::new(fs),
            Box::new(SequentialIdGenerator::new("plan")),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn in_memory_context_is_deterministic() {
        let fs = MemoryFileSystem::new();
        let ctx = ServiceContext::in_memory(fs.clone());

        assert_eq!(ctx.clock.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert_eq!(ctx.clock.now().to_rfc3339(), "2025-01-01T00:00:01+00:00");
        assert_eq!(ctx.id_gen.generate_id(), "plan-1");

        ctx.fs.write(Path::new("/store/x.yaml"), "x").unwrap();
        assert_eq!(fs.paths(), vec![Path::new("/store/x.yaml").to_path_buf()]);
    }
}
