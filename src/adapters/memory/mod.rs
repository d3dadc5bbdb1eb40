//! In-memory adapters for deterministic tests and dry runs.

pub mod clock;
pub mod filesystem;
pub mod id_gen;

pub use clock::SteppingClock;
pub use filesystem::MemoryFileSystem;
pub use id_gen::SequentialIdGenerator;
