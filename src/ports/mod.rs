//! Port traits defining external boundaries.
//!
//! The core only touches time, disk, and id generation through these
//! traits. Implementations live in `src/adapters/`.

pub mod clock;
pub mod filesystem;
pub mod id_gen;

pub use clock::Clock;
pub use filesystem::FileSystem;
pub use id_gen::IdGenerator;
