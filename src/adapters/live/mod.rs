//! Live adapters backed by the real clock, disk, and random ids.

pub mod clock;
pub mod filesystem;
pub mod id_gen;

pub use clock::LiveClock;
pub use filesystem::LiveFileSystem;
pub use id_gen::LiveIdGenerator;
