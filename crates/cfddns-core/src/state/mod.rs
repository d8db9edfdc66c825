// # State Store Implementations
//
// Only an in-memory store exists: the last-known address is deliberately
// lost on restart.

pub mod memory;

pub use memory::MemoryStateStore;
