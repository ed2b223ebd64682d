//! Shared synchronization and atomic types.
//!
//! One import point so the metering code does not care whether a lock comes
//! from `parking_lot` or `std`.

pub use parking_lot::{Mutex, RwLock};

pub use std::sync::{
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    Arc,
};
