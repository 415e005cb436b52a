#![allow(forbidden_lint_groups)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

mod atomic_flag;

use std::sync::Arc;

pub use atomic_flag::ArcAtomicBool;
pub use parking_lot::*;

/// Returned by the `try_*` accessors when the lock is held by someone else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WouldBlock;

pub trait ArcRwLockExt<T> {
    fn get<R>(&self, closure: impl FnOnce(&T) -> R) -> R;
    fn get_mut<R>(&self, closure: impl FnOnce(&mut T) -> R) -> R;

    /// Never waits: a realtime reader gives up instead of blocking behind a writer.
    fn try_get<R>(&self, closure: impl FnOnce(&T) -> R) -> Result<R, WouldBlock>;
    fn try_get_mut<R>(&self, closure: impl FnOnce(&mut T) -> R) -> Result<R, WouldBlock>;
}

pub type ArcRwLock<T> = Arc<RwLock<T>>;

impl<T> ArcRwLockExt<T> for RwLock<T> {
    fn get<R>(&self, closure: impl FnOnce(&T) -> R) -> R {
        let guard = RwLock::read(self);
        closure(&*guard)
    }

    fn get_mut<R>(&self, closure: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = RwLock::write(self);
        closure(&mut *guard)
    }

    fn try_get<R>(&self, closure: impl FnOnce(&T) -> R) -> Result<R, WouldBlock> {
        let guard = RwLock::try_read(self).ok_or(WouldBlock)?;
        Ok(closure(&*guard))
    }

    fn try_get_mut<R>(&self, closure: impl FnOnce(&mut T) -> R) -> Result<R, WouldBlock> {
        let mut guard = RwLock::try_write(self).ok_or(WouldBlock)?;
        Ok(closure(&mut *guard))
    }
}
