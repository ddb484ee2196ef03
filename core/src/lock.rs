use parking_lot::{Condvar, Mutex};
use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};

/// A simple custom lock that allows simultaneous read operations but gives a
/// writer exclusive access. The protected value is owned by the lock and only
/// reachable through RAII guards, so every exit path releases.
///
/// No priority or fairness policy: whichever waiter's condition becomes true
/// first proceeds. Sustained read traffic can starve a writer indefinitely;
/// that is a known limitation of this lock, not something it tries to fix.
pub struct ReadWriteLock<T> {
    state: Mutex<LockState>,
    cond: Condvar,
    data: UnsafeCell<T>,
}

#[derive(Default)]
struct LockState {
    readers: usize,
    writers: usize,
}

// Readers exclude writers and vice versa, so handing out &T to many threads
// and &mut T to exactly one is sound.
unsafe impl<T: Send> Send for ReadWriteLock<T> {}
unsafe impl<T: Send + Sync> Sync for ReadWriteLock<T> {}

impl<T> ReadWriteLock<T> {
    pub fn new(data: T) -> Self {
        Self {
            state: Mutex::new(LockState::default()),
            cond: Condvar::new(),
            data: UnsafeCell::new(data),
        }
    }

    /// Waits until there are no active writers, then registers a reader.
    pub fn read(&self) -> ReadGuard<'_, T> {
        let mut state = self.state.lock();
        while state.writers > 0 {
            self.cond.wait(&mut state);
        }
        state.readers += 1;
        ReadGuard { lock: self }
    }

    /// Waits until there are no active readers or writers, then registers
    /// the writer.
    pub fn write(&self) -> WriteGuard<'_, T> {
        let mut state = self.state.lock();
        while state.readers > 0 || state.writers > 0 {
            self.cond.wait(&mut state);
        }
        state.writers += 1;
        WriteGuard { lock: self }
    }

    /// Consumes the lock and returns the inner value.
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

/// Shared access to the protected value. Dropping the guard releases the
/// read side and wakes one waiter so a blocked writer can re-check.
pub struct ReadGuard<'a, T> {
    lock: &'a ReadWriteLock<T>,
}

impl<T> Deref for ReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> Drop for ReadGuard<'_, T> {
    fn drop(&mut self) {
        let mut state = self.lock.state.lock();
        state.readers -= 1;
        self.lock.cond.notify_one();
    }
}

/// Exclusive access to the protected value. Dropping the guard releases the
/// write side and wakes all waiters, since both readers and writers may now
/// be eligible.
pub struct WriteGuard<'a, T> {
    lock: &'a ReadWriteLock<T>,
}

impl<T> Deref for WriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for WriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for WriteGuard<'_, T> {
    fn drop(&mut self) {
        let mut state = self.lock.state.lock();
        state.writers -= 1;
        self.lock.cond.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn writes_are_exclusive() {
        let lock = Arc::new(ReadWriteLock::new(0usize));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let lock = lock.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..500 {
                    let mut value = lock.write();
                    *value += 1;
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(*lock.read(), 4000);
    }

    #[test]
    fn readers_share_access() {
        let lock = Arc::new(ReadWriteLock::new(vec![1, 2, 3]));
        let a = lock.read();
        let b = lock.read();
        assert_eq!(a.len(), 3);
        assert_eq!(b.len(), 3);
    }
}
