//! Ambient per-task depth budget
//!
//! The resolver's recursion counter is thread-local, not shared: parallel
//! `format_pattern` calls on different threads each get the full budget,
//! and a custom function that re-enters the resolver on the same thread
//! keeps consuming the same budget, so callbacks cannot bypass the
//! nesting limit. The frame releases its slot on drop, on every exit
//! path.

use std::cell::Cell;

thread_local! {
    static AMBIENT_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Typed overflow signal for the ambient budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmbientDepthExceeded {
    pub max_depth: usize,
}

/// One claimed level of the current thread's budget
#[derive(Debug)]
pub struct AmbientFrame {
    _private: (),
}

impl Drop for AmbientFrame {
    fn drop(&mut self) {
        AMBIENT_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Claim one level; the check happens before the increment, so a failed
/// entry leaves the counter untouched.
pub fn enter(max_depth: usize) -> Result<AmbientFrame, AmbientDepthExceeded> {
    AMBIENT_DEPTH.with(|depth| {
        let current = depth.get();
        if current >= max_depth {
            return Err(AmbientDepthExceeded { max_depth });
        }
        depth.set(current + 1);
        Ok(AmbientFrame { _private: () })
    })
}

/// Current depth on this thread
pub fn current() -> usize {
    AMBIENT_DEPTH.with(|depth| depth.get())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_balance_on_drop() {
        assert_eq!(current(), 0);
        {
            let _a = enter(10).unwrap();
            let _b = enter(10).unwrap();
            assert_eq!(current(), 2);
        }
        assert_eq!(current(), 0);
    }

    #[test]
    fn rejected_entry_keeps_the_counter() {
        let _a = enter(1).unwrap();
        assert!(enter(1).is_err());
        assert_eq!(current(), 1);
    }

    #[test]
    fn threads_have_independent_budgets() {
        let _outer = enter(2).unwrap();
        let _outer2 = enter(2).unwrap();
        assert!(enter(2).is_err());
        std::thread::spawn(|| {
            assert_eq!(current(), 0);
            assert!(enter(2).is_ok());
        })
        .join()
        .unwrap();
    }
}
