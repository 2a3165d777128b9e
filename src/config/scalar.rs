// src/config/scalar.rs

//! Helpers for tri-state optional scalars.
//!
//! Every user-facing scalar is an `Option<T>`:
//!
//! - `None`: unset, inherit from a parent or a default at finalize time.
//! - `Some(zero)`: explicitly set to the zero value (e.g. `""`, `false`).
//! - `Some(v)`: explicitly set.
//!
//! Merge logic only ever looks at `is_some()`; presence checks that need to
//! know whether the user typed something meaningful use [`is_present`].

use std::time::Duration;

/// Types with a well-defined "zero" value.
pub trait Zero {
    fn is_zero(&self) -> bool;
}

impl Zero for String {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl Zero for &str {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl Zero for bool {
    fn is_zero(&self) -> bool {
        !*self
    }
}

impl Zero for Duration {
    fn is_zero(&self) -> bool {
        Duration::is_zero(self)
    }
}

macro_rules! impl_zero_for_int {
    ($($t:ty),*) => {
        $(impl Zero for $t {
            fn is_zero(&self) -> bool {
                *self == 0
            }
        })*
    };
}

impl_zero_for_int!(u16, u32, u64, usize, i32, i64);

/// Wrap a value as an explicitly set scalar.
pub fn wrap<T>(value: T) -> Option<T> {
    Some(value)
}

/// The value, or the type's zero value when unset.
pub fn value<T: Clone + Default>(opt: &Option<T>) -> T {
    opt.clone().unwrap_or_default()
}

/// Independent copy of an optional scalar.
pub fn copy<T: Clone>(opt: &Option<T>) -> Option<T> {
    opt.clone()
}

/// True iff the scalar is set AND not its zero value.
pub fn is_present<T: Zero>(opt: &Option<T>) -> bool {
    opt.as_ref().is_some_and(|v| !v.is_zero())
}

/// Fill an unset scalar with `default`.
pub fn default_to<T>(opt: &mut Option<T>, default: T) {
    if opt.is_none() {
        *opt = Some(default);
    }
}

/// Borrow a finalized string field, `""` when unset.
pub fn str_value(opt: &Option<String>) -> &str {
    opt.as_deref().unwrap_or_default()
}
