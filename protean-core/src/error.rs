// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Error taxonomy of the engine.
//!
//! Resolution-time failures ([`Error::Resolution`],
//! [`Error::CycleWithoutProgress`]) are fatal for the requesting descriptor
//! and are cached so later requests fail fast. Call-time failures
//! ([`Error::MismatchedShape`], [`Error::Format`] and friends) abort only the
//! in-flight (de)serialize call; cached strategies stay valid.
//!
//! Always create errors through the static constructor functions: they route
//! through the `PROTEAN_PANIC_ON_ERROR` debug switch and accept anything
//! convertible into a `Cow<'static, str>`.

use std::borrow::Cow;

use thiserror::Error;

/// Compile-time flag: set `PROTEAN_PANIC_ON_ERROR=1` in the build environment
/// to panic at the exact construction site of any engine error. Pair with
/// `RUST_BACKTRACE=1` to see where an error originates.
pub const PANIC_ON_ERROR: bool = option_env!("PROTEAN_PANIC_ON_ERROR").is_some();

/// Error type for resolution and (de)serialization operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// No dispatch rule (including the fallback) matched a descriptor.
    /// Raised once at resolution time and replayed from the failure cache.
    #[error("{0}")]
    Resolution(Cow<'static, str>),

    /// A dependency cycle contains no indirection point able to defer
    /// construction. Raised at resolution time, never as stack exhaustion.
    #[error("{0}")]
    CycleWithoutProgress(Cow<'static, str>),

    /// A format backend supplied or expected events inconsistent with the
    /// strategy's shape. Scoped to the single (de)serialize call.
    #[error("{0}")]
    MismatchedShape(Cow<'static, str>),

    /// A failure raised by the format backend. Passes through the traversal
    /// protocol unchanged; the engine neither catches nor retries it.
    #[error(transparent)]
    Format(#[from] anyhow::Error),

    /// A repeated map key under [`crate::types::DuplicateKeys::Unique`].
    #[error("{0}")]
    DuplicateKey(Cow<'static, str>),

    /// A required struct field never arrived from the source.
    #[error("{0}")]
    MissingField(Cow<'static, str>),

    /// A union tag that matches no declared variant.
    #[error("{0}")]
    UnknownVariant(Cow<'static, str>),

    /// Buffer boundary violation in the packed backend.
    #[error("Buffer out of bound: {0} + {1} > {2}")]
    BufferOutOfBound(usize, usize, usize),

    /// A type-erased value failed to cast to the expected concrete type.
    #[error("{0}")]
    TypeError(Cow<'static, str>),

    /// An operation the engine does not support.
    #[error("{0}")]
    Unsupported(Cow<'static, str>),
}

macro_rules! cold_constructor {
    ($(#[$doc:meta])* $name:ident, $variant:ident) => {
        $(#[$doc])*
        #[inline(always)]
        #[cold]
        #[track_caller]
        pub fn $name<S: Into<Cow<'static, str>>>(s: S) -> Self {
            let err = Error::$variant(s.into());
            if PANIC_ON_ERROR {
                panic!("PROTEAN_PANIC_ON_ERROR: {}", err);
            }
            err
        }
    };
}

impl Error {
    cold_constructor!(
        /// Creates a new [`Error::Resolution`].
        resolution,
        Resolution
    );

    cold_constructor!(
        /// Creates a new [`Error::CycleWithoutProgress`].
        cycle_without_progress,
        CycleWithoutProgress
    );

    cold_constructor!(
        /// Creates a new [`Error::MismatchedShape`].
        mismatched_shape,
        MismatchedShape
    );

    cold_constructor!(
        /// Creates a new [`Error::DuplicateKey`].
        duplicate_key,
        DuplicateKey
    );

    cold_constructor!(
        /// Creates a new [`Error::MissingField`].
        missing_field,
        MissingField
    );

    cold_constructor!(
        /// Creates a new [`Error::UnknownVariant`].
        unknown_variant,
        UnknownVariant
    );

    cold_constructor!(
        /// Creates a new [`Error::TypeError`].
        type_error,
        TypeError
    );

    cold_constructor!(
        /// Creates a new [`Error::Unsupported`].
        unsupported,
        Unsupported
    );

    /// Creates a new [`Error::BufferOutOfBound`] with the given bounds.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn buffer_out_of_bound(offset: usize, length: usize, capacity: usize) -> Self {
        let err = Error::BufferOutOfBound(offset, length, capacity);
        if PANIC_ON_ERROR {
            panic!("PROTEAN_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Wraps an opaque backend failure into [`Error::Format`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn format<E: Into<anyhow::Error>>(e: E) -> Self {
        let err = Error::Format(e.into());
        if PANIC_ON_ERROR {
            panic!("PROTEAN_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Appends the concrete type name to a [`Error::TypeError`] message.
    #[inline(never)]
    pub fn enhance_type_error<T: ?Sized + 'static>(err: Error) -> Error {
        if let Error::TypeError(s) = err {
            let mut msg = s.to_string();
            msg.push_str(" (type: ");
            msg.push_str(std::any::type_name::<T>());
            msg.push(')');
            Error::type_error(msg)
        } else {
            err
        }
    }
}

/// Ensures a condition is true; otherwise returns an [`enum@Error`].
///
/// ```
/// use protean_core::ensure;
/// use protean_core::error::Error;
///
/// fn check_arity(n: usize) -> Result<(), Error> {
///     ensure!(n <= 4, Error::unsupported(format!("arity {} too large", n)));
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}

/// Returns early with an [`Error::TypeError`].
#[macro_export]
macro_rules! bail {
    ($err:expr) => {
        return Err($crate::error::Error::type_error($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::error::Error::type_error(format!($fmt, $($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_accept_static_and_owned_messages() {
        let a = Error::resolution("no rule matched");
        let b = Error::resolution(format!("no rule matched for {}", "X"));
        assert!(matches!(a, Error::Resolution(_)));
        assert!(matches!(b, Error::Resolution(_)));
    }

    #[test]
    fn format_errors_pass_through_display() {
        let err = Error::format(anyhow::anyhow!("backend exploded"));
        assert_eq!(err.to_string(), "backend exploded");
    }
}
