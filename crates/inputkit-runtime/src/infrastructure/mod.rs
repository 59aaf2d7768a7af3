//! Infrastructure layer for the runtime.
//!
//! Contains OS-facing adapters: input sources and file-system storage.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `inputkit_core`, but MUST NOT be imported by the `application` layer,
//! except through the [`input_source::InputSource`] trait it defines.

pub mod input_source;
pub mod storage;
