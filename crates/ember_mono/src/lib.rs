//! Monomorphization of Ember module expressions.
//!
//! Input: a typed, polymorphic [`Mast`](ember_mast::Mast) plus the type store
//! it was checked against. Output: one [`MonoMod`] per distinct instantiation,
//! with every field given a concrete type and a resolved target, and one
//! [`ClosureRecord`] per closure literal per owning instance.

pub mod capture;
pub mod dump;
pub mod error;
pub mod instance;
pub mod mangle;
pub mod mono;

pub use error::MonoError;
pub use instance::{
  Capture, ClosureId, ClosureRecord, DefKind, DefTarget, GlobalDef, InstanceKey, MonoMod, MonoModId,
};
pub use mono::{MonoOutput, MonoStats, Monomorphizer};
