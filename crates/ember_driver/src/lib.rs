mod codegen_backend;
mod context;
mod pipeline;

pub use codegen_backend::{BackendEmitContext, CodegenBackend, ListingBackend};
pub use context::Context;
pub use pipeline::{CompileOutput, compile, emit};
