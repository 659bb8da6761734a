use std::fmt;

use ember_diagnostics::diagnostic_report::Diagnostic;
use ember_type::{span::Span, types::TypeError};

/// Internal-consistency failures of the monomorphizer. Each one means an
/// earlier stage admitted an ill-formed program; none is recoverable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonoError {
  /// Instantiation site supplies a different number of arguments than the
  /// module declares template parameters.
  ArgListArityMismatch {
    module: String,
    expected: usize,
    found: usize,
    span: Span,
  },
  /// A type argument given for a value parameter, or the other way around.
  ArgKindMismatch {
    module: String,
    index: usize,
    expected_type: bool,
    span: Span,
  },
  /// The module's scheme disagrees with its type-valued parameters.
  ArityMismatch {
    module: String,
    expected: usize,
    found: usize,
    span: Span,
  },
  UnknownDefinitionKind {
    field: String,
    found: &'static str,
    span: Span,
  },
  UnknownModuleField {
    module: String,
    field: String,
    span: Span,
  },
  /// Reference to a module whose enclosing instance cannot be determined
  /// from the referencing site.
  UnboundModuleReference { module: String, span: Span },
  Type {
    error: TypeError,
    context: String,
    span: Span,
  },
  InstantiationLimit {
    limit: usize,
    module: String,
    span: Span,
  },
}

impl MonoError {
  pub fn code(&self) -> String {
    match self {
      MonoError::ArgListArityMismatch { .. } => "M0001",
      MonoError::ArgKindMismatch { .. } => "M0002",
      MonoError::ArityMismatch { .. } => "M0003",
      MonoError::UnknownDefinitionKind { .. } => "M0004",
      MonoError::UnknownModuleField { .. } => "M0005",
      MonoError::UnboundModuleReference { .. } => "M0006",
      MonoError::Type { .. } => "M0007",
      MonoError::InstantiationLimit { .. } => "M0008",
    }
    .to_string()
  }

  pub fn span(&self) -> Span {
    match self {
      MonoError::ArgListArityMismatch { span, .. }
      | MonoError::ArgKindMismatch { span, .. }
      | MonoError::ArityMismatch { span, .. }
      | MonoError::UnknownDefinitionKind { span, .. }
      | MonoError::UnknownModuleField { span, .. }
      | MonoError::UnboundModuleReference { span, .. }
      | MonoError::Type { span, .. }
      | MonoError::InstantiationLimit { span, .. } => *span,
    }
  }

  pub fn report(&self) -> Diagnostic {
    let note = match self {
      MonoError::InstantiationLimit { .. } => {
        "generic modules are instantiated without bound; raise `mono.max_instances` only if this is expected"
      },
      _ => "internal compiler error: an earlier stage admitted an ill-formed instantiation",
    };

    let diag = Diagnostic::error(self.code(), self.to_string(), self.span()).with_note(note);
    match self {
      MonoError::UnknownModuleField { module, .. } => diag.in_instance(module.as_str()),
      _ => diag,
    }
  }
}

impl fmt::Display for MonoError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      MonoError::ArgListArityMismatch {
        module,
        expected,
        found,
        ..
      } => write!(
        f,
        "module '{}' declares {} template parameter(s) but was given {} argument(s)",
        module, expected, found
      ),
      MonoError::ArgKindMismatch {
        module,
        index,
        expected_type,
        ..
      } => {
        let (expected, found) = if *expected_type { ("type", "value") } else { ("value", "type") };
        write!(
          f,
          "argument {} of module '{}' must be a {} but a {} was given",
          index, module, expected, found
        )
      },
      MonoError::ArityMismatch {
        module,
        expected,
        found,
        ..
      } => write!(
        f,
        "scheme of module '{}' quantifies {} variable(s) but {} type argument(s) were given",
        module, expected, found
      ),
      MonoError::UnknownDefinitionKind { field, found, .. } => {
        write!(f, "field '{}' resolves to a {}, which is neither a type nor a value", field, found)
      },
      MonoError::UnknownModuleField { module, field, .. } => {
        write!(f, "module '{}' has no field '{}'", module, field)
      },
      MonoError::UnboundModuleReference { module, .. } => {
        write!(f, "module '{}' is referenced outside of an instance of its enclosing module", module)
      },
      MonoError::Type { error, context, .. } => write!(f, "{}: {}", context, error),
      MonoError::InstantiationLimit { limit, module, .. } => write!(
        f,
        "instantiating module '{}' exceeds the limit of {} concrete module instances",
        module, limit
      ),
    }
  }
}

impl std::error::Error for MonoError {}
