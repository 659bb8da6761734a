use ember_type::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
  Error,
  Warning,
}

impl Severity {
  pub fn title(&self) -> &'static str {
    match self {
      Severity::Error => "Error",
      Severity::Warning => "Warning",
    }
  }
}

/// A problem found while building concrete module instances.
#[derive(Debug, Clone)]
pub struct Diagnostic {
  pub severity: Severity,
  pub message: String,
  pub error_code: String,
  pub primary_span: Span,
  /// Concrete instance under construction when the problem was found.
  pub instance: Option<String>,
  pub notes: Vec<String>,
}

impl Diagnostic {
  pub fn error(
    error_code: impl Into<String>,
    message: impl Into<String>,
    primary_span: Span,
  ) -> Self {
    Self::new(Severity::Error, error_code.into(), message.into(), primary_span)
  }

  pub fn warning(
    error_code: impl Into<String>,
    message: impl Into<String>,
    primary_span: Span,
  ) -> Self {
    Self::new(Severity::Warning, error_code.into(), message.into(), primary_span)
  }

  fn new(
    severity: Severity,
    error_code: String,
    message: String,
    primary_span: Span,
  ) -> Self {
    Self {
      severity,
      message,
      error_code,
      primary_span,
      instance: None,
      notes: Vec::new(),
    }
  }

  pub fn in_instance(
    mut self,
    name: impl Into<String>,
  ) -> Self {
    self.instance = Some(name.into());
    self
  }

  pub fn with_note(
    mut self,
    note: impl Into<String>,
  ) -> Self {
    self.notes.push(note.into());
    self
  }

  pub fn is_error(&self) -> bool {
    self.severity == Severity::Error
  }
}
