pub mod diagnostic_report;

use std::fmt::Write;

use colored::*;
use diagnostic_report::{Diagnostic, Severity};
use ember_type::file::SourceMap;

/// Prints `diag` to stderr.
pub fn render(
  diag: &Diagnostic,
  sm: &SourceMap,
) {
  eprint!("{}", format_diagnostic(diag, sm));
}

pub fn render_batch(
  diagnostics: &[Diagnostic],
  sm: &SourceMap,
) {
  for diag in diagnostics {
    render(diag, sm);
  }
}

pub fn format_diagnostic(
  diag: &Diagnostic,
  sm: &SourceMap,
) -> String {
  let mut out = String::new();
  write_header(&mut out, diag);
  write_body(&mut out, diag, sm);

  for note in &diag.notes {
    let _ = writeln!(out, "  {} {}", "note:".cyan().bold(), note);
  }

  out.push('\n');
  out
}

fn write_header(
  out: &mut String,
  diag: &Diagnostic,
) {
  let title = diag.severity.title();
  let message = diag.message.bold();

  let _ = match diag.severity {
    Severity::Error => writeln!(out, "{}[{}]: {}", title.red().bold(), diag.error_code.red().bold(), message),
    Severity::Warning => writeln!(out, "{}[{}]: {}", title.yellow().bold(), diag.error_code.yellow(), message),
  };

  if let Some(instance) = &diag.instance {
    let _ = writeln!(out, "{:2}{} {}", "", "in instance".blue().bold(), instance);
  }
}

fn write_body(
  out: &mut String,
  diag: &Diagnostic,
  sm: &SourceMap,
) {
  let span = diag.primary_span;

  // Compiler-synthesized nodes have no text to point at.
  let Some(file) = sm.try_get(&span.file) else {
    let _ = writeln!(out, "{:2}{} <synthetic>", "", "-->".blue().bold());
    return;
  };

  let (line, col) = sm.line_col(&span.file, span.start);
  let (end_line, end_col) = sm.line_col(&span.file, span.end);

  let _ = writeln!(
    out,
    "{:2}{} {}:{}:{}",
    "",
    "-->".blue().bold(),
    file.path.display().to_string().bold(),
    line.to_string().bold(),
    col.to_string().bold(),
  );

  let pipe = "|".blue().bold();
  let lines: Vec<&str> = file.text.lines().collect();
  let line_idx = (line as usize).saturating_sub(1);

  let _ = writeln!(out, "{:3}{:3}", "", pipe);
  if let Some(error_line) = lines.get(line_idx) {
    let _ = writeln!(out, "{:3}{:3}{}", line.to_string().blue().bold(), pipe, error_line);

    let span_len = if line == end_line {
      (end_col.saturating_sub(col)).max(1) as usize
    } else {
      error_line.len().saturating_sub(col as usize).max(1)
    };

    let caret = "^".repeat(span_len).red().bold();
    let _ = writeln!(out, "{:3}{:3}{}{}", "", pipe, " ".repeat((col as usize).saturating_sub(1)), caret);
  }
}
