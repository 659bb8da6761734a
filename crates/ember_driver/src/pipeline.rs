use colored::*;
use ember_config::{DebugTrace, DumpKind, EmberConfig};
use ember_diagnostics::diagnostic_report::Diagnostic;
use ember_log::{log_dbg, phase_log, phase_ok, trace_dbg};
use ember_mast::ModExpId;
use ember_mono::{DefKind, MonoOutput, dump};
use ember_type::span::Span;

use crate::{
  codegen_backend::{BackendEmitContext, CodegenBackend},
  context::Context,
};

const NON_CONCRETE_WARNING: &str = "M0100";

pub struct CompileOutput {
  pub mono: MonoOutput,
  /// Whatever the backend returned from `finish`.
  pub emitted: String,
  /// Requested dumps, in `DumpKind` order.
  pub dumps: Vec<(DumpKind, String)>,
}

fn dump_requested(
  config: &EmberConfig,
  kind: DumpKind,
) -> bool {
  config.dumps(kind)
}

fn collect_dumps(
  ctx: &Context,
  mono: &MonoOutput,
) -> Result<Vec<(DumpKind, String)>, ()> {
  let mut dumps = Vec::new();

  if dump_requested(&ctx.config, DumpKind::Types) {
    dumps.push((DumpKind::Types, dump::dump_types(&ctx.types, &ctx.symbols)));
  }

  if dump_requested(&ctx.config, DumpKind::Mono) {
    let mut text = dump::dump_instances(mono, &ctx.mast, &ctx.types, &ctx.symbols);
    text.push('\n');
    text.push_str(&dump::dump_closures(mono, &ctx.types, &ctx.symbols));
    dumps.push((DumpKind::Mono, text));
  }

  if dump_requested(&ctx.config, DumpKind::MonoJson) {
    match dump::dump_json(mono, &ctx.types, &ctx.symbols) {
      Ok(json) => dumps.push((DumpKind::MonoJson, json)),
      Err(e) => {
        eprintln!("{} Failed to serialize instance summary: {}", "Error:".red().bold(), e);
        return Err(());
      },
    }
  }

  Ok(dumps)
}

/// Monomorphize from `root`, print the requested dumps and run `backend`
/// over the instances. Errors are rendered before returning.
pub fn compile<B: CodegenBackend + ?Sized>(
  ctx: &mut Context,
  root: ModExpId,
  backend: &mut B,
) -> Result<CompileOutput, ()> {
  let mono = match ctx.monomorphize(root) {
    Ok(mono) => mono,
    Err(err) => {
      if !ctx.config.quiet {
        ctx.render(&err);
      }
      return Err(());
    },
  };

  phase_ok!(
    &ctx.config,
    "Monomorphized {} instance(s), {} closure(s)",
    mono.instance_count(),
    mono.closure_count()
  );

  if !ctx.config.quiet && !mono.warnings.is_empty() {
    let warnings: Vec<Diagnostic> = mono
      .warnings
      .iter()
      .map(|w| Diagnostic::warning(NON_CONCRETE_WARNING, w.as_str(), Span::synthetic()))
      .collect();
    ember_diagnostics::render_batch(&warnings, &ctx.source_map);
  }

  let dumps = collect_dumps(ctx, &mono)?;
  for (_, text) in &dumps {
    println!("\n{}", text);
  }

  phase_log!(&ctx.config, "Emitting with the {} backend...", backend.name());

  let emitted = match emit(ctx, &mono, backend) {
    Ok(emitted) => emitted,
    Err(e) => {
      eprintln!("{} {}", "Error:".red().bold(), e);
      return Err(());
    },
  };

  Ok(CompileOutput { mono, emitted, dumps })
}

/// Drive `backend` over `mono` in instance id order: closures first, then
/// value fields. Type constants are erased.
pub fn emit<B: CodegenBackend + ?Sized>(
  ctx: &Context,
  mono: &MonoOutput,
  backend: &mut B,
) -> Result<String, String> {
  let context = BackendEmitContext {
    mono,
    mast: &ctx.mast,
    types: &ctx.types,
    symbols: &ctx.symbols,
  };

  for (_, closure) in mono.closures.iter() {
    backend.declare_closure(&context, closure)?;
  }

  let mut erased = 0;
  for (_, instance) in mono.instances.iter() {
    for field in &instance.fields {
      match field.kind {
        DefKind::TypeConstant => erased += 1,
        DefKind::ValueConstant => backend.emit_field(&context, instance, field)?,
      }
    }

    trace_dbg!(&ctx.config, DebugTrace::Driver, "emitted {}", instance.name);
  }

  log_dbg!(&ctx.config, "erased {} type constant(s)", erased);

  backend.finish(&context)
}
