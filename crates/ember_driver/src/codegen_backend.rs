use ember_mast::Mast;
use ember_mono::{ClosureRecord, DefTarget, GlobalDef, MonoMod, MonoOutput, dump};
use ember_type::{symbol::SymbolTable, types::TypeStore};

pub struct BackendEmitContext<'a> {
  pub mono: &'a MonoOutput,
  pub mast: &'a Mast,
  pub types: &'a TypeStore,
  pub symbols: &'a SymbolTable,
}

impl BackendEmitContext<'_> {
  pub fn spell(
    &self,
    ty: &ember_type::types::TypeId,
  ) -> String {
    self.types.spelling(ty, self.symbols)
  }
}

/// Code generation seam. The driver declares every registered closure, then
/// hands over each value field of each instance in id order. Type constants
/// are erased before they reach the backend.
pub trait CodegenBackend {
  fn name(&self) -> &'static str;

  fn declare_closure(
    &mut self,
    context: &BackendEmitContext<'_>,
    closure: &ClosureRecord,
  ) -> Result<(), String>;

  fn emit_field(
    &mut self,
    context: &BackendEmitContext<'_>,
    instance: &MonoMod,
    field: &GlobalDef,
  ) -> Result<(), String>;

  fn finish(
    &mut self,
    context: &BackendEmitContext<'_>,
  ) -> Result<String, String>;
}

/// Plain-text listing of what a real backend would be asked to emit.
#[derive(Debug, Default)]
pub struct ListingBackend {
  lines: Vec<String>,
}

impl ListingBackend {
  pub fn new() -> Self {
    Self::default()
  }
}

impl CodegenBackend for ListingBackend {
  fn name(&self) -> &'static str {
    "listing"
  }

  fn declare_closure(
    &mut self,
    context: &BackendEmitContext<'_>,
    closure: &ClosureRecord,
  ) -> Result<(), String> {
    let mut line = format!("closure {} :: {}", closure.symbol, context.spell(&closure.fn_ty));

    if !closure.captures.is_empty() {
      let captures: Vec<String> = closure
        .captures
        .iter()
        .map(|c| format!("{} :: {}", context.symbols.get(&c.name), context.spell(&c.ty)))
        .collect();
      line.push_str(&format!(" [{}]", captures.join(", ")));
    }

    self.lines.push(line);
    Ok(())
  }

  fn emit_field(
    &mut self,
    context: &BackendEmitContext<'_>,
    instance: &MonoMod,
    field: &GlobalDef,
  ) -> Result<(), String> {
    let name = context.symbols.get(&field.name);

    if field.target == DefTarget::Pending {
      return Err(format!("field '{}.{}' was never resolved", instance.name, name));
    }

    let target = dump::describe_target(&field.target, context.mono, context.types, context.symbols);
    self.lines.push(format!(
      "{}.{} :: {} = {}",
      instance.name,
      name,
      context.spell(&field.ty),
      target
    ));
    Ok(())
  }

  fn finish(
    &mut self,
    _context: &BackendEmitContext<'_>,
  ) -> Result<String, String> {
    Ok(std::mem::take(&mut self.lines).join("\n"))
  }
}
