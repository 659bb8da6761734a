use ember_config::{DebugTrace, EmberConfig};
use ember_log::{phase_log, trace_dbg};
use ember_mast::{Mast, ModExpId};
use ember_mono::{MonoError, MonoOutput, Monomorphizer};
use ember_type::{file::SourceMap, symbol::SymbolTable, types::TypeStore};

/// Single owner of everything one compilation shares: sources, symbols,
/// interned types and the module tree.
///
/// Components borrow from it for the length of a call and never keep the
/// borrow, so a fresh `Context` is all a test needs.
pub struct Context {
  pub config: EmberConfig,
  pub source_map: SourceMap,
  pub symbols: SymbolTable,
  pub types: TypeStore,
  pub mast: Mast,
}

impl Context {
  pub fn new(config: EmberConfig) -> Self {
    Self {
      config,
      source_map: SourceMap::new(),
      symbols: SymbolTable::new(),
      types: TypeStore::new(),
      mast: Mast::new(),
    }
  }

  pub fn monomorphize(
    &mut self,
    root: ModExpId,
  ) -> Result<MonoOutput, MonoError> {
    phase_log!(
      &self.config,
      "Monomorphizing {}...",
      self.symbols.get(&self.mast.module(&root).name)
    );

    trace_dbg!(
      &self.config,
      DebugTrace::Driver,
      "{} module expression(s), {} expression(s), {} interned type(s)",
      self.mast.modules.len(),
      self.mast.exps.len(),
      self.types.len()
    );

    Monomorphizer::new(&self.mast, &mut self.types, &self.symbols, &self.config).run(root)
  }

  /// Rendered diagnostic for `error`, without printing it.
  pub fn report(
    &self,
    error: &MonoError,
  ) -> String {
    ember_diagnostics::format_diagnostic(&error.report(), &self.source_map)
  }

  pub fn render(
    &self,
    error: &MonoError,
  ) {
    ember_diagnostics::render(&error.report(), &self.source_map);
  }
}
