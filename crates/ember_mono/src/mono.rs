//! Monomorphization of module expressions.
//!
//! Turns a polymorphic module tree into concrete module instances, one per
//! distinct `(module, enclosing instance, substitution, value arguments)`.
//!
//! ## Algorithm Overview
//!
//! 1. **Instantiation**: `instantiate_module` checks the argument list,
//!    builds the instantiating substitution and looks it up in the cache. On a
//!    miss it creates the instance shell: field kinds and concrete field types,
//!    plus one closure registration per lambda reachable from the field
//!    initializers. The new instance is pushed on the work-list.
//!
//! 2. **Processing**: popping an instance resolves each field's target and
//!    visits every instantiation site in its initializers, plus its
//!    non-generic nested modules. Cache misses there feed the work-list.
//!
//! The loop stops when the work-list is empty, which happens as long as the
//! program has finitely many distinct instantiations. `mono.max_instances`
//! turns the other case into an error.

use std::collections::{HashMap, VecDeque};

use ember_config::{DebugTrace, EmberConfig};
use ember_log::{log_dbg, phase_warn, trace_dbg};
use ember_mast::{ActualArg, Binding, BindingKind, ExpId, ExpKind, Mast, ModExpId, TemplateParamKind};
use ember_type::{
  Store,
  span::Span,
  subst::Substitution,
  symbol::SymbolTable,
  types::{TypeError, TypeId, TypeStore},
};

use crate::{
  capture,
  error::MonoError,
  instance::{Capture, ClosureId, ClosureRecord, DefKind, DefTarget, GlobalDef, InstanceKey, MonoMod, MonoModId},
  mangle,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonoStats {
  pub cache_hits: usize,
  pub cache_misses: usize,
  /// Instances popped from the work-list.
  pub processed: usize,
}

/// Output from monomorphization.
pub struct MonoOutput {
  pub root: MonoModId,
  pub instances: Store<MonoMod>,
  pub closures: Store<ClosureRecord>,
  pub cache: HashMap<InstanceKey, MonoModId>,
  pub closure_table: HashMap<(ExpId, MonoModId), Vec<ClosureId>>,
  pub stats: MonoStats,
  /// Non-concrete types found after the work-list drained.
  pub warnings: Vec<String>,
}

impl MonoOutput {
  pub fn instance_count(&self) -> usize {
    self.instances.len()
  }

  pub fn closure_count(&self) -> usize {
    self.closures.len()
  }

  #[inline]
  pub fn instance(
    &self,
    id: &MonoModId,
  ) -> &MonoMod {
    self.instances.get(id)
  }

  #[inline]
  pub fn closure(
    &self,
    id: &ClosureId,
  ) -> &ClosureRecord {
    self.closures.get(id)
  }

  /// Instances of `module`, in creation order.
  pub fn instances_of(
    &self,
    module: ModExpId,
  ) -> Vec<MonoModId> {
    self
      .instances
      .iter()
      .filter(|(_, inst)| inst.source == module)
      .map(|(id, _)| id)
      .collect()
  }

  /// Registrations of the closure literal `exp` inside instance `owner`.
  pub fn closures_for(
    &self,
    exp: ExpId,
    owner: MonoModId,
  ) -> &[ClosureId] {
    self.closure_table.get(&(exp, owner)).map(|v| v.as_slice()).unwrap_or(&[])
  }
}

/// Closure found while building an instance shell, before it gets an id.
struct ClosureShell {
  exp: ExpId,
  fn_ty: TypeId,
  captures: Vec<Capture>,
  symbol: String,
}

/// Monomorphizer state. Owns the instantiation cache and the closure
/// registration table for one compilation.
pub struct Monomorphizer<'a> {
  mast: &'a Mast,
  types: &'a mut TypeStore,
  symbols: &'a SymbolTable,
  config: &'a EmberConfig,

  instances: Store<MonoMod>,
  closures: Store<ClosureRecord>,
  /// Maps instantiation keys to their instance
  cache: HashMap<InstanceKey, MonoModId>,
  closure_table: HashMap<(ExpId, MonoModId), Vec<ClosureId>>,
  /// Instances created but not processed yet
  worklist: VecDeque<MonoModId>,
  stats: MonoStats,
}

impl<'a> Monomorphizer<'a> {
  pub fn new(
    mast: &'a Mast,
    types: &'a mut TypeStore,
    symbols: &'a SymbolTable,
    config: &'a EmberConfig,
  ) -> Self {
    Self {
      mast,
      types,
      symbols,
      config,
      instances: Store::new(),
      closures: Store::new(),
      cache: HashMap::new(),
      closure_table: HashMap::new(),
      worklist: VecDeque::new(),
      stats: MonoStats::default(),
    }
  }

  /// Instantiate `root` with no arguments and drain the work-list.
  pub fn run(
    mut self,
    root: ModExpId,
  ) -> Result<MonoOutput, MonoError> {
    let root_id = self.instantiate_module(root, &[])?;
    self.finish(root_id)
  }

  /// Concrete instance of `module` for `args`, created on first request.
  ///
  /// Nested modules are accepted only when every enclosing module is
  /// non-generic; other nested modules are reached through sites inside an
  /// instance of their parent.
  pub fn instantiate_module(
    &mut self,
    module: ModExpId,
    args: &[ActualArg],
  ) -> Result<MonoModId, MonoError> {
    let span = self.mast.module(&module).span;
    self.instantiate_at(module, args, None, span)
  }

  pub fn drain(&mut self) -> Result<(), MonoError> {
    while let Some(id) = self.worklist.pop_front() {
      trace_dbg!(self.config, DebugTrace::Mono, "processing {}", self.instances.get(&id).name);
      self.process(id)?;
      self.stats.processed += 1;
    }
    Ok(())
  }

  pub fn pending(&self) -> usize {
    self.worklist.len()
  }

  pub fn instance_count(&self) -> usize {
    self.instances.len()
  }

  pub fn instance(
    &self,
    id: &MonoModId,
  ) -> &MonoMod {
    self.instances.get(id)
  }

  /// Drains what is left and hands the instances over.
  pub fn finish(
    mut self,
    root: MonoModId,
  ) -> Result<MonoOutput, MonoError> {
    self.drain()?;

    let warnings = if self.config.mono.verify_concrete {
      self.verify_concrete()
    } else {
      Vec::new()
    };

    if !warnings.is_empty() {
      phase_warn!(self.config, "{} non-concrete type(s) left after monomorphization", warnings.len());
    }

    log_dbg!(
      self.config,
      "monomorphized {} instance(s), {} closure(s), {} cache hit(s)",
      self.instances.len(),
      self.closures.len(),
      self.stats.cache_hits
    );

    Ok(MonoOutput {
      root,
      instances: self.instances,
      closures: self.closures,
      cache: self.cache,
      closure_table: self.closure_table,
      stats: self.stats,
      warnings,
    })
  }

  // === Instantiation ===

  fn instantiate_at(
    &mut self,
    module: ModExpId,
    args: &[ActualArg],
    site: Option<MonoModId>,
    span: Span,
  ) -> Result<MonoModId, MonoError> {
    let mast = self.mast;
    let m = mast.module(&module);
    let module_name = self.symbols.get(&m.name).to_string();

    if args.len() != m.template_params.len() {
      return Err(MonoError::ArgListArityMismatch {
        module: module_name,
        expected: m.template_params.len(),
        found: args.len(),
        span,
      });
    }

    // Arguments written inside a generic instance may mention its variables.
    let site_sub = match site {
      Some(s) => self.instances.get(&s).sub.clone(),
      None => Substitution::empty(),
    };

    let mut type_args = Vec::new();
    let mut values = Vec::new();
    let mut actuals = Vec::with_capacity(args.len());

    for (index, (param, arg)) in m.template_params.iter().zip(args).enumerate() {
      match (&param.kind, arg) {
        (TemplateParamKind::Type { .. }, ActualArg::Type(ty)) => {
          let ty = self.concretize(&site_sub, *ty, span, || {
            format!("type argument {} of '{}'", index, module_name)
          })?;
          type_args.push(ty);
          actuals.push(ActualArg::Type(ty));
        },
        (TemplateParamKind::Value { .. }, ActualArg::Value(value)) => {
          values.push(value.clone());
          actuals.push(ActualArg::Value(value.clone()));
        },
        _ => {
          return Err(MonoError::ArgKindMismatch {
            module: module_name,
            index,
            expected_type: param.is_type(),
            span,
          });
        },
      }
    }

    // Actuals pair with the declared parameters. The scheme must quantify
    // exactly those variables, in whatever order it lists them.
    let own_sub = if m.template_params.is_empty() {
      Substitution::empty()
    } else {
      let params = m.type_param_vars();
      let bound = m.scheme.bound_vars();

      if bound.len() != type_args.len() {
        return Err(MonoError::ArityMismatch {
          module: module_name,
          expected: bound.len(),
          found: type_args.len(),
          span,
        });
      }

      if let Some(var) = params.iter().find(|v| !bound.contains(*v)) {
        return Err(MonoError::Type {
          error: TypeError::UnquantifiedVariable { var: *var },
          context: format!("instantiating '{}'", module_name),
          span,
        });
      }

      Substitution::from_pairs(params.into_iter().zip(type_args.iter().copied()))
    };

    let parent = self.enclosing_instance(module, site, span)?;
    let sub = match parent {
      Some(p) => {
        let outer = self.instances.get(&p).sub.restrict_to(&mast.ancestor_type_vars(&module));
        own_sub.extend(&outer)
      },
      None => own_sub,
    };

    let key = InstanceKey {
      module,
      parent,
      sub,
      values,
    };

    if let Some(&id) = self.cache.get(&key) {
      self.stats.cache_hits += 1;
      trace_dbg!(self.config, DebugTrace::Mono, "cache hit: {}", self.instances.get(&id).name);
      return Ok(id);
    }

    if self.instances.len() >= self.config.mono.max_instances {
      return Err(MonoError::InstantiationLimit {
        limit: self.config.mono.max_instances,
        module: module_name,
        span,
      });
    }

    self.stats.cache_misses += 1;
    let id = self.create_instance(&key, actuals)?;
    self.cache.insert(key, id);
    self.worklist.push_back(id);

    Ok(id)
  }

  /// Instance of the lexical parent of `module` that a reference from `site`
  /// lives in.
  fn enclosing_instance(
    &mut self,
    module: ModExpId,
    site: Option<MonoModId>,
    span: Span,
  ) -> Result<Option<MonoModId>, MonoError> {
    let mast = self.mast;
    let Some(lexical_parent) = mast.module(&module).parent else {
      return Ok(None);
    };

    if let Some(found) = self.find_in_chain(site, lexical_parent) {
      return Ok(Some(found));
    }

    // A chain of non-generic modules has exactly one instance each.
    let monomorphic_chain = std::iter::once(lexical_parent)
      .chain(mast.ancestors(&lexical_parent))
      .all(|m| !mast.module(&m).is_generic());

    if monomorphic_chain {
      let parent_span = mast.module(&lexical_parent).span;
      return self.instantiate_at(lexical_parent, &[], None, parent_span).map(Some);
    }

    Err(MonoError::UnboundModuleReference {
      module: self.symbols.get(&mast.module(&module).name).to_string(),
      span,
    })
  }

  fn find_in_chain(
    &self,
    start: Option<MonoModId>,
    source: ModExpId,
  ) -> Option<MonoModId> {
    let mut current = start;
    while let Some(id) = current {
      let inst = self.instances.get(&id);
      if inst.source == source {
        return Some(id);
      }
      current = inst.parent;
    }
    None
  }

  /// Create the instance shell: concrete field types, closure registrations.
  /// Field targets stay pending until the instance is processed.
  fn create_instance(
    &mut self,
    key: &InstanceKey,
    args: Vec<ActualArg>,
  ) -> Result<MonoModId, MonoError> {
    let mast = self.mast;
    let symbols = self.symbols;
    let m = mast.module(&key.module);

    let base = mangle::escape(symbols.get(&m.name));
    let base = match key.parent {
      Some(p) => format!("{}__{}", self.instances.get(&p).name, base),
      None => base,
    };
    let name = mangle::mangle_instance(&base, &args, self.types);

    let module_ty = self.concretize(&key.sub, m.scheme.body(), m.span, || format!("type of '{}'", name))?;

    let mut fields = Vec::new();
    for (binding, b) in m.bindings.iter().enumerate() {
      let (kind, ty) = match &b.kind {
        BindingKind::Value { ty, .. } => (DefKind::ValueConstant, *ty),
        BindingKind::Type { ty } => (DefKind::TypeConstant, *ty),
        BindingKind::Module(_) => continue,
      };

      let field_name = symbols.get(&b.name);
      let ty = self.concretize(&key.sub, ty, b.span, || format!("field '{}' of '{}'", field_name, name))?;

      let target = match kind {
        DefKind::TypeConstant => DefTarget::Type(ty),
        DefKind::ValueConstant => DefTarget::Pending,
      };

      fields.push(GlobalDef {
        name: b.name,
        binding,
        kind,
        ty,
        target,
        span: b.span,
      });
    }

    trace_dbg!(
      self.config,
      DebugTrace::Mono,
      "cache miss: {} with {} field(s)",
      name,
      fields.len()
    );

    let mut shells = Vec::new();
    for b in &m.bindings {
      if let BindingKind::Value { init, .. } = &b.kind {
        self.collect_closures(&key.sub, &name, *init, &mut shells)?;
      }
    }

    // Nothing below can fail, so the store never holds a half-built instance.
    let id = self.instances.next_id();
    self.instances.alloc(MonoMod {
      id,
      source: key.module,
      parent: key.parent,
      sub: key.sub.clone(),
      args,
      name,
      module_ty,
      fields,
      closures: Vec::new(),
      submodules: Vec::new(),
    });

    for (index, shell) in shells.into_iter().enumerate() {
      trace_dbg!(
        self.config,
        DebugTrace::Closures,
        "registered {} with {} capture(s)",
        shell.symbol,
        shell.captures.len()
      );

      let closure = self.closures.next_id();
      self.closures.alloc(ClosureRecord {
        id: closure,
        owner: id,
        index,
        exp: shell.exp,
        fn_ty: shell.fn_ty,
        captures: shell.captures,
        symbol: shell.symbol,
      });
      self.instances.get_mut(id).closures.push(closure);
      self.closure_table.entry((shell.exp, id)).or_default().push(closure);
    }

    Ok(id)
  }

  /// Collects every lambda reachable from `exp` in preorder, nested lambdas
  /// included, with its type and captures concretized under `sub`.
  fn collect_closures(
    &mut self,
    sub: &Substitution,
    instance: &str,
    exp: ExpId,
    out: &mut Vec<ClosureShell>,
  ) -> Result<(), MonoError> {
    let mast = self.mast;
    let symbols = self.symbols;
    let node = mast.exp(&exp);

    if matches!(node.kind, ExpKind::Lambda { .. }) {
      let symbol = mangle::closure_symbol(instance, out.len());
      let fn_ty = self.concretize(sub, node.ty, node.span, || format!("closure '{}'", symbol))?;

      let mut captures = Vec::new();
      for (name, ty) in capture::free_locals(mast, exp) {
        let ty = self.concretize(sub, ty, node.span, || {
          format!("capture '{}' of closure '{}'", symbols.get(&name), symbol)
        })?;
        captures.push(Capture { name, ty });
      }

      out.push(ClosureShell {
        exp,
        fn_ty,
        captures,
        symbol,
      });
    }

    for child in node.kind.children() {
      self.collect_closures(sub, instance, child, out)?;
    }

    Ok(())
  }

  // === Processing ===

  fn process(
    &mut self,
    id: MonoModId,
  ) -> Result<(), MonoError> {
    let mast = self.mast;
    let source = self.instances.get(&id).source;
    let m = mast.module(&source);

    for (binding, b) in m.bindings.iter().enumerate() {
      match &b.kind {
        BindingKind::Value { init, .. } => {
          let target = self.resolve_target(id, *init, b)?;
          if let Some(field) = self.instances.get(&id).field_for_binding(binding) {
            self.instances.get_mut(id).fields[field].target = target;
          }

          for child in mast.exp(init).kind.children() {
            self.scan_sites(id, child)?;
          }
        },
        BindingKind::Type { .. } => {},
        BindingKind::Module(nested) => {
          if !mast.module(nested).is_generic() {
            let nested_id = self.instantiate_at(*nested, &[], Some(id), b.span)?;
            self.instances.get_mut(id).submodules.push(nested_id);
          }
        },
      }
    }

    Ok(())
  }

  fn resolve_target(
    &mut self,
    id: MonoModId,
    init: ExpId,
    binding: &Binding,
  ) -> Result<DefTarget, MonoError> {
    let mast = self.mast;
    let symbols = self.symbols;
    let node = mast.exp(&init);

    let target = match &node.kind {
      ExpKind::Literal(value) => DefTarget::Literal(value.clone()),

      ExpKind::Lambda { .. } => match self.closure_table.get(&(init, id)).and_then(|c| c.first()) {
        Some(closure) => DefTarget::Closure(*closure),
        None => DefTarget::Expression(init),
      },

      ExpKind::Field { module, index } => {
        let owner = self.find_in_chain(Some(id), *module).ok_or_else(|| MonoError::UnboundModuleReference {
          module: symbols.get(&mast.module(module).name).to_string(),
          span: node.span,
        })?;
        self.alias(owner, *index, binding, node.span)?
      },

      ExpKind::ModField { module, args, field } => {
        let instance = self.instantiate_at(*module, args, Some(id), node.span)?;
        let index = mast
          .module(module)
          .binding_index(*field)
          .ok_or_else(|| MonoError::UnknownModuleField {
            module: self.instances.get(&instance).name.clone(),
            field: symbols.get(field).to_string(),
            span: node.span,
          })?;
        self.alias(instance, index, binding, node.span)?
      },

      ExpKind::TemplateValue { module, index } => {
        let module_name = symbols.get(&mast.module(module).name).to_string();
        let owner = self
          .find_in_chain(Some(id), *module)
          .ok_or_else(|| MonoError::UnboundModuleReference {
            module: module_name.clone(),
            span: node.span,
          })?;

        match self.instances.get(&owner).value_arg(*index) {
          Some(value) => DefTarget::Literal(value.clone()),
          None => {
            return Err(MonoError::ArgKindMismatch {
              module: module_name,
              index: *index,
              expected_type: false,
              span: node.span,
            });
          },
        }
      },

      _ => DefTarget::Expression(init),
    };

    Ok(target)
  }

  /// Target for a value field that names binding `binding_index` of `owner`.
  fn alias(
    &self,
    owner: MonoModId,
    binding_index: usize,
    referrer: &Binding,
    span: Span,
  ) -> Result<DefTarget, MonoError> {
    let inst = self.instances.get(&owner);
    let referrer_name = self.symbols.get(&referrer.name).to_string();

    match inst.field_for_binding(binding_index) {
      Some(field) if inst.fields[field].kind == DefKind::ValueConstant => Ok(DefTarget::Def {
        instance: owner,
        field,
      }),
      Some(_) => Err(MonoError::UnknownDefinitionKind {
        field: referrer_name,
        found: "type constant",
        span,
      }),
      None => {
        let source = self.mast.module(&inst.source);
        match source.bindings.get(binding_index) {
          Some(b) if matches!(b.kind, BindingKind::Module(_)) => Err(MonoError::UnknownDefinitionKind {
            field: referrer_name,
            found: "module",
            span,
          }),
          _ => Err(MonoError::UnknownModuleField {
            module: inst.name.clone(),
            field: format!("#{}", binding_index),
            span,
          }),
        }
      },
    }
  }

  /// Instantiates every module site under `exp`, lambda bodies included.
  fn scan_sites(
    &mut self,
    id: MonoModId,
    exp: ExpId,
  ) -> Result<(), MonoError> {
    let mast = self.mast;
    let node = mast.exp(&exp);

    if let ExpKind::ModField { module, args, .. } = &node.kind {
      self.instantiate_at(*module, args, Some(id), node.span)?;
    }

    for child in node.kind.children() {
      self.scan_sites(id, child)?;
    }

    Ok(())
  }

  fn concretize(
    &mut self,
    sub: &Substitution,
    ty: TypeId,
    span: Span,
    context: impl FnOnce() -> String,
  ) -> Result<TypeId, MonoError> {
    let before = self.types.len();

    match sub.rewrite_total(self.types, ty) {
      Ok(concrete) => {
        let minted = self.types.len() - before;
        if minted > 0 {
          trace_dbg!(
            self.config,
            DebugTrace::Types,
            "interned {} new type(s) for {}",
            minted,
            self.types.spelling(&concrete, self.symbols)
          );
        }
        Ok(concrete)
      },
      Err(error) => Err(MonoError::Type {
        error,
        context: context(),
        span,
      }),
    }
  }

  fn verify_concrete(&self) -> Vec<String> {
    let mut warnings = Vec::new();

    for (_, inst) in self.instances.iter() {
      for field in &inst.fields {
        if !self.types.is_concrete(&field.ty) {
          warnings.push(format!(
            "{}: field '{}' has non-concrete type {}",
            inst.name,
            self.symbols.get(&field.name),
            self.types.spelling(&field.ty, self.symbols)
          ));
        }
      }
    }

    for (_, closure) in self.closures.iter() {
      if !self.types.is_concrete(&closure.fn_ty) {
        warnings.push(format!(
          "{}: non-concrete type {}",
          closure.symbol,
          self.types.spelling(&closure.fn_ty, self.symbols)
        ));
      }

      for capture in &closure.captures {
        if !self.types.is_concrete(&capture.ty) {
          warnings.push(format!(
            "{}: capture '{}' has non-concrete type {}",
            closure.symbol,
            self.symbols.get(&capture.name),
            self.types.spelling(&capture.ty, self.symbols)
          ));
        }
      }
    }

    warnings
  }
}
