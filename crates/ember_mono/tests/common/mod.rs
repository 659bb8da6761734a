#![allow(dead_code)]

use ember_config::EmberConfig;
use ember_mast::{ActualArg, ExpId, ExpKind, Mast, ModExpId, Param, TemplateParam, TemplateParamKind};
use ember_mono::{MonoError, MonoOutput, Monomorphizer};
use ember_type::{
  BytePosition,
  file::FileId,
  scheme::Scheme,
  span::Span,
  symbol::{SymbolId, SymbolTable},
  types::{SideEffects, TypeId, TypeStore},
  value::LiteralValue,
};

/// Builds small module trees by hand, the way the front end would hand them
/// over: typed, polymorphic, with schemes sealed after the bindings are in.
pub struct Fixture {
  pub types: TypeStore,
  pub symbols: SymbolTable,
  pub mast: Mast,
  pub config: EmberConfig,
}

impl Fixture {
  pub fn new() -> Self {
    Self {
      types: TypeStore::new(),
      symbols: SymbolTable::new(),
      mast: Mast::new(),
      config: EmberConfig::new_basic(false, Vec::new(), true, 0),
    }
  }

  pub fn sym(
    &mut self,
    name: &str,
  ) -> SymbolId {
    self.symbols.intern(name)
  }

  /// Type parameter plus the bound variable standing for it.
  pub fn type_param(
    &mut self,
    name: &str,
  ) -> (TemplateParam, TypeId) {
    let sym = self.sym(name);
    let var = self.types.new_bound_var(sym);
    let param = TemplateParam {
      name: sym,
      span: Span::default(),
      kind: TemplateParamKind::Type { var },
    };
    (param, var)
  }

  pub fn value_param(
    &mut self,
    name: &str,
    ty: TypeId,
  ) -> TemplateParam {
    TemplateParam {
      name: self.sym(name),
      span: Span::default(),
      kind: TemplateParamKind::Value { ty },
    }
  }

  /// Adds a module with a placeholder scheme; call `seal` once its bindings
  /// are in place.
  pub fn module(
    &mut self,
    name: &str,
    parent: Option<ModExpId>,
    params: Vec<TemplateParam>,
  ) -> ModExpId {
    let sym = self.sym(name);
    let unit = self.types.unit();
    self.mast.add_module(sym, Span::default(), parent, params, Scheme::monomorphic(unit))
  }

  pub fn seal(
    &mut self,
    module: ModExpId,
  ) {
    let vars = self.mast.module(&module).type_param_vars();
    let enclosing = self.mast.ancestor_type_vars(&module);
    let body = self.mast.module_type(&module, &mut self.types);
    let scheme = Scheme::nested(&self.types, vars, body, &enclosing).expect("well-formed module scheme");
    self.mast.modules.get_mut(module).scheme = scheme;
  }

  pub fn value(
    &mut self,
    module: ModExpId,
    name: &str,
    init: ExpId,
  ) -> usize {
    let sym = self.sym(name);
    self.mast.add_value(module, sym, init)
  }

  pub fn type_def(
    &mut self,
    module: ModExpId,
    name: &str,
    ty: TypeId,
  ) -> usize {
    let sym = self.sym(name);
    self.mast.add_type(module, sym, ty)
  }

  pub fn exp(
    &mut self,
    kind: ExpKind,
    ty: TypeId,
  ) -> ExpId {
    self.mast.alloc(kind, ty, Span::default())
  }

  /// Expression with a span of its own, for asserting error locations.
  pub fn exp_at(
    &mut self,
    kind: ExpKind,
    ty: TypeId,
    start: u32,
    end: u32,
  ) -> ExpId {
    self.mast.alloc(kind, ty, span(start, end))
  }

  pub fn int(
    &mut self,
    value: i32,
  ) -> ExpId {
    let ty = self.types.i32();
    self.exp(ExpKind::Literal(LiteralValue::Int32(value)), ty)
  }

  pub fn local(
    &mut self,
    name: &str,
    ty: TypeId,
  ) -> ExpId {
    let sym = self.sym(name);
    self.exp(ExpKind::Local(sym), ty)
  }

  /// Single-parameter lambda typed `(param) -> body`.
  pub fn lambda(
    &mut self,
    param: &str,
    param_ty: TypeId,
    body: ExpId,
  ) -> ExpId {
    let name = self.sym(param);
    let ret = self.mast.exp(&body).ty;
    let fn_ty = self.types.function(param_ty, ret, SideEffects::Total);
    self.exp(
      ExpKind::Lambda {
        params: vec![Param { name, ty: param_ty }],
        body,
      },
      fn_ty,
    )
  }

  /// `\x. x` over `ty`.
  pub fn identity(
    &mut self,
    ty: TypeId,
  ) -> ExpId {
    let body = self.local("x", ty);
    self.lambda("x", ty, body)
  }

  pub fn mod_field(
    &mut self,
    module: ModExpId,
    args: Vec<ActualArg>,
    field: &str,
    ty: TypeId,
  ) -> ExpId {
    let field = self.sym(field);
    self.exp(ExpKind::ModField { module, args, field }, ty)
  }

  pub fn run(
    &mut self,
    root: ModExpId,
  ) -> Result<MonoOutput, MonoError> {
    Monomorphizer::new(&self.mast, &mut self.types, &self.symbols, &self.config).run(root)
  }

  pub fn spell(
    &self,
    ty: TypeId,
  ) -> String {
    self.types.spelling(&ty, &self.symbols)
  }
}

pub fn span(
  start: u32,
  end: u32,
) -> Span {
  Span::new(FileId::new(0), BytePosition(start), BytePosition(end))
}

/// `M<T>` with a type field `Elem = T`, an identity closure `id :: (T) -> T`
/// and a plain constant `size = 4`.
pub struct Generic {
  pub module: ModExpId,
  pub var: TypeId,
  pub lambda: ExpId,
}

pub fn generic_module(fx: &mut Fixture) -> Generic {
  let (param, var) = fx.type_param("T");
  let module = fx.module("M", None, vec![param]);
  fx.type_def(module, "Elem", var);
  let lambda = fx.identity(var);
  fx.value(module, "id", lambda);
  let size = fx.int(4);
  fx.value(module, "size", size);
  fx.seal(module);

  Generic { module, var, lambda }
}

/// `Main` with one field `f{i} = M[arg].id` per argument.
pub fn main_using(
  fx: &mut Fixture,
  generic: &Generic,
  args: &[TypeId],
) -> ModExpId {
  let main = fx.module("Main", None, vec![]);
  for (i, arg) in args.iter().enumerate() {
    let fn_ty = fx.types.function(*arg, *arg, SideEffects::Total);
    let site = fx.mod_field(generic.module, vec![ActualArg::Type(*arg)], "id", fn_ty);
    fx.value(main, &format!("f{}", i), site);
  }
  fx.seal(main);
  main
}
