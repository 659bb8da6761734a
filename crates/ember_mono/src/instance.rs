use ember_mast::{ActualArg, ExpId, ModExpId};
use ember_type::{
  Id,
  span::Span,
  subst::Substitution,
  symbol::SymbolId,
  types::TypeId,
  value::LiteralValue,
};

pub type MonoModId = Id<MonoMod>;
pub type ClosureId = Id<ClosureRecord>;

/// Identity of a concrete module instance.
///
/// `parent` is the enclosing instance for nested modules; top-level modules
/// are keyed on their own arguments only. Value arguments take part in the
/// key by literal equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceKey {
  pub module: ModExpId,
  pub parent: Option<MonoModId>,
  pub sub: Substitution,
  pub values: Vec<LiteralValue>,
}

/// Whether a field is erased before code generation or must be emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefKind {
  TypeConstant,
  ValueConstant,
}

impl std::fmt::Display for DefKind {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    match self {
      DefKind::TypeConstant => write!(f, "type"),
      DefKind::ValueConstant => write!(f, "value"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefTarget {
  /// Not resolved yet; only seen before the instance leaves the work-list.
  Pending,
  Literal(LiteralValue),
  Closure(ClosureId),
  /// Alias of field `field` of `instance`.
  Def { instance: MonoModId, field: usize },
  Type(TypeId),
  /// Computed initializer, lowered by the backend.
  Expression(ExpId),
}

/// Global definition: one resolved field of a module instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalDef {
  pub name: SymbolId,
  /// Index of the binding in the source module expression.
  pub binding: usize,
  pub kind: DefKind,
  /// Concrete type: the value's type for values, the definition for types.
  pub ty: TypeId,
  pub target: DefTarget,
  pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MonoMod {
  pub id: MonoModId,
  pub source: ModExpId,
  pub parent: Option<MonoModId>,
  pub sub: Substitution,
  /// Actual arguments with type arguments already concrete.
  pub args: Vec<ActualArg>,
  /// Mangled symbol name.
  pub name: String,
  pub module_ty: TypeId,
  pub fields: Vec<GlobalDef>,
  pub closures: Vec<ClosureId>,
  /// Nested non-generic modules, instantiated together with this one.
  pub submodules: Vec<MonoModId>,
}

impl MonoMod {
  pub fn field_count(&self) -> usize {
    self.fields.len()
  }

  pub fn field_for_binding(
    &self,
    binding: usize,
  ) -> Option<usize> {
    self.fields.iter().position(|f| f.binding == binding)
  }

  pub fn field_by_name(
    &self,
    name: SymbolId,
  ) -> Option<&GlobalDef> {
    self.fields.iter().find(|f| f.name == name)
  }

  /// Value argument bound to template parameter `index`.
  pub fn value_arg(
    &self,
    index: usize,
  ) -> Option<&LiteralValue> {
    match self.args.get(index) {
      Some(ActualArg::Value(v)) => Some(v),
      _ => None,
    }
  }
}

/// Non-local name a closure needs as an implicit parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
  pub name: SymbolId,
  pub ty: TypeId,
}

/// One closure literal registered against one concrete module instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureRecord {
  pub id: ClosureId,
  pub owner: MonoModId,
  /// Registration index within the owner; stable across runs.
  pub index: usize,
  pub exp: ExpId,
  pub fn_ty: TypeId,
  pub captures: Vec<Capture>,
  pub symbol: String,
}
