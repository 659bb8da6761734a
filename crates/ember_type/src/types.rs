use std::collections::HashMap;

use crate::{
  Id, Store,
  symbol::{SymbolId, SymbolTable},
};

pub type TypeId = Id<Type>;

/// Side-effect class of a function type. Part of the function's structural
/// identity: `(Int32) -> Int32` at `Total` and at `State` are distinct types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SideEffects {
  Total,
  Divergent,
  State,
  Exception,
  MachineLevel,
}

impl std::fmt::Display for SideEffects {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    let s = match self {
      SideEffects::Total => "Tot",
      SideEffects::Divergent => "Dv",
      SideEffects::State => "ST",
      SideEffects::Exception => "Exn",
      SideEffects::MachineLevel => "ML",
    };
    write!(f, "{}", s)
  }
}

/// One entry of a composite's component table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElemInfo {
  pub name: Option<SymbolId>,
  pub ty: TypeId,
  pub is_type_field: bool,
}

impl ElemInfo {
  pub fn value(
    name: SymbolId,
    ty: TypeId,
  ) -> Self {
    Self {
      name: Some(name),
      ty,
      is_type_field: false,
    }
  }

  pub fn type_field(
    name: SymbolId,
    ty: TypeId,
  ) -> Self {
    Self {
      name: Some(name),
      ty,
      is_type_field: true,
    }
  }

  pub fn unnamed(ty: TypeId) -> Self {
    Self {
      name: None,
      ty,
      is_type_field: false,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
  Unit,
  Bool,
  String,
  /// Width in bits.
  SignedInt(u32),
  UnsignedInt(u32),
  Float(u32),

  Pointer {
    pointee: TypeId,
    mutable: bool,
  },
  Array {
    element: TypeId,
    mutable: bool,
  },
  Slice {
    element: TypeId,
    mutable: bool,
  },
  Function {
    arg: TypeId,
    ret: TypeId,
    effects: SideEffects,
  },
  Tuple(Vec<TypeId>),

  Struct(Vec<ElemInfo>),
  Union(Vec<ElemInfo>),
  Enum(Vec<ElemInfo>),
  Module(Vec<ElemInfo>),

  BoundVar(SymbolId),
  FreeVar(SymbolId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
  Unit,
  Bool,
  String,
  SignedInt,
  UnsignedInt,
  Float,
  Pointer,
  Array,
  Slice,
  Function,
  Tuple,
  Struct,
  Union,
  Enum,
  Module,
  BoundVar,
  FreeVar,
}

impl std::fmt::Display for TypeKind {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    write!(f, "{:?}", self)
  }
}

impl Type {
  pub fn kind(&self) -> TypeKind {
    match self {
      Type::Unit => TypeKind::Unit,
      Type::Bool => TypeKind::Bool,
      Type::String => TypeKind::String,
      Type::SignedInt(_) => TypeKind::SignedInt,
      Type::UnsignedInt(_) => TypeKind::UnsignedInt,
      Type::Float(_) => TypeKind::Float,
      Type::Pointer { .. } => TypeKind::Pointer,
      Type::Array { .. } => TypeKind::Array,
      Type::Slice { .. } => TypeKind::Slice,
      Type::Function { .. } => TypeKind::Function,
      Type::Tuple(_) => TypeKind::Tuple,
      Type::Struct(_) => TypeKind::Struct,
      Type::Union(_) => TypeKind::Union,
      Type::Enum(_) => TypeKind::Enum,
      Type::Module(_) => TypeKind::Module,
      Type::BoundVar(_) => TypeKind::BoundVar,
      Type::FreeVar(_) => TypeKind::FreeVar,
    }
  }

  pub fn is_var(&self) -> bool {
    matches!(self, Type::BoundVar(_) | Type::FreeVar(_))
  }

  fn fields(&self) -> Option<&[ElemInfo]> {
    match self {
      Type::Struct(f) | Type::Union(f) | Type::Enum(f) | Type::Module(f) => Some(f),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
  /// A field lookup against a type kind with no field table.
  UnknownField {
    ty: TypeId,
    kind: TypeKind,
    field: SymbolId,
  },
  /// Strict rewrite reached a bound variable the substitution does not map.
  UnboundSubstitutionTarget { var: TypeId },
  ArityMismatch {
    expected: usize,
    found: usize,
  },
  /// A scheme body mentions a bound variable it does not quantify over.
  UnquantifiedVariable { var: TypeId },
}

impl std::fmt::Display for TypeError {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    match self {
      TypeError::UnknownField { ty, kind, field } => write!(
        f,
        "cannot look up field #{} on type {:?}: kind {} has no field table",
        field.index(),
        ty,
        kind
      ),
      TypeError::UnboundSubstitutionTarget { var } => {
        write!(f, "bound variable {:?} has no entry in the substitution", var)
      },
      TypeError::ArityMismatch { expected, found } => {
        write!(f, "expected {} type argument(s), found {}", expected, found)
      },
      TypeError::UnquantifiedVariable { var } => {
        write!(f, "bound variable {:?} appears in a scheme body but is not quantified", var)
      },
    }
  }
}

impl std::error::Error for TypeError {}

/// Owner of every type handle.
///
/// Structural constructors go through a memo table, so two handles are equal
/// iff the types they denote are structurally equal. Module types and type
/// variables are nominal and always mint a fresh handle.
#[derive(Debug, Clone)]
pub struct TypeStore {
  types: Store<Type>,
  interned: HashMap<Type, TypeId>,
  field_luts: HashMap<TypeId, HashMap<SymbolId, usize>>,
}

impl Default for TypeStore {
  fn default() -> Self {
    Self::new()
  }
}

impl TypeStore {
  pub fn new() -> Self {
    let mut store = Self {
      types: Store::new(),
      interned: HashMap::new(),
      field_luts: HashMap::new(),
    };
    store.init_primitives();
    store
  }

  fn init_primitives(&mut self) {
    let primitives = [
      Type::Unit,
      Type::Bool,
      Type::String,
      Type::SignedInt(8),
      Type::SignedInt(16),
      Type::SignedInt(32),
      Type::SignedInt(64),
      Type::UnsignedInt(8),
      Type::UnsignedInt(16),
      Type::UnsignedInt(32),
      Type::UnsignedInt(64),
      Type::Float(32),
      Type::Float(64),
    ];

    for ty in primitives {
      self.intern(ty);
    }
  }

  fn intern(
    &mut self,
    ty: Type,
  ) -> TypeId {
    if let Some(&id) = self.interned.get(&ty) {
      return id;
    }

    let id = self.types.alloc(ty.clone());
    self.install_field_lut(id, &ty);
    self.interned.insert(ty, id);
    id
  }

  fn mint_nominal(
    &mut self,
    ty: Type,
  ) -> TypeId {
    let id = self.types.alloc(ty.clone());
    self.install_field_lut(id, &ty);
    id
  }

  fn install_field_lut(
    &mut self,
    id: TypeId,
    ty: &Type,
  ) {
    let Some(fields) = ty.fields() else {
      return;
    };

    let lut = fields
      .iter()
      .enumerate()
      .filter_map(|(ix, e)| e.name.map(|n| (n, ix)))
      .collect();
    self.field_luts.insert(id, lut);
  }

  // Constructors

  pub fn int(
    &mut self,
    width_in_bits: u32,
    signed: bool,
  ) -> TypeId {
    if signed {
      self.intern(Type::SignedInt(width_in_bits))
    } else {
      self.intern(Type::UnsignedInt(width_in_bits))
    }
  }

  pub fn float(
    &mut self,
    width_in_bits: u32,
  ) -> TypeId {
    self.intern(Type::Float(width_in_bits))
  }

  pub fn pointer(
    &mut self,
    pointee: TypeId,
    mutable: bool,
  ) -> TypeId {
    self.intern(Type::Pointer { pointee, mutable })
  }

  pub fn array(
    &mut self,
    element: TypeId,
    mutable: bool,
  ) -> TypeId {
    self.intern(Type::Array { element, mutable })
  }

  pub fn slice(
    &mut self,
    element: TypeId,
    mutable: bool,
  ) -> TypeId {
    self.intern(Type::Slice { element, mutable })
  }

  pub fn function(
    &mut self,
    arg: TypeId,
    ret: TypeId,
    effects: SideEffects,
  ) -> TypeId {
    self.intern(Type::Function { arg, ret, effects })
  }

  pub fn tuple(
    &mut self,
    elements: Vec<TypeId>,
  ) -> TypeId {
    self.intern(Type::Tuple(elements))
  }

  pub fn structure(
    &mut self,
    fields: Vec<ElemInfo>,
  ) -> TypeId {
    self.intern(Type::Struct(fields))
  }

  pub fn union(
    &mut self,
    fields: Vec<ElemInfo>,
  ) -> TypeId {
    self.intern(Type::Union(fields))
  }

  pub fn enumeration(
    &mut self,
    fields: Vec<ElemInfo>,
  ) -> TypeId {
    self.intern(Type::Enum(fields))
  }

  pub fn new_module(
    &mut self,
    fields: Vec<ElemInfo>,
  ) -> TypeId {
    self.mint_nominal(Type::Module(fields))
  }

  pub fn new_bound_var(
    &mut self,
    name: SymbolId,
  ) -> TypeId {
    self.mint_nominal(Type::BoundVar(name))
  }

  pub fn new_free_var(
    &mut self,
    name: SymbolId,
  ) -> TypeId {
    self.mint_nominal(Type::FreeVar(name))
  }

  /// Rebuilds a type of the same kind as `ty` around new components. Goes
  /// through the memo table for structural kinds; modules get a fresh handle.
  pub(crate) fn rebuild(
    &mut self,
    ty: Type,
  ) -> TypeId {
    match ty {
      Type::Module(fields) => self.new_module(fields),
      Type::BoundVar(_) | Type::FreeVar(_) => self.mint_nominal(ty),
      other => self.intern(other),
    }
  }

  // Primitive accessors

  #[inline]
  pub fn unit(&self) -> TypeId {
    self.interned[&Type::Unit]
  }
  #[inline]
  pub fn boolean(&self) -> TypeId {
    self.interned[&Type::Bool]
  }
  #[inline]
  pub fn string(&self) -> TypeId {
    self.interned[&Type::String]
  }

  #[inline]
  pub fn i8(&self) -> TypeId {
    self.interned[&Type::SignedInt(8)]
  }
  #[inline]
  pub fn i16(&self) -> TypeId {
    self.interned[&Type::SignedInt(16)]
  }
  #[inline]
  pub fn i32(&self) -> TypeId {
    self.interned[&Type::SignedInt(32)]
  }
  #[inline]
  pub fn i64(&self) -> TypeId {
    self.interned[&Type::SignedInt(64)]
  }

  #[inline]
  pub fn u8(&self) -> TypeId {
    self.interned[&Type::UnsignedInt(8)]
  }
  #[inline]
  pub fn u16(&self) -> TypeId {
    self.interned[&Type::UnsignedInt(16)]
  }
  #[inline]
  pub fn u32(&self) -> TypeId {
    self.interned[&Type::UnsignedInt(32)]
  }
  #[inline]
  pub fn u64(&self) -> TypeId {
    self.interned[&Type::UnsignedInt(64)]
  }

  #[inline]
  pub fn f32(&self) -> TypeId {
    self.interned[&Type::Float(32)]
  }
  #[inline]
  pub fn f64(&self) -> TypeId {
    self.interned[&Type::Float(64)]
  }

  // Component table queries

  #[inline]
  pub fn get(
    &self,
    id: &TypeId,
  ) -> &Type {
    self.types.get(id)
  }

  #[inline]
  pub fn kind_of(
    &self,
    id: &TypeId,
  ) -> TypeKind {
    self.get(id).kind()
  }

  pub fn len(&self) -> usize {
    self.types.len()
  }

  pub fn is_empty(&self) -> bool {
    self.types.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (TypeId, &Type)> {
    self.types.iter()
  }

  pub fn scalar_width_in_bits(
    &self,
    id: &TypeId,
  ) -> Option<u32> {
    match self.get(id) {
      Type::SignedInt(w) | Type::UnsignedInt(w) | Type::Float(w) => Some(*w),
      Type::Bool => Some(1),
      _ => None,
    }
  }

  pub fn scalar_width_in_bytes(
    &self,
    id: &TypeId,
  ) -> Option<u32> {
    self.scalar_width_in_bits(id).map(|bits| bits.div_ceil(8))
  }

  pub fn is_mut(
    &self,
    id: &TypeId,
  ) -> Option<bool> {
    match self.get(id) {
      Type::Pointer { mutable, .. } | Type::Array { mutable, .. } | Type::Slice { mutable, .. } => Some(*mutable),
      _ => None,
    }
  }

  pub fn pointee(
    &self,
    id: &TypeId,
  ) -> Option<TypeId> {
    match self.get(id) {
      Type::Pointer { pointee, .. } => Some(*pointee),
      Type::Array { element, .. } | Type::Slice { element, .. } => Some(*element),
      _ => None,
    }
  }

  pub fn fn_arg(
    &self,
    id: &TypeId,
  ) -> Option<TypeId> {
    match self.get(id) {
      Type::Function { arg, .. } => Some(*arg),
      _ => None,
    }
  }

  pub fn fn_ret(
    &self,
    id: &TypeId,
  ) -> Option<TypeId> {
    match self.get(id) {
      Type::Function { ret, .. } => Some(*ret),
      _ => None,
    }
  }

  pub fn side_effects(
    &self,
    id: &TypeId,
  ) -> Option<SideEffects> {
    match self.get(id) {
      Type::Function { effects, .. } => Some(*effects),
      _ => None,
    }
  }

  /// Ordered component sequence. Scalars and variables have none; a function
  /// has its argument then its return; indirections have their pointee.
  pub fn elements(
    &self,
    id: &TypeId,
  ) -> Vec<ElemInfo> {
    match self.get(id) {
      Type::Unit
      | Type::Bool
      | Type::String
      | Type::SignedInt(_)
      | Type::UnsignedInt(_)
      | Type::Float(_)
      | Type::BoundVar(_)
      | Type::FreeVar(_) => Vec::new(),
      Type::Pointer { pointee, .. } => vec![ElemInfo::unnamed(*pointee)],
      Type::Array { element, .. } | Type::Slice { element, .. } => vec![ElemInfo::unnamed(*element)],
      Type::Function { arg, ret, .. } => vec![ElemInfo::unnamed(*arg), ElemInfo::unnamed(*ret)],
      Type::Tuple(elems) => elems.iter().map(|t| ElemInfo::unnamed(*t)).collect(),
      Type::Struct(fields) | Type::Union(fields) | Type::Enum(fields) | Type::Module(fields) => fields.clone(),
    }
  }

  pub fn elem_count(
    &self,
    id: &TypeId,
  ) -> usize {
    match self.get(id) {
      Type::Tuple(elems) => elems.len(),
      other => match other.fields() {
        Some(fields) => fields.len(),
        None => self.elements(id).len(),
      },
    }
  }

  /// `Ok(None)` when the type has a field table without `name`; an error when
  /// the kind carries no field table at all.
  pub fn field_index(
    &self,
    id: &TypeId,
    name: SymbolId,
  ) -> Result<Option<usize>, TypeError> {
    match self.field_luts.get(id) {
      Some(lut) => Ok(lut.get(&name).copied()),
      None => Err(TypeError::UnknownField {
        ty: *id,
        kind: self.kind_of(id),
        field: name,
      }),
    }
  }

  pub fn field_name_at(
    &self,
    id: &TypeId,
    index: usize,
  ) -> Option<SymbolId> {
    self.get(id).fields().and_then(|f| f.get(index)).and_then(|e| e.name)
  }

  pub fn field_type_at(
    &self,
    id: &TypeId,
    index: usize,
  ) -> Option<TypeId> {
    match self.get(id) {
      Type::Tuple(elems) => elems.get(index).copied(),
      other => other.fields().and_then(|f| f.get(index)).map(|e| e.ty),
    }
  }

  pub fn is_type_field_at(
    &self,
    id: &TypeId,
    index: usize,
  ) -> bool {
    self
      .get(id)
      .fields()
      .and_then(|f| f.get(index))
      .is_some_and(|e| e.is_type_field)
  }

  pub fn is_var(
    &self,
    id: &TypeId,
  ) -> bool {
    self.get(id).is_var()
  }

  /// Every variable reachable from `id`, in first-occurrence order.
  pub fn vars_in(
    &self,
    id: &TypeId,
  ) -> Vec<TypeId> {
    let mut out = Vec::new();
    self.collect_vars(id, &mut out);
    out
  }

  fn collect_vars(
    &self,
    id: &TypeId,
    out: &mut Vec<TypeId>,
  ) {
    if self.is_var(id) {
      if !out.contains(id) {
        out.push(*id);
      }
      return;
    }

    for elem in self.elements(id) {
      self.collect_vars(&elem.ty, out);
    }
  }

  pub fn is_concrete(
    &self,
    id: &TypeId,
  ) -> bool {
    self.vars_in(id).is_empty()
  }

  /// Display string for `id`, rebuilt on every call.
  pub fn spelling(
    &self,
    id: &TypeId,
    symbols: &SymbolTable,
  ) -> String {
    match self.get(id) {
      Type::Unit => "()".to_string(),
      Type::Bool => "Bool".to_string(),
      Type::String => "String".to_string(),
      Type::SignedInt(w) => format!("Int{}", w),
      Type::UnsignedInt(w) => format!("UInt{}", w),
      Type::Float(w) => format!("Float{}", w),

      Type::Pointer { pointee, mutable } => {
        format!("{}[{}]", mut_prefix(*mutable), self.spelling(pointee, symbols))
      },
      Type::Array { element, mutable } => {
        format!("{}[{}, N]", mut_prefix(*mutable), self.spelling(element, symbols))
      },
      Type::Slice { element, mutable } => {
        format!("{}[{}, ?]", mut_prefix(*mutable), self.spelling(element, symbols))
      },

      Type::Function { arg, ret, .. } => {
        let lhs = self.spelling(arg, symbols);
        let rhs = self.spelling(ret, symbols);
        if lhs.starts_with('(') {
          format!("{} -> {}", lhs, rhs)
        } else {
          format!("({}) -> {}", lhs, rhs)
        }
      },

      Type::Tuple(elems) => {
        let parts: Vec<String> = elems.iter().map(|t| self.spelling(t, symbols)).collect();
        format!("({})", parts.join(", "))
      },

      Type::Struct(fields) | Type::Union(fields) | Type::Enum(fields) | Type::Module(fields) => {
        let keyword = match self.kind_of(id) {
          TypeKind::Struct => "Struct",
          TypeKind::Union => "Union",
          TypeKind::Enum => "Enum",
          _ => "Module",
        };

        if fields.is_empty() {
          return format!("{} {{}}", keyword);
        }

        let parts: Vec<String> = fields
          .iter()
          .map(|e| {
            let name = e.name.map(|n| symbols.get(&n).to_string()).unwrap_or_else(|| "_".to_string());
            let sep = if e.is_type_field { "=" } else { "::" };
            format!("{} {} {}", name, sep, self.spelling(&e.ty, symbols))
          })
          .collect();

        format!("{} {{ {} }}", keyword, parts.join("; "))
      },

      Type::BoundVar(name) | Type::FreeVar(name) => format!("{}#{}", symbols.get(name), id.index()),
    }
  }
}

fn mut_prefix(mutable: bool) -> &'static str {
  if mutable { "mut" } else { "" }
}
