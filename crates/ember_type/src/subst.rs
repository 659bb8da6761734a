use std::collections::BTreeMap;

use crate::{
  scheme::Scheme,
  symbol::SymbolTable,
  types::{ElemInfo, Type, TypeError, TypeId, TypeStore},
};

/// Immutable mapping from type variables to replacement types.
///
/// Backed by an ordered map so that equality and hashing are structural over
/// the resolved pairs, which lets a substitution serve as a cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Substitution {
  map: BTreeMap<TypeId, TypeId>,
}

impl Substitution {
  pub fn empty() -> Self {
    Self::default()
  }

  pub fn from_pairs<I: IntoIterator<Item = (TypeId, TypeId)>>(pairs: I) -> Self {
    Self {
      map: pairs.into_iter().collect(),
    }
  }

  pub fn get(
    &self,
    var: &TypeId,
  ) -> Option<TypeId> {
    self.map.get(var).copied()
  }

  pub fn contains(
    &self,
    var: &TypeId,
  ) -> bool {
    self.map.contains_key(var)
  }

  pub fn len(&self) -> usize {
    self.map.len()
  }

  pub fn is_empty(&self) -> bool {
    self.map.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (TypeId, TypeId)> + '_ {
    self.map.iter().map(|(k, v)| (*k, *v))
  }

  /// Rewrites `ty`, leaving variables outside the domain untouched.
  pub fn rewrite(
    &self,
    types: &mut TypeStore,
    ty: TypeId,
  ) -> TypeId {
    match self.rewrite_with(types, ty, false) {
      Ok(id) => id,
      // Lenient mode never reports unbound targets.
      Err(_) => ty,
    }
  }

  /// Like [`Substitution::rewrite`], but every bound variable reached must be
  /// mapped. Free variables outside the domain are left as they are.
  pub fn rewrite_total(
    &self,
    types: &mut TypeStore,
    ty: TypeId,
  ) -> Result<TypeId, TypeError> {
    self.rewrite_with(types, ty, true)
  }

  fn rewrite_with(
    &self,
    types: &mut TypeStore,
    ty: TypeId,
    strict: bool,
  ) -> Result<TypeId, TypeError> {
    let node = types.get(&ty).clone();

    let rebuilt = match &node {
      Type::Unit | Type::Bool | Type::String | Type::SignedInt(_) | Type::UnsignedInt(_) | Type::Float(_) => {
        return Ok(ty);
      },

      Type::BoundVar(_) => {
        return match self.map.get(&ty) {
          Some(replacement) => Ok(*replacement),
          None if strict => Err(TypeError::UnboundSubstitutionTarget { var: ty }),
          None => Ok(ty),
        };
      },
      Type::FreeVar(_) => return Ok(self.get(&ty).unwrap_or(ty)),

      Type::Pointer { pointee, mutable } => Type::Pointer {
        pointee: self.rewrite_with(types, *pointee, strict)?,
        mutable: *mutable,
      },
      Type::Array { element, mutable } => Type::Array {
        element: self.rewrite_with(types, *element, strict)?,
        mutable: *mutable,
      },
      Type::Slice { element, mutable } => Type::Slice {
        element: self.rewrite_with(types, *element, strict)?,
        mutable: *mutable,
      },
      Type::Function { arg, ret, effects } => Type::Function {
        arg: self.rewrite_with(types, *arg, strict)?,
        ret: self.rewrite_with(types, *ret, strict)?,
        effects: *effects,
      },
      Type::Tuple(elems) => {
        let mut out = Vec::with_capacity(elems.len());
        for elem in elems {
          out.push(self.rewrite_with(types, *elem, strict)?);
        }
        Type::Tuple(out)
      },
      Type::Struct(fields) => Type::Struct(self.rewrite_fields(types, fields, strict)?),
      Type::Union(fields) => Type::Union(self.rewrite_fields(types, fields, strict)?),
      Type::Enum(fields) => Type::Enum(self.rewrite_fields(types, fields, strict)?),
      Type::Module(fields) => Type::Module(self.rewrite_fields(types, fields, strict)?),
    };

    if rebuilt == node {
      return Ok(ty);
    }

    Ok(types.rebuild(rebuilt))
  }

  fn rewrite_fields(
    &self,
    types: &mut TypeStore,
    fields: &[ElemInfo],
    strict: bool,
  ) -> Result<Vec<ElemInfo>, TypeError> {
    let mut out = Vec::with_capacity(fields.len());
    for field in fields {
      out.push(ElemInfo {
        ty: self.rewrite_with(types, field.ty, strict)?,
        ..*field
      });
    }
    Ok(out)
  }

  /// Substitution equivalent to applying `applied_first`, then `self`.
  /// Keys present in both take the rewritten entry from `applied_first`.
  pub fn compose(
    &self,
    types: &mut TypeStore,
    applied_first: &Substitution,
  ) -> Substitution {
    let mut map = self.map.clone();
    for (var, replacement) in applied_first.iter() {
      let rewritten = self.rewrite(types, replacement);
      map.insert(var, rewritten);
    }
    Substitution { map }
  }

  /// Drops the bindings for `keys_to_remove`.
  pub fn restrict(
    &self,
    keys_to_remove: &[TypeId],
  ) -> Substitution {
    Substitution {
      map: self
        .map
        .iter()
        .filter(|(k, _)| !keys_to_remove.contains(k))
        .map(|(k, v)| (*k, *v))
        .collect(),
    }
  }

  /// Keeps only the bindings for `keys`.
  pub fn restrict_to(
    &self,
    keys: &[TypeId],
  ) -> Substitution {
    Substitution {
      map: self
        .map
        .iter()
        .filter(|(k, _)| keys.contains(k))
        .map(|(k, v)| (*k, *v))
        .collect(),
    }
  }

  /// Union of both mappings. Entries of `other` win on conflicting keys.
  pub fn extend(
    &self,
    other: &Substitution,
  ) -> Substitution {
    let mut map = self.map.clone();
    map.extend(other.iter());
    Substitution { map }
  }

  /// Rewrites the body of `scheme` without touching its own bound variables.
  pub fn rewrite_scheme(
    &self,
    types: &mut TypeStore,
    scheme: &Scheme,
  ) -> Scheme {
    let visible = self.restrict(scheme.bound_vars());
    let body = visible.rewrite(types, scheme.body());
    Scheme::from_parts(scheme.bound_vars().to_vec(), body)
  }

  pub fn spelling(
    &self,
    types: &TypeStore,
    symbols: &SymbolTable,
  ) -> String {
    let parts: Vec<String> = self
      .iter()
      .map(|(k, v)| format!("{} -> {}", types.spelling(&k, symbols), types.spelling(&v, symbols)))
      .collect();
    format!("{{{}}}", parts.join(", "))
  }
}
