use crate::{
  subst::Substitution,
  symbol::SymbolTable,
  types::{Type, TypeError, TypeId, TypeStore},
};

/// `forall bound_vars. body`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scheme {
  bound_vars: Vec<TypeId>,
  body: TypeId,
}

impl Scheme {
  /// Fails with [`TypeError::UnquantifiedVariable`] if `body` mentions a bound
  /// variable that is not in `bound_vars`.
  pub fn new(
    types: &TypeStore,
    bound_vars: Vec<TypeId>,
    body: TypeId,
  ) -> Result<Self, TypeError> {
    Self::nested(types, bound_vars, body, &[])
  }

  /// Scheme of a definition nested inside other generic definitions. Bound
  /// variables quantified by an enclosing scheme may appear in `body`.
  pub fn nested(
    types: &TypeStore,
    bound_vars: Vec<TypeId>,
    body: TypeId,
    enclosing: &[TypeId],
  ) -> Result<Self, TypeError> {
    for var in types.vars_in(&body) {
      let is_bound = matches!(types.get(&var), Type::BoundVar(_));
      if is_bound && !bound_vars.contains(&var) && !enclosing.contains(&var) {
        return Err(TypeError::UnquantifiedVariable { var });
      }
    }

    Ok(Self { bound_vars, body })
  }

  pub fn monomorphic(body: TypeId) -> Self {
    Self {
      bound_vars: Vec::new(),
      body,
    }
  }

  pub(crate) fn from_parts(
    bound_vars: Vec<TypeId>,
    body: TypeId,
  ) -> Self {
    Self { bound_vars, body }
  }

  pub fn bound_vars(&self) -> &[TypeId] {
    &self.bound_vars
  }

  pub fn body(&self) -> TypeId {
    self.body
  }

  pub fn arity(&self) -> usize {
    self.bound_vars.len()
  }

  pub fn is_monomorphic(&self) -> bool {
    self.bound_vars.is_empty()
  }

  /// Without `actual_args`, every bound variable is replaced by a fresh free
  /// variable (one set per call). With them, bound variables are paired with
  /// the actuals positionally.
  pub fn instantiate(
    &self,
    types: &mut TypeStore,
    actual_args: Option<&[TypeId]>,
  ) -> Result<(Substitution, TypeId), TypeError> {
    let sub = match actual_args {
      None => {
        let mut pairs = Vec::with_capacity(self.bound_vars.len());
        for var in &self.bound_vars {
          let name = match types.get(var) {
            Type::BoundVar(name) | Type::FreeVar(name) => *name,
            _ => return Err(TypeError::UnquantifiedVariable { var: *var }),
          };
          pairs.push((*var, types.new_free_var(name)));
        }
        Substitution::from_pairs(pairs)
      },
      Some(args) => {
        if args.len() != self.bound_vars.len() {
          return Err(TypeError::ArityMismatch {
            expected: self.bound_vars.len(),
            found: args.len(),
          });
        }
        Substitution::from_pairs(self.bound_vars.iter().copied().zip(args.iter().copied()))
      },
    };

    let body = sub.rewrite(types, self.body);
    Ok((sub, body))
  }

  pub fn spelling(
    &self,
    types: &TypeStore,
    symbols: &SymbolTable,
  ) -> String {
    let body = types.spelling(&self.body, symbols);
    if self.bound_vars.is_empty() {
      return body;
    }

    let vars: Vec<String> = self.bound_vars.iter().map(|v| types.spelling(v, symbols)).collect();
    format!("\u{2200} ({}) {}", vars.join(", "), body)
  }
}
