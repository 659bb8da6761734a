use std::collections::HashSet;

use ember_mast::{ExpId, ExpKind, Mast};
use ember_type::{symbol::SymbolId, types::TypeId};

/// Free locals of the lambda at `lambda`: names read in its body that are not
/// bound by its parameters or by a `let` or lambda inside it. Returned in
/// first-occurrence order with the type of that occurrence.
pub fn free_locals(
  mast: &Mast,
  lambda: ExpId,
) -> Vec<(SymbolId, TypeId)> {
  let mut out = Vec::new();

  if let ExpKind::Lambda { params, body } = &mast.exp(&lambda).kind {
    let mut scope: Vec<SymbolId> = params.iter().map(|p| p.name).collect();
    let mut seen = HashSet::new();
    collect(mast, *body, &mut scope, &mut seen, &mut out);
  }

  out
}

fn collect(
  mast: &Mast,
  exp: ExpId,
  scope: &mut Vec<SymbolId>,
  seen: &mut HashSet<SymbolId>,
  out: &mut Vec<(SymbolId, TypeId)>,
) {
  let node = mast.exp(&exp);

  match &node.kind {
    ExpKind::Local(name) => {
      if !scope.contains(name) && seen.insert(*name) {
        out.push((*name, node.ty));
      }
    },
    ExpKind::Let { name, value, body } => {
      collect(mast, *value, scope, seen, out);
      scope.push(*name);
      collect(mast, *body, scope, seen, out);
      scope.pop();
    },
    ExpKind::Lambda { params, body } => {
      let depth = scope.len();
      scope.extend(params.iter().map(|p| p.name));
      collect(mast, *body, scope, seen, out);
      scope.truncate(depth);
    },
    other => {
      for child in other.children() {
        collect(mast, child, scope, seen, out);
      }
    },
  }
}

#[cfg(test)]
mod tests {
  use ember_mast::Param;
  use ember_type::{span::Span, symbol::SymbolTable, types::TypeStore};

  use super::*;

  #[test]
  fn parameters_and_lets_are_not_captured() {
    let mut types = TypeStore::new();
    let mut symbols = SymbolTable::new();
    let mut mast = Mast::new();
    let i32 = types.i32();
    let b = types.boolean();
    let (x, y, z) = (symbols.intern("x"), symbols.intern("y"), symbols.intern("z"));
    let sp = Span::default();

    // fun (x) -> let z = y in (x, z, y, b)
    let ry = mast.alloc(ExpKind::Local(y), i32, sp);
    let rx = mast.alloc(ExpKind::Local(x), i32, sp);
    let rz = mast.alloc(ExpKind::Local(z), i32, sp);
    let ry2 = mast.alloc(ExpKind::Local(y), i32, sp);
    let bsym = symbols.intern("b");
    let rb = mast.alloc(ExpKind::Local(bsym), b, sp);
    let tuple_ty = types.tuple(vec![i32, i32, i32, b]);
    let tuple = mast.alloc(ExpKind::Tuple(vec![rx, rz, ry2, rb]), tuple_ty, sp);
    let body = mast.alloc(
      ExpKind::Let {
        name: z,
        value: ry,
        body: tuple,
      },
      tuple_ty,
      sp,
    );
    let fn_ty = types.function(i32, tuple_ty, ember_type::types::SideEffects::Total);
    let lambda = mast.alloc(
      ExpKind::Lambda {
        params: vec![Param { name: x, ty: i32 }],
        body,
      },
      fn_ty,
      sp,
    );

    assert_eq!(free_locals(&mast, lambda), vec![(y, i32), (bsym, b)]);
  }

  #[test]
  fn inner_lambda_parameters_shadow() {
    let mut types = TypeStore::new();
    let mut symbols = SymbolTable::new();
    let mut mast = Mast::new();
    let i32 = types.i32();
    let (x, y) = (symbols.intern("x"), symbols.intern("y"));
    let sp = Span::default();
    let fn_ty = types.function(i32, i32, ember_type::types::SideEffects::Total);

    // fun (x) -> fun (y) -> y
    let ry = mast.alloc(ExpKind::Local(y), i32, sp);
    let inner = mast.alloc(
      ExpKind::Lambda {
        params: vec![Param { name: y, ty: i32 }],
        body: ry,
      },
      fn_ty,
      sp,
    );
    let outer_ty = types.function(i32, fn_ty, ember_type::types::SideEffects::Total);
    let outer = mast.alloc(
      ExpKind::Lambda {
        params: vec![Param { name: x, ty: i32 }],
        body: inner,
      },
      outer_ty,
      sp,
    );

    assert!(free_locals(&mast, outer).is_empty());
    assert!(free_locals(&mast, inner).is_empty());
    assert!(free_locals(&mast, ry).is_empty());
  }
}
