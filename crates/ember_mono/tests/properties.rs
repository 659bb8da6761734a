mod common;

use std::collections::BTreeSet;

use common::{Fixture, generic_module, main_using};
use ember_mono::DefTarget;
use ember_type::types::{SideEffects, TypeId};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Shape {
  Leaf(usize),
  Pointer(Box<Shape>),
  Function(Box<Shape>, Box<Shape>, bool),
  Tuple(Vec<Shape>),
}

fn shape() -> impl Strategy<Value = Shape> {
  let leaf = (0usize..3).prop_map(Shape::Leaf);
  leaf.prop_recursive(3, 16, 3, |inner| {
    prop_oneof![
      inner.clone().prop_map(|s| Shape::Pointer(Box::new(s))),
      (inner.clone(), inner.clone(), any::<bool>())
        .prop_map(|(arg, ret, total)| Shape::Function(Box::new(arg), Box::new(ret), total)),
      prop::collection::vec(inner, 0..3).prop_map(Shape::Tuple),
    ]
  })
}

fn build(
  fx: &mut Fixture,
  shape: &Shape,
) -> TypeId {
  match shape {
    Shape::Leaf(0) => fx.types.i32(),
    Shape::Leaf(1) => fx.types.boolean(),
    Shape::Leaf(_) => fx.types.f64(),
    Shape::Pointer(inner) => {
      let pointee = build(fx, inner);
      fx.types.pointer(pointee, false)
    },
    Shape::Function(arg, ret, total) => {
      let arg = build(fx, arg);
      let ret = build(fx, ret);
      let effects = if *total { SideEffects::Total } else { SideEffects::State };
      fx.types.function(arg, ret, effects)
    },
    Shape::Tuple(elems) => {
      let elems = elems.iter().map(|e| build(fx, e)).collect();
      fx.types.tuple(elems)
    },
  }
}

proptest! {
  #[test]
  fn repeated_arguments_share_instances(choices in prop::collection::vec(0usize..4, 1..8)) {
    let mut fx = Fixture::new();
    let generic = generic_module(&mut fx);
    let pool = [fx.types.i32(), fx.types.f64(), fx.types.boolean(), fx.types.u8()];
    let args: Vec<TypeId> = choices.iter().map(|c| pool[*c]).collect();
    let main = main_using(&mut fx, &generic, &args);

    let out = fx.run(main).expect("monomorphize");

    let distinct: BTreeSet<usize> = choices.iter().copied().collect();
    prop_assert_eq!(out.instances_of(generic.module).len(), distinct.len());
    prop_assert_eq!(out.closure_count(), distinct.len());
    prop_assert_eq!(out.stats.cache_hits, choices.len() - distinct.len());

    let root = out.instance(&out.root);
    for (field, arg) in root.fields.iter().zip(&args) {
      match &field.target {
        DefTarget::Def { instance, .. } => {
          prop_assert_eq!(out.instance(instance).sub.get(&generic.var), Some(*arg));
        },
        other => prop_assert!(false, "unexpected target {:?}", other),
      }
    }
  }

  #[test]
  fn every_instance_is_fully_concrete(choices in prop::collection::vec(0usize..3, 1..6)) {
    let mut fx = Fixture::new();
    let generic = generic_module(&mut fx);
    let pool = [fx.types.i64(), fx.types.f32(), fx.types.string()];
    let args: Vec<TypeId> = choices.iter().map(|c| pool[*c]).collect();
    let main = main_using(&mut fx, &generic, &args);

    let out = fx.run(main).expect("monomorphize");

    prop_assert!(out.warnings.is_empty());
    for (_, inst) in out.instances.iter() {
      for field in &inst.fields {
        prop_assert!(fx.types.is_concrete(&field.ty));
        prop_assert_ne!(&field.target, &DefTarget::Pending);
      }
    }
  }

  #[test]
  fn distinct_arguments_get_distinct_names(shapes in prop::collection::vec(shape(), 1..6)) {
    let mut fx = Fixture::new();
    let generic = generic_module(&mut fx);
    let args: Vec<TypeId> = shapes.iter().map(|s| build(&mut fx, s)).collect();
    let main = main_using(&mut fx, &generic, &args);

    let out = fx.run(main).expect("monomorphize");

    let distinct: BTreeSet<TypeId> = args.iter().copied().collect();
    let instances = out.instances_of(generic.module);
    prop_assert_eq!(instances.len(), distinct.len());

    let names: BTreeSet<&str> = instances.iter().map(|id| out.instance(id).name.as_str()).collect();
    prop_assert_eq!(names.len(), instances.len());

    let symbols: BTreeSet<&str> = out.closures.iter().map(|(_, c)| c.symbol.as_str()).collect();
    prop_assert_eq!(symbols.len(), out.closure_count());
  }
}
