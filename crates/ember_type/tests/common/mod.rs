use ember_type::{
  symbol::SymbolTable,
  types::{ElemInfo, SideEffects, TypeId, TypeStore},
};
use proptest::prelude::*;

/// Constructor-argument tree used to drive the type store from proptest.
#[derive(Debug, Clone)]
pub enum Shape {
  Int(u32, bool),
  Float(u32),
  Bool,
  Var(usize),
  Pointer(Box<Shape>, bool),
  Slice(Box<Shape>, bool),
  Function(Box<Shape>, Box<Shape>),
  Tuple(Vec<Shape>),
  Struct(Vec<(String, Shape)>),
}

pub fn shape() -> impl Strategy<Value = Shape> {
  let leaf = prop_oneof![
    (prop::sample::select(vec![8u32, 16, 32, 64]), any::<bool>()).prop_map(|(w, s)| Shape::Int(w, s)),
    prop::sample::select(vec![32u32, 64]).prop_map(Shape::Float),
    Just(Shape::Bool),
    (0usize..3).prop_map(Shape::Var),
  ];

  leaf.prop_recursive(4, 32, 4, |inner| {
    prop_oneof![
      (inner.clone(), any::<bool>()).prop_map(|(s, m)| Shape::Pointer(Box::new(s), m)),
      (inner.clone(), any::<bool>()).prop_map(|(s, m)| Shape::Slice(Box::new(s), m)),
      (inner.clone(), inner.clone()).prop_map(|(a, r)| Shape::Function(Box::new(a), Box::new(r))),
      prop::collection::vec(inner.clone(), 0..4).prop_map(Shape::Tuple),
      prop::collection::vec(("[a-d]", inner), 0..4).prop_map(Shape::Struct),
    ]
  })
}

pub struct Env {
  pub types: TypeStore,
  pub symbols: SymbolTable,
  pub vars: Vec<TypeId>,
}

impl Env {
  pub fn new() -> Self {
    let mut types = TypeStore::new();
    let mut symbols = SymbolTable::new();
    let vars = ["a", "b", "c"]
      .iter()
      .map(|n| {
        let sym = symbols.intern(n);
        types.new_bound_var(sym)
      })
      .collect();

    Self { types, symbols, vars }
  }

  pub fn build(
    &mut self,
    shape: &Shape,
  ) -> TypeId {
    match shape {
      Shape::Int(w, s) => self.types.int(*w, *s),
      Shape::Float(w) => self.types.float(*w),
      Shape::Bool => self.types.boolean(),
      Shape::Var(i) => self.vars[*i],
      Shape::Pointer(s, m) => {
        let inner = self.build(s);
        self.types.pointer(inner, *m)
      },
      Shape::Slice(s, m) => {
        let inner = self.build(s);
        self.types.slice(inner, *m)
      },
      Shape::Function(a, r) => {
        let arg = self.build(a);
        let ret = self.build(r);
        self.types.function(arg, ret, SideEffects::Total)
      },
      Shape::Tuple(elems) => {
        let ids = elems.iter().map(|e| self.build(e)).collect();
        self.types.tuple(ids)
      },
      Shape::Struct(fields) => {
        let infos = fields
          .iter()
          .map(|(name, s)| {
            let ty = self.build(s);
            ElemInfo::value(self.symbols.intern(name), ty)
          })
          .collect();
        self.types.structure(infos)
      },
    }
  }
}
