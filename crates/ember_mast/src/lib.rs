//! Module-expression tree (MAST) handed to the monomorphizer by the front end.
//!
//! The tree is typed and still polymorphic: types may mention the bound
//! variables introduced by the template parameters of enclosing modules.
//! Nothing downstream mutates it.

pub mod operation;

use ember_type::{
  Id, Store,
  scheme::Scheme,
  span::Span,
  symbol::SymbolId,
  types::{TypeId, TypeStore},
  value::LiteralValue,
};

use operation::{BinaryOperation, UnaryOperation};

pub type ModExpId = Id<ModExp>;
pub type ExpId = Id<Exp>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateParamKind {
  /// Type-valued parameter, bound to a `BoundVar` of the module's scheme.
  Type { var: TypeId },
  /// Compile-time constant of type `ty`.
  Value { ty: TypeId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParam {
  pub name: SymbolId,
  pub span: Span,
  pub kind: TemplateParamKind,
}

impl TemplateParam {
  pub fn is_type(&self) -> bool {
    matches!(self.kind, TemplateParamKind::Type { .. })
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingKind {
  Value { ty: TypeId, init: ExpId },
  Type { ty: TypeId },
  /// Nested module. Its own template parameters (if any) are supplied at the
  /// sites that reference it.
  Module(ModExpId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
  pub name: SymbolId,
  pub span: Span,
  pub kind: BindingKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModExp {
  pub name: SymbolId,
  pub span: Span,
  pub parent: Option<ModExpId>,
  pub template_params: Vec<TemplateParam>,
  /// Type of the module, quantified over the type-valued template parameters.
  pub scheme: Scheme,
  pub bindings: Vec<Binding>,
}

impl ModExp {
  pub fn is_generic(&self) -> bool {
    !self.template_params.is_empty()
  }

  /// Bound variables of the type-valued template parameters, in order.
  pub fn type_param_vars(&self) -> Vec<TypeId> {
    self
      .template_params
      .iter()
      .filter_map(|p| match p.kind {
        TemplateParamKind::Type { var } => Some(var),
        TemplateParamKind::Value { .. } => None,
      })
      .collect()
  }

  pub fn binding_index(
    &self,
    name: SymbolId,
  ) -> Option<usize> {
    self.bindings.iter().position(|b| b.name == name)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActualArg {
  Type(TypeId),
  Value(LiteralValue),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
  pub name: SymbolId,
  pub ty: TypeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpKind {
  Literal(LiteralValue),
  /// Lambda parameter or `let`-bound name.
  Local(SymbolId),
  /// Binding `index` of `module`, which is the current module or one of its
  /// ancestors.
  Field { module: ModExpId, index: usize },
  /// `module[args].field`: the instantiation site.
  ModField {
    module: ModExpId,
    args: Vec<ActualArg>,
    field: SymbolId,
  },
  /// Value template parameter `index` of `module` (the current module or an
  /// ancestor).
  TemplateValue { module: ModExpId, index: usize },
  Lambda { params: Vec<Param>, body: ExpId },
  Call { callee: ExpId, args: Vec<ExpId> },
  Tuple(Vec<ExpId>),
  Let { name: SymbolId, value: ExpId, body: ExpId },
  If {
    condition: ExpId,
    then_branch: ExpId,
    else_branch: ExpId,
  },
  Unary {
    operation: UnaryOperation,
    operand: ExpId,
  },
  Binary {
    operation: BinaryOperation,
    left: ExpId,
    right: ExpId,
  },
}

impl ExpKind {
  /// Direct sub-expressions, in evaluation order.
  pub fn children(&self) -> Vec<ExpId> {
    match self {
      ExpKind::Literal(_)
      | ExpKind::Local(_)
      | ExpKind::Field { .. }
      | ExpKind::ModField { .. }
      | ExpKind::TemplateValue { .. } => Vec::new(),
      ExpKind::Lambda { body, .. } => vec![*body],
      ExpKind::Call { callee, args } => {
        let mut out = vec![*callee];
        out.extend(args.iter().copied());
        out
      },
      ExpKind::Tuple(elems) => elems.clone(),
      ExpKind::Let { value, body, .. } => vec![*value, *body],
      ExpKind::If {
        condition,
        then_branch,
        else_branch,
      } => vec![*condition, *then_branch, *else_branch],
      ExpKind::Unary { operand, .. } => vec![*operand],
      ExpKind::Binary { left, right, .. } => vec![*left, *right],
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exp {
  pub kind: ExpKind,
  pub span: Span,
  pub ty: TypeId,
}

#[derive(Debug, Clone, Default)]
pub struct Mast {
  pub modules: Store<ModExp>,
  pub exps: Store<Exp>,
}

impl Mast {
  pub fn new() -> Self {
    Self::default()
  }

  #[inline]
  pub fn module(
    &self,
    id: &ModExpId,
  ) -> &ModExp {
    self.modules.get(id)
  }

  #[inline]
  pub fn exp(
    &self,
    id: &ExpId,
  ) -> &Exp {
    self.exps.get(id)
  }

  /// Enclosing modules of `id`, innermost first.
  pub fn ancestors(
    &self,
    id: &ModExpId,
  ) -> Vec<ModExpId> {
    let mut out = Vec::new();
    let mut current = self.module(id).parent;
    while let Some(parent) = current {
      out.push(parent);
      current = self.module(&parent).parent;
    }
    out
  }

  /// Type-parameter variables of every enclosing module of `id`.
  pub fn ancestor_type_vars(
    &self,
    id: &ModExpId,
  ) -> Vec<TypeId> {
    self
      .ancestors(id)
      .iter()
      .flat_map(|m| self.module(m).type_param_vars())
      .collect()
  }

  // Building

  /// Adds a module and, when `parent` is set, a `Module` binding for it in
  /// the parent.
  pub fn add_module(
    &mut self,
    name: SymbolId,
    span: Span,
    parent: Option<ModExpId>,
    template_params: Vec<TemplateParam>,
    scheme: Scheme,
  ) -> ModExpId {
    let id = self.modules.alloc(ModExp {
      name,
      span,
      parent,
      template_params,
      scheme,
      bindings: Vec::new(),
    });

    if let Some(parent) = parent {
      self.modules.get_mut(parent).bindings.push(Binding {
        name,
        span,
        kind: BindingKind::Module(id),
      });
    }

    id
  }

  /// Returns the index of the new binding.
  pub fn add_binding(
    &mut self,
    module: ModExpId,
    binding: Binding,
  ) -> usize {
    let bindings = &mut self.modules.get_mut(module).bindings;
    bindings.push(binding);
    bindings.len() - 1
  }

  pub fn add_value(
    &mut self,
    module: ModExpId,
    name: SymbolId,
    init: ExpId,
  ) -> usize {
    let exp = self.exp(&init);
    let binding = Binding {
      name,
      span: exp.span,
      kind: BindingKind::Value { ty: exp.ty, init },
    };
    self.add_binding(module, binding)
  }

  pub fn add_type(
    &mut self,
    module: ModExpId,
    name: SymbolId,
    ty: TypeId,
  ) -> usize {
    let span = self.module(&module).span;
    self.add_binding(module, Binding {
      name,
      span,
      kind: BindingKind::Type { ty },
    })
  }

  pub fn alloc(
    &mut self,
    kind: ExpKind,
    ty: TypeId,
    span: Span,
  ) -> ExpId {
    self.exps.alloc(Exp { kind, span, ty })
  }

  /// Module type built from the bindings: value fields with their types,
  /// type fields with their definitions. Nested modules are not fields.
  pub fn module_type(
    &self,
    id: &ModExpId,
    types: &mut TypeStore,
  ) -> TypeId {
    use ember_type::types::ElemInfo;

    let fields = self
      .module(id)
      .bindings
      .iter()
      .filter_map(|b| match &b.kind {
        BindingKind::Value { ty, .. } => Some(ElemInfo::value(b.name, *ty)),
        BindingKind::Type { ty } => Some(ElemInfo::type_field(b.name, *ty)),
        BindingKind::Module(_) => None,
      })
      .collect();

    types.new_module(fields)
  }
}
