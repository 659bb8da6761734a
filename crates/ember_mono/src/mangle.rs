use ember_mast::ActualArg;
use ember_type::types::{SideEffects, Type, TypeId, TypeStore};

/// `Base__arg1__arg2`, or just `Base` without arguments. `base` is expected
/// to be escaped already.
pub fn mangle_instance(
  base: &str,
  args: &[ActualArg],
  types: &TypeStore,
) -> String {
  let mut out = base.to_string();
  for arg in args {
    out.push_str("__");
    match arg {
      ActualArg::Type(ty) => out.push_str(&mangle_type(*ty, types)),
      ActualArg::Value(value) => out.push_str(&value.mangle()),
    }
  }
  out
}

pub fn closure_symbol(
  instance: &str,
  index: usize,
) -> String {
  format!("{}__closure{}", instance, index)
}

pub fn mangle_type(
  ty: TypeId,
  types: &TypeStore,
) -> String {
  match types.get(&ty) {
    Type::Unit => "unit".into(),
    Type::Bool => "bool".into(),
    Type::String => "string".into(),
    Type::SignedInt(w) => format!("i{}", w),
    Type::UnsignedInt(w) => format!("u{}", w),
    Type::Float(w) => format!("f{}", w),
    Type::Pointer { pointee, mutable } => {
      let prefix = if *mutable { "ptrmut" } else { "ptr" };
      format!("{}_{}", prefix, mangle_type(*pointee, types))
    },
    Type::Array { element, mutable } => {
      let prefix = if *mutable { "arrmut" } else { "arr" };
      format!("{}_{}", prefix, mangle_type(*element, types))
    },
    Type::Slice { element, mutable } => {
      let prefix = if *mutable { "slicemut" } else { "slice" };
      format!("{}_{}", prefix, mangle_type(*element, types))
    },
    Type::Function { arg, ret, effects } => {
      format!(
        "{}_{}_{}",
        effect_head(*effects),
        mangle_type(*arg, types),
        mangle_type(*ret, types)
      )
    },
    // The arity keeps nested tuples apart: every head has a fixed number of
    // operands, so the token sequence decodes one way only.
    Type::Tuple(elems) => {
      let mut out = format!("tuple{}", elems.len());
      for elem in elems {
        out.push('_');
        out.push_str(&mangle_type(*elem, types));
      }
      out
    },
    // Structural composites are unique per handle, anonymous otherwise.
    Type::Struct(_) => format!("struct{}", ty.index()),
    Type::Union(_) => format!("union{}", ty.index()),
    Type::Enum(_) => format!("enum{}", ty.index()),
    Type::Module(_) => format!("mod{}", ty.index()),
    Type::BoundVar(_) | Type::FreeVar(_) => format!("var{}", ty.index()),
  }
}

fn effect_head(effects: SideEffects) -> &'static str {
  match effects {
    SideEffects::Total => "fn",
    SideEffects::Divergent => "fndiv",
    SideEffects::State => "fnst",
    SideEffects::Exception => "fnexn",
    SideEffects::MachineLevel => "fnmach",
  }
}

pub fn escape(s: &str) -> String {
  s.replace('_', "_0")
}
