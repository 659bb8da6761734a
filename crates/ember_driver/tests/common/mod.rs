#![allow(dead_code)]

use ember_driver::Context;
use ember_mast::{ActualArg, ExpKind, ModExpId, Param, TemplateParam, TemplateParamKind};
use ember_type::{
  BytePosition,
  file::FileId,
  scheme::Scheme,
  span::Span,
  types::{SideEffects, TypeId},
  value::LiteralValue,
};

pub const SOURCE: &str = "\
module Pair<T>
  type Elem = T
  id = \\x. x
  size = 4
module Main
  a = Pair[Int32].id
  b = Pair[Bool].id
  answer = 42
  oops = Pair[].id
";

pub struct Program {
  pub file: FileId,
  pub pair: ModExpId,
  pub root: ModExpId,
}

pub fn span_of(
  ctx: &Context,
  file: FileId,
  needle: &str,
) -> Span {
  let text = &ctx.source_map.get(&file).text;
  let start = text.find(needle).expect("snippet present in source") as u32;
  Span::new(file, BytePosition(start), BytePosition(start + needle.len() as u32))
}

fn seal(
  ctx: &mut Context,
  module: ModExpId,
  vars: Vec<TypeId>,
) {
  let body = ctx.mast.module_type(&module, &mut ctx.types);
  let scheme = Scheme::new(&ctx.types, vars, body).expect("well-formed module scheme");
  ctx.mast.modules.get_mut(module).scheme = scheme;
}

fn site(
  ctx: &mut Context,
  file: FileId,
  text: &str,
  pair: ModExpId,
  args: Vec<ActualArg>,
  ty: TypeId,
) -> ember_mast::ExpId {
  let span = span_of(ctx, file, text);
  let field = ctx.symbols.intern("id");
  ctx.mast.alloc(ExpKind::ModField { module: pair, args, field }, ty, span)
}

/// Builds the module tree a front end would produce for `SOURCE`. The
/// `oops` binding, which passes no arguments to `Pair`, is only added when
/// `with_error` is set.
pub fn build(
  ctx: &mut Context,
  with_error: bool,
) -> Program {
  let file = ctx.source_map.add_virtual("test", SOURCE.to_string());
  let unit = ctx.types.unit();
  let i32 = ctx.types.i32();
  let boolean = ctx.types.boolean();

  // module Pair<T>
  let t_name = ctx.symbols.intern("T");
  let t = ctx.types.new_bound_var(t_name);
  let pair_name = ctx.symbols.intern("Pair");
  let pair_span = span_of(ctx, file, "module Pair<T>");
  let param_span = span_of(ctx, file, "T>");
  let pair = ctx.mast.add_module(
    pair_name,
    pair_span,
    None,
    vec![TemplateParam {
      name: t_name,
      span: param_span,
      kind: TemplateParamKind::Type { var: t },
    }],
    Scheme::monomorphic(unit),
  );

  let elem = ctx.symbols.intern("Elem");
  ctx.mast.add_type(pair, elem, t);

  let x = ctx.symbols.intern("x");
  let fn_t = ctx.types.function(t, t, SideEffects::Total);
  let body_span = span_of(ctx, file, "x. x");
  let body = ctx.mast.alloc(ExpKind::Local(x), t, body_span);
  let lambda_span = span_of(ctx, file, "\\x. x");
  let lambda = ctx.mast.alloc(
    ExpKind::Lambda {
      params: vec![Param { name: x, ty: t }],
      body,
    },
    fn_t,
    lambda_span,
  );
  let id = ctx.symbols.intern("id");
  ctx.mast.add_value(pair, id, lambda);

  let size_span = span_of(ctx, file, "4");
  let four = ctx.mast.alloc(ExpKind::Literal(LiteralValue::Int32(4)), i32, size_span);
  let size = ctx.symbols.intern("size");
  ctx.mast.add_value(pair, size, four);

  seal(ctx, pair, vec![t]);

  // module Main
  let main_name = ctx.symbols.intern("Main");
  let main_span = span_of(ctx, file, "module Main");
  let root = ctx.mast.add_module(main_name, main_span, None, vec![], Scheme::monomorphic(unit));

  let fn_i32 = ctx.types.function(i32, i32, SideEffects::Total);
  let a = site(ctx, file, "Pair[Int32].id", pair, vec![ActualArg::Type(i32)], fn_i32);
  let a_name = ctx.symbols.intern("a");
  ctx.mast.add_value(root, a_name, a);

  let fn_bool = ctx.types.function(boolean, boolean, SideEffects::Total);
  let b = site(ctx, file, "Pair[Bool].id", pair, vec![ActualArg::Type(boolean)], fn_bool);
  let b_name = ctx.symbols.intern("b");
  ctx.mast.add_value(root, b_name, b);

  let answer_span = span_of(ctx, file, "42");
  let answer = ctx.mast.alloc(ExpKind::Literal(LiteralValue::Int32(42)), i32, answer_span);
  let answer_name = ctx.symbols.intern("answer");
  ctx.mast.add_value(root, answer_name, answer);

  if with_error {
    let oops = site(ctx, file, "Pair[].id", pair, vec![], unit);
    let oops_name = ctx.symbols.intern("oops");
    ctx.mast.add_value(root, oops_name, oops);
  }

  seal(ctx, root, vec![]);

  Program { file, pair, root }
}
