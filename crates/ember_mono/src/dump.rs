use std::fmt::Write;

use ascii_table::AsciiTable;
use serde::Serialize;

use ember_mast::Mast;
use ember_type::{symbol::SymbolTable, types::TypeStore};

use crate::{
  instance::{DefTarget, MonoMod},
  mono::MonoOutput,
};

/// Dump every interned type in simple format
pub fn dump_types(
  types: &TypeStore,
  symbols: &SymbolTable,
) -> String {
  let mut output = String::new();

  writeln!(&mut output, "=== Type Store ===").unwrap();

  for (id, _) in types.iter() {
    writeln!(
      &mut output,
      "  #{} {}: {}",
      id.index(),
      types.kind_of(&id),
      types.spelling(&id, symbols)
    )
    .unwrap();
  }

  output
}

/// Short text for a field target: literal, closure symbol, aliased field or type.
pub fn describe_target(
  target: &DefTarget,
  output: &MonoOutput,
  types: &TypeStore,
  symbols: &SymbolTable,
) -> String {
  match target {
    DefTarget::Pending => "<pending>".to_string(),
    DefTarget::Literal(value) => value.to_string(),
    DefTarget::Closure(id) => output.closure(id).symbol.clone(),
    DefTarget::Def { instance, field } => {
      let inst = output.instance(instance);
      format!("{}.{}", inst.name, symbols.get(&inst.fields[*field].name))
    },
    DefTarget::Type(ty) => types.spelling(ty, symbols),
    DefTarget::Expression(exp) => format!("<exp {}>", exp.index()),
  }
}

fn fields_text(
  inst: &MonoMod,
  output: &MonoOutput,
  types: &TypeStore,
  symbols: &SymbolTable,
) -> String {
  inst
    .fields
    .iter()
    .map(|f| {
      format!(
        "{} {} :: {} = {}",
        f.kind,
        symbols.get(&f.name),
        types.spelling(&f.ty, symbols),
        describe_target(&f.target, output, types, symbols)
      )
    })
    .collect::<Vec<_>>()
    .join("; ")
}

/// One row per instance.
pub fn dump_instances(
  output: &MonoOutput,
  mast: &Mast,
  types: &TypeStore,
  symbols: &SymbolTable,
) -> String {
  let mut rows: Vec<Vec<String>> = Vec::new();

  for (id, inst) in output.instances.iter() {
    let closures = inst
      .closures
      .iter()
      .map(|c| output.closure(c).symbol.clone())
      .collect::<Vec<_>>()
      .join("; ");

    rows.push(vec![
      id.index().to_string(),
      inst.name.clone(),
      symbols.get(&mast.module(&inst.source).name).to_string(),
      inst.sub.spelling(types, symbols),
      fields_text(inst, output, types, symbols),
      closures,
    ]);
  }

  let mut table = AsciiTable::default();
  table.set_max_width(400);
  table.column(0).set_header("Id");
  table.column(1).set_header("Name");
  table.column(2).set_header("Source");
  table.column(3).set_header("Substitution");
  table.column(4).set_header("Fields");
  table.column(5).set_header("Closures");

  table.format(rows)
}

pub fn dump_closures(
  output: &MonoOutput,
  types: &TypeStore,
  symbols: &SymbolTable,
) -> String {
  let mut out = String::new();

  writeln!(&mut out, "=== Closures ===").unwrap();

  for (_, closure) in output.closures.iter() {
    writeln!(
      &mut out,
      "  {} :: {} (owner {}, exp {})",
      closure.symbol,
      types.spelling(&closure.fn_ty, symbols),
      output.instance(&closure.owner).name,
      closure.exp.index()
    )
    .unwrap();

    for capture in &closure.captures {
      writeln!(
        &mut out,
        "    captures {} :: {}",
        symbols.get(&capture.name),
        types.spelling(&capture.ty, symbols)
      )
      .unwrap();
    }
  }

  out
}

#[derive(Serialize)]
struct FieldSummary {
  name: String,
  kind: String,
  ty: String,
  target: String,
}

#[derive(Serialize)]
struct InstanceSummary {
  id: u32,
  name: String,
  parent: Option<u32>,
  substitution: String,
  fields: Vec<FieldSummary>,
  closures: Vec<String>,
  submodules: Vec<u32>,
}

#[derive(Serialize)]
struct ClosureSummary {
  symbol: String,
  owner: u32,
  ty: String,
  captures: Vec<(String, String)>,
}

#[derive(Serialize)]
struct MonoSummary {
  root: u32,
  instances: Vec<InstanceSummary>,
  closures: Vec<ClosureSummary>,
  cache_hits: usize,
  cache_misses: usize,
  warnings: Vec<String>,
}

/// Machine-readable summary of the instances and closures.
pub fn dump_json(
  output: &MonoOutput,
  types: &TypeStore,
  symbols: &SymbolTable,
) -> Result<String, serde_json::Error> {
  let instances = output
    .instances
    .iter()
    .map(|(id, inst)| InstanceSummary {
      id: id.index(),
      name: inst.name.clone(),
      parent: inst.parent.map(|p| p.index()),
      substitution: inst.sub.spelling(types, symbols),
      fields: inst
        .fields
        .iter()
        .map(|f| FieldSummary {
          name: symbols.get(&f.name).to_string(),
          kind: f.kind.to_string(),
          ty: types.spelling(&f.ty, symbols),
          target: describe_target(&f.target, output, types, symbols),
        })
        .collect(),
      closures: inst.closures.iter().map(|c| output.closure(c).symbol.clone()).collect(),
      submodules: inst.submodules.iter().map(|s| s.index()).collect(),
    })
    .collect();

  let closures = output
    .closures
    .iter()
    .map(|(_, c)| ClosureSummary {
      symbol: c.symbol.clone(),
      owner: c.owner.index(),
      ty: types.spelling(&c.fn_ty, symbols),
      captures: c
        .captures
        .iter()
        .map(|cap| (symbols.get(&cap.name).to_string(), types.spelling(&cap.ty, symbols)))
        .collect(),
    })
    .collect();

  let summary = MonoSummary {
    root: output.root.index(),
    instances,
    closures,
    cache_hits: output.stats.cache_hits,
    cache_misses: output.stats.cache_misses,
    warnings: output.warnings.clone(),
  };

  serde_json::to_string_pretty(&summary)
}
