use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DumpKind {
  /// Every interned type with its spelling.
  Types,
  /// Table of concrete module instances.
  Mono,
  /// Instance summary as JSON.
  MonoJson,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DebugTrace {
  Types,
  Mono,
  Closures,
  Driver,
}

/// Limits and checks for the monomorphizer.
///
/// Expected format:
/// ```toml
/// [mono]
/// max_instances = 4096
/// verify_concrete = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonoConfig {
  /// Upper bound on distinct concrete module instances. Reaching it means the
  /// program instantiates generics without bound.
  pub max_instances: usize,
  /// Check that no type variable survives in emitted fields and closures.
  pub verify_concrete: bool,
}

impl Default for MonoConfig {
  fn default() -> Self {
    Self {
      max_instances: 4096,
      verify_concrete: true,
    }
  }
}

/// On-disk configuration file. Every table is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmberConfigFile {
  pub debug_trace: Vec<DebugTrace>,
  pub dump: Vec<DumpKind>,
  pub mono: MonoConfig,
}

impl EmberConfigFile {
  pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
    toml::from_str(text)
  }

  pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
    toml::to_string(self)
  }
}

#[derive(Debug, Clone, Default)]
pub struct EmberConfig {
  pub debug: bool,
  pub debug_trace: Vec<DebugTrace>,
  pub quiet: bool,
  pub verbose: u8,
  pub dump: Vec<DumpKind>,
  pub mono: MonoConfig,
}

impl EmberConfig {
  pub fn new_basic(
    debug: bool,
    debug_trace: Vec<DebugTrace>,
    quiet: bool,
    verbose: u8,
  ) -> Self {
    Self {
      debug,
      debug_trace,
      quiet,
      verbose,
      ..Self::default()
    }
  }

  /// Silent configuration, used by tests and embedders.
  pub fn quiet() -> Self {
    Self::new_basic(false, Vec::new(), true, 0)
  }

  /// Layers a parsed configuration file on top of command-line style flags.
  pub fn with_file(
    mut self,
    file: EmberConfigFile,
  ) -> Self {
    self.mono = file.mono;

    for trace in file.debug_trace {
      if !self.debug_trace.contains(&trace) {
        self.debug_trace.push(trace);
      }
    }

    for kind in file.dump {
      if !self.dump.contains(&kind) {
        self.dump.push(kind);
      }
    }

    self
  }

  pub fn dumps(
    &self,
    kind: DumpKind,
  ) -> bool {
    self.dump.contains(&kind)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_keys_fall_back_to_defaults() {
    let file = EmberConfigFile::from_toml_str("[mono]\nmax_instances = 16\n").expect("valid toml");

    assert_eq!(file.mono.max_instances, 16);
    assert!(file.mono.verify_concrete);
    assert!(file.debug_trace.is_empty());
  }

  #[test]
  fn empty_file_is_default() {
    let file = EmberConfigFile::from_toml_str("").expect("valid toml");
    assert_eq!(file, EmberConfigFile::default());
  }

  #[test]
  fn traces_and_dumps_are_parsed() {
    let text = "debug_trace = [\"mono\", \"closures\"]\ndump = [\"mono-json\"]\n";
    let file = EmberConfigFile::from_toml_str(text).expect("valid toml");

    assert_eq!(file.debug_trace, vec![DebugTrace::Mono, DebugTrace::Closures]);
    assert_eq!(file.dump, vec![DumpKind::MonoJson]);
  }

  #[test]
  fn unknown_trace_is_rejected() {
    assert!(EmberConfigFile::from_toml_str("debug_trace = [\"lexer\"]\n").is_err());
  }

  #[test]
  fn file_layers_onto_flags() {
    let file = EmberConfigFile {
      mono: MonoConfig {
        max_instances: 8,
        verify_concrete: false,
      },
      debug_trace: vec![DebugTrace::Mono, DebugTrace::Types],
      dump: vec![DumpKind::Types],
    };

    let config = EmberConfig::new_basic(false, vec![DebugTrace::Mono], false, 1).with_file(file);

    assert_eq!(config.mono.max_instances, 8);
    assert_eq!(config.debug_trace, vec![DebugTrace::Mono, DebugTrace::Types]);
    assert!(config.dumps(DumpKind::Types));
    assert_eq!(config.verbose, 1);
  }

  #[test]
  fn round_trips_through_toml() {
    let file = EmberConfigFile {
      mono: MonoConfig::default(),
      debug_trace: vec![DebugTrace::Driver],
      dump: vec![DumpKind::Mono],
    };

    let text = file.to_toml_string().expect("serializable");
    assert_eq!(EmberConfigFile::from_toml_str(&text).expect("valid toml"), file);
  }
}
