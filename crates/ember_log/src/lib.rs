//! Stderr logging for the monomorphizer and the driver.
//!
//! Phase banners (`phase_log!`, `phase_ok!`, `phase_warn!`) follow the
//! compilation as it moves from one stage to the next. Category traces
//! (`trace_dbg!`) follow the internals of one stage, selected per
//! [`DebugTrace`]. `log_dbg!` prints one-off summaries at debug verbosity.
//!
//! Stdout is left to dumps.

use ember_config::{DebugTrace, EmberConfig};

#[doc(hidden)]
pub use colored;

pub fn log_phase(config: &EmberConfig) -> bool {
  !config.quiet
}

/// Debug output is on with `debug` set or from verbosity 2 up.
pub fn log_debug(config: &EmberConfig) -> bool {
  !config.quiet && (config.debug || config.verbose >= 2)
}

/// `debug` turns every category on; otherwise only the listed ones trace.
pub fn debug_trace_enabled(
  config: &EmberConfig,
  trace: DebugTrace,
) -> bool {
  !config.quiet && (config.debug || config.debug_trace.contains(&trace))
}

pub fn trace_name(trace: DebugTrace) -> &'static str {
  match trace {
    DebugTrace::Types => "types",
    DebugTrace::Mono => "mono",
    DebugTrace::Closures => "closures",
    DebugTrace::Driver => "driver",
  }
}

/// Indented banner for a stage that is starting.
///
/// ```ignore
/// phase_log!(&config, "Monomorphizing {}...", root_name);
/// ```
#[macro_export]
macro_rules! phase_log {
  ($config:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if $crate::log_phase($config) {
      use $crate::colored::Colorize;
      eprintln!("    {} {}", "-->".bright_green().bold(), format!($fmt $(, $arg)*));
    }
  }};
}

/// Banner for a stage that finished.
#[macro_export]
macro_rules! phase_ok {
  ($config:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if $crate::log_phase($config) {
      use $crate::colored::Colorize;
      eprintln!("{} {}", "-->".bright_green().bold(), format!($fmt $(, $arg)*));
    }
  }};
}

/// Banner for a stage that finished with something worth a look.
///
/// ```ignore
/// phase_warn!(&config, "{} non-concrete type(s) left", count);
/// ```
#[macro_export]
macro_rules! phase_warn {
  ($config:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if $crate::log_phase($config) {
      use $crate::colored::Colorize;
      eprintln!("{} {}", "-->".bright_yellow().bold(), format!($fmt $(, $arg)*));
    }
  }};
}

/// `debug[category]: message`, printed when the category is enabled.
///
/// ```ignore
/// trace_dbg!(&config, DebugTrace::Mono, "cache miss: {}", name);
/// // debug[mono]: cache miss: Pair__i32
/// ```
#[macro_export]
macro_rules! trace_dbg {
  ($config:expr, $trace:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if $crate::debug_trace_enabled($config, $trace) {
      eprintln!("debug[{}]: {}", $crate::trace_name($trace), format!($fmt $(, $arg)*));
    }
  }};
}

#[macro_export]
macro_rules! log_dbg {
  ($config:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if $crate::log_debug($config) {
      eprintln!("debug: {}", format!($fmt $(, $arg)*));
    }
  }};
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn quiet_silences_everything() {
    let mut config = EmberConfig::new_basic(true, vec![DebugTrace::Mono], true, 3);
    assert!(!log_phase(&config));
    assert!(!log_debug(&config));
    assert!(!debug_trace_enabled(&config, DebugTrace::Mono));

    config.quiet = false;
    assert!(debug_trace_enabled(&config, DebugTrace::Mono));
  }

  #[test]
  fn debug_flag_enables_all_categories() {
    let config = EmberConfig::new_basic(true, Vec::new(), false, 0);
    assert!(log_debug(&config));
    assert!(debug_trace_enabled(&config, DebugTrace::Closures));
    assert!(debug_trace_enabled(&config, DebugTrace::Types));
  }

  #[test]
  fn traces_are_selected_by_category() {
    let config = EmberConfig::new_basic(false, vec![DebugTrace::Types], false, 1);
    assert!(!log_debug(&config));
    assert!(debug_trace_enabled(&config, DebugTrace::Types));
    assert!(!debug_trace_enabled(&config, DebugTrace::Driver));
    assert_eq!(trace_name(DebugTrace::Types), "types");
  }

  #[test]
  fn verbosity_two_turns_on_debug_lines() {
    let config = EmberConfig::new_basic(false, Vec::new(), false, 2);
    assert!(log_debug(&config));
    assert!(!debug_trace_enabled(&config, DebugTrace::Mono));
  }
}
