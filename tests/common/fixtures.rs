//! Static documents and patterns used across harnesses.

/// A YAML document touching scalars, containers and an unregistered key.
pub const SYSTEM_YAML: &str = r#"
system:
  port: 9900
  value: 15.5
  int_vec: [10, 20, 30]
  str_set: [b, a, b]
  str_int_map:
    k: 30
    j: 40
  unknown_key: ignored
"#;

/// The same shape as TOML.
pub const SYSTEM_TOML: &str = r#"
[system]
port = 9900
value = 15.5
int_vec = [10, 20, 30]
str_set = ["b", "a", "b"]

[system.str_int_map]
k = 30
j = 40
"#;

/// Logger definitions for the `logs` binding. `{file}` is substituted by
/// the harness with a temp path.
pub const LOGS_YAML_TEMPLATE: &str = r#"
logs:
  - name: system
    level: info
    formatter: "%p%T%c%T%m%n"
    appenders:
      - type: file
        file: "{file}"
      - type: file
        file: "{file}"
        level: error
        formatter: "!!%m%n"
"#;

/// Patterns that must compile without the error flag.
pub const GOOD_PATTERNS: &[&str] = &[
    kestrel::log::DEFAULT_PATTERN,
    "%m%n",
    "%d{%H:%M:%S%.3f} [%p] %c - %m%n",
    "100%% %m",
    "%f:%l%T%t%T%N%T%F%T%r",
];

/// Patterns that must compile with the error flag and render a marker.
pub const BAD_PATTERNS: &[(&str, &str)] = &[
    ("%Q", "<<error_format %Q>>"),
    ("ok %d{%Y", "ok <<pattern_error>>"),
    ("%m%", "msg<<error_format %>>"),
];
