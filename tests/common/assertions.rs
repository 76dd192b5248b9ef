//! Domain-specific assertion macros for kestrel harnesses.
//!
//! These wrap `pretty_assertions` and add context-rich failure messages that
//! make it clear which pattern or variable misbehaved.

/// Assert that `pattern` renders `event` (as logger `root`) to `expected`.
///
/// ```rust,ignore
/// assert_renders!("%p %m", error_event("boom"), "ERROR boom");
/// ```
#[macro_export]
macro_rules! assert_renders {
    ($pattern:expr, $event:expr, $expected:expr) => {{
        let formatter = kestrel::Formatter::new($pattern);
        let actual = formatter.format("root", &$event);
        pretty_assertions::assert_eq!(actual, $expected, "pattern {:?}", $pattern);
    }};
}

/// Assert that the registry holds `name` with type `$ty` and value `$value`.
#[macro_export]
macro_rules! assert_var {
    ($registry:expr, $name:expr, $ty:ty, $value:expr) => {{
        let name: &str = $name;
        match $registry.lookup::<$ty>(name) {
            Some(var) => pretty_assertions::assert_eq!(var.get_value(), $value, "variable {:?}", name),
            None => panic!(
                "assert_var! failed: {:?} is not registered as {}",
                name,
                stringify!($ty)
            ),
        }
    }};
}
