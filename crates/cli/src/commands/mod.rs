//! Subcommand implementations

pub mod compare;
pub mod create;
pub mod mode;
pub mod suggest;

/// Split a `namespace/name` argument, falling back to the session
/// namespace when no slash is present.
pub fn split_target<'a>(input: &'a str, default_namespace: &'a str) -> (&'a str, &'a str) {
    match input.split_once('/') {
        Some((ns, name)) => (ns, name),
        None => (default_namespace, input),
    }
}

#[cfg(test)]
mod tests {
    use super::split_target;

    #[test]
    fn qualified_names_split_on_slash() {
        assert_eq!(split_target("prod/web", "default"), ("prod", "web"));
    }

    #[test]
    fn bare_names_use_the_default_namespace() {
        assert_eq!(split_target("web", "default"), ("default", "web"));
    }
}
