#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Build a [`Rule`](crate::Rule) from a pattern literal and a production
/// over its captures.
#[macro_export]
macro_rules! rule {
    (
        name: $name:expr,
        pattern: $pat:literal
        $(, features: $features:expr)?
        , prod: |$caps:ident| -> $ret_ty:ty $body:block
        $(,)?
    ) => {{
        $crate::Rule {
            name: $name,
            pattern: $crate::regex!($pat),
            features: { $crate::engine::Features::empty() $(| $features)? },
            production: |$caps: &regex::Captures<'_>| -> $ret_ty { $body },
        }
    }};
}
