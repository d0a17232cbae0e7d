//! Metadata graph: solutions own projects, projects own their settings.
//!
//! Records from independent sources are combined with explicit overlay
//! functions: an incoming field replaces the existing one only when it is
//! populated, so partial records can be layered in any number of passes.

use std::collections::BTreeMap;

/// Declares a keyword enum parsed case-insensitively from its variant names.
macro_rules! keyword_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                $(
                    if trimmed.eq_ignore_ascii_case(stringify!($variant)) {
                        return Ok($name::$variant);
                    }
                )+
                Err($crate::error::ModelError::InvalidValue {
                    kind: stringify!($name),
                    value: s.to_string(),
                })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

pub mod gitversion;
pub mod project;
pub mod settings;
pub mod solution;

pub use gitversion::*;
pub use project::*;
pub use settings::*;
pub use solution::*;

/// A value that can tell whether it carries information worth overlaying.
pub trait Populated {
    fn is_populated(&self) -> bool;
}

impl Populated for String {
    fn is_populated(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Populated for Vec<T> {
    fn is_populated(&self) -> bool {
        !self.is_empty()
    }
}

impl<K, V> Populated for BTreeMap<K, V> {
    fn is_populated(&self) -> bool {
        !self.is_empty()
    }
}

impl<T: Populated> Populated for Option<T> {
    fn is_populated(&self) -> bool {
        self.as_ref().is_some_and(Populated::is_populated)
    }
}

impl Populated for crate::locator::SourceLocator {
    fn is_populated(&self) -> bool {
        self.kind() != crate::locator::SourceKind::None
    }
}

/// Replace `target` with `incoming` when `incoming` is populated.
pub fn overlay<T: Populated>(target: &mut T, incoming: T) {
    if incoming.is_populated() {
        *target = incoming;
    }
}

/// Replace `target` with `incoming` when it is `Some`, for values with no notion of emptiness.
pub fn overlay_some<T>(target: &mut Option<T>, incoming: Option<T>) {
    if incoming.is_some() {
        *target = incoming;
    }
}
