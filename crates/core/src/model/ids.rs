use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Declares an opaque string identifier.
///
/// Curriculum ids come from an external document, so they are kept verbatim
/// rather than parsed into numbers.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a curriculum component (e.g. `"01"`).
    ComponentId
);
string_id!(
    /// Identifier of a topic within a component (e.g. `"1.1"`).
    TopicId
);
string_id!(
    /// Identifier of a subtopic (e.g. `"1.1.1"`).
    SubtopicId
);
string_id!(
    /// Identifier of an objective or sub-objective. Leaf ids double as
    /// checked-state keys.
    ObjectiveId
);
string_id!(
    /// Identifier of a flattened revision item (`obj-<n>`).
    ItemId
);

impl ItemId {
    /// Id assigned to the item at position `index` in document order.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self(format!("obj-{index}"))
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
