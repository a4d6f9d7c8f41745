//! Newtype domain identifiers.
//!
//! Every name the run API puts into a URL is a distinct newtype wrapping a
//! `String`. This prevents accidentally interchanging — for example — an
//! [`AccountName`] with a [`ProjectName`] even though both are plain text on
//! the wire.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Namespace identifiers
// ---------------------------------------------------------------------------

string_id! {
    /// The account (team or user) that owns a project.
    ///
    /// First path segment after `/run/` in every run API URL.
    AccountName
}

string_id! {
    /// A project within an account.
    ProjectName
}

string_id! {
    /// The model file a run executes (e.g. `"model.eqn"`, `"model.jl"`).
    ModelFile
}

// ---------------------------------------------------------------------------
// Resource identifiers
// ---------------------------------------------------------------------------

string_id! {
    /// Opaque identifier of a run resource within an account/project namespace.
    ///
    /// Issued by the server when a run is created. The client never inspects
    /// its structure.
    RunId
}

string_id! {
    /// Name of a server-side operation invocable on a run (e.g. `"solve"`,
    /// `"add"`).
    OperationName
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Bearer token forwarded with every request when configured.
///
/// `Debug` never prints the token value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken(String);

impl AuthToken {
    /// Creates a token, returning `None` if the value is empty.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        if v.is_empty() {
            None
        } else {
            Some(Self(v))
        }
    }

    /// Returns the raw token.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}
