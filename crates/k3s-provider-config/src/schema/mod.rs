//! Option schemas for k3s node configuration
//!
//! Two shapes exist: [`ServerOptions`] for initializer and control-plane
//! nodes, and [`AgentOptions`] for workers. Both are declared with
//! [`option_schema!`], which generates the struct, its serde mapping to k3s
//! key names, and a typed `set` that applies one document key at a time.
//!
//! Documents are applied key by key: a key that is present replaces the
//! field, a key that is absent leaves it alone, and a key the shape does not
//! know is reported back as dropped. Presence never depends on zero values.

use serde::Serialize;
use serde_json::{Map, Value};

use k3s_provider_common::{Error, Result};

use crate::descriptor::Role;

pub mod field;

pub use field::{FieldValue, TriState};

/// Declare an option schema struct.
///
/// Each field is written as `name: Type => "external-key",`. Field types must
/// implement [`FieldValue`].
macro_rules! option_schema {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $field:ident: $ty:ty => $key:literal,
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
        $vis struct $name {
            $(
                $(#[$fmeta])*
                #[serde(rename = $key, skip_serializing_if = "crate::schema::field::omit")]
                pub $field: $ty,
            )*
        }

        impl $crate::schema::OptionSchema for $name {
            const NAME: &'static str = stringify!($name);
            const KEYS: &'static [&'static str] = &[$($key),*];

            fn set(
                &mut self,
                key: &str,
                value: serde_json::Value,
            ) -> k3s_provider_common::Result<bool> {
                match key {
                    $(
                        $key => {
                            self.$field =
                                <$ty as $crate::schema::field::FieldValue>::from_value(value)
                                    .map_err(|msg| k3s_provider_common::Error::option_value(key, msg))?;
                            Ok(true)
                        }
                    )*
                    _ => Ok(false),
                }
            }
        }
    };
}

mod agent;
mod server;

pub use agent::AgentOptions;
pub use server::ServerOptions;

/// A typed option document with a fixed key set.
pub trait OptionSchema: Serialize + Default {
    /// Schema name used in diagnostics
    const NAME: &'static str;

    /// External keys this schema understands, in serialization order
    const KEYS: &'static [&'static str];

    /// Apply a single key. Returns `Ok(false)` when the key is not part of
    /// this shape; the value is then ignored.
    fn set(&mut self, key: &str, value: Value) -> Result<bool>;

    /// Apply every key of `document` on top of `self`.
    ///
    /// Returns the keys this shape does not have, sorted by key.
    fn apply(&mut self, document: &Map<String, Value>) -> Result<Vec<String>> {
        let mut dropped = Vec::new();
        for (key, value) in document {
            if !self.set(key, value.clone())? {
                dropped.push(key.clone());
            }
        }
        Ok(dropped)
    }

    /// Build a fresh instance from `document`, along with the dropped keys.
    fn from_document(document: &Map<String, Value>) -> Result<(Self, Vec<String>)> {
        let mut options = Self::default();
        let dropped = options.apply(document)?;
        Ok((options, dropped))
    }

    /// Whether `key` belongs to this shape
    fn has_key(key: &str) -> bool {
        Self::KEYS.contains(&key)
    }

    /// Compact JSON with empty fields omitted
    fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| Error::serialization_for_kind(Self::NAME, e.to_string()))
    }
}

/// Role-shaped options: the server shape or the agent shape.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeOptions {
    /// Initializer and control-plane nodes
    Server(ServerOptions),
    /// Worker nodes
    Agent(AgentOptions),
}

impl NodeOptions {
    /// Empty options in the shape appropriate for `role`
    pub fn empty_for(role: Role) -> Self {
        match role {
            Role::Initializer | Role::ControlPlane => {
                NodeOptions::Server(ServerOptions::default())
            }
            Role::Worker => NodeOptions::Agent(AgentOptions::default()),
        }
    }

    /// Decode `document` into the shape appropriate for `role`.
    ///
    /// Keys the shape does not have are dropped and returned alongside.
    pub fn from_document(
        role: Role,
        document: &Map<String, Value>,
    ) -> Result<(Self, Vec<String>)> {
        let mut options = Self::empty_for(role);
        let dropped = options.apply(document)?;
        Ok((options, dropped))
    }

    /// Schema name of the current shape
    pub fn shape(&self) -> &'static str {
        match self {
            NodeOptions::Server(_) => ServerOptions::NAME,
            NodeOptions::Agent(_) => AgentOptions::NAME,
        }
    }

    /// Apply a single key to whichever shape this is
    pub fn set(&mut self, key: &str, value: Value) -> Result<bool> {
        match self {
            NodeOptions::Server(o) => o.set(key, value),
            NodeOptions::Agent(o) => o.set(key, value),
        }
    }

    /// Apply every key of `document`, returning the dropped keys
    pub fn apply(&mut self, document: &Map<String, Value>) -> Result<Vec<String>> {
        match self {
            NodeOptions::Server(o) => o.apply(document),
            NodeOptions::Agent(o) => o.apply(document),
        }
    }

    /// Compact JSON with empty fields omitted
    pub fn to_json(&self) -> Result<String> {
        match self {
            NodeOptions::Server(o) => o.to_json(),
            NodeOptions::Agent(o) => o.to_json(),
        }
    }

    /// The server shape, if this is one
    pub fn as_server(&self) -> Option<&ServerOptions> {
        match self {
            NodeOptions::Server(o) => Some(o),
            NodeOptions::Agent(_) => None,
        }
    }

    /// The agent shape, if this is one
    pub fn as_agent(&self) -> Option<&AgentOptions> {
        match self {
            NodeOptions::Agent(o) => Some(o),
            NodeOptions::Server(_) => None,
        }
    }
}
