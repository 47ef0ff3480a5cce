//! Tool schema handling: strict-mode transform and its reversal.

pub mod node;
pub mod reconcile;
pub mod strict;

pub use node::{ObjectSchema, SchemaKind, SchemaNode};
pub use reconcile::{reconcile_arguments, reconcile_node, unstrictify};
pub use strict::strictify;
