//! Request pipeline pieces: key resolution, write preconditions, and store execution.

mod condition;
mod crud;
mod key;

pub use condition::{Condition, ConditionExpression, ConditionPlanner};
pub use crud::{CrudService, Outcome, StoreRequest};
pub use key::{KeyResolver, ResolvedKey};
