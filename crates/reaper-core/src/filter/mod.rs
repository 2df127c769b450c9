//! Predicate library: criteria compiled once per invocation, pure
//! per-record tests, and the AND pipeline that applies them.

pub mod criteria;
pub mod errors;
pub mod pipeline;
pub mod predicates;

pub use criteria::{CriteriaSpec, FilterCriteria, NameMatcher};
pub use errors::{CriteriaError, PredicateError};
pub use pipeline::{Selection, StageCount, select};
pub use predicates::{
    AgePredicate, AttachedPredicate, NameExemptPredicate, NameMatchPredicate, Predicate,
    PredicateSet, SubnetField, SubnetPredicate,
};
