//! Public types exposed by the `nl2query-core` crate.

pub mod filter;
pub mod query;

pub use filter::{FieldCondition, FilterExpression, FilterField, FilterOperator};
pub use query::{
    BatchItem, BatchOptions, BatchOutcome, BatchReport, QueryContext, QueryMatch, SearchOutcome,
    TranslationRecord,
};
