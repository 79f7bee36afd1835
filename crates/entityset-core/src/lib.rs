//! Attribute and instance materialization engine.
//!
//! Turns persisted entities into a typed dataset. The [`FieldClassifier`]
//! decides which fields become columns, the [`DomainResolver`] fetches the
//! category lists of reference columns through a [`QueryExecutor`], and the
//! [`InstanceMaterializer`] encodes one row per entity. A [`BuildSpec`]
//! carries options, extra attributes, fan-out sets, callbacks and
//! missing-value sentinels; [`DatasetBuilder`] runs the whole pipeline.

pub mod assemble;
pub mod builder;
pub mod callback;
pub mod classify;
pub mod domain;
pub mod error;
pub mod materialize;
pub mod options;
pub mod query;
pub mod registry;

pub use assemble::{Header, assemble};
pub use builder::DatasetBuilder;
pub use callback::{Callback, CallbackKind, CallbackOutput, FanOutFn, NumericFn, TextualFn};
pub use classify::{
    ColumnPlan, ColumnSource, FieldClass, FieldClassification, FieldClassifier, IgnoreReason,
    PlannedColumn, ReferenceEncoding,
};
pub use domain::DomainResolver;
pub use error::{BuildError, CellError, QueryError, Result};
pub use materialize::InstanceMaterializer;
pub use options::{BuildOptions, CellFailurePolicy};
pub use query::{Query, QueryExecutor};
pub use registry::{BuildSpec, ExtraAttribute, FanOutSet};
