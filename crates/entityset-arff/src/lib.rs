//! Weka ARFF writer for entityset datasets.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use entityset_arff::write_arff;
//! use entityset_model::{Attribute, Dataset, Instance};
//!
//! let mut dataset = Dataset::new("Person", vec![Attribute::numeric("age")]).unwrap();
//! dataset.add_instance(Instance::new(vec![35.0])).unwrap();
//! write_arff(Path::new("person.arff"), &dataset).unwrap();
//! ```

mod error;
mod options;
pub mod quote;
mod writer;

pub use error::{ArffError, Result};
pub use options::{ArffWriterOptions, DEFAULT_DATE_FORMAT, DEFAULT_DATE_PATTERN};
pub use writer::{
    ArffWriter, to_arff_string, to_arff_string_with_options, write_arff, write_arff_with_options,
};
