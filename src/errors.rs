//! Errors and error-related utilities.

use std::{error, fmt, result};

/// The result type used throughout this library.
pub type Result<T> = result::Result<T, Box<dyn error::Error>>;

/// Invalid input.
#[derive(Debug)]
pub struct InvalidInput(pub String);

/// Invalid command line argument.
#[derive(Debug)]
pub struct InvalidArgument(pub String);

/// A column that some operation needs is not defined by the header row.
#[derive(Debug)]
pub struct MissingField(pub String);

/// An injury count that is neither empty nor a non-negative integer.
#[derive(Debug)]
pub struct BadInjuryCount {
    pub line: usize,
    pub field: String,
    pub value: String,
}

/// Neither the event date nor the event id gives a usable month and year.
#[derive(Debug)]
pub struct UnresolvedMonth {
    pub line: usize,
    pub date: String,
    pub id: String,
}

impl fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid input: {}", self.0)
    }
}

impl fmt::Display for InvalidArgument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid argument: {}", self.0)
    }
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "missing field: '{}' is not in the header", self.0)
    }
}

impl fmt::Display for BadInjuryCount {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "line {}: '{}' should be a non-negative integer, got '{}'",
            self.line, self.field, self.value
        )
    }
}

impl fmt::Display for UnresolvedMonth {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "line {}: cannot resolve month from date '{}' or id '{}'",
            self.line, self.date, self.id
        )
    }
}

impl error::Error for InvalidInput {}

impl error::Error for InvalidArgument {}

impl error::Error for MissingField {}

impl error::Error for BadInjuryCount {}

impl error::Error for UnresolvedMonth {}

/// A helper for constructing [InvalidInput].
pub fn invalid_input(s: String) -> Box<dyn error::Error> {
    InvalidInput(s).into()
}

/// A helper for constructing [InvalidInput].
pub fn invalid_input_ref(s: &str) -> Box<dyn error::Error> {
    InvalidInput(s.to_owned()).into()
}

/// A helper for constructing [InvalidArgument].
pub fn invalid_argument(s: String) -> Box<dyn error::Error> {
    InvalidArgument(s).into()
}

/// A helper for constructing [MissingField].
pub fn missing_field(name: &str) -> Box<dyn error::Error> {
    MissingField(name.to_owned()).into()
}
