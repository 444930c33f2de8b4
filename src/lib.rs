pub mod aggregate;
pub mod driver;
pub mod errors;
pub mod index;
mod information;
pub mod input;
pub mod months;
pub mod output;
