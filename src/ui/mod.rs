// Output formatting module

pub mod formatters;

pub use formatters::{format_perfdata, render};
