pub mod accumulator;
pub mod runner;

pub use accumulator::{Accumulator, AveragedBand};
pub use runner::{AverageOptions, WrittenAverage, output_name, run_average};
