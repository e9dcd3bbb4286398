mod outcome;
mod result_value;
mod test_result;

pub use outcome::{DEFAULT_SUITE, Outcome};
pub use result_value::ResultValue;
pub use test_result::TestResult;
