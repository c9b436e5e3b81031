mod evaluator;

pub use evaluator::{Evaluator, Verdict};
