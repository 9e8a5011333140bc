//! Combinatorial primitives
//!
//! Binomial coefficients (cached, log-domain and exact) and the labeled
//! history count that normalizes every rank probability.

mod binomial;
mod histories;

pub use binomial::{gcd, gcd_divide, nchoose_exact, BinomialCache};
pub use histories::history_count;
