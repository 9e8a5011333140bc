//! Memoized binomial coefficients
//!
//! Row `j` of the table holds C(n, j) for n = 0..=len-1 and is extended with
//! the multiplicative step C(n, j) = C(n-1, j) · n / (n-j).
//! A parallel ln(n!) table serves the log-domain evaluations used by the
//! rank recurrence, where products of coefficients overflow `f64` long
//! before the probabilities themselves become small.

/// Append-only cache of binomial coefficients
///
/// Entries depend only on `(n, j)`, never on a tree, so one cache can serve
/// any number of unrelated queries.
#[derive(Debug, Clone, Default)]
pub struct BinomialCache {
    /// rows[j][n] = C(n, j); indices are (j, n), not (n, j)
    rows: Vec<Vec<f64>>,

    /// ln_factorials[n] = ln(n!)
    ln_factorials: Vec<f64>,
}

impl BinomialCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// C(n, j); 0 when `j > n`
    pub fn nchoose(&mut self, n: usize, j: usize) -> f64 {
        if j > n {
            return 0.0;
        }
        if self.rows.len() <= j {
            self.rows.resize_with(j + 1, Vec::new);
        }

        let row = &mut self.rows[j];
        if row.len() <= j {
            // C(i, j) = 0 for i < j, C(j, j) = 1
            row.resize(j, 0.0);
            row.push(1.0);
        }
        for i in row.len()..=n {
            let next = row[i - 1] * i as f64 / (i - j) as f64;
            row.push(next);
        }
        row[n]
    }

    /// ln C(n, j); `-inf` when `j > n`
    pub fn ln_nchoose(&mut self, n: usize, j: usize) -> f64 {
        if j > n {
            return f64::NEG_INFINITY;
        }
        self.extend_ln_factorials(n);
        let lf = &self.ln_factorials;
        lf[n] - lf[j] - lf[n - j]
    }

    /// ln(n!)
    pub fn ln_factorial(&mut self, n: usize) -> f64 {
        self.extend_ln_factorials(n);
        self.ln_factorials[n]
    }

    /// Number of cached values across both tables, for diagnostics
    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum::<usize>() + self.ln_factorials.len()
    }

    /// True if nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn extend_ln_factorials(&mut self, n: usize) {
        if self.ln_factorials.is_empty() {
            self.ln_factorials.push(0.0);
        }
        for i in self.ln_factorials.len()..=n {
            let next = self.ln_factorials[i - 1] + (i as f64).ln();
            self.ln_factorials.push(next);
        }
    }
}

/// Exact C(n, j), or `None` if it does not fit in `u128`
///
/// Every intermediate C(i, k) is an integer, so the division is exact.
pub fn nchoose_exact(n: u64, j: u64) -> Option<u128> {
    if j > n {
        return Some(0);
    }
    let j = j.min(n - j);
    let mut acc: u128 = 1;
    for k in 1..=j {
        let numer = u128::from(n - j + k);
        let k = u128::from(k);
        // acc * numer / k, reduced first to delay overflow
        let g = gcd(acc, k);
        let (acc_r, k_r) = (acc / g, k / g);
        let g2 = gcd(numer, k_r);
        acc = acc_r.checked_mul(numer / g2)? / (k_r / g2);
    }
    Some(acc)
}

/// Greatest common divisor by Euclid's algorithm
///
/// `gcd(0, m) = m`, `gcd(0, 0) = 0`.
pub fn gcd(mut n: u128, mut m: u128) -> u128 {
    while m != 0 {
        let r = n % m;
        n = m;
        m = r;
    }
    n
}

/// `n / m` as a float, reducing by the gcd first so that two large counts
/// can be divided without either losing precision on conversion
pub fn gcd_divide(n: u128, m: u128) -> f64 {
    let g = gcd(n, m);
    if g == 0 {
        return f64::NAN;
    }
    (n / g) as f64 / (m / g) as f64
}
