use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Pascal's triangle up to a fixed row, with exact entries.
#[derive(Debug, Clone)]
pub struct BinomialTable {
    rows: Vec<Vec<BigUint>>,
}

impl BinomialTable {
    pub fn new(max_n: usize) -> Self {
        let mut rows: Vec<Vec<BigUint>> = Vec::with_capacity(max_n + 1);
        rows.push(vec![BigUint::one()]);
        for n in 1..=max_n {
            let prev = &rows[n - 1];
            let mut row = Vec::with_capacity(n + 1);
            row.push(BigUint::one());
            for k in 1..n {
                row.push(&prev[k - 1] + &prev[k]);
            }
            row.push(BigUint::one());
            rows.push(row);
        }
        Self { rows }
    }

    pub fn max_n(&self) -> usize {
        self.rows.len() - 1
    }

    /// `C(n, k)`, zero when `k > n`. Rows past the table are computed on the fly.
    pub fn choose(&self, n: usize, k: usize) -> BigUint {
        if k > n {
            return BigUint::zero();
        }
        match self.rows.get(n) {
            Some(row) => row[k].clone(),
            None => binomial(n, k),
        }
    }

    /// Ways to hand `parts[i]` items to each of several takers out of `n`,
    /// leaving the rest unassigned. Zero when the parts overflow `n`.
    pub fn multinomial(&self, n: usize, parts: &[usize]) -> BigUint {
        let mut remaining = n;
        let mut total = BigUint::one();
        for &part in parts {
            if part > remaining {
                return BigUint::zero();
            }
            total *= self.choose(remaining, part);
            remaining -= part;
        }
        total
    }
}

/// `C(n, k)` by the multiplicative formula; each partial product is an exact binomial.
pub fn binomial(n: usize, k: usize) -> BigUint {
    if k > n {
        return BigUint::zero();
    }
    let k = k.min(n - k);
    let mut result = BigUint::one();
    for i in 0..k {
        result *= BigUint::from(n - i);
        result /= BigUint::from(i + 1);
    }
    result
}
