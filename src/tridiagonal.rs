use crate::error::{Error, Result};

/// Thomas algorithm solver for systems of a fixed size `n`.
///
/// The modified coefficients are kept between calls so repeated solves of the
/// same size do not allocate scratch space.
#[derive(Clone, Debug)]
pub struct TridiagonalSolver {
    size: usize,
    c_prime: Vec<f64>,
    d_prime: Vec<f64>,
}

impl TridiagonalSolver {
    pub fn new(size: usize) -> Self {
        TridiagonalSolver {
            size,
            c_prime: vec![0.0; size],
            d_prime: vec![0.0; size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Solve `A x = rhs`.
    ///
    /// - `lower`: sub-diagonal, `n - 1` values (`lower[i]` multiplies `x[i]` in row `i + 1`)
    /// - `diag`: main diagonal, `n` values
    /// - `upper`: super-diagonal, `n - 1` values (`upper[i]` multiplies `x[i + 1]` in row `i`)
    ///
    /// Zero pivots are not detected; they show up as non-finite values in the
    /// returned solution.
    pub fn solve(
        &mut self,
        lower: &[f64],
        diag: &[f64],
        upper: &[f64],
        rhs: &[f64],
    ) -> Result<Vec<f64>> {
        let n = self.size;
        check_len("right-hand side", n, rhs.len())?;
        check_len("diagonal", n, diag.len())?;
        check_len("sub-diagonal", n.saturating_sub(1), lower.len())?;
        check_len("super-diagonal", n.saturating_sub(1), upper.len())?;
        if n == 0 {
            return Ok(Vec::new());
        }

        let c_prime = &mut self.c_prime;
        let d_prime = &mut self.d_prime;

        // Forward elimination
        if n > 1 {
            c_prime[0] = upper[0] / diag[0];
        }
        d_prime[0] = rhs[0] / diag[0];
        for i in 1..n {
            let denom = diag[i] - lower[i - 1] * c_prime[i - 1];
            if i < n - 1 {
                c_prime[i] = upper[i] / denom;
            }
            d_prime[i] = (rhs[i] - lower[i - 1] * d_prime[i - 1]) / denom;
        }

        // Back substitution
        let mut x = vec![0.0; n];
        x[n - 1] = d_prime[n - 1];
        for i in (0..n - 1).rev() {
            x[i] = d_prime[i] - c_prime[i] * x[i + 1];
        }
        Ok(x)
    }
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::SizeMismatch {
            what,
            expected,
            actual,
        })
    }
}
