//! Sequential minimal optimization for the C-SVC dual
//!
//! Minimises ½αᵀQα − eᵀα subject to yᵀα = 0 and 0 ≤ α ≤ C, where
//! Q[i][j] = y_i y_j K(x_i, x_j). Each step picks the maximal violating pair,
//! solves the two-variable subproblem analytically and clips it back into the
//! box. Ties go to the lowest index, so a fixed input order gives a fixed
//! solution.

use super::kernel::KernelType;

/// Guards the step size when the pair's curvature vanishes
const TAU: f64 = 1e-12;

pub(crate) struct Solution {
    pub alpha: Vec<f64>,
    pub rho: f64,
    pub iterations: usize,
    pub converged: bool,
}

pub(crate) struct Problem<'a> {
    pub x: &'a [Vec<f64>],
    /// +1 or -1 per example
    pub y: &'a [f64],
    pub kernel: KernelType,
    pub gamma: f64,
    pub c: f64,
    pub eps: f64,
    pub max_iterations: usize,
}

impl Problem<'_> {
    fn q(&self, i: usize, j: usize) -> f64 {
        self.y[i] * self.y[j] * self.kernel.evaluate(&self.x[i], &self.x[j], self.gamma)
    }

    fn q_column(&self, i: usize) -> Vec<f64> {
        (0..self.x.len()).map(|t| self.q(t, i)).collect()
    }

    fn is_upper(&self, alpha: f64) -> bool {
        alpha >= self.c
    }

    fn is_lower(alpha: f64) -> bool {
        alpha <= 0.0
    }

    /// Maximal violating pair, or `None` once the KKT gap is below eps
    fn select_pair(&self, alpha: &[f64], grad: &[f64]) -> Option<(usize, usize)> {
        let mut g_max = f64::NEG_INFINITY;
        let mut g_min = f64::INFINITY;
        let mut i_sel = None;
        let mut j_sel = None;

        for t in 0..alpha.len() {
            let score = -self.y[t] * grad[t];
            let in_up = if self.y[t] > 0.0 {
                !self.is_upper(alpha[t])
            } else {
                !Self::is_lower(alpha[t])
            };
            let in_low = if self.y[t] > 0.0 {
                !Self::is_lower(alpha[t])
            } else {
                !self.is_upper(alpha[t])
            };

            if in_up && score > g_max {
                g_max = score;
                i_sel = Some(t);
            }
            if in_low && score < g_min {
                g_min = score;
                j_sel = Some(t);
            }
        }

        match (i_sel, j_sel) {
            (Some(i), Some(j)) if g_max - g_min >= self.eps => Some((i, j)),
            _ => None,
        }
    }

    pub fn solve(&self) -> Solution {
        let n = self.x.len();
        let c = self.c;
        let mut alpha = vec![0.0; n];
        let mut grad = vec![-1.0; n];
        let diag: Vec<f64> = (0..n).map(|t| self.q(t, t)).collect();

        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            let Some((i, j)) = self.select_pair(&alpha, &grad) else {
                converged = true;
                break;
            };
            iterations += 1;

            let q_i = self.q_column(i);
            let q_j = self.q_column(j);
            let old_ai = alpha[i];
            let old_aj = alpha[j];

            if self.y[i] != self.y[j] {
                let quad = positive(diag[i] + diag[j] + 2.0 * q_i[j]);
                let delta = (-grad[i] - grad[j]) / quad;
                let diff = alpha[i] - alpha[j];
                alpha[i] += delta;
                alpha[j] += delta;

                if diff > 0.0 {
                    if alpha[j] < 0.0 {
                        alpha[j] = 0.0;
                        alpha[i] = diff;
                    }
                } else if alpha[i] < 0.0 {
                    alpha[i] = 0.0;
                    alpha[j] = -diff;
                }
                // both bounds are C, so the comparison is against zero
                if diff > 0.0 {
                    if alpha[i] > c {
                        alpha[i] = c;
                        alpha[j] = c - diff;
                    }
                } else if alpha[j] > c {
                    alpha[j] = c;
                    alpha[i] = c + diff;
                }
            } else {
                let quad = positive(diag[i] + diag[j] - 2.0 * q_i[j]);
                let delta = (grad[i] - grad[j]) / quad;
                let sum = alpha[i] + alpha[j];
                alpha[i] -= delta;
                alpha[j] += delta;

                if sum > c {
                    if alpha[i] > c {
                        alpha[i] = c;
                        alpha[j] = sum - c;
                    }
                } else if alpha[j] < 0.0 {
                    alpha[j] = 0.0;
                    alpha[i] = sum;
                }
                if sum > c {
                    if alpha[j] > c {
                        alpha[j] = c;
                        alpha[i] = sum - c;
                    }
                } else if alpha[i] < 0.0 {
                    alpha[i] = 0.0;
                    alpha[j] = sum;
                }
            }

            let d_ai = alpha[i] - old_ai;
            let d_aj = alpha[j] - old_aj;
            for t in 0..n {
                grad[t] += q_i[t] * d_ai + q_j[t] * d_aj;
            }

            if iterations % 1000 == 0 {
                log::trace!("SMO iteration {}: pair ({}, {})", iterations, i, j);
            }
        }

        if !converged {
            log::warn!(
                "SMO stopped after {} iterations without reaching eps={}",
                iterations,
                self.eps
            );
        }

        let rho = self.rho(&alpha, &grad);
        Solution {
            alpha,
            rho,
            iterations,
            converged,
        }
    }

    /// Offset from free support vectors, or the midpoint of the feasible
    /// interval when every alpha sits on a bound
    fn rho(&self, alpha: &[f64], grad: &[f64]) -> f64 {
        let mut ub = f64::INFINITY;
        let mut lb = f64::NEG_INFINITY;
        let mut free = 0usize;
        let mut sum_free = 0.0;

        for t in 0..alpha.len() {
            let yg = self.y[t] * grad[t];
            if self.is_upper(alpha[t]) {
                if self.y[t] < 0.0 {
                    ub = ub.min(yg);
                } else {
                    lb = lb.max(yg);
                }
            } else if Self::is_lower(alpha[t]) {
                if self.y[t] > 0.0 {
                    ub = ub.min(yg);
                } else {
                    lb = lb.max(yg);
                }
            } else {
                free += 1;
                sum_free += yg;
            }
        }

        if free > 0 {
            sum_free / free as f64
        } else {
            (ub + lb) / 2.0
        }
    }
}

fn positive(quad: f64) -> f64 {
    if quad > 0.0 {
        quad
    } else {
        TAU
    }
}
