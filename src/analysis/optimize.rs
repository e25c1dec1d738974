//! Derivative-free minimisation with the Nelder-Mead simplex method.

/// Reflection coefficient.
const RHO: f64 = 1.0;
/// Expansion coefficient.
const CHI: f64 = 2.0;
/// Contraction coefficient.
const PSI: f64 = 0.5;
/// Shrink coefficient.
const SIGMA: f64 = 0.5;

/// Result of a minimisation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    /// Best point found.
    pub x: Vec<f64>,
    /// Objective value at `x`.
    pub value: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether the simplex met both tolerances before the iteration limit.
    pub converged: bool,
}

/// Nelder-Mead settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelderMead {
    /// Iteration limit.
    pub max_iterations: usize,
    /// Largest allowed coordinate spread of the simplex at convergence.
    pub x_tolerance: f64,
    /// Largest allowed objective spread of the simplex at convergence.
    pub f_tolerance: f64,
}

impl NelderMead {
    /// Creates an optimizer with the same tolerance for both criteria.
    pub fn new(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations,
            x_tolerance: tolerance,
            f_tolerance: tolerance,
        }
    }

    /// Minimises `f` starting from `x0`.
    ///
    /// Non-finite objective values are allowed and simply lose every
    /// comparison, which keeps the simplex inside the feasible region.
    pub fn minimize(&self, mut f: impl FnMut(&[f64]) -> f64, x0: &[f64]) -> Minimum {
        let n = x0.len();
        let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
        simplex.push(x0.to_vec());
        for k in 0..n {
            let mut vertex = x0.to_vec();
            vertex[k] = if vertex[k] == 0.0 {
                0.00025
            } else {
                vertex[k] * 1.05
            };
            simplex.push(vertex);
        }
        let mut values: Vec<f64> = simplex.iter().map(|x| sanitize(f(x))).collect();
        sort_simplex(&mut simplex, &mut values);

        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            if self.has_converged(&simplex, &values) {
                converged = true;
                break;
            }
            iterations += 1;

            let worst = n;
            let centroid: Vec<f64> = (0..n)
                .map(|j| simplex[..n].iter().map(|v| v[j]).sum::<f64>() / n as f64)
                .collect();

            let reflected = affine(&centroid, &simplex[worst], 1.0 + RHO, -RHO);
            let f_reflected = sanitize(f(&reflected));

            if f_reflected < values[0] {
                let expanded = affine(&centroid, &simplex[worst], 1.0 + RHO * CHI, -RHO * CHI);
                let f_expanded = sanitize(f(&expanded));
                if f_expanded < f_reflected {
                    simplex[worst] = expanded;
                    values[worst] = f_expanded;
                } else {
                    simplex[worst] = reflected;
                    values[worst] = f_reflected;
                }
            } else if f_reflected < values[n - 1] {
                simplex[worst] = reflected;
                values[worst] = f_reflected;
            } else {
                let mut shrink = false;
                if f_reflected < values[worst] {
                    let contracted =
                        affine(&centroid, &simplex[worst], 1.0 + PSI * RHO, -PSI * RHO);
                    let f_contracted = sanitize(f(&contracted));
                    if f_contracted <= f_reflected {
                        simplex[worst] = contracted;
                        values[worst] = f_contracted;
                    } else {
                        shrink = true;
                    }
                } else {
                    let contracted = affine(&centroid, &simplex[worst], 1.0 - PSI, PSI);
                    let f_contracted = sanitize(f(&contracted));
                    if f_contracted < values[worst] {
                        simplex[worst] = contracted;
                        values[worst] = f_contracted;
                    } else {
                        shrink = true;
                    }
                }

                if shrink {
                    let best = simplex[0].clone();
                    for j in 1..=n {
                        simplex[j] = affine(&best, &simplex[j], 1.0 - SIGMA, SIGMA);
                        values[j] = sanitize(f(&simplex[j]));
                    }
                }
            }

            sort_simplex(&mut simplex, &mut values);
        }

        if !converged {
            converged = self.has_converged(&simplex, &values);
        }

        Minimum {
            x: simplex.swap_remove(0),
            value: values[0],
            iterations,
            converged,
        }
    }

    fn has_converged(&self, simplex: &[Vec<f64>], values: &[f64]) -> bool {
        let best = &simplex[0];
        let x_spread = simplex[1..]
            .iter()
            .flat_map(|v| v.iter().zip(best).map(|(a, b)| (a - b).abs()))
            .fold(0.0_f64, f64::max);
        let f_spread = values[1..]
            .iter()
            .map(|v| (v - values[0]).abs())
            .fold(0.0_f64, f64::max);
        values[0].is_finite()
            && f_spread.is_finite()
            && x_spread <= self.x_tolerance
            && f_spread <= self.f_tolerance
    }
}

/// `a * p + b * q`, coordinate-wise.
fn affine(p: &[f64], q: &[f64], a: f64, b: f64) -> Vec<f64> {
    p.iter().zip(q).map(|(pi, qi)| a * pi + b * qi).collect()
}

fn sanitize(value: f64) -> f64 {
    if value.is_nan() { f64::INFINITY } else { value }
}

fn sort_simplex(simplex: &mut Vec<Vec<f64>>, values: &mut Vec<f64>) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    *simplex = order.iter().map(|&i| simplex[i].clone()).collect();
    *values = order.iter().map(|&i| values[i]).collect();
}
