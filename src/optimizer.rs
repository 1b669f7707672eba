//! Derivative-free minimization by the Nelder-Mead simplex method.
//!
//! Uses the standard coefficients (reflection 1, expansion 2, contraction 1/2,
//! shrinkage 1/2) and builds the initial simplex by perturbing each coordinate of
//! the starting point by 5%.

use serde::Serialize;
use std::cmp::Ordering;

const REFLECT: f64 = 1.;
const EXPAND: f64 = 2.;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;
const NONZERO_DELTA: f64 = 0.05;
const ZERO_DELTA: f64 = 0.00025;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OptimizeResult {
    /// The best point found.
    pub x: Vec<f64>,
    pub fun: f64,
    pub nit: usize,
    pub nfev: usize,
    pub success: bool,
    pub message: String,
}

#[derive(Clone, Debug)]
pub struct NelderMead {
    /// Defaults to 200 times the number of parameters.
    pub max_iter: Option<usize>,
    /// Defaults to 200 times the number of parameters.
    pub max_fev: Option<usize>,
    /// Absolute tolerance on each coordinate of the simplex vertices.
    pub xatol: f64,
    /// Absolute tolerance on the objective values at the vertices.
    pub fatol: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            max_iter: None,
            max_fev: None,
            xatol: 1e-4,
            fatol: 1e-4,
        }
    }
}

// NaN sorts after every number
fn cmp_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.total_cmp(&b),
    }
}

// a + t * (b - a)
fn affine(a: &[f64], b: &[f64], t: f64) -> Vec<f64> {
    a.iter().zip(b).map(|(&ai, &bi)| ai + t * (bi - ai)).collect()
}

struct Simplex<F> {
    objective: F,
    points: Vec<Vec<f64>>,
    values: Vec<f64>,
    nfev: usize,
}

impl<F: FnMut(&[f64]) -> f64> Simplex<F> {
    fn eval(&mut self, x: &[f64]) -> f64 {
        self.nfev += 1;
        (self.objective)(x)
    }

    fn sort(&mut self) {
        let mut order: Vec<usize> = (0..self.points.len()).collect();
        order.sort_by(|&i, &j| cmp_nan_last(self.values[i], self.values[j]));
        self.points = order.iter().map(|&i| self.points[i].clone()).collect();
        self.values = order.iter().map(|&i| self.values[i]).collect();
    }

    fn converged(&self, xatol: f64, fatol: f64) -> bool {
        let (best, best_val) = (&self.points[0], self.values[0]);
        let x_close = self.points[1..].iter().all(|point| {
            point
                .iter()
                .zip(best)
                .all(|(xi, bi)| (xi - bi).abs() <= xatol)
        });
        x_close
            && self.values[1..]
                .iter()
                .all(|val| (val - best_val).abs() <= fatol)
    }

    fn centroid(&self) -> Vec<f64> {
        let n = self.points.len() - 1;
        let mut centroid = vec![0.; self.points[0].len()];
        for point in &self.points[..n] {
            for (c, xi) in centroid.iter_mut().zip(point) {
                *c += xi / n as f64;
            }
        }
        centroid
    }

    fn replace_worst(&mut self, x: Vec<f64>, val: f64) {
        let worst = self.points.len() - 1;
        self.points[worst] = x;
        self.values[worst] = val;
    }

    fn shrink_towards_best(&mut self) {
        for j in 1..self.points.len() {
            let point = affine(&self.points[0], &self.points[j], SHRINK);
            self.values[j] = self.eval(&point);
            self.points[j] = point;
        }
    }

    /// One reflection step, followed by expansion, contraction or shrinkage.
    fn step(&mut self) {
        let n = self.points.len() - 1;
        let worst = self.points[n].clone();
        let f_best = self.values[0];
        let f_second_worst = self.values[n - 1];
        let f_worst = self.values[n];
        let centroid = self.centroid();

        let reflected = affine(&centroid, &worst, -REFLECT);
        let f_reflected = self.eval(&reflected);

        if f_reflected < f_best {
            let expanded = affine(&centroid, &worst, -REFLECT * EXPAND);
            let f_expanded = self.eval(&expanded);
            if f_expanded < f_reflected {
                self.replace_worst(expanded, f_expanded);
            } else {
                self.replace_worst(reflected, f_reflected);
            }
        } else if f_reflected < f_second_worst {
            self.replace_worst(reflected, f_reflected);
        } else if f_reflected < f_worst {
            let outside = affine(&centroid, &worst, -CONTRACT * REFLECT);
            let f_outside = self.eval(&outside);
            if f_outside <= f_reflected {
                self.replace_worst(outside, f_outside);
            } else {
                self.shrink_towards_best();
            }
        } else {
            let inside = affine(&centroid, &worst, CONTRACT);
            let f_inside = self.eval(&inside);
            if cmp_nan_last(f_inside, f_worst) == Ordering::Less {
                self.replace_worst(inside, f_inside);
            } else {
                self.shrink_towards_best();
            }
        }
    }
}

impl NelderMead {
    /// Minimizes `objective` starting from `x0`. Failure to converge within the
    /// budgets is reported through `success` and `message`, not as an error.
    pub fn minimize(
        &self,
        objective: impl FnMut(&[f64]) -> f64,
        x0: &[f64],
    ) -> OptimizeResult {
        let n = x0.len();
        let max_iter = self.max_iter.unwrap_or(200 * n);
        let max_fev = self.max_fev.unwrap_or(200 * n);

        let mut points = vec![x0.to_vec()];
        for k in 0..n {
            let mut vertex = x0.to_vec();
            vertex[k] = if vertex[k] != 0. {
                (1. + NONZERO_DELTA) * vertex[k]
            } else {
                ZERO_DELTA
            };
            points.push(vertex);
        }

        let mut simplex = Simplex {
            objective,
            points: vec![],
            values: vec![],
            nfev: 0,
        };
        let values = points.iter().map(|x| simplex.eval(x)).collect();
        simplex.values = values;
        simplex.points = points;
        simplex.sort();

        let mut nit = 1;
        while simplex.nfev < max_fev && nit < max_iter {
            if simplex.converged(self.xatol, self.fatol) {
                break;
            }
            simplex.step();
            simplex.sort();
            nit += 1;
        }

        let (success, message) = if simplex.nfev >= max_fev {
            (false, "Maximum number of function evaluations has been exceeded.")
        } else if nit >= max_iter {
            (false, "Maximum number of iterations has been exceeded.")
        } else {
            (true, "Optimization terminated successfully.")
        };

        OptimizeResult {
            x: simplex.points.swap_remove(0),
            fun: simplex.values[0],
            nit,
            nfev: simplex.nfev,
            success,
            message: message.to_owned(),
        }
    }
}
