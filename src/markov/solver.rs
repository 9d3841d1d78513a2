//! Exact fixation analytics for the Moran birth-death chain
//!
//! State is the number of mutants `i` in `[0, N]`; both boundaries absorb.
//! One individual reproduces (proportional to fitness) and one dies per
//! elementary step, giving the transition-up probability
//!
//! ```text
//! T+(i) = (N - i) * i * fA / (N * (i * fA + (N - i) * fB))
//! ```
//!
//! and the constant backward/forward ratio `rho = T-(i) / T+(i) = fB / fA`.
//! That constant ratio is what makes the closed-form recursions below exact:
//! fixation probabilities are quotients of cumulative products of `rho`, and
//! the fixation times are the standard nested birth-death sums over the same
//! products. All cumulative products are built by iterative accumulation over
//! the sub-unit ratio `min(rho, 1/rho)`, not repeated exponentiation, so the
//! recursions stay finite and well-conditioned across the whole exact-size
//! range even for extreme fitness ratios.
//!
//! Everything is memoized per `(N, fA, fB)` inside the solver instance; the
//! memo is invalidated only when a parameter actually changes. The solver is
//! not meant to be shared across threads — parallel parameter sweeps should
//! own one instance per run.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Population size above which fixation probabilities fall back to the
/// infinite-population limit
pub const DEFAULT_MAX_EXACT_PROBABILITY: usize = 1000;

/// Population size above which fixation times are reported unavailable
pub const DEFAULT_MAX_EXACT_TIME: usize = 500;

/// Outcome of an analytical query
///
/// Scale-limit conditions are values, not errors: a caller overlaying
/// reference curves must be able to distinguish "exactly computed",
/// "closed-form limit", and "not available at this population size" from a
/// legitimate zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Analytic {
    /// Exact value from the finite-population recursion
    Exact(f64),
    /// Closed-form infinite-population approximation
    Limit(f64),
    /// Not analytically available (population too large for the nested sums)
    Unavailable,
}

impl Analytic {
    /// The numeric value, if one is available
    pub fn value(&self) -> Option<f64> {
        match *self {
            Self::Exact(v) | Self::Limit(v) => Some(v),
            Self::Unavailable => None,
        }
    }

    /// True for exactly computed values
    pub fn is_exact(&self) -> bool {
        matches!(self, Self::Exact(_))
    }

    /// True when no value is available
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

#[derive(Debug, Clone)]
struct Cache {
    pop_size: usize,
    fit_mutant: f64,
    fit_resident: f64,
    fixation: Option<Vec<f64>>,
    absorption: Option<Vec<f64>>,
    conditional: Option<Vec<f64>>,
}

impl Cache {
    fn new(pop_size: usize, fit_mutant: f64, fit_resident: f64) -> Self {
        Self {
            pop_size,
            fit_mutant,
            fit_resident,
            fixation: None,
            absorption: None,
            conditional: None,
        }
    }

    fn ratio(&self) -> f64 {
        self.fit_resident / self.fit_mutant
    }
}

/// Exact solver for fixation probabilities and fixation times
///
/// Pure function library over its memo cache: construct once per run,
/// [`configure`](Self::configure) whenever payoffs or population size change,
/// query on demand.
#[derive(Debug, Clone)]
pub struct FixationSolver {
    max_exact_probability: usize,
    max_exact_time: usize,
    cache: Option<Cache>,
}

impl FixationSolver {
    /// Create an unconfigured solver with the default exact-size thresholds
    pub fn new() -> Self {
        Self {
            max_exact_probability: DEFAULT_MAX_EXACT_PROBABILITY,
            max_exact_time: DEFAULT_MAX_EXACT_TIME,
            cache: None,
        }
    }

    /// Adjust the population-size thresholds for exact computation
    ///
    /// Above `max_probability` the fixation probability is reported as the
    /// infinite-population [`Analytic::Limit`]; above `max_time` the nested
    /// time sums (`O(N^2)` per query) are skipped and times are
    /// [`Analytic::Unavailable`].
    pub fn set_exact_limits(&mut self, max_probability: usize, max_time: usize) {
        self.max_exact_probability = max_probability;
        self.max_exact_time = max_time;
    }

    /// The configured `(N, fA, fB)` triple, if any
    pub fn params(&self) -> Option<(usize, f64, f64)> {
        self.cache
            .as_ref()
            .map(|c| (c.pop_size, c.fit_mutant, c.fit_resident))
    }

    /// Configure the chain: population size, mutant fitness, resident fitness
    ///
    /// Invalid parameters are rejected and the previous configuration (and
    /// its memoized results) retained. Reconfiguring with identical values is
    /// a no-op — memoized results survive.
    pub fn configure(
        &mut self,
        pop_size: usize,
        fit_mutant: f64,
        fit_resident: f64,
    ) -> Result<(), ConfigError> {
        if pop_size == 0 {
            return Err(ConfigError::InvalidPopulationSize(pop_size));
        }
        if !(fit_mutant > 0.0 && fit_mutant.is_finite())
            || !(fit_resident > 0.0 && fit_resident.is_finite())
        {
            log::warn!("rejecting fitness pair ({fit_mutant}, {fit_resident})");
            return Err(ConfigError::InvalidFitness {
                mutant: fit_mutant,
                resident: fit_resident,
            });
        }

        if let Some(c) = &self.cache {
            if c.pop_size == pop_size
                && c.fit_mutant == fit_mutant
                && c.fit_resident == fit_resident
            {
                return Ok(());
            }
            log::debug!(
                "invalidating memo: ({}, {}, {}) -> ({pop_size}, {fit_mutant}, {fit_resident})",
                c.pop_size,
                c.fit_mutant,
                c.fit_resident
            );
        }
        self.cache = Some(Cache::new(pop_size, fit_mutant, fit_resident));
        Ok(())
    }

    /// Probability that `i` initial mutants fixate in a population of size `N`
    ///
    /// Exact for `N` up to the probability threshold; the infinite-population
    /// limit `max(0, 1 - (fB/fA)^i)` beyond it. [`Analytic::Unavailable`] if
    /// the solver is unconfigured or `i > N`.
    pub fn fixation_probability(&mut self, i: usize) -> Analytic {
        let Some(c) = &self.cache else {
            return Analytic::Unavailable;
        };
        if i > c.pop_size {
            return Analytic::Unavailable;
        }
        if c.pop_size > self.max_exact_probability {
            let rho = c.ratio();
            return Analytic::Limit((1.0 - rho.powf(i as f64)).max(0.0));
        }
        self.ensure_fixation();
        match self.cache.as_ref().and_then(|c| c.fixation.as_ref()) {
            Some(phi) => Analytic::Exact(phi[i]),
            None => Analytic::Unavailable,
        }
    }

    /// Expected number of update steps until absorption (either boundary),
    /// starting from `i` mutants
    ///
    /// Never approximated: [`Analytic::Unavailable`] above the time threshold.
    pub fn absorption_time(&mut self, i: usize) -> Analytic {
        if !self.times_computable(i) {
            return Analytic::Unavailable;
        }
        self.ensure_times();
        match self.cache.as_ref().and_then(|c| c.absorption.as_ref()) {
            Some(t) => Analytic::Exact(t[i]),
            None => Analytic::Unavailable,
        }
    }

    /// Expected number of update steps until fixation at `N`, conditioned on
    /// fixation happening, starting from `i` mutants
    ///
    /// Defined as 0 at `i = 0` (conditioning on a null event).
    pub fn conditional_fixation_time(&mut self, i: usize) -> Analytic {
        if !self.times_computable(i) {
            return Analytic::Unavailable;
        }
        self.ensure_times();
        match self.cache.as_ref().and_then(|c| c.conditional.as_ref()) {
            Some(t) => Analytic::Exact(t[i]),
            None => Analytic::Unavailable,
        }
    }

    /// Exact fixation probabilities for every `i` in `[0, N]`
    ///
    /// Empty when unconfigured or the population exceeds the exact-size
    /// threshold — the reporting layer treats an empty overlay as "no
    /// reference curve", not as an error.
    pub fn fixation_curve(&mut self) -> Vec<f64> {
        let available =
            matches!(&self.cache, Some(c) if c.pop_size <= self.max_exact_probability);
        if !available {
            return Vec::new();
        }
        self.ensure_fixation();
        self.cache
            .as_ref()
            .and_then(|c| c.fixation.clone())
            .unwrap_or_default()
    }

    /// Exact absorption times for every `i` in `[0, N]`; empty when
    /// unavailable
    pub fn absorption_curve(&mut self) -> Vec<f64> {
        if !self.times_computable(0) {
            return Vec::new();
        }
        self.ensure_times();
        self.cache
            .as_ref()
            .and_then(|c| c.absorption.clone())
            .unwrap_or_default()
    }

    /// Exact conditional fixation times for every `i` in `[0, N]`; empty
    /// when unavailable
    pub fn conditional_curve(&mut self) -> Vec<f64> {
        if !self.times_computable(0) {
            return Vec::new();
        }
        self.ensure_times();
        self.cache
            .as_ref()
            .and_then(|c| c.conditional.clone())
            .unwrap_or_default()
    }

    fn times_computable(&self, i: usize) -> bool {
        match &self.cache {
            Some(c) => i <= c.pop_size && c.pop_size <= self.max_exact_time,
            None => false,
        }
    }

    fn ensure_fixation(&mut self) {
        let Some(c) = self.cache.as_mut() else {
            return;
        };
        if c.fixation.is_none() {
            c.fixation = Some(fixation_probabilities(c.pop_size, c.ratio()));
        }
    }

    fn ensure_times(&mut self) {
        let Some(c) = self.cache.as_mut() else {
            return;
        };
        if c.absorption.is_some() && c.conditional.is_some() {
            return;
        }
        let (absorption, conditional) = fixation_times(c.pop_size, c.fit_mutant, c.fit_resident);
        c.absorption = Some(absorption);
        c.conditional = Some(conditional);
    }
}

impl Default for FixationSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Transition-up probability of the Moran chain at state `i`
fn transition_up(n: usize, i: usize, fit_mutant: f64, fit_resident: f64) -> f64 {
    let (n_f, i_f) = (n as f64, i as f64);
    (n_f - i_f) * i_f * fit_mutant / (n_f * (i_f * fit_mutant + (n_f - i_f) * fit_resident))
}

/// Fixation probabilities `phi_i` for `i` in `[0, N]`
///
/// `phi_i = S_i / S_N` with `S_i = sum_{k=0}^{i-1} rho^k`, the powers built
/// by running multiplication. The accumulation always runs over the sub-unit
/// ratio `q = min(rho, 1/rho)` so the running power can only decay: for
/// `rho > 1` the quotient is rescaled as `phi_i = q^(N-i) * Z_i / Z_N` with
/// `Z_m = sum_{j=0}^{m-1} q^j`, which underflows gracefully toward 0 for
/// hopeless mutants instead of overflowing to `inf/inf`. Boundaries come out
/// exactly: `phi_0 = 0`, `phi_N = 1`, and `phi_i = i/N` in the neutral case
/// `rho = 1`.
fn fixation_probabilities(n: usize, rho: f64) -> Vec<f64> {
    if rho <= 1.0 {
        let z = geometric_partials(n, rho);
        let total = z[n];
        return z.iter().map(|&s| s / total).collect();
    }

    let q = 1.0 / rho;
    let z = geometric_partials(n, q);
    let total = z[n];
    let mut phi = vec![0.0; n + 1];
    let mut power = 1.0;
    for i in (0..=n).rev() {
        phi[i] = power * z[i] / total;
        power *= q;
    }
    phi
}

/// Partial sums `Z_m = sum_{j=0}^{m-1} q^j` for `m` in `[0, N]`
fn geometric_partials(n: usize, q: f64) -> Vec<f64> {
    let mut z = vec![0.0; n + 1];
    let mut power = 1.0;
    let mut acc = 0.0;
    for s in z.iter_mut().skip(1) {
        acc += power;
        *s = acc;
        power *= q;
    }
    z
}

/// Unconditional absorption times and conditional fixation times
///
/// The textbook birth-death solution `t_i = phi_i * sum_k I_k - sum_{k<i} I_k`
/// (with inner sums `I_k = sum_{l<=k} rho^(k-l) / T+(l)`) subtracts two terms
/// that each grow like `rho^i`, which loses all precision under strong
/// selection and overflows outright for large `N`. Swapping the summation
/// order and substituting `phi_i = S_i / S_N` (`S_m = sum_{j=0}^{m-1} rho^j`)
/// cancels the difference analytically, leaving sums of non-negative terms:
///
/// ```text
/// t_i   = [ sum_{l<i}  u_l S_l rho^(i-l) S_(N-i)
///         + sum_{l>=i} u_l S_i S_(N-l) ] / S_N
/// t_i^A =   sum_{l<i}  u_l S_l^2 rho^(i-l) S_(N-i) / (S_N S_i)
///         + sum_{l>=i} u_l S_l S_(N-l) / S_N
/// ```
///
/// with `u_l = 1/T+(l)` and sums over `l = 1..N-1`. As in the probability
/// recursion the partial sums are accumulated over the sub-unit ratio
/// `q = min(rho, 1/rho)`; for `rho > 1` the substitution `S_m = rho^(m-1) Z_m`
/// collapses every leftover power of `rho` into a non-positive power of `q`,
/// so no intermediate value can overflow.
fn fixation_times(n: usize, fit_mutant: f64, fit_resident: f64) -> (Vec<f64>, Vec<f64>) {
    let rho = fit_resident / fit_mutant;
    let inverted = rho > 1.0;
    let q = if inverted { 1.0 / rho } else { rho };
    let z = geometric_partials(n, q);
    let total = z[n];
    let up_inv: Vec<f64> = (1..n)
        .map(|l| 1.0 / transition_up(n, l, fit_mutant, fit_resident))
        .collect();

    let mut absorption = vec![0.0; n + 1];
    let mut conditional = vec![0.0; n + 1];
    for i in 0..=n {
        let mut t = 0.0;
        let mut t_fix = 0.0;

        // l < i, walking down from i - 1 so `power` tracks q^(i-l); the
        // rescaled absorption weight is the constant q, the conditional one
        // q^(i-l+1)
        let mut power = q;
        for l in (1..i).rev() {
            let u = up_inv[l - 1];
            let (w, w_fix) = if inverted {
                (q, power * q)
            } else {
                (power, power)
            };
            t += u * z[l] * z[n - i] * w;
            t_fix += u * z[l] * z[l] * z[n - i] * w_fix / z[i];
            power *= q;
        }

        // l >= i, where the rescaled absorption weight is q^(l+1-i) and the
        // conditional one is the constant q
        let mut power = if inverted { q } else { 1.0 };
        let w_fix = if inverted { q } else { 1.0 };
        for l in i.max(1)..n {
            let u = up_inv[l - 1];
            t += u * z[i] * z[n - l] * power;
            t_fix += u * z[l] * z[n - l] * w_fix;
            if inverted {
                power *= q;
            }
        }

        absorption[i] = t / total;
        conditional[i] = if i == 0 { 0.0 } else { t_fix / total };
    }
    (absorption, conditional)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn solver(n: usize, fa: f64, fb: f64) -> FixationSolver {
        let mut s = FixationSolver::new();
        s.configure(n, fa, fb).unwrap();
        s
    }

    fn exact(a: Analytic) -> f64 {
        match a {
            Analytic::Exact(v) => v,
            other => panic!("expected exact value, got {other:?}"),
        }
    }

    #[test]
    fn test_fixation_boundaries() {
        for n in [1, 2, 5, 50] {
            for (fa, fb) in [(1.0, 1.0), (2.0, 1.0), (0.5, 1.7)] {
                let mut s = solver(n, fa, fb);
                assert_relative_eq!(exact(s.fixation_probability(0)), 0.0);
                assert_relative_eq!(exact(s.fixation_probability(n)), 1.0);
            }
        }
    }

    #[test]
    fn test_neutral_drift() {
        for n in 2..=50 {
            let mut s = solver(n, 1.0, 1.0);
            for i in 0..=n {
                assert_relative_eq!(
                    exact(s.fixation_probability(i)),
                    i as f64 / n as f64,
                    epsilon = 1e-12
                );
            }
        }
    }

    #[test]
    fn test_classical_single_mutant() {
        // r = fA/fB = 2: rho_1 = (1 - 1/r) / (1 - 1/r^N) ~ 0.5 for N = 100
        let mut s = solver(100, 2.0, 1.0);
        let expected = 0.5 / (1.0 - 0.5f64.powi(100));
        assert_relative_eq!(exact(s.fixation_probability(1)), expected, epsilon = 1e-12);
        assert_relative_eq!(exact(s.fixation_probability(1)), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_fixation_monotone_in_mutant_count() {
        for (fa, fb) in [(1.3, 1.0), (1.0, 1.3), (1.0, 1.0)] {
            let mut s = solver(30, fa, fb);
            let mut last = -1.0;
            for i in 0..=30 {
                let p = exact(s.fixation_probability(i));
                assert!(p >= last, "phi({i}) = {p} < {last}");
                last = p;
            }
        }
    }

    #[test]
    fn test_advantageous_beats_neutral() {
        let mut s = solver(40, 1.5, 1.0);
        let p = exact(s.fixation_probability(1));
        assert!(p > 1.0 / 40.0);

        let mut s = solver(40, 0.8, 1.0);
        let p = exact(s.fixation_probability(1));
        assert!(p < 1.0 / 40.0);
    }

    #[test]
    fn test_neutral_absorption_time_single_mutant() {
        // Neutral Moran chain: t_1 = N * H_{N-1}
        let n = 10;
        let mut s = solver(n, 1.0, 1.0);
        let harmonic: f64 = (1..n).map(|k| 1.0 / k as f64).sum();
        assert_relative_eq!(
            exact(s.absorption_time(1)),
            n as f64 * harmonic,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_neutral_conditional_time_single_mutant() {
        // Neutral Moran chain: t1_fix = N * (N - 1)
        for n in [5, 10, 25] {
            let mut s = solver(n, 1.0, 1.0);
            assert_relative_eq!(
                exact(s.conditional_fixation_time(1)),
                (n * (n - 1)) as f64,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_time_boundaries() {
        let mut s = solver(20, 1.4, 1.0);
        assert_relative_eq!(exact(s.absorption_time(0)), 0.0);
        assert_relative_eq!(exact(s.absorption_time(20)), 0.0, epsilon = 1e-9);
        assert_relative_eq!(exact(s.conditional_fixation_time(20)), 0.0, epsilon = 1e-9);
        // Interior states take time to absorb
        assert!(exact(s.absorption_time(10)) > 0.0);
        assert!(exact(s.conditional_fixation_time(1)) > 0.0);
    }

    #[test]
    fn test_limit_fallback_above_threshold() {
        let mut s = solver(2000, 2.0, 1.0);
        match s.fixation_probability(1) {
            Analytic::Limit(p) => assert_relative_eq!(p, 0.5),
            other => panic!("expected limit, got {other:?}"),
        }
        // Disadvantageous mutants go extinct in the limit
        let mut s = solver(2000, 1.0, 2.0);
        match s.fixation_probability(1) {
            Analytic::Limit(p) => assert_relative_eq!(p, 0.0),
            other => panic!("expected limit, got {other:?}"),
        }
    }

    #[test]
    fn test_times_unavailable_above_threshold() {
        let mut s = solver(600, 2.0, 1.0);
        assert!(s.absorption_time(1).is_unavailable());
        assert!(s.conditional_fixation_time(1).is_unavailable());
        assert!(s.absorption_curve().is_empty());
        assert!(s.conditional_curve().is_empty());
        // Probability is still exact at N = 600
        assert!(s.fixation_probability(1).is_exact());
    }

    #[test]
    fn test_unconfigured_is_unavailable() {
        let mut s = FixationSolver::new();
        assert!(s.fixation_probability(1).is_unavailable());
        assert!(s.absorption_time(1).is_unavailable());
        assert!(s.fixation_curve().is_empty());
    }

    #[test]
    fn test_out_of_range_state() {
        let mut s = solver(10, 1.0, 1.0);
        assert!(s.fixation_probability(11).is_unavailable());
        assert!(s.absorption_time(11).is_unavailable());
    }

    #[test]
    fn test_curves_match_pointwise_queries() {
        let mut s = solver(25, 1.2, 1.0);
        let curve = s.fixation_curve();
        assert_eq!(curve.len(), 26);
        for (i, &p) in curve.iter().enumerate() {
            assert_relative_eq!(p, exact(s.fixation_probability(i)));
        }
        let times = s.absorption_curve();
        assert_eq!(times.len(), 26);
        assert_relative_eq!(times[1], exact(s.absorption_time(1)));
    }

    #[test]
    fn test_reconfigure_same_params_keeps_memo() {
        let mut s = solver(30, 1.5, 1.0);
        let before = exact(s.fixation_probability(3));
        assert!(s.cache.as_ref().unwrap().fixation.is_some());

        s.configure(30, 1.5, 1.0).unwrap();
        assert!(
            s.cache.as_ref().unwrap().fixation.is_some(),
            "identical reconfigure must not invalidate the memo"
        );
        assert_relative_eq!(exact(s.fixation_probability(3)), before);
    }

    #[test]
    fn test_reconfigure_new_params_invalidates_memo() {
        let mut s = solver(30, 1.5, 1.0);
        let _ = s.fixation_probability(3);
        s.configure(30, 1.6, 1.0).unwrap();
        assert!(s.cache.as_ref().unwrap().fixation.is_none());
    }

    #[test]
    fn test_invalid_configure_retains_previous() {
        let mut s = solver(30, 1.5, 1.0);
        let before = exact(s.fixation_probability(3));

        assert_eq!(
            s.configure(0, 1.5, 1.0),
            Err(ConfigError::InvalidPopulationSize(0))
        );
        assert!(matches!(
            s.configure(30, -1.0, 1.0),
            Err(ConfigError::InvalidFitness { .. })
        ));
        assert!(matches!(
            s.configure(30, 1.0, f64::NAN),
            Err(ConfigError::InvalidFitness { .. })
        ));

        assert_eq!(s.params(), Some((30, 1.5, 1.0)));
        assert_relative_eq!(exact(s.fixation_probability(3)), before);
    }

    #[test]
    fn test_extreme_ratio_at_probability_threshold() {
        // rho = 10 at the largest exactly-solved population: the geometric
        // partial sums span ~10^999, far past f64 range if accumulated naively
        let mut s = solver(DEFAULT_MAX_EXACT_PROBABILITY, 0.1, 1.0);
        assert_relative_eq!(exact(s.fixation_probability(0)), 0.0);
        assert_relative_eq!(
            exact(s.fixation_probability(DEFAULT_MAX_EXACT_PROBABILITY)),
            1.0
        );

        let curve = s.fixation_curve();
        assert_eq!(curve.len(), DEFAULT_MAX_EXACT_PROBABILITY + 1);
        let mut last = -1.0;
        for (i, &p) in curve.iter().enumerate() {
            assert!(p.is_finite(), "phi({i}) = {p}");
            assert!((0.0..=1.0).contains(&p), "phi({i}) = {p}");
            assert!(p >= last, "phi({i}) = {p} < {last}");
            last = p;
        }

        // Strongly advantageous direction at the same size
        let mut s = solver(DEFAULT_MAX_EXACT_PROBABILITY, 1.0, 0.1);
        let p = exact(s.fixation_probability(1));
        assert!(p.is_finite() && p > 0.89 && p < 1.0, "phi(1) = {p}");
    }

    #[test]
    fn test_extreme_ratio_at_time_threshold() {
        for (fa, fb) in [(0.1, 1.0), (1.0, 0.1)] {
            let mut s = solver(DEFAULT_MAX_EXACT_TIME, fa, fb);
            let t = exact(s.absorption_time(1));
            assert!(t.is_finite() && t > 0.0, "t(1) = {t} for ({fa}, {fb})");
            let t = exact(s.conditional_fixation_time(1));
            assert!(t.is_finite() && t > 0.0, "tA(1) = {t} for ({fa}, {fb})");

            for (i, &t) in s.absorption_curve().iter().enumerate() {
                assert!(t.is_finite() && t >= 0.0, "t({i}) = {t} for ({fa}, {fb})");
            }
            for (i, &t) in s.conditional_curve().iter().enumerate() {
                assert!(t.is_finite() && t >= 0.0, "tA({i}) = {t} for ({fa}, {fb})");
            }
        }
    }

    #[test]
    fn test_times_match_direct_double_sum() {
        // Independent evaluation of t_i = phi_i * sum_k I_k - sum_{k<i} I_k
        // with explicit nested loops, at sizes where it is still stable
        let (n, fa, fb) = (30, 1.0, 1.5);
        let rho: f64 = fb / fa;
        let phi = |i: usize| {
            let s = |m: usize| (0..m).map(|k| rho.powi(k as i32)).sum::<f64>();
            s(i) / s(n)
        };
        let inner = |k: usize| {
            (1..=k)
                .map(|l| rho.powi((k - l) as i32) / transition_up(n, l, fa, fb))
                .sum::<f64>()
        };
        let full: f64 = (1..n).map(inner).sum();

        let weighted_inner = |k: usize| {
            (1..=k)
                .map(|l| rho.powi((k - l) as i32) * phi(l) / transition_up(n, l, fa, fb))
                .sum::<f64>()
        };
        let weighted_full: f64 = (1..n).map(weighted_inner).sum();

        let mut s = solver(n, fa, fb);
        for i in [1, 7, 15, 29] {
            let partial: f64 = (1..i).map(inner).sum();
            let expected = phi(i) * full - partial;
            assert_relative_eq!(exact(s.absorption_time(i)), expected, epsilon = 1e-6);

            let weighted_partial: f64 = (1..i).map(weighted_inner).sum();
            let expected = (phi(i) * weighted_full - weighted_partial) / phi(i);
            assert_relative_eq!(
                exact(s.conditional_fixation_time(i)),
                expected,
                epsilon = 1e-6
            );
        }
    }

    #[test]
    fn test_single_individual_population() {
        let mut s = solver(1, 2.0, 1.0);
        assert_relative_eq!(exact(s.fixation_probability(0)), 0.0);
        assert_relative_eq!(exact(s.fixation_probability(1)), 1.0);
        assert_relative_eq!(exact(s.absorption_time(0)), 0.0);
        assert_relative_eq!(exact(s.absorption_time(1)), 0.0);
    }
}
