use std::path::Path;

use rand::Rng;

use crate::config::TrainConfig;
use crate::error::LogRegError;
use crate::io::model_file;
use crate::math::{Array1, Features};

/// Smoothing term keeping the likelihood's logarithms away from log(0).
const LIKELIHOOD_SMOOTHING: f64 = 1e-6;

/// Fitted parameters of a binary logistic regression.
///
/// Either all three fields are defined together (the classifier holds
/// `Some(ModelParams)`) or none are; partial parameter sets are never
/// observable.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelParams {
    /// Free term of the linear score.
    pub bias: f64,
    /// One coefficient per feature column.
    pub weights: Array1<f64>,
    /// Decision cutoff in [0, 1] applied to predicted probabilities.
    pub threshold: f64,
}

/// Binary logistic regression classifier.
///
/// Estimates `P(label = 1 | x) = sigmoid(x·w + bias)` and thresholds that
/// probability for hard predictions. Training runs full-batch gradient
/// ascent on the log-likelihood with a golden-section line search for the
/// step size, then calibrates the decision threshold to the ROC point
/// closest to (FPR, TPR) = (0, 1) on the training set.
#[derive(Clone, Debug, Default)]
pub struct LogisticRegression {
    params: Option<ModelParams>,
}

impl LogisticRegression {
    /// Create an untrained classifier with no parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether parameters are present (after a successful `fit` or `load`).
    pub fn is_fitted(&self) -> bool {
        self.params.is_some()
    }

    /// Read-only view of the fitted parameters, if any.
    pub fn params(&self) -> Option<&ModelParams> {
        self.params.as_ref()
    }

    pub fn bias(&self) -> Option<f64> {
        self.params.as_ref().map(|p| p.bias)
    }

    pub fn weights(&self) -> Option<&Array1<f64>> {
        self.params.as_ref().map(|p| &p.weights)
    }

    pub fn threshold(&self) -> Option<f64> {
        self.params.as_ref().map(|p| p.threshold)
    }

    /// Train on a labeled sample set, drawing the initial parameters from
    /// the thread-local RNG. See [`Self::fit_with_rng`].
    pub fn fit<F: Features>(
        &mut self,
        x: &F,
        y: &[f64],
        config: &TrainConfig,
    ) -> Result<(), LogRegError> {
        self.fit_with_rng(x, y, config, &mut rand::thread_rng())
    }

    /// Train on a labeled sample set with an injectable random source.
    ///
    /// # Arguments
    ///
    /// * `x` - Feature matrix, one sample per row
    /// * `y` - Labels in {0.0, 1.0}, one per sample row
    /// * `config` - Stopping sensitivity, step-size bound and iteration cap
    /// * `rng` - Source for the uniform [-0.5, 0.5] parameter initialization
    ///
    /// Bias and weights are initialized at random, refined by gradient
    /// ascent until the per-iteration log-likelihood gain drops below
    /// `config.eps` (or `config.max_iters` is reached), and the decision
    /// threshold is then calibrated against the training set's own predicted
    /// probabilities. Previous parameters are replaced only after the new
    /// ones are fully computed; a failed call leaves the classifier as it
    /// was.
    pub fn fit_with_rng<F: Features, R: Rng>(
        &mut self,
        x: &F,
        y: &[f64],
        config: &TrainConfig,
        rng: &mut R,
    ) -> Result<(), LogRegError> {
        if x.nrows() != y.len() {
            return Err(LogRegError::InvalidTrainingData(format!(
                "{} sample rows but {} labels",
                x.nrows(),
                y.len()
            )));
        }
        config.validate()?;

        let mut bias = rng.gen::<f64>() - 0.5;
        let mut weights: Array1<f64> = (0..x.ncols()).map(|_| rng.gen::<f64>() - 0.5).collect();

        let mut objective_old = log_likelihood(x, y, bias, &weights);
        log::trace!("{:>5}\t{:>17.12}", 0, objective_old);

        let mut iterations = 1usize;
        loop {
            let (grad_bias, grad_weights) = gradient(x, y, bias, &weights);
            let lr = find_best_lr(x, y, bias, &weights, grad_bias, &grad_weights, config.lr_max);
            bias += lr * grad_bias;
            weights.scaled_add(lr, &grad_weights);

            let objective_new = log_likelihood(x, y, bias, &weights);
            log::trace!("{:>5}\t{:>17.12}", iterations, objective_new);

            if objective_new - objective_old < config.eps {
                break;
            }
            objective_old = objective_new;
            iterations += 1;
            if iterations >= config.max_iters {
                break;
            }
        }
        if iterations < config.max_iters {
            log::info!("Training stopped owing to very small changes of the log-likelihood");
        } else {
            log::info!("Training stopped after the maximum number of iterations");
        }

        let probabilities = predict_proba_with(x, bias, &weights);
        let threshold = best_threshold(y, &probabilities);

        self.params = Some(ModelParams {
            bias,
            weights,
            threshold,
        });
        Ok(())
    }

    /// Predicted probability of the positive class for every sample row.
    ///
    /// Fails with `NotFitted` when no parameters are present and with
    /// `InvalidInput` when the column count does not match the trained
    /// feature dimensionality.
    pub fn transform<F: Features>(&self, x: &F) -> Result<Vec<f64>, LogRegError> {
        let params = self.params.as_ref().ok_or(LogRegError::NotFitted)?;
        if x.ncols() != params.weights.len() {
            return Err(LogRegError::InvalidInput {
                expected: params.weights.len(),
                found: x.ncols(),
            });
        }
        Ok(predict_proba_with(x, params.bias, &params.weights))
    }

    /// Hard 0.0/1.0 labels: 1.0 where the predicted probability reaches the
    /// calibrated threshold. Same failure modes as [`Self::transform`].
    pub fn predict<F: Features>(&self, x: &F) -> Result<Vec<f64>, LogRegError> {
        let threshold = self.params.as_ref().ok_or(LogRegError::NotFitted)?.threshold;
        Ok(self
            .transform(x)?
            .into_iter()
            .map(|p| if p >= threshold { 1.0 } else { 0.0 })
            .collect())
    }

    /// Write the fitted parameters to a flat text file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), LogRegError> {
        let params = self.params.as_ref().ok_or(LogRegError::NotFitted)?;
        model_file::write_model(path, params)
    }

    /// Replace the parameters with the contents of a model file.
    ///
    /// The file is parsed into a scratch value first, so a corrupt file
    /// cannot leave partially overwritten parameters behind.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LogRegError> {
        let params = model_file::read_model(path)?;
        self.params = Some(params);
        Ok(())
    }
}

#[inline]
fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn predict_proba_with<F: Features>(x: &F, bias: f64, weights: &Array1<f64>) -> Vec<f64> {
    (0..x.nrows())
        .map(|row| sigmoid(x.row_dot(row, weights) + bias))
        .collect()
}

/// Smoothed log-likelihood of the labels under the given parameters.
fn log_likelihood<F: Features>(x: &F, y: &[f64], bias: f64, weights: &Array1<f64>) -> f64 {
    (0..x.nrows())
        .map(|row| {
            let p = sigmoid(x.row_dot(row, weights) + bias);
            y[row] * (p + LIKELIHOOD_SMOOTHING).ln()
                + (1.0 - y[row]) * (1.0 - p + LIKELIHOOD_SMOOTHING).ln()
        })
        .sum()
}

/// Gradient of the log-likelihood: `(Σ(y - p), Xᵗ·(y - p))`.
fn gradient<F: Features>(
    x: &F,
    y: &[f64],
    bias: f64,
    weights: &Array1<f64>,
) -> (f64, Array1<f64>) {
    let mut grad_bias = 0.0;
    let mut grad_weights = Array1::zeros(x.ncols());
    for row in 0..x.nrows() {
        let residual = y[row] - sigmoid(x.row_dot(row, weights) + bias);
        grad_bias += residual;
        x.add_scaled_row(row, residual, &mut grad_weights);
    }
    (grad_bias, grad_weights)
}

/// Golden-section search over [0, lr_max] for the step size maximizing the
/// log-likelihood along the gradient ray. Returns the midpoint of the final
/// bracket once its width drops below `1e-5 * lr_max`.
#[allow(clippy::too_many_arguments)]
fn find_best_lr<F: Features>(
    x: &F,
    y: &[f64],
    bias: f64,
    weights: &Array1<f64>,
    grad_bias: f64,
    grad_weights: &Array1<f64>,
    lr_max: f64,
) -> f64 {
    let objective = |lr: f64| {
        let mut trial = weights.clone();
        trial.scaled_add(lr, grad_weights);
        log_likelihood(x, y, bias + lr * grad_bias, &trial)
    };

    let mut lo = 0.0f64;
    let mut hi = lr_max;
    let phi = (1.0 + 5.0f64.sqrt()) / 2.0;
    let tol = 1e-5 * (hi - lo);
    let mut lr1 = hi - (hi - lo) / phi;
    let mut lr2 = lo + (hi - lo) / phi;
    while (hi - lo).abs() >= tol {
        if objective(lr1) <= objective(lr2) {
            lo = lr1;
            lr1 = lr2;
            lr2 = lo + (hi - lo) / phi;
        } else {
            hi = lr2;
            lr2 = lr1;
            lr1 = hi - (hi - lo) / phi;
        }
    }
    (lo + hi) / 2.0
}

struct Confusion {
    tp: usize,
    tn: usize,
    fp: usize,
    fn_: usize,
}

fn confusion(y: &[f64], probabilities: &[f64], threshold: f64) -> Confusion {
    let mut counts = Confusion {
        tp: 0,
        tn: 0,
        fp: 0,
        fn_: 0,
    };
    for (target, p) in y.iter().zip(probabilities) {
        let predicted = *p >= threshold;
        if *target > 0.0 {
            if predicted {
                counts.tp += 1;
            } else {
                counts.fn_ += 1;
            }
        } else if predicted {
            counts.fp += 1;
        } else {
            counts.tn += 1;
        }
    }
    counts
}

/// Scan the 101 candidate thresholds {0.00, 0.01, ..., 1.00} and keep the
/// one whose ROC point lies closest to (FPR, TPR) = (0, 1). Ties resolve to
/// the first (lowest) candidate. Candidates with a zero TPR or FPR
/// denominator are skipped; when the label set is degenerate (all positive
/// or all negative) every candidate is skipped and the threshold falls back
/// to 0.5.
fn best_threshold(y: &[f64], probabilities: &[f64]) -> f64 {
    let mut best = 0.5;
    let mut min_dist = f64::INFINITY;
    for step in 0..=100u32 {
        let threshold = f64::from(step) / 100.0;
        let counts = confusion(y, probabilities, threshold);
        let positives = counts.tp + counts.fn_;
        let negatives = counts.fp + counts.tn;
        if positives == 0 || negatives == 0 {
            continue;
        }
        let tpr = counts.tp as f64 / positives as f64;
        let fpr = counts.fp as f64 / negatives as f64;
        let dist = (fpr * fpr + (1.0 - tpr) * (1.0 - tpr)).sqrt();
        if dist < min_dist {
            min_dist = dist;
            best = threshold;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Array2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn or_gate() -> (Array2<f64>, Vec<f64>) {
        let x = Array2::from_shape_vec(
            (4, 2),
            vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0],
        )
        .unwrap();
        (x, vec![0.0, 1.0, 1.0, 1.0])
    }

    #[test]
    fn transform_before_fit_is_not_fitted() {
        let (x, _) = or_gate();
        let model = LogisticRegression::new();
        assert!(matches!(model.transform(&x), Err(LogRegError::NotFitted)));
        assert!(matches!(model.predict(&x), Err(LogRegError::NotFitted)));
    }

    #[test]
    fn fit_rejects_mismatched_labels() {
        let (x, _) = or_gate();
        let mut model = LogisticRegression::new();
        let err = model.fit(&x, &[0.0, 1.0], &TrainConfig::default());
        assert!(matches!(err, Err(LogRegError::InvalidTrainingData(_))));
        assert!(!model.is_fitted());
    }

    #[test]
    fn fit_rejects_bad_hyperparameters() {
        let (x, y) = or_gate();
        let mut model = LogisticRegression::new();
        for config in [
            TrainConfig::new(0.0, 1.0, 1000),
            TrainConfig::new(0.001, -1.0, 1000),
            TrainConfig::new(0.001, 1.0, 0),
        ] {
            let err = model.fit(&x, &y, &config);
            assert!(matches!(err, Err(LogRegError::InvalidHyperparameter(_))));
        }
        assert!(!model.is_fitted());
    }

    #[test]
    fn fit_learns_the_or_gate() {
        let (x, y) = or_gate();
        let mut model = LogisticRegression::new();
        let mut rng = StdRng::seed_from_u64(42);
        model
            .fit_with_rng(&x, &y, &TrainConfig::default(), &mut rng)
            .unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);
    }

    #[test]
    fn transform_outputs_open_unit_interval() {
        let (x, y) = or_gate();
        let mut model = LogisticRegression::new();
        let mut rng = StdRng::seed_from_u64(1);
        model
            .fit_with_rng(&x, &y, &TrainConfig::default(), &mut rng)
            .unwrap();
        for p in model.transform(&x).unwrap() {
            assert!(p > 0.0 && p < 1.0, "probability {} not in (0, 1)", p);
        }
    }

    #[test]
    fn predict_agrees_with_thresholded_transform() {
        let (x, y) = or_gate();
        let mut model = LogisticRegression::new();
        let mut rng = StdRng::seed_from_u64(7);
        model
            .fit_with_rng(&x, &y, &TrainConfig::default(), &mut rng)
            .unwrap();
        let threshold = model.threshold().unwrap();
        let probabilities = model.transform(&x).unwrap();
        let labels = model.predict(&x).unwrap();
        for (p, label) in probabilities.iter().zip(&labels) {
            assert_eq!(*label == 1.0, *p >= threshold);
        }
    }

    #[test]
    fn transform_rejects_column_mismatch() {
        let (x, y) = or_gate();
        let mut model = LogisticRegression::new();
        model.fit(&x, &y, &TrainConfig::default()).unwrap();
        let wide =
            Array2::from_shape_vec((1, 3), vec![1.0, 0.0, 1.0]).unwrap();
        match model.transform(&wide) {
            Err(LogRegError::InvalidInput { expected, found }) => {
                assert_eq!(expected, 2);
                assert_eq!(found, 3);
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn seeded_fit_is_deterministic() {
        let (x, y) = or_gate();
        let mut first = LogisticRegression::new();
        let mut second = LogisticRegression::new();
        first
            .fit_with_rng(&x, &y, &TrainConfig::default(), &mut StdRng::seed_from_u64(9))
            .unwrap();
        second
            .fit_with_rng(&x, &y, &TrainConfig::default(), &mut StdRng::seed_from_u64(9))
            .unwrap();
        assert_eq!(first.params(), second.params());
    }

    #[test]
    fn golden_section_step_stays_in_range_and_improves() {
        let (x, y) = or_gate();
        let bias = 0.1;
        let weights = Array1::from_vec(vec![-0.2, 0.3]);
        let (grad_bias, grad_weights) = gradient(&x, &y, bias, &weights);
        let lr_max = 1.0;
        let lr = find_best_lr(&x, &y, bias, &weights, grad_bias, &grad_weights, lr_max);
        assert!((0.0..=lr_max).contains(&lr));

        let at = |step: f64| {
            let mut trial = weights.clone();
            trial.scaled_add(step, &grad_weights);
            log_likelihood(&x, &y, bias + step * grad_bias, &trial)
        };
        assert!(at(lr) >= at(0.0) - 1e-9);
    }

    #[test]
    fn confusion_counts_are_exhaustive() {
        let y = [1.0, 1.0, 0.0, 0.0];
        let probabilities = [0.9, 0.2, 0.8, 0.1];
        let counts = confusion(&y, &probabilities, 0.5);
        assert_eq!(counts.tp, 1);
        assert_eq!(counts.fn_, 1);
        assert_eq!(counts.fp, 1);
        assert_eq!(counts.tn, 1);
    }

    #[test]
    fn best_threshold_separates_clean_scores() {
        let y = [0.0, 0.0, 1.0, 1.0];
        let probabilities = [0.1, 0.2, 0.8, 0.9];
        let threshold = best_threshold(&y, &probabilities);
        // Every candidate in (0.2, 0.8] is perfect; the first one wins.
        assert!((threshold - 0.21).abs() < 1e-12);
    }

    #[test]
    fn best_threshold_degenerate_labels_fall_back() {
        let probabilities = [0.3, 0.6, 0.9];
        assert_eq!(best_threshold(&[1.0, 1.0, 1.0], &probabilities), 0.5);
        assert_eq!(best_threshold(&[0.0, 0.0, 0.0], &probabilities), 0.5);
    }

    #[test]
    fn fit_with_degenerate_labels_does_not_panic() {
        let (x, _) = or_gate();
        let mut model = LogisticRegression::new();
        let mut rng = StdRng::seed_from_u64(3);
        model
            .fit_with_rng(&x, &[1.0, 1.0, 1.0, 1.0], &TrainConfig::default(), &mut rng)
            .unwrap();
        assert_eq!(model.threshold(), Some(0.5));
    }
}
