//! Clean versus patched accuracy of a classifier.
use crate::classifier::Classifier;
use crate::error::Result;
use crate::normalize::Normalize;
use crate::patch::ApplyPatch;
use crate::PixelFloat;
use log::{debug, info};
use ndarray::Array4;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Running counts over an evaluation set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EvaluationReport {
    pub correct_clean: usize,
    pub correct_adv: usize,
    /// Patched images classified as the patch's target
    pub n_success: usize,
    pub n_samples: usize,
}

impl EvaluationReport {
    fn percent(&self, count: usize) -> f64 {
        if self.n_samples == 0 {
            return 0.;
        }
        100. * count as f64 / self.n_samples as f64
    }

    pub fn clean_accuracy(&self) -> f64 {
        self.percent(self.correct_clean)
    }

    pub fn robust_accuracy(&self) -> f64 {
        self.percent(self.correct_adv)
    }

    pub fn success_rate(&self) -> f64 {
        self.percent(self.n_success)
    }

    pub fn record(&mut self, labels: &[usize], clean: &[usize], adv: &[usize], target: usize) {
        debug_assert_eq!(labels.len(), clean.len());
        debug_assert_eq!(labels.len(), adv.len());
        self.correct_clean += labels.iter().zip(clean).filter(|(y, p)| y == p).count();
        self.correct_adv += labels.iter().zip(adv).filter(|(y, p)| y == p).count();
        self.n_success += adv.iter().filter(|&&p| p == target).count();
        self.n_samples += labels.len();
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Clean accuracy: {:.1}%", self.clean_accuracy())?;
        writeln!(f, "Robust accuracy: {:.1}%", self.robust_accuracy())?;
        write!(f, "Success rate: {:.1}%", self.success_rate())
    }
}

/// Feeds each batch to a classifier twice: normalized as is, and patched then
/// normalized.
#[derive(Clone, Debug)]
pub struct Evaluator {
    applier: ApplyPatch,
    normalizer: Normalize,
}

impl Evaluator {
    pub fn new(applier: ApplyPatch, normalizer: Normalize) -> Self {
        Self {
            applier,
            normalizer,
        }
    }

    /// # Errors
    /// On the first batch that fails to load, has the wrong shape, or cannot
    /// be classified.
    pub fn evaluate<C, I, R>(&self, batches: I, classifier: &C, rng: &mut R) -> Result<EvaluationReport>
    where
        C: Classifier + ?Sized,
        I: IntoIterator<Item = Result<(Array4<PixelFloat>, Vec<usize>)>>,
        R: Rng,
    {
        let mut report = EvaluationReport::default();
        for (idx, batch) in batches.into_iter().enumerate() {
            let (x, y) = batch?;
            let x_clean = self.normalizer.apply(x.view())?;
            let x_adv = self.normalizer.apply(self.applier.apply(x.view(), rng)?.view())?;

            let pred_clean = classifier.predict(x_clean.view())?;
            let pred_adv = classifier.predict(x_adv.view())?;
            report.record(&y, &pred_clean, &pred_adv, self.applier.target());
            debug!("batch {}: {:?}", idx, report);
        }
        info!(
            "evaluated {} samples against target {}",
            report.n_samples,
            self.applier.target()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::argmax_rows;
    use crate::error::PatchError;
    use crate::transform::RandomAffine;
    use ndarray::{Array2, Array3, ArrayView4, Axis};
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    /// Predicts class 1 for images whose center pixel is bright, else class 0.
    #[derive(Debug)]
    struct CenterProbe;

    impl Classifier for CenterProbe {
        fn logits(&self, batch: ArrayView4<PixelFloat>) -> Result<Array2<PixelFloat>> {
            let (n, _, h, w) = batch.dim();
            let mut logits = Array2::zeros((n, 2));
            for (i, image) in batch.outer_iter().enumerate() {
                let bright = image[[0, h / 2, w / 2]] > 0.;
                logits[[i, usize::from(bright)]] = 1.;
            }
            Ok(logits)
        }
    }

    fn evaluator() -> Evaluator {
        let patch = Array3::from_elem((1, 8, 8), 1.);
        let applier = ApplyPatch::new(patch, 1, RandomAffine::identity(), 4).unwrap();
        Evaluator::new(applier, Normalize::new(vec![0.5], vec![0.5]).unwrap())
    }

    #[test]
    fn report_formats_one_decimal() {
        let report = EvaluationReport {
            correct_clean: 2,
            correct_adv: 1,
            n_success: 2,
            n_samples: 3,
        };
        assert_eq!(
            report.to_string(),
            "Clean accuracy: 66.7%\nRobust accuracy: 33.3%\nSuccess rate: 66.7%"
        );
    }

    #[test]
    fn empty_report_is_zero() {
        let report = EvaluationReport::default();
        assert_eq!(report.clean_accuracy(), 0.);
        assert_eq!(report.success_rate(), 0.);
    }

    #[test]
    fn patch_flips_predictions_to_target() {
        let batches = vec![
            Ok((Array4::zeros((3, 1, 8, 8)), vec![0, 0, 1])),
            Ok((Array4::zeros((2, 1, 8, 8)), vec![0, 0])),
        ];
        let mut rng = Pcg64::seed_from_u64(0);
        let report = evaluator().evaluate(batches, &CenterProbe, &mut rng).unwrap();
        assert_eq!(
            report,
            EvaluationReport {
                correct_clean: 4,
                correct_adv: 1,
                n_success: 5,
                n_samples: 5,
            }
        );
        assert_eq!(report.robust_accuracy(), 20.);
        assert_eq!(report.success_rate(), 100.);
    }

    #[test]
    fn first_failing_batch_aborts() {
        let batches = vec![
            Ok((Array4::zeros((1, 1, 8, 8)), vec![0])),
            Err(PatchError::Dataset("unreadable".to_string())),
        ];
        let mut rng = Pcg64::seed_from_u64(0);
        assert!(evaluator().evaluate(batches, &CenterProbe, &mut rng).is_err());
    }

    #[test]
    fn probe_sees_normalized_input() {
        let batch = Array4::<PixelFloat>::from_elem((1, 1, 8, 8), 0.5);
        let normalized = Normalize::new(vec![0.5], vec![0.5])
            .unwrap()
            .apply(batch.view())
            .unwrap();
        let logits = CenterProbe.logits(normalized.view()).unwrap();
        assert_eq!(argmax_rows(&logits).unwrap(), vec![0]);
        assert_eq!(normalized.index_axis(Axis(0), 0)[[0, 4, 4]], 0.);
    }
}
