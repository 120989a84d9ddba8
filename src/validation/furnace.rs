// Copyright @yucwang 2026

use crate::core::bsdf::BxDF;
use crate::core::rng::{LcgRng, SampleGenerator};
use crate::io::material_loader::MaterialLibrary;
use crate::materials::diffuse::DiffuseModel;
use crate::materials::standard::StandardBSDF;
use crate::math::constants::{Float, PI, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

/// Polar view angles every material is checked at, in degrees.
pub const VIEW_ANGLES_DEG: [Float; 5] = [0.0, 30.0, 60.0, 80.0, 89.0];

// Share of samples allowed to miss a per-sample check before the case fails.
const MAX_MISMATCH_FRACTION: Float = 1e-2;

#[derive(Debug, Copy, Clone)]
pub struct FurnaceSettings {
    pub samples: usize,
    pub seed: u64,
    /// Relative tolerance of the per-sample pdf and weight comparisons.
    pub tolerance: Float,
}

impl Default for FurnaceSettings {
    fn default() -> Self {
        Self { samples: 1 << 16, seed: 0, tolerance: 1e-2 }
    }
}

/// White furnace statistics of one `(bxdf, wo)` pair.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FurnaceStats {
    pub samples: usize,
    pub accepted: usize,
    /// Mean sample weight, failed samples counting as zero.
    pub albedo: RGBSpectrum,
    /// Mean of `eval / eval_pdf` over the same samples.
    pub albedo_estimate: RGBSpectrum,
    pub pdf_mismatches: usize,
    pub weight_mismatches: usize,
    pub non_finite: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FurnaceFailure {
    NonFinite,
    PdfMismatch,
    WeightMismatch,
    EstimatorMismatch,
    Energy,
}

impl fmt::Display for FurnaceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FurnaceFailure::NonFinite => "non-finite",
            FurnaceFailure::PdfMismatch => "pdf",
            FurnaceFailure::WeightMismatch => "weight",
            FurnaceFailure::EstimatorMismatch => "estimator",
            FurnaceFailure::Energy => "energy",
        };
        write!(f, "{}", name)
    }
}

fn close(a: Float, b: Float, tolerance: Float) -> bool {
    (a - b).abs() <= tolerance * a.abs().max(b.abs()).max(1e-2)
}

/// Draws `samples` directions from `bxdf` and cross-checks every sample
/// against `eval` and `eval_pdf`.
pub fn measure<B: BxDF + ?Sized>(bxdf: &B,
                                 wo: &Vector3f,
                                 samples: usize,
                                 sg: &mut dyn SampleGenerator,
                                 tolerance: Float) -> FurnaceStats {
    let mut stats = FurnaceStats {
        samples,
        accepted: 0,
        albedo: RGBSpectrum::zero(),
        albedo_estimate: RGBSpectrum::zero(),
        pdf_mismatches: 0,
        weight_mismatches: 0,
        non_finite: 0,
    };
    if samples == 0 {
        return stats;
    }

    for _ in 0..samples {
        let sample = match bxdf.sample(wo, sg) {
            Some(sample) => sample,
            None => continue,
        };
        stats.accepted += 1;

        let value = bxdf.eval(wo, &sample.wi);
        let pdf = bxdf.eval_pdf(wo, &sample.wi);
        if !sample.weight.is_finite() || !sample.pdf.is_finite() || !value.is_finite() || !pdf.is_finite() {
            stats.non_finite += 1;
            continue;
        }

        if !close(sample.pdf, pdf, tolerance) {
            stats.pdf_mismatches += 1;
        }
        let expected = if sample.pdf > 0.0 { value / sample.pdf } else { RGBSpectrum::zero() };
        if (0..3).any(|c| !close(sample.weight[c], expected[c], tolerance)) {
            stats.weight_mismatches += 1;
        }

        stats.albedo += sample.weight;
        stats.albedo_estimate += expected;
    }

    let inv_samples = 1.0 / samples as Float;
    stats.albedo *= inv_samples;
    stats.albedo_estimate *= inv_samples;
    stats
}

impl FurnaceStats {
    /// Checks that failed. `strict_weights` demands `weight == eval / pdf`
    /// per sample, which only holds when a single lobe is active; otherwise
    /// the two albedo estimators are compared instead.
    pub fn failures(&self, strict_weights: bool, energy_bound: Float) -> Vec<FurnaceFailure> {
        let mut failures = Vec::new();
        let allowed = (self.accepted as Float * MAX_MISMATCH_FRACTION).floor() as usize;

        if self.non_finite > 0 {
            failures.push(FurnaceFailure::NonFinite);
        }
        if self.pdf_mismatches > allowed {
            failures.push(FurnaceFailure::PdfMismatch);
        }
        if strict_weights {
            if self.weight_mismatches > allowed {
                failures.push(FurnaceFailure::WeightMismatch);
            }
        } else if (0..3).any(|c| {
            let estimate = self.albedo_estimate[c];
            (self.albedo[c] - estimate).abs() > 0.02 + 0.05 * estimate.abs()
        }) {
            failures.push(FurnaceFailure::EstimatorMismatch);
        }
        if self.albedo.min_component() < 0.0 || self.albedo.max_component() > energy_bound + 0.02 {
            failures.push(FurnaceFailure::Energy);
        }
        failures
    }
}

// Peak diffuse albedo per unit base color. Disney-style retro-reflection
// exceeds one at grazing angles.
fn diffuse_albedo_bound(model: DiffuseModel) -> Float {
    match model {
        DiffuseModel::Lambert => 1.0,
        DiffuseModel::Frostbite => 2.0,
        DiffuseModel::Disney => 3.0,
    }
}

/// Upper bound on the white furnace albedo of a standard material.
pub fn energy_bound(bsdf: &StandardBSDF) -> Float {
    let p = bsdf.probabilities();
    let st = bsdf.specular_transmission();

    let mut reflection = 0.0;
    if p.diffuse > 0.0 {
        reflection += diffuse_albedo_bound(bsdf.config().diffuse) * bsdf.diffuse_reflection().albedo().max_component();
    }
    if p.specular_reflection > 0.0 {
        reflection += bsdf.specular_reflection().albedo.max_component().max(1.0);
    }

    let mut transmission = 0.0;
    if p.specular_transmission > 0.0 {
        let lobe = bsdf.specular_reflection_transmission();
        transmission = (lobe.transmission_albedo.max_component() * lobe.eta * lobe.eta).max(1.0);
    }
    (1.0 - st) * reflection + st * transmission
}

fn active_lobes(bsdf: &StandardBSDF) -> usize {
    let p = bsdf.probabilities();
    [p.diffuse, p.specular_reflection, p.specular_transmission].iter().filter(|v| **v > 0.0).count()
}

#[derive(Debug, Clone)]
pub struct FurnaceReport {
    pub material: String,
    pub theta_deg: Float,
    pub stats: FurnaceStats,
    pub energy_bound: Float,
    pub failures: Vec<FurnaceFailure>,
}

impl FurnaceReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs the white furnace checks on one material at one view angle.
pub fn evaluate(material: &str, bsdf: &StandardBSDF, theta_deg: Float, settings: &FurnaceSettings, seed: u64) -> FurnaceReport {
    let theta = theta_deg * PI / 180.0;
    let wo = Vector3f::new(theta.sin(), 0.0, theta.cos());
    let mut rng = LcgRng::new(seed);
    let stats = measure(bsdf, &wo, settings.samples, &mut rng, settings.tolerance);
    let bound = energy_bound(bsdf);
    let failures = stats.failures(active_lobes(bsdf) == 1, bound);
    if !failures.is_empty() {
        log::debug!("{} at {} deg failed: {:?}, {:?}", material, theta_deg, failures, stats);
    }
    FurnaceReport {
        material: material.to_string(),
        theta_deg,
        stats,
        energy_bound: bound,
        failures,
    }
}

/// Checks every material of `library` at every angle of `VIEW_ANGLES_DEG`
/// on all available cores. Reports come back in library order.
pub fn run_furnace_suite(library: &MaterialLibrary, settings: &FurnaceSettings) -> Vec<FurnaceReport> {
    let mut cases: Vec<(&str, StandardBSDF, Float)> = Vec::new();
    for (name, material) in library.iter() {
        let bsdf = library.config.setup(material);
        for theta_deg in VIEW_ANGLES_DEG.iter() {
            cases.push((name, bsdf, *theta_deg));
        }
    }
    let total_cases = cases.len();
    if total_cases == 0 {
        return Vec::new();
    }
    log::info!("Running {} furnace cases with {} samples each.", total_cases, settings.samples);

    let progress = ProgressBar::new(total_cases as u64);
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} cases")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let next_case = AtomicUsize::new(0);
    let thread_count = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(total_cases);
    let (tx, rx) = mpsc::channel::<(usize, FurnaceReport)>();
    let mut reports: Vec<Option<FurnaceReport>> = vec![None; total_cases];

    thread::scope(|scope| {
        for _ in 0..thread_count {
            let tx = tx.clone();
            let next_case = &next_case;
            let cases = &cases;
            scope.spawn(move || {
                loop {
                    let case_index = next_case.fetch_add(1, Ordering::Relaxed);
                    if case_index >= total_cases {
                        break;
                    }

                    let (name, bsdf, theta_deg) = &cases[case_index];
                    let seed = (settings.seed << 16) ^ case_index as u64;
                    let report = evaluate(name, bsdf, *theta_deg, settings, seed);
                    if tx.send((case_index, report)).is_err() {
                        break;
                    }
                }
            });
        }

        drop(tx);
        for (case_index, report) in rx.iter() {
            reports[case_index] = Some(report);
            progress.inc(1);
        }
    });
    progress.finish_and_clear();

    reports.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::material::MaterialDescription;
    use crate::io::material_loader::parse_material_library;
    use crate::materials::frostbite_diffuse::FrostbiteDiffuseBRDF;
    use crate::materials::lambertian_diffuse::LambertianDiffuseBRDF;
    use crate::materials::microfacet::{HalfVectorSampling, MaskingFunction};
    use crate::materials::specular_reflection::SpecularReflectionMicrofacet;
    use crate::materials::specular_reflection_transmission::SpecularReflectionTransmissionMicrofacet;
    use crate::materials::standard::BSDFConfig;
    use crate::math::constants::MIN_GGX_ALPHA;

    const ROUGHNESS: [Float; 3] = [0.01, 0.3, 0.9];

    fn alpha(roughness: Float) -> Float {
        (roughness * roughness).max(MIN_GGX_ALPHA)
    }

    fn view(theta_deg: Float) -> Vector3f {
        let theta = theta_deg * PI / 180.0;
        Vector3f::new(theta.sin(), 0.0, theta.cos())
    }

    fn assert_energy_bounded(stats: &FurnaceStats, bound: Float) {
        assert_eq!(stats.non_finite, 0);
        assert!(stats.albedo.min_component() >= 0.0, "{:?}", stats);
        assert!(stats.albedo.max_component() <= bound + 0.03, "{:?}", stats);
    }

    #[test]
    fn test_lambert_albedo_matches_base_color() {
        let lobe = LambertianDiffuseBRDF::new(RGBSpectrum::new(0.9, 0.5, 0.1));
        let mut rng = LcgRng::new(3);
        let stats = measure(&lobe, &view(30.0), 8192, &mut rng, 1e-3);
        assert_eq!(stats.pdf_mismatches, 0);
        assert_eq!(stats.weight_mismatches, 0);
        assert!((stats.albedo[0] - 0.9).abs() < 0.01);
        assert!((stats.albedo[2] - 0.1).abs() < 0.01);
    }

    #[test]
    fn test_diffuse_energy_bounds() {
        for roughness in ROUGHNESS.iter() {
            for theta_deg in [30.0, 60.0].iter() {
                let mut rng = LcgRng::new(5);
                let frostbite = FrostbiteDiffuseBRDF::new(RGBSpectrum::one(), *roughness);
                let stats = measure(&frostbite, &view(*theta_deg), 8192, &mut rng, 1e-4);
                assert_eq!(stats.pdf_mismatches, 0);
                assert_eq!(stats.weight_mismatches, 0);
                assert_energy_bounded(&stats, 1.0);
            }
        }
        let mut rng = LcgRng::new(5);
        let lambert = LambertianDiffuseBRDF::new(RGBSpectrum::one());
        assert_energy_bounded(&measure(&lambert, &view(60.0), 8192, &mut rng, 1e-3), 1.0);
    }

    #[test]
    fn test_specular_energy_bounds() {
        for roughness in ROUGHNESS.iter() {
            for sampling in [HalfVectorSampling::Ndf, HalfVectorSampling::Vndf].iter() {
                let conductor = SpecularReflectionMicrofacet::new(
                    RGBSpectrum::one(), alpha(*roughness), MaskingFunction::SmithGGXCorrelated, *sampling);
                let glass = SpecularReflectionTransmissionMicrofacet::new(
                    RGBSpectrum::one(), alpha(*roughness), 1.0 / 1.5, MaskingFunction::SmithGGXSeparable, *sampling);
                let mut rng = LcgRng::new(11);
                assert_energy_bounded(&measure(&conductor, &view(45.0), 8192, &mut rng, 1e-2), 1.0);
                assert_energy_bounded(&measure(&glass, &view(45.0), 8192, &mut rng, 1e-2), 1.0);
            }
        }
    }

    #[test]
    fn test_rough_glass_keeps_most_energy() {
        let glass = SpecularReflectionTransmissionMicrofacet::new(
            RGBSpectrum::one(), alpha(0.3), 1.0 / 1.5, MaskingFunction::SmithGGXCorrelated, HalfVectorSampling::Vndf);
        let mut rng = LcgRng::new(13);
        let stats = measure(&glass, &view(0.0), 16384, &mut rng, 1e-2);
        // eta^2 compresses the transmitted radiance by roughly 1/2.25.
        assert!(stats.albedo[0] > 0.4 && stats.albedo[0] < 0.6, "{:?}", stats);
    }

    #[test]
    fn test_failures_flag_broken_stats() {
        let good = FurnaceStats {
            samples: 1000,
            accepted: 1000,
            albedo: RGBSpectrum::splat(0.5),
            albedo_estimate: RGBSpectrum::splat(0.5),
            pdf_mismatches: 0,
            weight_mismatches: 0,
            non_finite: 0,
        };
        assert!(good.failures(true, 1.0).is_empty());

        let broken = FurnaceStats {
            albedo: RGBSpectrum::splat(1.5),
            pdf_mismatches: 100,
            non_finite: 1,
            ..good
        };
        let failures = broken.failures(false, 1.0);
        assert!(failures.contains(&FurnaceFailure::NonFinite));
        assert!(failures.contains(&FurnaceFailure::PdfMismatch));
        assert!(failures.contains(&FurnaceFailure::EstimatorMismatch));
        assert!(failures.contains(&FurnaceFailure::Energy));

        let noisy_weights = FurnaceStats { weight_mismatches: 20, ..good };
        assert_eq!(noisy_weights.failures(true, 1.0), vec![FurnaceFailure::WeightMismatch]);
        assert!(noisy_weights.failures(false, 1.0).is_empty());
    }

    #[test]
    fn test_energy_bound_of_standard_materials() {
        let config = BSDFConfig {
            diffuse: DiffuseModel::Lambert,
            masking: MaskingFunction::SmithGGXCorrelated,
            sampling: HalfVectorSampling::Ndf,
        };
        let glass = MaterialDescription { specular_transmission: 1.0, ..Default::default() };
        assert!((energy_bound(&config.setup(&glass)) - 1.0).abs() < 1e-6);

        let plastic = MaterialDescription { diffuse: RGBSpectrum::splat(0.8), ..Default::default() };
        assert!((energy_bound(&config.setup(&plastic)) - 1.8).abs() < 1e-6);
    }

    #[test]
    fn test_suite_passes_on_sane_library() {
        let xml = r#"
<library>
    <config diffuse="lambert" masking="correlated" sampling="vndf"/>
    <bsdf type="standard" id="plastic">
        <rgb name="diffuse" value="0.8 0.7 0.6"/>
        <float name="roughness" value="0.5"/>
    </bsdf>
    <bsdf type="metalrough" id="gold">
        <rgb name="base_color" value="1.0 0.78 0.34"/>
        <float name="metallic" value="1"/>
        <float name="roughness" value="0.3"/>
    </bsdf>
    <bsdf type="standard" id="glass">
        <float name="ior" value="1.5"/>
        <float name="specular_transmission" value="1"/>
        <float name="roughness" value="0.3"/>
    </bsdf>
</library>
"#;
        let library = parse_material_library(xml).expect("failed to parse library");
        let settings = FurnaceSettings { samples: 16384, seed: 7, tolerance: 1e-2 };
        let reports = run_furnace_suite(&library, &settings);
        assert_eq!(reports.len(), 3 * VIEW_ANGLES_DEG.len());
        assert_eq!(reports[0].material, "plastic");
        assert_eq!(reports[0].theta_deg, 0.0);
        assert_eq!(reports.last().map(|r| r.material.as_str()), Some("glass"));
        for report in reports.iter() {
            assert!(report.passed(), "{} at {}: {:?} {:?}", report.material, report.theta_deg, report.failures, report.stats);
        }
    }

    #[test]
    fn test_empty_library_has_no_reports() {
        let library = MaterialLibrary::new(BSDFConfig::default());
        assert!(run_furnace_suite(&library, &FurnaceSettings::default()).is_empty());
    }
}
