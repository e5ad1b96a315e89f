//! Packages, the validity evaluator and the size classifier.

use std::fmt;

use crate::constraints::{ConstraintSet, ConstraintSpec, Limit};

const OUNCES_PER_POUND: f64 = 16.0;
const GRAMS_PER_POUND: f64 = 453.592_37;
const CENTIMETRES_PER_INCH: f64 = 2.54;

/// Longest side above which a package is `LARGE`.
pub const LARGE_LENGTH_INCHES: f64 = 12.0;
/// Length plus girth above which a package is `LARGE`.
pub const LARGE_LENGTH_PLUS_GIRTH_INCHES: f64 = 108.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitSystem {
    /// Ounces and inches.
    #[default]
    Imperial,
    /// Grams and centimetres.
    Metric,
}

/// A package to be rated. Stored in pounds and inches, with dimensions sorted
/// so `length >= width >= height`.
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pounds: f64,
    inches: [f64; 3],
}

impl Package {
    pub fn new(weight: f64, dimensions: [f64; 3], units: UnitSystem) -> Self {
        let (pounds, mut inches) = match units {
            UnitSystem::Imperial => (weight / OUNCES_PER_POUND, dimensions),
            UnitSystem::Metric => (weight / GRAMS_PER_POUND, dimensions.map(|cm| cm / CENTIMETRES_PER_INCH)),
        };
        inches.sort_by(|a, b| b.total_cmp(a));
        Package { pounds, inches }
    }

    /// Weight in ounces, dimensions in inches (any order).
    pub fn imperial(ounces: f64, dimensions: [f64; 3]) -> Self {
        Self::new(ounces, dimensions, UnitSystem::Imperial)
    }

    /// Weight in grams, dimensions in centimetres (any order).
    pub fn metric(grams: f64, dimensions: [f64; 3]) -> Self {
        Self::new(grams, dimensions, UnitSystem::Metric)
    }

    pub fn pounds(&self) -> f64 {
        self.pounds
    }

    pub fn ounces(&self) -> f64 {
        self.pounds * OUNCES_PER_POUND
    }

    pub fn length(&self) -> f64 {
        self.inches[0]
    }

    pub fn width(&self) -> f64 {
        self.inches[1]
    }

    pub fn height(&self) -> f64 {
        self.inches[2]
    }

    pub fn max_dimension(&self) -> f64 {
        self.inches[0]
    }

    /// Twice the sum of the two shorter sides.
    pub fn girth(&self) -> f64 {
        2.0 * (self.width() + self.height())
    }

    pub fn length_plus_girth(&self) -> f64 {
        self.length() + self.girth()
    }

    pub fn length_plus_width_plus_height(&self) -> f64 {
        self.length() + self.width() + self.height()
    }

    /// The package quantity a limit bounds.
    pub fn measure(&self, limit: Limit) -> f64 {
        match limit {
            Limit::Length => self.length(),
            Limit::Width => self.width(),
            Limit::Height => self.height(),
            Limit::Weight => self.pounds(),
            Limit::LengthPlusGirth => self.length_plus_girth(),
            Limit::LengthPlusWidthPlusHeight => self.length_plus_width_plus_height(),
        }
    }

    /// True when every bound in `set` is met. Bounds are inclusive.
    pub fn fits(&self, set: &ConstraintSet) -> bool {
        set.iter().all(|(limit, bound)| self.measure(limit) <= bound)
    }

    pub fn size_code(&self) -> SizeCode {
        SizeCode::classify(self)
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}oz {}x{}x{}in", self.ounces(), self.length(), self.width(), self.height())
    }
}

/// Valid iff the package meets at least one alternative of `spec`.
pub fn is_valid(package: &Package, spec: &ConstraintSpec) -> bool {
    spec.alternatives().iter().any(|set| package.fits(set))
}

/// Coarse size code sent in the outbound rate request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeCode {
    Regular,
    Large,
}

impl SizeCode {
    pub fn classify(package: &Package) -> Self {
        if package.max_dimension() > LARGE_LENGTH_INCHES
            || package.length_plus_girth() > LARGE_LENGTH_PLUS_GIRTH_INCHES
        {
            SizeCode::Large
        } else {
            SizeCode::Regular
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SizeCode::Regular => "REGULAR",
            SizeCode::Large => "LARGE",
        }
    }
}

impl fmt::Display for SizeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> Package {
        Package::imperial(32.0, [10.0, 7.0, 2.0])
    }

    #[test]
    fn dimensions_are_sorted_and_derived() {
        let p = Package::imperial(16.0, [2.0, 10.0, 7.0]);
        assert_eq!((p.length(), p.width(), p.height()), (10.0, 7.0, 2.0));
        assert_eq!(p.pounds(), 1.0);
        assert_eq!(p.girth(), 18.0);
        assert_eq!(p.length_plus_girth(), 28.0);
        assert_eq!(p.length_plus_width_plus_height(), 19.0);
    }

    #[test]
    fn metric_is_converted_at_construction() {
        let p = Package::metric(453.592_37, [25.4, 2.54, 5.08]);
        assert!((p.pounds() - 1.0).abs() < 1e-9);
        assert!((p.length() - 10.0).abs() < 1e-9);
        assert!((p.width() - 2.0).abs() < 1e-9);
        assert!((p.height() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn weight_bound_is_inclusive() {
        let spec = ConstraintSpec::Single(ConstraintSet::new().with(Limit::Weight, 70.0));

        assert!(is_valid(&Package::imperial(70.0 * 16.0, [10.0, 7.0, 2.0]), &spec));
        assert!(!is_valid(&Package::imperial(70.0 * 16.0 + 1.0, [10.0, 7.0, 2.0]), &spec));
        assert!(is_valid(&Package::imperial(70.0 * 16.0 - 1.0, [10.0, 7.0, 2.0]), &spec));
    }

    #[test]
    fn every_axis_bound_is_inclusive() {
        let p = book();
        for limit in Limit::ALL {
            let exact = ConstraintSet::new().with(limit, p.measure(limit));
            assert!(p.fits(&exact), "{} at bound", limit);

            let tight = ConstraintSet::new().with(limit, p.measure(limit) - 0.01);
            assert!(!p.fits(&tight), "{} 0.01 over bound", limit);
        }
    }

    #[test]
    fn any_of_needs_one_alternative() {
        let envelope = ConstraintSet::new().with(Limit::Length, 12.5).with(Limit::Width, 9.5).with(Limit::Height, 0.75);
        let small_box = ConstraintSet::new().with(Limit::Length, 11.0).with(Limit::Width, 8.5).with(Limit::Height, 5.5);
        let flat_box =
            ConstraintSet::new().with(Limit::Length, 13.625).with(Limit::Width, 11.875).with(Limit::Height, 3.375);

        let p = Package::imperial(20.0, [12.0, 10.0, 3.0]);
        assert!(!is_valid(&p, &ConstraintSpec::AnyOf(vec![envelope.clone(), small_box.clone()])));
        assert!(is_valid(&p, &ConstraintSpec::AnyOf(vec![envelope, small_box, flat_box])));
        assert!(!is_valid(&p, &ConstraintSpec::AnyOf(Vec::new())));
        assert!(is_valid(&p, &ConstraintSpec::unconstrained()));
    }

    #[test]
    fn validity_is_monotonic() {
        let spec = ConstraintSpec::Single(
            ConstraintSet::new()
                .with(Limit::Weight, 4.0)
                .with(Limit::Length, 24.0)
                .with(Limit::LengthPlusWidthPlusHeight, 36.0),
        );

        let mut ounces = 64.0;
        let mut dims = [24.0, 8.0, 4.0];
        assert!(is_valid(&Package::imperial(ounces, dims), &spec));

        for step in 0..20 {
            ounces -= 2.5;
            dims[step % 3] *= 0.9;
            assert!(is_valid(&Package::imperial(ounces.max(0.0), dims), &spec), "step {}", step);
        }
    }

    #[test]
    fn size_codes() {
        assert_eq!(SizeCode::classify(&Package::imperial(16.0, [12.0, 12.0, 12.0])), SizeCode::Regular);
        assert_eq!(SizeCode::classify(&Package::imperial(16.0, [12.01, 1.0, 1.0])), SizeCode::Large);
        assert_eq!(book().size_code().as_str(), "REGULAR");
        assert_eq!(SizeCode::Large.to_string(), "LARGE");
    }
}
