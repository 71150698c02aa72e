use crate::math::model::{ContinuedFraction, Model, SimpleFraction};

pub struct DemoCase {
    pub model: Model,
    pub x: f64,
}

fn cases(model: Model, points: &[f64]) -> impl Iterator<Item = DemoCase> + '_ {
    points.iter().map(move |&x| DemoCase { model, x })
}

/// Fixed evaluations shown by the demo mode. The last two hit the middle and
/// outer checkpoints of the continued fraction.
pub fn battery() -> Vec<DemoCase> {
    let simple = Model::Simple(SimpleFraction::new(2.0));
    let continued = Model::Continued(ContinuedFraction::new(1.0, 2.0, 3.0));

    cases(simple, &[1.0, 0.5, -4.0, 0.0])
        .chain(cases(continued, &[1.0, 2.0, -1.0, 0.0]))
        .chain(cases(Model::Continued(ContinuedFraction::new(1.0, 1.0, -1.0)), &[1.0]))
        .chain(cases(Model::Continued(ContinuedFraction::new(1.0, -2.0, 1.0)), &[1.0]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::model::{Fraction, Stage};

    #[test]
    fn battery_covers_every_checkpoint() {
        let stages: Vec<Stage> = battery()
            .iter()
            .filter_map(|case| case.model.evaluate(case.x).err())
            .map(|e| e.stage)
            .collect();
        for stage in [Stage::Single, Stage::Innermost, Stage::Middle, Stage::Outer] {
            assert!(stages.contains(&stage), "missing {stage:?}");
        }
    }

    #[test]
    fn battery_has_successful_evaluations() {
        let ok = battery()
            .iter()
            .filter(|case| case.model.evaluate(case.x).is_ok())
            .count();
        assert_eq!(ok, 6);
    }
}
