use std::f64::consts::PI;
use urg_data::SensorParameters;

pub fn degrees_to_radians(degree: f64) -> f64 {
    degree * PI / 180.
}

pub fn radians_to_degrees(radian: f64) -> f64 {
    radian * 180. / PI
}

/// Angular layout of the sensor steps, fixed once a connection is open.
///
/// Step `front_step` points along angle zero and one full revolution spans
/// `area_resolution` steps. Steps outside `min_step..=max_step` are clamped
/// to the nearest valid step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepTable {
    min_step: i32,
    max_step: i32,
    front_step: i32,
    area_resolution: i32,
}

impl StepTable {
    /// Returns `None` when the parameters cannot describe a valid step range.
    pub fn new(parameters: &SensorParameters) -> Option<StepTable> {
        if parameters.area_resolution <= 0 || parameters.min_step > parameters.max_step {
            return None;
        }
        Some(StepTable {
            min_step: parameters.min_step,
            max_step: parameters.max_step,
            front_step: parameters.front_step,
            area_resolution: parameters.area_resolution,
        })
    }

    pub fn min_step(&self) -> i32 {
        self.min_step
    }

    pub fn max_step(&self) -> i32 {
        self.max_step
    }

    pub fn clamp_step(&self, step: i64) -> i32 {
        // The bounds are i32, so the clamped value always fits.
        step.clamp(self.min_step.into(), self.max_step.into()) as i32
    }

    fn radians_per_step(&self) -> f64 {
        2. * PI / (self.area_resolution as f64)
    }

    pub fn step_to_angle(&self, step: i32) -> f64 {
        let step = self.clamp_step(step.into());
        ((step - self.front_step) as f64) * self.radians_per_step()
    }

    pub fn angle_to_step(&self, radian: f64) -> i32 {
        let offset = (radian / self.radians_per_step()).round() as i64;
        self.clamp_step(offset.saturating_add(i64::from(self.front_step)))
    }

    pub fn step_to_degree(&self, step: i32) -> f64 {
        radians_to_degrees(self.step_to_angle(step))
    }

    pub fn degree_to_step(&self, degree: f64) -> i32 {
        self.angle_to_step(degrees_to_radians(degree))
    }

    /// Angle of the `index`-th sample of a scan covering the full step range.
    pub fn index_to_angle(&self, index: usize) -> f64 {
        let step = i64::from(self.min_step).saturating_add(index.try_into().unwrap_or(i64::MAX));
        self.step_to_angle(self.clamp_step(step))
    }

    pub fn angle_to_index(&self, radian: f64) -> usize {
        (self.angle_to_step(radian) - self.min_step) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utm_parameters() -> SensorParameters {
        SensorParameters {
            min_step: 0,
            max_step: 1080,
            front_step: 540,
            area_resolution: 1440,
            min_distance: 23,
            max_distance: 60000,
            scan_usec: 25000,
            max_data_size: 1081,
            max_echo_size: 3,
        }
    }

    #[test]
    fn test_degree_conversion() {
        assert!((degrees_to_radians(180.) - PI).abs() < 1e-12);
        assert!((radians_to_degrees(PI / 2.) - 90.).abs() < 1e-12);
    }

    #[test]
    fn test_step_to_angle() {
        let table = StepTable::new(&utm_parameters()).unwrap();
        assert_eq!(table.step_to_angle(540), 0.);
        assert!((table.step_to_degree(900) - 90.).abs() < 1e-9);
        assert!((table.step_to_degree(0) + 135.).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip() {
        let table = StepTable::new(&utm_parameters()).unwrap();
        for step in [0, 1, 270, 539, 540, 541, 1000, 1080] {
            assert_eq!(table.angle_to_step(table.step_to_angle(step)), step);
        }
        assert_eq!(table.degree_to_step(table.step_to_degree(123)), 123);
    }

    #[test]
    fn test_clamping() {
        let table = StepTable::new(&utm_parameters()).unwrap();
        assert_eq!(table.step_to_angle(-50), table.step_to_angle(0));
        assert_eq!(table.step_to_angle(5000), table.step_to_angle(1080));
        assert_eq!(table.angle_to_step(10. * PI), 1080);
        assert_eq!(table.angle_to_step(-10. * PI), 0);
    }

    #[test]
    fn test_extreme_angles_clamp() {
        let table = StepTable::new(&utm_parameters()).unwrap();
        assert_eq!(table.angle_to_step(f64::INFINITY), 1080);
        assert_eq!(table.angle_to_step(f64::MAX), 1080);
        assert_eq!(table.angle_to_step(f64::NEG_INFINITY), 0);
        assert_eq!(table.angle_to_step(f64::MIN), 0);
        assert_eq!(table.degree_to_step(f64::INFINITY), 1080);
    }

    #[test]
    fn test_index_to_angle() {
        let table = StepTable::new(&utm_parameters()).unwrap();
        assert_eq!(table.index_to_angle(540), 0.);
        assert_eq!(table.index_to_angle(0), table.step_to_angle(0));
        assert_eq!(table.index_to_angle(usize::MAX), table.step_to_angle(1080));
        assert_eq!(table.angle_to_index(0.), 540);
    }

    #[test]
    fn test_invalid_parameters() {
        let mut parameters = utm_parameters();
        parameters.area_resolution = 0;
        assert!(StepTable::new(&parameters).is_none());

        let mut parameters = utm_parameters();
        parameters.min_step = 2000;
        assert!(StepTable::new(&parameters).is_none());
    }
}
