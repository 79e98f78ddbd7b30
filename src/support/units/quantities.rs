use uom::{
    si::{ISQ, Quantity, SI, f64::HeatCapacity, heat_capacity::joule_per_kelvin},
    typenum::{N1, P2, Z0},
};

/// Thermal diffusivity, m²/s in SI.
pub type ThermalDiffusivity = Quantity<ISQ<P2, Z0, N1, Z0, Z0, Z0, Z0>, SI<f64>, f64>;

/// Boltzmann constant `k_B`, exact since the 2019 SI redefinition.
#[must_use]
pub fn boltzmann_constant() -> HeatCapacity {
    HeatCapacity::new::<joule_per_kelvin>(1.380_649e-23)
}

/// Builds a [`ThermalDiffusivity`] from a value in m²/s.
#[must_use]
pub fn diffusivity_from_si(value: f64) -> ThermalDiffusivity {
    ThermalDiffusivity {
        dimension: std::marker::PhantomData,
        units: std::marker::PhantomData,
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{
        area::square_meter,
        f64::{Area, Time},
        time::second,
    };

    #[test]
    fn diffusivity_from_area_over_time() {
        let alpha: ThermalDiffusivity =
            Area::new::<square_meter>(2e-6) / Time::new::<second>(2.0);
        assert_relative_eq!(alpha.value, 1e-6);
        assert_relative_eq!(diffusivity_from_si(1e-6).value, alpha.value);
    }
}
