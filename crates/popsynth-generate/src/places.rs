use rand::{Rng, RngCore};
use tracing::debug;

use popsynth_core::{Place, PlaceKind, SpatialBounds};

use crate::errors::GenerationError;

/// Generate `count` places of one kind.
///
/// IDs run `1..=count` in generation order; coordinates are drawn uniformly
/// from the closed rectangle.
pub fn generate_places(
    kind: PlaceKind,
    count: u32,
    bounds: &SpatialBounds,
    rng: &mut dyn RngCore,
) -> Result<Vec<Place>, GenerationError> {
    for (axis, axis_bounds) in [("x", &bounds.x), ("y", &bounds.y)] {
        if !axis_bounds.is_valid() {
            return Err(GenerationError::InvalidInput(format!(
                "{kind} {axis} bounds {axis_bounds} must be finite with min < max and a finite width"
            )));
        }
    }

    let places = (1..=count)
        .map(|id| Place {
            kind,
            id,
            x: rng.random_range(bounds.x.min..=bounds.x.max),
            y: rng.random_range(bounds.y.min..=bounds.y.max),
        })
        .collect::<Vec<_>>();

    debug!(kind = %kind, count, "places generated");
    Ok(places)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use popsynth_core::Bounds;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn bounds() -> SpatialBounds {
        SpatialBounds::new(Bounds::new(10.0, 150.0), Bounds::new(100.0, 120.0))
    }

    #[test]
    fn ids_are_contiguous_from_one() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let places =
            generate_places(PlaceKind::Household, 250, &bounds(), &mut rng).expect("generate");

        let ids = places.iter().map(|place| place.id).collect::<BTreeSet<_>>();
        assert_eq!(ids, (1..=250).collect::<BTreeSet<_>>());
        assert!(places.iter().all(|place| place.kind == PlaceKind::Household));
    }

    #[test]
    fn coordinates_stay_inside_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let bounds = bounds();
        let places =
            generate_places(PlaceKind::Workplace, 1_000, &bounds, &mut rng).expect("generate");
        assert!(places.iter().all(|place| bounds.contains(place.x, place.y)));
    }

    #[test]
    fn zero_count_yields_no_places() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let places = generate_places(PlaceKind::School, 0, &bounds(), &mut rng).expect("generate");
        assert!(places.is_empty());
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let bounds = SpatialBounds::new(Bounds::new(150.0, 10.0), Bounds::new(100.0, 120.0));
        let err = generate_places(PlaceKind::School, 2, &bounds, &mut rng)
            .expect_err("inverted bounds");
        assert!(matches!(err, GenerationError::InvalidInput(_)));
    }

    #[test]
    fn bounds_with_overflowing_width_are_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let bounds = SpatialBounds::new(Bounds::new(-1e308, 1e308), Bounds::new(100.0, 120.0));
        let err = generate_places(PlaceKind::Household, 3, &bounds, &mut rng)
            .expect_err("width overflows to infinity");
        assert!(matches!(err, GenerationError::InvalidInput(_)));
    }
}
