use rand::seq::index;
use rand::{Rng, RngCore};
use tracing::debug;

use popsynth_core::{Agent, Place, PlaceKind};

use crate::age::AgeSampler;
use crate::errors::GenerationError;

/// Agent totals requested from the assigner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentRequest {
    pub n_agents: u32,
    pub n_students: u32,
    pub n_workers: u32,
    pub n_infected: u32,
}

impl AssignmentRequest {
    fn check(
        &self,
        households: &[Place],
        schools: &[Place],
        workplaces: &[Place],
    ) -> Result<(), GenerationError> {
        for (label, requested) in [
            ("students", self.n_students),
            ("workers", self.n_workers),
            ("infected", self.n_infected),
        ] {
            if requested > self.n_agents {
                return Err(GenerationError::InvalidInput(format!(
                    "{requested} {label} requested but only {} agents exist",
                    self.n_agents
                )));
            }
        }

        for (needed, places, kind) in [
            (self.n_agents, households, PlaceKind::Household),
            (self.n_students, schools, PlaceKind::School),
            (self.n_workers, workplaces, PlaceKind::Workplace),
        ] {
            if needed > 0 && places.is_empty() {
                return Err(GenerationError::InvalidInput(format!(
                    "{needed} agents need a {kind} but none exist"
                )));
            }
            if let Some(place) = places.iter().find(|place| place.kind != kind) {
                return Err(GenerationError::InvalidInput(format!(
                    "{} {} passed where a {kind} was expected",
                    place.kind, place.id
                )));
            }
        }

        Ok(())
    }
}

/// Create agents and attach them to places.
///
/// Every agent lives in a household drawn with repetition (households may
/// stay empty) and copies its coordinates. Students, workers, and infected
/// agents are three independent draws without replacement of exactly the
/// requested size. All inputs are checked before any agent is created.
pub fn assign_population(
    request: &AssignmentRequest,
    households: &[Place],
    schools: &[Place],
    workplaces: &[Place],
    ages: &AgeSampler,
    rng: &mut dyn RngCore,
) -> Result<Vec<Agent>, GenerationError> {
    request.check(households, schools, workplaces)?;

    let n_agents = request.n_agents as usize;
    let mut agents = Vec::with_capacity(n_agents);
    for _ in 0..n_agents {
        let house = &households[rng.random_range(0..households.len())];
        agents.push(Agent {
            is_student: false,
            is_worker: false,
            age: 0,
            x: house.x,
            y: house.y,
            household_id: house.id,
            school_id: 0,
            workplace_id: 0,
            infected: false,
        });
    }

    for idx in index::sample(rng, n_agents, request.n_students as usize) {
        let school = &schools[rng.random_range(0..schools.len())];
        let agent = &mut agents[idx];
        agent.is_student = true;
        agent.school_id = school.id;
    }

    for idx in index::sample(rng, n_agents, request.n_workers as usize) {
        let workplace = &workplaces[rng.random_range(0..workplaces.len())];
        let agent = &mut agents[idx];
        agent.is_worker = true;
        agent.workplace_id = workplace.id;
    }

    for idx in index::sample(rng, n_agents, request.n_infected as usize) {
        agents[idx].infected = true;
    }

    for agent in &mut agents {
        agent.age = ages.sample(rng);
    }

    debug!(
        agents = agents.len(),
        students = request.n_students,
        workers = request.n_workers,
        infected = request.n_infected,
        "agents assigned"
    );
    Ok(agents)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use popsynth_config::AgePolicy;
    use popsynth_core::{Bounds, SpatialBounds};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::places::generate_places;

    struct Fixture {
        households: Vec<Place>,
        schools: Vec<Place>,
        workplaces: Vec<Place>,
        rng: ChaCha8Rng,
    }

    fn fixture(nh: u32, ns: u32, nw: u32) -> Fixture {
        let bounds = SpatialBounds::new(Bounds::new(10.0, 150.0), Bounds::new(100.0, 120.0));
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let households =
            generate_places(PlaceKind::Household, nh, &bounds, &mut rng).expect("houses");
        let schools = generate_places(PlaceKind::School, ns, &bounds, &mut rng).expect("schools");
        let workplaces =
            generate_places(PlaceKind::Workplace, nw, &bounds, &mut rng).expect("workplaces");
        Fixture {
            households,
            schools,
            workplaces,
            rng,
        }
    }

    fn ages() -> AgeSampler {
        AgeSampler::from_policy(&AgePolicy::default()).expect("default policy")
    }

    fn request(n_agents: u32, n_students: u32, n_workers: u32, n_infected: u32) -> AssignmentRequest {
        AssignmentRequest {
            n_agents,
            n_students,
            n_workers,
            n_infected,
        }
    }

    #[test]
    fn aggregate_counts_match_request_exactly() {
        let mut fx = fixture(50, 4, 20);
        let agents = assign_population(
            &request(400, 120, 280, 37),
            &fx.households,
            &fx.schools,
            &fx.workplaces,
            &ages(),
            &mut fx.rng,
        )
        .expect("assign");

        assert_eq!(agents.len(), 400);
        assert_eq!(agents.iter().filter(|a| a.is_student).count(), 120);
        assert_eq!(agents.iter().filter(|a| a.is_worker).count(), 280);
        assert_eq!(agents.iter().filter(|a| a.infected).count(), 37);
    }

    #[test]
    fn affiliation_ids_agree_with_flags() {
        let mut fx = fixture(5, 2, 6);
        let agents = assign_population(
            &request(10, 3, 6, 3),
            &fx.households,
            &fx.schools,
            &fx.workplaces,
            &ages(),
            &mut fx.rng,
        )
        .expect("assign");

        for agent in &agents {
            assert_eq!(agent.is_student, agent.school_id != 0);
            assert_eq!(agent.is_worker, agent.workplace_id != 0);
            assert!(agent.school_id <= 2);
            assert!(agent.workplace_id <= 6);
        }
    }

    #[test]
    fn agents_live_at_their_household() {
        let mut fx = fixture(25, 1, 1);
        let houses = fx
            .households
            .iter()
            .map(|house| (house.id, (house.x, house.y)))
            .collect::<HashMap<_, _>>();
        let agents = assign_population(
            &request(300, 0, 0, 0),
            &fx.households,
            &fx.schools,
            &fx.workplaces,
            &ages(),
            &mut fx.rng,
        )
        .expect("assign");

        for agent in &agents {
            let (x, y) = houses[&agent.household_id];
            assert_eq!((agent.x, agent.y), (x, y));
        }
    }

    #[test]
    fn full_selection_marks_every_agent() {
        let mut fx = fixture(3, 1, 1);
        let agents = assign_population(
            &request(8, 8, 8, 8),
            &fx.households,
            &fx.schools,
            &fx.workplaces,
            &ages(),
            &mut fx.rng,
        )
        .expect("assign");
        assert!(agents.iter().all(|a| a.is_student && a.is_worker && a.infected));
    }

    #[test]
    fn infected_above_agents_fails_before_generation() {
        let mut fx = fixture(5, 2, 6);
        let err = assign_population(
            &request(10, 3, 6, 11),
            &fx.households,
            &fx.schools,
            &fx.workplaces,
            &ages(),
            &mut fx.rng,
        )
        .expect_err("too many infected");
        assert!(matches!(err, GenerationError::InvalidInput(message) if message.contains("infected")));
    }

    #[test]
    fn students_without_schools_fail() {
        let mut fx = fixture(5, 0, 6);
        let err = assign_population(
            &request(10, 1, 0, 0),
            &fx.households,
            &fx.schools,
            &fx.workplaces,
            &ages(),
            &mut fx.rng,
        )
        .expect_err("no schools");
        assert!(matches!(err, GenerationError::InvalidInput(_)));
    }

    #[test]
    fn places_of_the_wrong_kind_are_rejected() {
        let mut fx = fixture(5, 2, 6);
        let err = assign_population(
            &request(10, 3, 6, 3),
            &fx.households,
            &fx.workplaces,
            &fx.schools,
            &ages(),
            &mut fx.rng,
        )
        .expect_err("swapped place sets");
        assert!(matches!(err, GenerationError::InvalidInput(_)));
    }
}
