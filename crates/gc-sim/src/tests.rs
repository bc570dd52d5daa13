//! Integration tests for gc-sim.

use std::fs;
use std::path::Path;

use gc_agent::{Agent, Population};
use gc_core::{
    AgentId, AgentRng, DiseaseConfig, GeoPoint, GridConfig, OutbreakConfig, OutputConfig,
    PopulationConfig, RunConfig, SimConfig, TimingConfig, Tick,
};
use gc_population::{InteractionLog, PopulationBuilder, ScheduledInteraction};
use gc_spatial::{Cell, DualGrid, RiskMap};
use gc_trajectory::{MemorySource, PltDirectory, TrajectoryRecord};

use crate::{NoopObserver, SimBuilder, SimError, SimObserver, Simulation, StepSummary};

// ── Helpers ───────────────────────────────────────────────────────────────────

const PLT_HEADER: &str = "Geolife trajectory\nWGS 84\nAltitude is in Feet\nReserved 3\n0,2,255,My Track,0,0,2,8421376\n0\n";

/// 10×10 grid over [0, 1]², quarter-day steps, agent 0 is the index case.
fn test_config(steps: u64) -> SimConfig {
    SimConfig {
        grid:       GridConfig { resolution: 10, min_lat: 0.0, max_lat: 1.0, min_lon: 0.0, max_lon: 1.0 },
        timing:     TimingConfig { steps, step_days: 0.25, start_days: Some(0.0) },
        disease:    DiseaseConfig {
            spread_prob:           0.0,
            incubation_days:       0.0,
            infection_days:        1.0,
            fatality_rate:         0.0,
            immunity_prob:         1.0,
            ambient_exposure_prob: 0.0,
            baseline_age:          37.0,
        },
        population: PopulationConfig::default(),
        outbreak:   OutbreakConfig { index_agent: Some(0), confirmed_code: None },
        run:        RunConfig::default(),
        output:     OutputConfig::default(),
    }
}

fn grid_for(config: &SimConfig) -> DualGrid {
    DualGrid::new(config.grid.bounds(), config.grid.resolution).unwrap()
}

/// Stationary agents of age 0 (contact probability = spread probability).
fn residents(config: &SimConfig, points: &[(f64, f64)]) -> (DualGrid, Population) {
    let grid = grid_for(config);
    let mut pop = Population::new();
    for &(lat, lon) in points {
        let id = pop.next_id();
        let point = GeoPoint::new(lat, lon);
        pop.push(Agent::stationary(
            id,
            format!("r{}", id.0),
            point,
            grid.locate(point),
            0.0,
            AgentRng::new(1, id),
            0.0,
            &grid,
        ));
    }
    (grid, pop)
}

fn build(config: SimConfig, points: &[(f64, f64)]) -> Simulation {
    let (grid, pop) = residents(&config, points);
    SimBuilder::new(config).population(grid, pop).build().unwrap()
}

fn assert_grid_invariant(sim: &Simulation) {
    for agent in sim.population().iter() {
        let expected = usize::from(agent.is_alive());
        assert_eq!(sim.grid().grid_a().membership_count(agent.id()), expected, "agent {} grid A", agent.id());
        assert_eq!(sim.grid().grid_b().membership_count(agent.id()), expected, "agent {} grid B", agent.id());
    }
}

#[derive(Default)]
struct Recorder {
    starts:    Vec<Tick>,
    summaries: Vec<StepSummary>,
    snapshots: Vec<Tick>,
    risk:      Option<RiskMap>,
}

impl SimObserver for Recorder {
    fn on_step_start(&mut self, tick: Tick, _time_days: f64) {
        self.starts.push(tick);
    }
    fn on_step_end(&mut self, summary: &StepSummary) {
        self.summaries.push(*summary);
    }
    fn on_snapshot(&mut self, tick: Tick, _population: &Population) {
        self.snapshots.push(tick);
    }
    fn on_sim_end(&mut self, _final_tick: Tick, risk: &RiskMap) {
        self.risk = Some(risk.clone());
    }
}

// ── SimBuilder ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn index_case_is_infected_at_build() {
        let sim = build(test_config(4), &[(0.55, 0.55), (0.15, 0.15)]);
        assert_eq!(sim.index_case(), AgentId(0));
        assert!(sim.population().get(AgentId(0)).unwrap().is_infected());
        assert_eq!(sim.population().counts().infected, 1);
        assert_eq!(sim.clock.now_days(), 0.0);
    }

    #[test]
    fn mismatched_grid_is_rejected() {
        let config = test_config(4);
        let (_, pop) = residents(&config, &[(0.5, 0.5)]);
        let wrong = DualGrid::new(config.grid.bounds(), 20).unwrap();
        let result = SimBuilder::new(config).population(wrong, pop).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = test_config(4);
        config.disease.spread_prob = 1.5;
        let (grid, pop) = residents(&config, &[(0.5, 0.5)]);
        assert!(matches!(SimBuilder::new(config).population(grid, pop).build(), Err(SimError::Config(_))));
    }

    #[test]
    fn empty_population_cannot_seed_an_outbreak() {
        let config = test_config(4);
        let grid = grid_for(&config);
        let result = SimBuilder::new(config).population(grid, Population::new()).build();
        assert!(matches!(result, Err(SimError::Population(_))));
    }

    #[test]
    fn start_defaults_to_earliest_mobile_record() {
        let mut config = test_config(4);
        config.timing.start_days = None;
        let grid = grid_for(&config);
        let pop = {
            let mut b = PopulationBuilder::new(&grid, 1, &config.population);
            for (label, t0) in [("late", 12.0), ("early", 10.5)] {
                let records = vec![
                    TrajectoryRecord::new(0.5, 0.5, 0.0, t0),
                    TrajectoryRecord::new(0.5, 0.5, 0.0, t0 + 5.0),
                ];
                b.add_mobile(Box::new(MemorySource::single(label, records))).unwrap();
            }
            b.finish().unwrap()
        };
        let sim = SimBuilder::new(config).population(grid, pop).build().unwrap();
        assert_eq!(sim.clock.start_days, 10.5);
    }
}

// ── Disease progression and risk ──────────────────────────────────────────────

#[cfg(test)]
mod progression {
    use super::*;

    #[test]
    fn lone_agent_recovers_and_marks_its_cell() {
        let mut sim = build(test_config(8), &[(0.55, 0.55)]);
        assert_eq!(sim.population().get(AgentId(0)).unwrap().cells().a, Cell::new(5, 5));
        let mut rec = Recorder::default();
        let risk = sim.run(&mut rec).unwrap();

        let agent = sim.population().get(AgentId(0)).unwrap();
        assert!(agent.is_alive());
        assert!(!agent.is_infected());
        assert!(agent.is_immune());
        assert_eq!(rec.summaries.iter().map(|s| s.recoveries).sum::<usize>(), 1);
        // Four countdown steps plus the step that resolves the infection.
        assert_eq!(sim.risk().count(Cell::new(5, 5)), 5);

        assert_eq!(risk.get(Cell::new(5, 5)), 255);
        assert_eq!(risk.hot_cells(), 1);
        assert!(risk.values().iter().enumerate().all(|(i, &v)| v == 0 || i == 55));
        assert_eq!(rec.risk.as_ref(), Some(&risk));
    }

    #[test]
    fn recovery_without_immunity_returns_to_susceptible() {
        let mut config = test_config(8);
        config.disease.immunity_prob = 0.0;
        let mut sim = build(config, &[(0.55, 0.55)]);
        sim.run(&mut NoopObserver).unwrap();
        let agent = sim.population().get(AgentId(0)).unwrap();
        assert!(!agent.is_infected() && !agent.is_immune() && agent.is_alive());
    }

    #[test]
    fn certain_fatality_removes_the_agent() {
        let mut config = test_config(8);
        config.disease.fatality_rate = 1.0;
        config.disease.baseline_age = 1e-9;
        let mut sim = build(config, &[(0.55, 0.55)]);
        let (pop, _) = sim.population_mut();
        pop.get_mut(AgentId(0)).unwrap().set_age(50.0);

        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();
        assert_eq!(rec.summaries.iter().map(|s| s.deaths).sum::<usize>(), 1);
        assert_eq!(rec.summaries.last().unwrap().dead, 1);
        assert_grid_invariant(&sim);
    }

    #[test]
    fn outbreak_that_never_spreads_leaves_a_cold_map() {
        let mut config = test_config(6);
        config.disease.spread_prob = 1.0;
        let grid = grid_for(&config);
        let pop = {
            let mut b = PopulationBuilder::new(&grid, 1, &config.population);
            // The index case's data runs out before it ever moves.
            let records = vec![TrajectoryRecord::new(0.55, 0.55, 0.0, 0.0)];
            b.add_mobile(Box::new(MemorySource::single("brief", records))).unwrap();
            b.add_density_cells(
                &[gc_population::DensityCell { point: GeoPoint::new(0.15, 0.15), density: 200.0 }],
                0.0,
            );
            b.finish().unwrap()
        };
        let mut sim = SimBuilder::new(config).population(grid, pop).build().unwrap();
        assert!(sim.population().len() > 1);

        let mut rec = Recorder::default();
        let risk = sim.run(&mut rec).unwrap();
        assert!(sim.is_done());
        assert_eq!(rec.summaries.len(), 6);
        assert_eq!(rec.summaries[0].departures, 1);
        assert_eq!(rec.summaries.iter().map(|s| s.new_infections).sum::<usize>(), 0);
        assert!(!sim.population().get(AgentId(0)).unwrap().is_alive());
        assert_eq!(sim.population().counts().infected, 0);
        assert_eq!(sim.risk().total(), 0);
        assert_eq!(risk.max(), 0);
        assert_eq!(risk.hot_cells(), 0);
        assert_eq!(rec.risk.as_ref(), Some(&risk));
        assert_grid_invariant(&sim);
    }
}

// ── Transmission ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod transmission {
    use super::*;

    #[test]
    fn cell_mates_catch_it_and_strangers_do_not() {
        let mut config = test_config(1);
        config.disease.spread_prob = 1.0;
        let mut sim = build(config, &[(0.55, 0.55), (0.55, 0.55), (0.05, 0.95)]);
        let summary = sim.step().unwrap();
        assert_eq!(summary.new_infections, 1);
        assert!(sim.population().get(AgentId(1)).unwrap().is_infected());
        assert!(!sim.population().get(AgentId(2)).unwrap().is_infected());
    }

    #[test]
    fn grid_b_catches_neighbours_across_a_boundary() {
        let mut config = test_config(1);
        config.disease.spread_prob = 1.0;
        // Grid-A cells (4,4) and (5,5); both fall in Grid-B cell (5,5).
        let mut sim = build(config, &[(0.49, 0.49), (0.51, 0.51)]);
        let pop = sim.population();
        assert_ne!(pop.get(AgentId(0)).unwrap().cells().a, pop.get(AgentId(1)).unwrap().cells().a);
        assert_eq!(pop.get(AgentId(0)).unwrap().cells().b, pop.get(AgentId(1)).unwrap().cells().b);
        sim.step().unwrap();
        assert!(sim.population().get(AgentId(1)).unwrap().is_infected());
    }

    #[test]
    fn incubating_agents_do_not_transmit() {
        let mut config = test_config(1);
        config.disease.spread_prob = 1.0;
        config.disease.incubation_days = 2.0;
        let mut sim = build(config, &[(0.55, 0.55), (0.55, 0.55)]);
        sim.step().unwrap();
        assert!(!sim.population().get(AgentId(1)).unwrap().is_infected());
    }

    #[test]
    fn same_seed_same_run() {
        let run = || {
            let mut config = test_config(12);
            config.disease.spread_prob = 0.3;
            config.disease.infection_days = 0.75;
            config.disease.immunity_prob = 0.5;
            let points: Vec<(f64, f64)> = (0..30).map(|i| (0.55 + (i % 3) as f64 * 0.1, 0.55)).collect();
            let mut sim = build(config, &points);
            let mut rec = Recorder::default();
            sim.run(&mut rec).unwrap();
            rec.summaries
        };
        assert_eq!(run(), run());
    }
}

// ── Interactions and contact tracing ──────────────────────────────────────────

#[cfg(test)]
mod tracing {
    use super::*;

    fn far_apart(config: SimConfig, events: Vec<ScheduledInteraction>) -> Simulation {
        let (grid, pop) = residents(&config, &[(0.05, 0.05), (0.95, 0.95), (0.05, 0.95)]);
        SimBuilder::new(config)
            .population(grid, pop)
            .interactions(InteractionLog::new(events))
            .build()
            .unwrap()
    }

    #[test]
    fn logged_interactions_replay_when_due() {
        let event = ScheduledInteraction { time_days: 0.3, a: AgentId(1), b: AgentId(2) };
        let mut sim = far_apart(test_config(3), vec![event]);
        assert_eq!(sim.step().unwrap().interactions, 0);
        assert_eq!(sim.step().unwrap().interactions, 1);
        assert_eq!(sim.step().unwrap().interactions, 0);
        assert_eq!(sim.population().get(AgentId(1)).unwrap().history().len(), 1);
    }

    #[test]
    fn confirmation_notifies_past_contacts() {
        let mut config = test_config(4);
        config.disease.incubation_days = 10.0;
        let events = vec![ScheduledInteraction { time_days: 0.1, a: AgentId(0), b: AgentId(1) }];
        let mut sim = far_apart(config, events);

        sim.step().unwrap();
        assert!(!sim.population().get(AgentId(1)).unwrap().is_infected());
        assert_eq!(sim.ledger().len(), 0);

        let (pop, world) = sim.population_mut();
        pop.get_mut(AgentId(0)).unwrap().infect(Some("CONF-7"), &world);

        let summary = sim.step().unwrap();
        assert_eq!(summary.ledger_size, 1);
        assert_eq!(summary.confirmed, 1);
        assert_eq!(summary.new_infections, 1);
        assert!(sim.population().get(AgentId(1)).unwrap().is_infected());
        assert!(!sim.population().get(AgentId(2)).unwrap().is_infected());
    }

    #[test]
    fn confirmed_index_case_infects_on_contact() {
        let mut config = test_config(1);
        config.outbreak.confirmed_code = Some("IDX".into());
        let events = vec![ScheduledInteraction { time_days: 0.25, a: AgentId(0), b: AgentId(2) }];
        let mut sim = far_apart(config, events);
        assert_eq!(sim.ledger().len(), 0);
        let summary = sim.step().unwrap();
        assert!(sim.population().get(AgentId(2)).unwrap().is_infected());
        assert_eq!(summary.ledger_size, 1);
    }
}

// ── Movement ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod movement {
    use super::*;

    fn walker(label: &str, from: f64, to: f64, until: f64) -> Box<MemorySource> {
        let n = 8;
        let records = (0..=n)
            .map(|i| {
                let f = i as f64 / n as f64;
                TrajectoryRecord::new(from + (to - from) * f, 0.5, 0.0, until * f)
            })
            .collect();
        Box::new(MemorySource::single(label, records))
    }

    #[test]
    fn grid_membership_holds_every_step() {
        let mut config = test_config(12);
        config.disease.spread_prob = 1.0;
        config.disease.infection_days = 0.5;
        config.disease.fatality_rate = 0.5;
        let grid = grid_for(&config);
        let pop = {
            let mut b = PopulationBuilder::new(&grid, 3, &config.population);
            b.add_mobile(walker("a", 0.05, 0.95, 3.0)).unwrap();
            b.add_mobile(walker("b", 0.95, 0.05, 1.0)).unwrap();
            b.add_mobile(walker("c", 0.5, 0.5, 2.0)).unwrap();
            b.add_density_cells(
                &[gc_population::DensityCell { point: GeoPoint::new(0.45, 0.5), density: 400.0 }],
                0.0,
            );
            b.finish().unwrap()
        };
        let mut sim = SimBuilder::new(config).population(grid, pop).build().unwrap();
        assert_grid_invariant(&sim);
        let (mut departures, mut deaths) = (0, 0);
        while !sim.is_done() {
            let summary = sim.step().unwrap();
            departures += summary.departures;
            deaths += summary.deaths;
            assert_grid_invariant(&sim);
        }
        // "b" ends at day 1 and "c" at day 2, unless the disease got them first.
        assert!(!sim.population().get(AgentId(1)).unwrap().is_alive());
        assert!(!sim.population().get(AgentId(2)).unwrap().is_alive());
        assert_eq!(departures + deaths, sim.population().counts().dead);
    }

    #[test]
    fn malformed_file_mid_run_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let person = dir.path().join("000");
        fs::create_dir_all(&person).unwrap();
        fs::write(person.join("a.plt"), format!("{PLT_HEADER}0.5,0.5,0,0,0.0\n0.5,0.5,0,0,0.1\n")).unwrap();
        fs::write(person.join("b.plt"), format!("{PLT_HEADER}0.5,0.5,0,zero,0.2\n")).unwrap();

        let config = test_config(4);
        let grid = grid_for(&config);
        let pop = {
            let mut b = PopulationBuilder::new(&grid, 1, &config.population);
            b.add_mobile(Box::new(PltDirectory::open(&person).unwrap())).unwrap();
            b.finish().unwrap()
        };
        let mut sim = SimBuilder::new(config).population(grid, pop).build().unwrap();
        let err = sim.run(&mut NoopObserver).unwrap_err();
        assert!(matches!(err, SimError::Trajectory { agent: AgentId(0), .. }));
        assert!(err.to_string().contains("b.plt"));
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer {
    use super::*;

    #[test]
    fn hooks_fire_in_order() {
        let mut config = test_config(4);
        config.run.output_interval_steps = 2;
        let mut sim = build(config, &[(0.55, 0.55)]);
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();

        assert_eq!(rec.starts, vec![Tick(1), Tick(2), Tick(3), Tick(4)]);
        assert_eq!(rec.summaries.len(), 4);
        assert_eq!(rec.summaries[3].time_days, 1.0);
        assert_eq!(rec.snapshots, vec![Tick(2), Tick(4)]);
        assert!(rec.risk.is_some());
        assert!(sim.is_done());
    }

    #[test]
    fn run_steps_ignores_the_configured_length() {
        let mut sim = build(test_config(2), &[(0.55, 0.55)]);
        sim.run_steps(5, &mut NoopObserver).unwrap();
        assert_eq!(sim.clock.current_tick, Tick(5));
    }
}

// ── Loading from configuration ────────────────────────────────────────────────

#[cfg(test)]
mod from_files {
    use super::*;

    fn write(path: &Path, body: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn builds_from_configured_sources() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            &root.join("people/000/Trajectory/1.plt"),
            &format!("{PLT_HEADER}0.55,0.55,0,0,100.0\n0.55,0.55,0,0,101.0\n"),
        );
        write(
            &root.join("people/001/Trajectory/1.plt"),
            &format!("{PLT_HEADER}0.15,0.15,0,0,100.0\n0.15,0.15,0,0,101.0\n"),
        );
        write(&root.join("raster/chunk.asc"), "ncols 1\nnrows 1\nxllcorner 0.5\nyllcorner 0.5\ncellsize 0.1\n300\n");
        write(&root.join("interactions.csv"), "time_days,agent_a,agent_b\n100.1,000,001\n");

        let mut config = test_config(2);
        config.timing.start_days = None;
        config.population.trajectory_root = Some(root.join("people"));
        config.population.raster_dir = Some(root.join("raster"));
        config.population.interactions_csv = Some(root.join("interactions.csv"));

        let mut sim = SimBuilder::new(config).build().unwrap();
        assert_eq!(sim.population().len(), 5);
        assert_eq!(sim.clock.start_days, 100.0);
        assert!(sim.population().iter().skip(2).all(|a| a.clock() == 100.0));

        sim.run(&mut NoopObserver).unwrap();
        assert_eq!(sim.population().get(AgentId(1)).unwrap().history().len(), 1);
    }
}
