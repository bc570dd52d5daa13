//! Unit tests for gc-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, InteractionId};

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(AgentId::INVALID.0, u32::MAX);
        assert_eq!(InteractionId::INVALID.0, u64::MAX);
    }

    #[test]
    fn display() {
        assert_eq!(AgentId(7).to_string(), "AgentId(7)");
    }
}

#[cfg(test)]
mod geo {
    use crate::{GeoBounds, GeoPoint};

    #[test]
    fn contains_is_edge_inclusive() {
        let b = GeoBounds::new(0.0, 1.0, 0.0, 1.0);
        assert!(b.contains(GeoPoint::new(0.0, 0.0)));
        assert!(b.contains(GeoPoint::new(1.0, 1.0)));
        assert!(!b.contains(GeoPoint::new(1.0001, 0.5)));
    }

    #[test]
    fn intersection() {
        let a = GeoBounds::new(0.0, 1.0, 0.0, 1.0);
        let b = GeoBounds::new(0.5, 2.0, 0.5, 2.0);
        let c = GeoBounds::new(5.0, 6.0, 5.0, 6.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, Tick, SECONDS_PER_DAY};

    #[test]
    fn tick_arithmetic() {
        assert_eq!(Tick(10) + 5, Tick(15));
        assert_eq!(Tick(10).offset(3), Tick(13));
    }

    #[test]
    fn is_every() {
        assert!(Tick(0).is_every(3));
        assert!(Tick(6).is_every(3));
        assert!(!Tick(7).is_every(3));
        assert!(!Tick(6).is_every(0));
    }

    #[test]
    fn clock_maps_ticks_to_days() {
        let mut clock = SimClock::new(100.0, 0.5);
        assert_eq!(clock.now_days(), 100.0);
        assert_eq!(clock.advance(), 100.5);
        assert_eq!(clock.advance(), 101.0);
        assert_eq!(clock.current_tick, Tick(2));
        assert_eq!(clock.time_at(Tick(10)), 105.0);
    }

    #[test]
    fn clock_display_breaks_down_elapsed_time() {
        let mut clock = SimClock::new(0.0, 90.0 / SECONDS_PER_DAY);
        clock.advance();
        assert_eq!(clock.elapsed_dhms(), (0, 0, 1, 30));
        assert_eq!(clock.to_string(), "T1 (day 0 00:01:30)");
    }
}

#[cfg(test)]
mod rng {
    use crate::{AgentId, AgentRng, SimRng};

    #[test]
    fn agent_rngs_are_deterministic_per_id() {
        let mut a = AgentRng::new(7, AgentId(3));
        let mut b = AgentRng::new(7, AgentId(3));
        let mut c = AgentRng::new(7, AgentId(4));
        let xa: u64 = a.random();
        let xb: u64 = b.random();
        let xc: u64 = c.random();
        assert_eq!(xa, xb);
        assert_ne!(xa, xc);
    }

    #[test]
    fn gen_bool_clamps_probability() {
        let mut rng = SimRng::new(1);
        assert!(rng.gen_bool(1.5));
        assert!(!rng.gen_bool(-0.5));
    }
}

#[cfg(test)]
mod config {
    use std::io::Write;

    use crate::{CoreError, SimConfig};

    const MINIMAL: &str = "
[grid]
resolution = 10
min_lat = 0.0
max_lat = 1.0
min_lon = 0.0
max_lon = 1.0

[timing]
steps = 5
";

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg = SimConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(cfg.grid.resolution, 10);
        assert_eq!(cfg.timing.steps, 5);
        assert!((cfg.timing.step_days - 1.0 / 86_400.0).abs() < 1e-15);
        assert_eq!(cfg.disease.spread_prob, 0.22);
        assert_eq!(cfg.disease.immunity_prob, 0.77);
        assert_eq!(cfg.population.age_mean, 37.0);
        assert_eq!(cfg.run.notify_interval_steps, 1);
        assert!(cfg.outbreak.index_agent.is_none());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let text = format!("{MINIMAL}\n[disease]\nfatality_rate = 0.5\n");
        let cfg = SimConfig::from_toml_str(&text).unwrap();
        assert_eq!(cfg.disease.fatality_rate, 0.5);
        assert_eq!(cfg.disease.incubation_days, 14.0);
    }

    #[test]
    fn inverted_bounds_rejected() {
        let text = MINIMAL.replace("max_lat = 1.0", "max_lat = -1.0");
        assert!(matches!(SimConfig::from_toml_str(&text), Err(CoreError::Config(_))));
    }

    #[test]
    fn zero_resolution_rejected() {
        let text = MINIMAL.replace("resolution = 10", "resolution = 0");
        assert!(matches!(SimConfig::from_toml_str(&text), Err(CoreError::Config(_))));
    }

    #[test]
    fn probability_out_of_range_rejected() {
        let text = format!("{MINIMAL}\n[disease]\nspread_prob = 1.2\n");
        assert!(matches!(SimConfig::from_toml_str(&text), Err(CoreError::Config(_))));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        assert!(matches!(SimConfig::from_toml_str("[grid"), Err(CoreError::Parse(_))));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();
        let cfg = SimConfig::load(file.path()).unwrap();
        assert_eq!(cfg.grid.bounds().max_lon, 1.0);
    }
}
