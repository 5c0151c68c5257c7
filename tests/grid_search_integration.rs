use shapetune::config::{AttributeSpec, GridSearchConfig, ParameterSpec, RangeSpec};
use shapetune::engines::evaluation::{SettledRatioFitness, SimulationStepper};
use shapetune::engines::optimisation::accessor::kind_mismatch;
use shapetune::engines::optimisation::{
    AccessorTable, AttributeAccess, CoordinateDescentOptimizer, ParamValue, StopReason,
};
use shapetune::{Result, ShapetuneError};

const DOMAIN_OBJECT: &str = "Liquid Domain";

#[derive(Debug, Clone, PartialEq)]
struct LiquidSettings {
    use_fractions: bool,
    resolution_max: i64,
    viscosity_value: f64,
}

fn get_use_fractions(s: &LiquidSettings) -> ParamValue {
    ParamValue::Bool(s.use_fractions)
}

fn set_use_fractions(s: &mut LiquidSettings, value: ParamValue) -> Result<()> {
    match value {
        ParamValue::Bool(v) => {
            s.use_fractions = v;
            Ok(())
        }
        other => Err(kind_mismatch("use_fractions", other)),
    }
}

fn get_resolution_max(s: &LiquidSettings) -> ParamValue {
    ParamValue::Int(s.resolution_max)
}

fn set_resolution_max(s: &mut LiquidSettings, value: ParamValue) -> Result<()> {
    match value {
        ParamValue::Int(v) => {
            s.resolution_max = v;
            Ok(())
        }
        other => Err(kind_mismatch("resolution_max", other)),
    }
}

fn get_viscosity_value(s: &LiquidSettings) -> ParamValue {
    ParamValue::Float(s.viscosity_value)
}

fn set_viscosity_value(s: &mut LiquidSettings, value: ParamValue) -> Result<()> {
    match value {
        ParamValue::Float(v) => {
            s.viscosity_value = v;
            Ok(())
        }
        other => Err(kind_mismatch("viscosity_value", other)),
    }
}

/// Stepped liquid simulation whose settled ratio depends on its settings.
///
/// During the warm-up the ratio sits exactly on target, so any measure that
/// fails to skip it sees a perfect score for every candidate.
struct ScriptedLiquid {
    settings: LiquidSettings,
    accessors: AccessorTable<LiquidSettings>,
    target_ratio: f64,
    warmup_steps: u32,
    step: u32,
    last_step: u32,
    writes: usize,
}

impl ScriptedLiquid {
    fn new(settings: LiquidSettings, target_ratio: f64) -> Self {
        let mut accessors = AccessorTable::new();
        accessors
            .register("use_fractions", get_use_fractions, set_use_fractions)
            .register("resolution_max", get_resolution_max, set_resolution_max)
            .register("viscosity_value", get_viscosity_value, set_viscosity_value);

        Self {
            settings,
            accessors,
            target_ratio,
            warmup_steps: 21,
            step: 0,
            last_step: 30,
            writes: 0,
        }
    }

    fn settled_ratio(&self) -> f64 {
        let viscosity_error = 0.05 * (self.settings.viscosity_value - 2.0).abs();
        let resolution_error = 0.001 * (self.settings.resolution_max - 64).abs() as f64 / 16.0;
        self.target_ratio - viscosity_error - resolution_error
    }
}

impl AttributeAccess for ScriptedLiquid {
    fn get(&self, object: &str, attribute: &str) -> Result<ParamValue> {
        if object != DOMAIN_OBJECT {
            return Err(ShapetuneError::HostIntegration(format!("No object '{}'", object)));
        }
        self.accessors.get(&self.settings, attribute)
    }

    fn set(&mut self, object: &str, attribute: &str, value: ParamValue) -> Result<()> {
        if object != DOMAIN_OBJECT {
            return Err(ShapetuneError::HostIntegration(format!("No object '{}'", object)));
        }
        self.writes += 1;
        self.accessors.set(&mut self.settings, attribute, value)
    }
}

impl SimulationStepper for ScriptedLiquid {
    fn rewind(&mut self) -> Result<()> {
        self.step = 0;
        Ok(())
    }

    fn advance_step(&mut self) -> Result<()> {
        self.step += 1;
        Ok(())
    }

    fn current_step(&self) -> u32 {
        self.step
    }

    fn last_step(&self) -> u32 {
        self.last_step
    }

    fn read_derived_ratio(&self) -> Result<f64> {
        if self.step <= self.warmup_steps {
            Ok(self.target_ratio)
        } else {
            Ok(self.settled_ratio())
        }
    }
}

fn attribute_values(name: &str, values: Vec<ParamValue>) -> AttributeSpec {
    AttributeSpec {
        name: name.to_string(),
        values: Some(values),
        range: None,
    }
}

fn attribute_range(name: &str, start: ParamValue, stop: ParamValue, step: ParamValue) -> AttributeSpec {
    AttributeSpec {
        name: name.to_string(),
        values: None,
        range: Some(RangeSpec { start, stop, step }),
    }
}

fn create_test_config(object: &str) -> GridSearchConfig {
    GridSearchConfig {
        parameters: vec![ParameterSpec {
            object: object.to_string(),
            attributes: vec![
                attribute_values(
                    "use_fractions",
                    vec![ParamValue::Bool(true), ParamValue::Bool(false)],
                ),
                attribute_range(
                    "resolution_max",
                    ParamValue::Int(32),
                    ParamValue::Int(128),
                    ParamValue::Int(16),
                ),
                attribute_range(
                    "viscosity_value",
                    ParamValue::Float(0.5),
                    ParamValue::Float(10.0),
                    ParamValue::Float(0.5),
                ),
            ],
        }],
        ..Default::default()
    }
}

fn measure_for(config: &GridSearchConfig) -> SettledRatioFitness {
    SettledRatioFitness::new(config.target_ratio, config.ratio_epsilon, config.warmup_steps)
}

fn starting_settings() -> LiquidSettings {
    LiquidSettings {
        use_fractions: false,
        resolution_max: 32,
        viscosity_value: 0.5,
    }
}

#[test]
fn test_liquid_search_reaches_target_ratio() {
    let config = create_test_config(DOMAIN_OBJECT);
    let optimizer = CoordinateDescentOptimizer::from_config(&config).unwrap();
    let mut host = ScriptedLiquid::new(starting_settings(), config.target_ratio);
    let mut measure = measure_for(&config);

    let outcome = optimizer.run(&mut host, &mut measure).unwrap();

    // viscosity moves pay more, so they come first
    let steps: Vec<&str> = outcome.moves.iter().map(|m| m.attribute.as_str()).collect();
    assert_eq!(
        steps,
        vec![
            "viscosity_value",
            "viscosity_value",
            "viscosity_value",
            "resolution_max",
            "resolution_max",
        ]
    );
    assert_eq!(outcome.stop, StopReason::LocalOptimum);
    assert_eq!(outcome.rounds, 6);

    assert_eq!(host.settings.viscosity_value, 2.0);
    assert_eq!(host.settings.resolution_max, 64);
    assert!(!host.settings.use_fractions);

    let perfect = 1.0 / config.ratio_epsilon;
    assert!((outcome.final_fitness - perfect).abs() / perfect < 1e-9);
    assert!(outcome.initial_fitness < outcome.final_fitness);
}

#[test]
fn test_fitness_increases_with_every_move() {
    let config = create_test_config(DOMAIN_OBJECT);
    let optimizer = CoordinateDescentOptimizer::from_config(&config).unwrap();
    let mut host = ScriptedLiquid::new(starting_settings(), config.target_ratio);
    let mut measure = measure_for(&config);

    let outcome = optimizer.run(&mut host, &mut measure).unwrap();

    let mut previous = outcome.initial_fitness;
    for step in &outcome.moves {
        assert!(step.fitness > previous);
        assert_eq!(step.object, DOMAIN_OBJECT);
        previous = step.fitness;
    }
    assert_eq!(previous, outcome.final_fitness);
}

#[test]
fn test_max_steps_stops_search_early() {
    let config = GridSearchConfig {
        max_steps: 2,
        ..create_test_config(DOMAIN_OBJECT)
    };
    let optimizer = CoordinateDescentOptimizer::from_config(&config).unwrap();
    let mut host = ScriptedLiquid::new(starting_settings(), config.target_ratio);
    let mut measure = measure_for(&config);

    let outcome = optimizer.run(&mut host, &mut measure).unwrap();

    assert_eq!(outcome.stop, StopReason::MaxSteps);
    assert_eq!(outcome.moves.len(), 2);
    assert_eq!(host.settings.viscosity_value, 1.5);
}

#[test]
fn test_value_outside_domain_is_left_alone() {
    let config = create_test_config(DOMAIN_OBJECT);
    let optimizer = CoordinateDescentOptimizer::from_config(&config).unwrap();
    let settings = LiquidSettings {
        resolution_max: 40,
        ..starting_settings()
    };
    let mut host = ScriptedLiquid::new(settings, config.target_ratio);
    let mut measure = measure_for(&config);

    let outcome = optimizer.run(&mut host, &mut measure).unwrap();

    assert_eq!(host.settings.resolution_max, 40);
    assert_eq!(host.settings.viscosity_value, 2.0);
    assert!(outcome.moves.iter().all(|m| m.attribute == "viscosity_value"));
}

#[test]
fn test_trials_restore_settings_at_optimum() {
    let config = create_test_config(DOMAIN_OBJECT);
    let optimizer = CoordinateDescentOptimizer::from_config(&config).unwrap();
    let optimum = LiquidSettings {
        use_fractions: true,
        resolution_max: 64,
        viscosity_value: 2.0,
    };
    let mut host = ScriptedLiquid::new(optimum.clone(), config.target_ratio);
    let mut measure = measure_for(&config);

    let outcome = optimizer.run(&mut host, &mut measure).unwrap();

    assert!(outcome.moves.is_empty());
    assert_eq!(outcome.rounds, 1);
    assert_eq!(host.settings, optimum);
    // one neighbor for the bool, two each for the others, each set then restored
    assert_eq!(host.writes, 2 * 5);
}

#[test]
fn test_unknown_object_is_a_host_error() {
    let config = create_test_config("Missing Domain");
    let optimizer = CoordinateDescentOptimizer::from_config(&config).unwrap();
    let mut host = ScriptedLiquid::new(starting_settings(), config.target_ratio);
    let mut measure = measure_for(&config);

    let result = optimizer.run(&mut host, &mut measure);

    assert!(matches!(result, Err(ShapetuneError::HostIntegration(_))));
    assert_eq!(host.settings, starting_settings());
}

#[test]
fn test_short_simulation_is_rejected() {
    let config = create_test_config(DOMAIN_OBJECT);
    let optimizer = CoordinateDescentOptimizer::from_config(&config).unwrap();
    let mut host = ScriptedLiquid::new(starting_settings(), config.target_ratio);
    host.last_step = 20;
    let mut measure = measure_for(&config);

    assert!(matches!(
        optimizer.run(&mut host, &mut measure),
        Err(ShapetuneError::Input(_))
    ));
}
