use std::{env, process, time::Duration};

use benchstop::{
    CriterionError, CriterionRegistry, RunConfig, SamplingBudget,
    bench_utils::{DurationStream, Workload},
    sampler,
};

const HELP: &str = "Usage: bench_driver [--criterion NAME] [--param NAME=VALUE]... \
[--max-samples N] [--timeout SECS] [--workload steady|noisy|drifting|bimodal] \
[--seed N] [--config PATH] [--list]\n";

#[derive(Clone, Debug, PartialEq)]
struct DriverArgs {
    criterion: Option<String>,
    assignments: Vec<String>,
    config_path: Option<String>,
    max_samples: u64,
    timeout: Option<Duration>,
    workload: String,
    seed: u64,
    list: bool,
}

impl Default for DriverArgs {
    fn default() -> Self {
        let budget = SamplingBudget::default();
        Self {
            criterion: None,
            assignments: Vec::new(),
            config_path: None,
            max_samples: budget.max_samples,
            timeout: budget.timeout,
            workload: "noisy".to_string(),
            seed: 0x5EED,
            list: false,
        }
    }
}

impl DriverArgs {
    fn from_args(args: &[&str]) -> Result<Self, String> {
        let mut parsed = DriverArgs::default();
        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            let mut value = |flag: &str| {
                iter.next()
                    .map(|v| v.to_string())
                    .ok_or_else(|| format!("{flag} requires a value"))
            };
            match *arg {
                "--criterion" => parsed.criterion = Some(value("--criterion")?),
                "--param" => parsed.assignments.push(value("--param")?),
                "--config" => parsed.config_path = Some(value("--config")?),
                "--workload" => parsed.workload = value("--workload")?,
                "--max-samples" => {
                    parsed.max_samples = value("--max-samples")?
                        .parse()
                        .map_err(|e| format!("--max-samples: {e}"))?;
                }
                "--seed" => {
                    parsed.seed = value("--seed")?
                        .parse()
                        .map_err(|e| format!("--seed: {e}"))?;
                }
                "--timeout" => {
                    let secs: f64 = value("--timeout")?
                        .parse()
                        .map_err(|e| format!("--timeout: {e}"))?;
                    parsed.timeout = if secs > 0.0 {
                        let timeout = Duration::try_from_secs_f64(secs)
                            .map_err(|e| format!("--timeout: {e}"))?;
                        Some(timeout)
                    } else {
                        None
                    };
                }
                "--list" => parsed.list = true,
                other => return Err(format!("unknown argument {other}")),
            }
        }
        Ok(parsed)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print!("{HELP}");
        return;
    }
    let arg_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    let parsed = match DriverArgs::from_args(&arg_refs) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(2);
        }
    };

    let mut registry = CriterionRegistry::new();
    if parsed.list {
        if let Err(err) = list_criteria(&registry) {
            eprintln!("error: {err}");
            process::exit(2);
        }
        return;
    }

    match run(&mut registry, &parsed) {
        Ok(summary) => println!("{summary}"),
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(2);
        }
    }
}

fn list_criteria(registry: &CriterionRegistry) -> Result<(), CriterionError> {
    for name in registry.names() {
        let params: Vec<String> = registry
            .get(name)?
            .params()
            .iter()
            .map(|(param, kind)| format!("{param}:{kind}"))
            .collect();
        println!("{name:<12}{}", params.join(" "));
    }
    Ok(())
}

fn build_config(
    registry: &CriterionRegistry,
    parsed: &DriverArgs,
) -> Result<RunConfig, CriterionError> {
    let mut config = match &parsed.config_path {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    config.apply_env();
    if let Some(name) = &parsed.criterion {
        config.criterion = name.clone();
    }
    let schema = registry.params_description()?;
    for assignment in &parsed.assignments {
        config.apply_assignment_with(&schema, assignment)?;
    }
    config.validate(registry)?;
    Ok(config)
}

fn run(registry: &mut CriterionRegistry, parsed: &DriverArgs) -> Result<String, CriterionError> {
    let config = build_config(registry, parsed)?;
    let workload: Workload = parsed.workload.parse()?;
    let budget = SamplingBudget {
        max_samples: parsed.max_samples,
        timeout: parsed.timeout,
        ..SamplingBudget::default()
    };
    let mut stream = DurationStream::new(workload, parsed.seed);
    let report = sampler::run_configured(registry, &config, &budget, || stream.next_sample())?;
    Ok(report.summary())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repeated_params() {
        let parsed = DriverArgs::from_args(&[
            "bench_driver",
            "--criterion",
            "entropy",
            "--param",
            "max-angle=0.1",
            "--param",
            "min-r2=0.5",
            "--timeout",
            "0",
        ])
        .unwrap();
        assert_eq!(parsed.criterion.as_deref(), Some("entropy"));
        assert_eq!(parsed.assignments, vec!["max-angle=0.1", "min-r2=0.5"]);
        assert_eq!(parsed.timeout, None);
    }

    #[test]
    fn test_parse_missing_value() {
        assert!(DriverArgs::from_args(&["bench_driver", "--param"]).is_err());
        assert!(DriverArgs::from_args(&["bench_driver", "--bogus"]).is_err());
    }

    #[test]
    fn test_parse_rejects_unrepresentable_timeout() {
        let err = DriverArgs::from_args(&["bench_driver", "--timeout", "inf"])
            .err()
            .unwrap();
        assert!(err.starts_with("--timeout:"));
    }

    #[test]
    fn test_build_config_types_assignments() {
        let registry = CriterionRegistry::new();
        let parsed = DriverArgs {
            criterion: Some("stdrel".into()),
            assignments: vec!["min-time=1".into()],
            ..DriverArgs::default()
        };
        let config = build_config(&registry, &parsed).unwrap();
        assert_eq!(config.params.get_float64("min-time"), Ok(1.0));
    }
}
