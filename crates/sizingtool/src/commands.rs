use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use search_sizing::{IndexFootprint, SizingConfig, SizingEngine, SizingInput, SizingResult};

#[derive(clap::Parser)]
#[clap(name = "sizingtool", about = "Estimate hardware for lexical and vector search indexes")]
pub struct SizingCommand {
    #[clap(subcommand)]
    pub command: SizingSubcommand,
}

#[derive(clap::Subcommand)]
pub enum SizingSubcommand {
    /// Estimate storage, RAM, vCPU and an instance class for a sizing request
    Estimate {
        /// JSON request with `lexical_sizing` and/or `vector_sizing`, `-` for stdin
        #[clap(long)]
        request: PathBuf,

        /// TOML file overriding the built-in cost and instance tables
        #[clap(long)]
        config: Option<PathBuf>,

        /// Print the result as JSON instead of a summary
        #[clap(long)]
        json: bool,
    },

    /// List the instance classes in selection order
    Instances {
        /// TOML file overriding the built-in cost and instance tables
        #[clap(long)]
        config: Option<PathBuf>,
    },

    /// Print the built-in configuration as TOML
    DefaultConfig,
}

impl SizingCommand {
    pub fn run(&self, out: &mut impl Write) -> Result<()> {
        match &self.command {
            SizingSubcommand::Estimate { request, config, json } => {
                self.estimate(out, request, config.as_deref(), *json)
            }
            SizingSubcommand::Instances { config } => self.instances(out, config.as_deref()),
            SizingSubcommand::DefaultConfig => {
                let rendered = toml::to_string_pretty(&SizingConfig::default())?;
                write!(out, "{rendered}")?;
                Ok(())
            }
        }
    }

    fn estimate(&self, out: &mut impl Write, request: &Path, config: Option<&Path>, json: bool) -> Result<()> {
        let engine = load_engine(config)?;
        let input = read_input(request)?;

        tracing::info!(
            lexical = input.lexical_sizing.is_some(),
            vector = input.vector_sizing.is_some(),
            "evaluating sizing request"
        );

        let result = engine
            .evaluate_input(&input)
            .context("Sizing request could not be satisfied")?;

        if json {
            writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
        } else {
            print_summary(out, &result)?;
        }

        Ok(())
    }

    fn instances(&self, out: &mut impl Write, config: Option<&Path>) -> Result<()> {
        let engine = load_engine(config)?;

        writeln!(out, "{:<8} {:>6} {:>8} {:>12} {:>10}", "NAME", "VCPU", "RAM GB", "STORAGE GB", "$/HOUR")?;
        for profile in engine.instances() {
            let price = profile
                .price_per_hour
                .map(|p| format!("{p:.2}"))
                .unwrap_or_else(|| "-".to_string());
            writeln!(
                out,
                "{:<8} {:>6} {:>8} {:>12} {:>10}",
                profile.name, profile.vcpu, profile.ram_gb, profile.max_storage_gb, price
            )?;
        }

        Ok(())
    }
}

fn load_engine(config: Option<&Path>) -> Result<SizingEngine> {
    match config {
        Some(path) => SizingEngine::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(SizingEngine::default()),
    }
}

fn read_input(path: &Path) -> Result<SizingInput> {
    let content = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request from {}", path.display()))?
    };

    Ok(SizingInput::from_json(&content)?)
}

fn print_summary(out: &mut impl Write, result: &SizingResult) -> Result<()> {
    writeln!(out, "Recommended instance: {}", result.recommended_instance)?;
    writeln!(out, "   Storage:   {:.3} GB", result.storage_gb())?;
    writeln!(out, "   Reindex:   {:.3} GB", result.reindex_storage_gb())?;
    writeln!(out, "   RAM:       {:.3} GB", result.ram_gb())?;
    writeln!(out, "   vCPU:      {}", result.required_vcpu)?;
    writeln!(out, "   Documents: {}", result.lexical_documents)?;

    if let Some(lexical) = &result.lexical {
        print_footprint(out, "lexical", lexical)?;
    }
    if let Some(vector) = &result.vector {
        print_footprint(out, "vector", vector)?;
    }

    Ok(())
}

fn print_footprint(out: &mut impl Write, label: &str, footprint: &IndexFootprint) -> Result<()> {
    writeln!(
        out,
        "   - {label}: {:.3} GB storage, {:.3} GB RAM, {} vCPU",
        footprint.storage_bytes as f64 / 1e9,
        footprint.ram_bytes as f64 / 1e9,
        footprint.required_vcpu
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn run(args: &[&str]) -> Result<String> {
        let command = SizingCommand::try_parse_from(args)?;
        let mut out = Vec::new();
        command.run(&mut out)?;
        Ok(String::from_utf8(out)?)
    }

    fn request_file(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    const LEXICAL_ONLY: &str = r#"{
        "lexical_sizing": {
            "num_documents": 1000000,
            "qps": 100,
            "latency": 0.05,
            "fields": [{"field_type": "String", "size": 150, "count": 2}]
        }
    }"#;

    #[test]
    fn test_estimate_summary() {
        let file = request_file(LEXICAL_ONLY);
        let output = run(&["sizingtool", "estimate", "--request", file.path().to_str().unwrap()]).unwrap();

        assert!(output.starts_with("Recommended instance: S30 (4 vCPU"));
        assert!(output.contains("Storage:   0.348 GB\n"));
        assert!(output.contains("Reindex:   0.783 GB\n"));
        assert!(output.contains("vCPU:      4"));
        assert!(output.is_ascii());
        assert!(output.contains("- lexical:"));
        assert!(!output.contains("- vector:"));
    }

    #[test]
    fn test_estimate_json() {
        let file = request_file(LEXICAL_ONLY);
        let output = run(&["sizingtool", "estimate", "--json", "--request", file.path().to_str().unwrap()]).unwrap();

        let result: SizingResult = serde_json::from_str(&output).unwrap();
        assert_eq!(result.recommended_instance.name, "S30");
        assert_eq!(result.estimated_ram_bytes, 43_500_000);
    }

    #[test]
    fn test_estimate_reports_unsatisfiable_request() {
        let file = request_file(
            r#"{"vector_sizing": {"num_documents": 100000000, "latency": 0.1,
                "fields": [{"field_type": "Vector", "dimensions": 1536}]}}"#,
        );
        let error = run(&["sizingtool", "estimate", "--request", file.path().to_str().unwrap()]).unwrap_err();

        assert!(format!("{error:#}").contains("No suitable instance"));
    }

    #[test]
    fn test_instances_listing_in_order() {
        let output = run(&["sizingtool", "instances"]).unwrap();
        let names: Vec<_> = output
            .lines()
            .skip(1)
            .filter_map(|line| line.split_whitespace().next())
            .collect();

        assert_eq!(names, vec!["S20", "S30", "S40", "S50", "S60", "S70", "S80"]);
    }

    #[test]
    fn test_default_config_round_trips_through_file() {
        let rendered = run(&["sizingtool", "default-config"]).unwrap();
        let file = request_file(&rendered);

        let output = run(&["sizingtool", "instances", "--config", file.path().to_str().unwrap()]).unwrap();
        assert!(output.contains("S80"));
    }
}
