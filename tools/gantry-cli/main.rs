use clap::Parser;
use gantry::error::DefinitionError;
use gantry::pipeline::{
    IntoPipeline, PipelineDefinition, PipelineMetadata, PipelineValidator, StepDefinition,
    StructuralValidator,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::time::Instant;
use uuid::Uuid;

// --- JSON Deserialization Structs (Input Format Specific) ---
// These structs match the flat node/edge export format produced by canvas
// frontends and are only used here for conversion.

#[derive(Deserialize)]
struct RawExport {
    name: String,
    nodes: Vec<RawNode>,
    edges: Vec<RawEdge>,
}

#[derive(Deserialize)]
struct RawNode {
    id: String,
    data: RawNodeData,
    position: RawPosition,
}

#[derive(Deserialize)]
struct RawNodeData {
    label: String,
    #[serde(alias = "filePath")]
    file_path: String,
    #[serde(default)]
    environment: String,
}

#[derive(Deserialize)]
struct RawPosition {
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
struct RawEdge {
    source: String,
    target: String,
}

// --- Converter Implementation ---
// This implements the conversion from the raw node/edge export to gantry's
// canonical PipelineDefinition.

impl IntoPipeline for RawExport {
    fn into_pipeline(self) -> Result<PipelineDefinition, DefinitionError> {
        let metadata = PipelineMetadata::new(self.name);

        let mut steps: BTreeMap<String, StepDefinition> = BTreeMap::new();
        for node in self.nodes {
            let uuid = Uuid::parse_str(&node.id)
                .map_err(|_| DefinitionError::MalformedStepId(node.id.clone()))?;
            steps.insert(
                uuid.to_string(),
                StepDefinition {
                    title: node.data.label,
                    file_path: node.data.file_path,
                    environment: node.data.environment,
                    kernel: Default::default(),
                    parameters: Default::default(),
                    position: (node.position.x, node.position.y),
                    incoming_connections: Vec::new(),
                },
            );
        }

        for edge in self.edges {
            let source = Uuid::parse_str(&edge.source)
                .map_err(|_| DefinitionError::MalformedStepId(edge.source.clone()))?;
            let target = steps
                .get_mut(&edge.target)
                .ok_or_else(|| DefinitionError::Invalid(format!(
                    "edge target '{}' does not exist",
                    edge.target
                )))?;
            target.incoming_connections.push(source);
        }

        Ok(PipelineDefinition {
            uuid: metadata.uuid,
            name: metadata.name,
            settings: metadata.settings,
            steps,
        })
    }
}

/// A validator and inspector for gantry pipeline files
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the pipeline JSON file
    pipeline_path: Option<String>,

    /// Treat the input as a flat node/edge canvas export instead of the
    /// canonical pipeline layout
    #[arg(short, long)]
    flat: bool,

    /// Write the canonical serialized layout to this path after validation
    #[arg(short, long)]
    normalize: Option<String>,

    /// Run in interactive mode to be prompted for inputs
    #[arg(short = 'i', long, help = "Run in interactive 'human' mode")]
    human: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.human {
        run_interactive();
    } else {
        run_non_interactive(cli);
    }
}

fn run_inspection(pipeline_path: String, flat: bool, normalize: Option<String>) {
    let total_start = Instant::now();

    // --- 1. File Loading ---
    let load_start = Instant::now();
    let pipeline_json = fs::read_to_string(&pipeline_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read pipeline file '{}': {}",
            &pipeline_path, e
        ))
    });
    let load_duration = load_start.elapsed();

    // --- 2. Parsing and Conversion ---
    let parse_start = Instant::now();
    let definition: PipelineDefinition = if flat {
        let raw: RawExport = serde_json::from_str(&pipeline_json)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse canvas export: {}", e)));
        raw.into_pipeline().unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to convert export to pipeline: {}", e))
        })
    } else {
        serde_json::from_str(&pipeline_json)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse pipeline JSON: {}", e)))
    };
    let parse_duration = parse_start.elapsed();

    // --- 3. Validation ---
    println!("\nValidating pipeline '{}'...", definition.name);
    let validate_start = Instant::now();
    let report = StructuralValidator.validate(&definition);
    let validate_duration = validate_start.elapsed();

    if report.valid() {
        println!("Validation Successful!");
    } else {
        println!("Validation found {} problem(s):", report.errors.len());
        for error in &report.errors {
            println!("  -> {}", error);
        }
    }

    // --- 4. Normalization ---
    if let Some(out_path) = normalize {
        if !report.valid() {
            exit_with_error("Refusing to normalize an invalid pipeline.");
        }
        let canonical = serde_json::to_string_pretty(&definition)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize pipeline: {}", e)));
        fs::write(&out_path, canonical).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to write '{}': {}", &out_path, e))
        });
        println!("Canonical layout written to '{}'", out_path);
    }

    // --- 5. Summary ---
    let total_duration = total_start.elapsed();
    println!("\n--- Pipeline Summary ---");
    println!("Name:        {}", definition.name);
    println!("UUID:        {}", definition.uuid);
    println!("Steps:       {}", definition.step_count());
    println!("Connections: {}", definition.edge_count());

    println!("\n--- Performance Summary ---");
    println!("File Loading: {:?}", load_duration);
    println!("Parsing:      {:?}", parse_duration);
    println!("Validation:   {:?}", validate_duration);
    println!("-----------------------------");
    println!("Total:        {:?}", total_duration);
    println!();

    if !report.valid() {
        std::process::exit(1);
    }
}

/// Runs the CLI in non-interactive mode, taking all arguments from the command line.
fn run_non_interactive(cli: Cli) {
    let pipeline_path = cli.pipeline_path.unwrap_or_else(|| {
        exit_with_error("Pipeline path is required in non-interactive mode.");
    });
    run_inspection(pipeline_path, cli.flat, cli.normalize);
}

/// Runs the CLI in an interactive, human-friendly mode with prompts.
fn run_interactive() {
    println!("--- Gantry Interactive Mode ---");

    let pipeline_path = prompt_for_input("Enter pipeline path", Some("data/pipeline.json"));
    let flat = loop {
        let choice = prompt_for_input("Input format: 1 canonical, 2 flat export", Some("1"));
        match choice.trim() {
            "1" => break false,
            "2" => break true,
            _ => println!("Invalid choice. Please enter 1 or 2."),
        }
    };
    let normalize_str = prompt_for_input("Normalized output path (optional)", None);
    let normalize = if normalize_str.is_empty() {
        None
    } else {
        Some(normalize_str)
    };

    run_inspection(pipeline_path, flat, normalize);
}

/// A helper function to prompt the user and read a line of input.
fn prompt_for_input(prompt_text: &str, default: Option<&str>) -> String {
    let mut line = String::new();
    let default_prompt = default.map_or("".to_string(), |d| format!(" [default: {}]", d));

    print!("> {}{}: ", prompt_text, default_prompt);
    io::stdout().flush().unwrap();

    io::stdin()
        .read_line(&mut line)
        .expect("Failed to read line");
    let trimmed = line.trim().to_string();

    if trimmed.is_empty() {
        default.unwrap_or("").to_string()
    } else {
        trimmed
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
