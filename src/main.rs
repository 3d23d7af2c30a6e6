use clap::{Args, Parser, Subcommand};
use colored::*;
use eltwise::config::{DescriptorRequest, OutputFormat, ToolConfig, CONFIG_FILE};
use eltwise::logging::init_tracing;
use eltwise::utils::parsing::parse_dims;
use eltwise::{
    eltwise_backward_desc_init, eltwise_forward_desc_init, relu_backward_desc_init,
    relu_forward_desc_init, AlgKind, DataType, EltwiseDesc, MemoryDesc, MemoryFormat, PropKind,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "eltwise")]
#[command(version = "0.1")]
#[command(about = "Build and validate elementwise primitive descriptors", long_about = None)]
struct Cli {
    /// Output format: 'display' (human-readable) or 'json'. Overrides eltwise.toml
    #[arg(long, global = true)]
    output: Option<OutputFormat>,

    /// Path to the tool configuration
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ShapeArgs {
    /// Data dims, e.g. "[2, 3]" or 2x3
    #[arg(long)]
    dims: String,
    #[arg(long, default_value = "f32")]
    data_type: DataType,
    #[arg(long, default_value = "any")]
    format: MemoryFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Forward descriptor (forward_training | forward_inference)
    Forward {
        #[arg(long)]
        prop: PropKind,
        #[arg(long)]
        alg: AlgKind,
        #[command(flatten)]
        shape: ShapeArgs,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        alpha: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        beta: f64,
    },
    /// Backward-data descriptor
    Backward {
        #[arg(long)]
        alg: AlgKind,
        #[command(flatten)]
        shape: ShapeArgs,
        /// Gradient dims; same type and format as the data
        #[arg(long)]
        diff_dims: String,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        alpha: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        beta: f64,
    },
    /// ReLU forward descriptor
    ReluForward {
        #[arg(long)]
        prop: PropKind,
        #[command(flatten)]
        shape: ShapeArgs,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        negative_slope: f64,
    },
    /// ReLU backward-data descriptor
    ReluBackward {
        #[command(flatten)]
        shape: ShapeArgs,
        #[arg(long)]
        diff_dims: String,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        negative_slope: f64,
    },
    /// Validate a request file (.toml or .json)
    Check {
        file: PathBuf,
    },
    /// Write a default eltwise.toml
    Init,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // init must work even when an existing eltwise.toml does not parse
    if matches!(cli.command, Commands::Init) {
        return handle_init(&cli.config);
    }

    let config = ToolConfig::load_or_default(&cli.config)?;
    init_tracing(&config.logging.level)?;
    let output = cli.output.unwrap_or(config.output.format);

    let result = match cli.command {
        Commands::Init => return handle_init(&cli.config),
        Commands::Check { file } => check_file(&file),
        Commands::Forward {
            prop,
            alg,
            shape,
            alpha,
            beta,
        } => memory_desc(&shape, &shape.dims).and_then(|data| {
            eltwise_forward_desc_init(prop, alg, Some(&data), alpha, beta).map_err(Into::into)
        }),
        Commands::Backward {
            alg,
            shape,
            diff_dims,
            alpha,
            beta,
        } => memory_descs(&shape, &diff_dims).and_then(|(data, diff)| {
            eltwise_backward_desc_init(alg, Some(&diff), Some(&data), alpha, beta)
                .map_err(Into::into)
        }),
        Commands::ReluForward {
            prop,
            shape,
            negative_slope,
        } => memory_desc(&shape, &shape.dims).and_then(|data| {
            relu_forward_desc_init(prop, Some(&data), negative_slope).map_err(Into::into)
        }),
        Commands::ReluBackward {
            shape,
            diff_dims,
            negative_slope,
        } => memory_descs(&shape, &diff_dims).and_then(|(data, diff)| {
            relu_backward_desc_init(Some(&diff), Some(&data), negative_slope).map_err(Into::into)
        }),
    };

    match result {
        Ok(desc) => {
            print_desc(&desc, output)?;
            Ok(())
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            std::process::exit(1);
        }
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn check_file(file: &Path) -> CliResult<EltwiseDesc> {
    info!(file = %file.display(), "checking request");
    let req = DescriptorRequest::load(file)?;
    Ok(req.build()?)
}

fn memory_desc(shape: &ShapeArgs, dims: &str) -> CliResult<MemoryDesc> {
    let dims = parse_dims(dims)?;
    Ok(MemoryDesc::new(dims, shape.data_type, shape.format)?)
}

fn memory_descs(shape: &ShapeArgs, diff_dims: &str) -> CliResult<(MemoryDesc, MemoryDesc)> {
    Ok((memory_desc(shape, &shape.dims)?, memory_desc(shape, diff_dims)?))
}

fn print_desc(desc: &EltwiseDesc, output: OutputFormat) -> CliResult<()> {
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(desc)?),
        OutputFormat::Display => {
            println!("{}", "Descriptor OK".green().bold());
            println!("{}", desc);
        }
    }
    Ok(())
}

fn handle_init(path: &Path) -> CliResult<()> {
    if path.exists() {
        println!(
            "Configuration file already exists: {}",
            path.display().to_string().yellow()
        );
        return Ok(());
    }
    fs::write(path, ToolConfig::default_toml())?;
    println!(
        "Created default configuration: {}",
        path.display().to_string().green()
    );
    Ok(())
}
