use clap::{Parser, Subcommand};
use darkroom::{EditSession, FileWriter, RasterBackend, catalog};
use std::path::PathBuf;
use std::sync::mpsc;

#[derive(Parser)]
#[command(name = "darkroom")]
#[command(about = "Apply stacked parametric photo filters from the command line")]
#[command(long_about = "\
Apply stacked parametric photo filters from the command line

Each --filter step selects a catalog filter (committing the previous step's
output, exactly as the interactive session does) and may set its parameters
inline:

  darkroom apply photo.jpg -o out.png \\
      --filter 'Sepia Tone:intensity=1.0' \\
      --filter 'Vignette:intensity=1.5,radius=80'

Unset parameters stay at their midpoint defaults. Values outside a
parameter's declared range are clamped, not rejected.

Run 'darkroom filters' for the catalog and its parameter ranges.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the filter catalog with parameter ranges
    Filters {
        /// Only show the first N entries (the default picker strip)
        #[arg(long)]
        limit: Option<usize>,
        /// Emit the catalog as JSON for external presentation layers
        #[arg(long)]
        json: bool,
    },
    /// Apply a pipeline of filters to an image and save the result as PNG
    Apply {
        /// Input image (JPEG, PNG, TIFF, WebP)
        input: PathBuf,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,

        /// Filter step: 'Name' or 'Name:param=value,param=value'; repeatable
        #[arg(long = "filter", value_name = "STEP")]
        filters: Vec<String>,
    },
}

/// One parsed `--filter` step.
struct FilterStep {
    name: String,
    sets: Vec<(String, f64)>,
}

fn parse_step(step: &str) -> Result<FilterStep, String> {
    let (name, params) = match step.split_once(':') {
        Some((name, params)) => (name, Some(params)),
        None => (step, None),
    };
    let name = name.trim();
    if catalog::lookup(name).is_none() {
        let known: Vec<&str> = catalog::all().iter().map(|d| d.name).collect();
        return Err(format!("unknown filter '{name}'. Known: {known:?}"));
    }

    let mut sets = Vec::new();
    for pair in params.unwrap_or("").split(',').filter(|p| !p.trim().is_empty()) {
        let (pname, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("expected param=value in '{pair}'"))?;
        let value: f64 = value
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not a number in '{pair}'", value.trim()))?;
        sets.push((pname.trim().to_string(), value));
    }
    Ok(FilterStep {
        name: name.to_string(),
        sets,
    })
}

fn print_catalog(limit: Option<usize>) {
    for def in catalog::top_n(limit.unwrap_or(catalog::len())) {
        if def.is_passthrough() {
            println!("{:<14} (pass-through)", def.name);
            continue;
        }
        let params: Vec<String> = def
            .params
            .iter()
            .map(|p| format!("{} {}..{}", p.name, p.lo, p.hi))
            .collect();
        println!("{:<14} {}", def.name, params.join(", "));
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Filters { limit, json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(catalog::top_n(
                    limit.unwrap_or(catalog::len()),
                ))?);
            } else {
                print_catalog(limit);
            }
        }
        Command::Apply {
            input,
            output,
            filters,
        } => {
            let steps = filters
                .iter()
                .map(|s| parse_step(s))
                .collect::<Result<Vec<_>, _>>()?;

            let raster = image::open(&input)
                .map_err(|e| format!("cannot open {}: {e}", input.display()))?
                .to_rgba8();

            let mut session = EditSession::new(RasterBackend::new());
            session.load_image(Some(raster));

            for step in steps {
                session.select_filter(&step.name);
                for (pname, value) in &step.sets {
                    session.set_parameter(pname, *value);
                }
            }

            let writer = FileWriter::to_path(&output);
            let (tx, rx) = mpsc::channel();
            session.save(&writer, move |result| {
                let _ = tx.send(result);
            });
            match rx.recv() {
                Ok(Ok(())) => println!("saved {}", output.display()),
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => return Err("nothing to save".into()),
            }
        }
    }

    Ok(())
}
