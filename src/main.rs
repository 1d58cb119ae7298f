use anyhow::{Context, Result};
use clap::Parser;
use npar::cli::{self, Cli, OutputFormat};
use npar::csv_output::CsvOutput;
use npar::dataset::Dataset;
use npar::descriptor::VariableGroup;
use npar::json_output::JsonOutput;
use npar::missing::MissingValues;
use npar::output::{render_text, Diagnostic, OutputCollector};
use npar::pivot::PivotTable;
use npar::stats::{NparSuite, NparTest};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Read the data file and apply the dictionary flags
fn load_dataset(args: &Cli) -> Result<Dataset> {
    let text = std::fs::read_to_string(&args.data)
        .with_context(|| format!("Failed to read data file {}", args.data.display()))?;
    let mut ds = Dataset::from_delimited(&text)
        .with_context(|| format!("Failed to parse {}", args.data.display()))?;

    for spec in &args.user_missing {
        let (name, values) = cli::parse_user_missing(spec)?;
        ds.dictionary_mut()
            .set_missing_values(&name, MissingValues::discrete(&values))?;
    }
    ds.dictionary_mut().set_weight(args.weight.as_deref())?;

    Ok(ds)
}

/// Build the suite from the repeatable test flags, in command-line order
/// within each kind (Cochran groups first, then sign pairs)
fn build_suite(args: &Cli, ds: &Dataset) -> Result<NparSuite> {
    let mut suite = NparSuite::new(args.npar_config()?)?;
    let dict = ds.dictionary();

    for spec in &args.cochran {
        let names = cli::parse_group(spec);
        let group = VariableGroup::from_names(dict, &names)
            .with_context(|| format!("Invalid --cochran group '{}'", spec))?;
        suite.add_test(NparTest::Cochran(group));
    }
    for spec in &args.sign {
        let pairs = cli::resolve_sign_pairs(dict, spec)
            .with_context(|| format!("Invalid --sign pairs '{}'", spec))?;
        suite.add_test(NparTest::Sign(pairs));
    }

    if suite.tests().is_empty() {
        anyhow::bail!("No tests requested. Use --cochran A,B,C and/or --sign A:B");
    }
    Ok(suite)
}

fn print_results(
    format: OutputFormat,
    tables: &[PivotTable],
    diagnostics: &[Diagnostic],
) -> Result<()> {
    for diagnostic in diagnostics {
        eprintln!("{}", diagnostic);
    }

    match format {
        OutputFormat::Text => {
            for table in tables {
                println!("{}", render_text(table));
            }
        }
        OutputFormat::Json => {
            let mut output = JsonOutput::new();
            for table in tables {
                output.add_table(table);
            }
            for diagnostic in diagnostics {
                output.add_diagnostic(diagnostic.clone());
            }
            println!("{}", output.to_json()?);
        }
        OutputFormat::Csv => {
            let mut output = CsvOutput::new();
            for table in tables {
                output.add_table(table);
            }
            print!("{}", output.to_csv());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let ds = load_dataset(&args)?;
    let suite = build_suite(&args, &ds)?;

    let mut out = OutputCollector::new();
    suite.run(&ds, &mut out);

    let (tables, diagnostics) = out.into_parts();
    print_results(args.format, &tables, &diagnostics)
}
