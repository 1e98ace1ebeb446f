//! Local Trip Guide CLI - consolidate school rosters into one report
//!
//! # Commands
//!
//! ```bash
//! localtrip merge rosters/*.xlsx              # Write 로컬트립가이드 종합보고서.xlsx
//! localtrip merge a.xlsx b.csv -o out.xlsx    # Explicit output path
//! localtrip inspect 2024-1학기_서울고.xlsx     # Show header/column detection per sheet
//! localtrip tables                            # Print built-in reference tables
//! localtrip tables --check my-tables.json     # Validate a tables file
//! ```

use clap::{Args, Parser, Subcommand};
use localtrip::logs::LOG_SINK;
use localtrip::parser::read_workbook;
use localtrip::sheet::map_columns;
use localtrip::validation::validate_reference_tables;
use localtrip::{
    load_sheet, run, BlankRowPolicy, DedupPolicy, LoaderOptions, ReferenceTables, RunOptions,
    SourceTag,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "localtrip")]
#[command(about = "Consolidate Local Trip Guide rosters into one diversity report", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Sheet reading heuristics
#[derive(Args, Debug, Clone)]
struct LoaderArgs {
    /// Rows scanned for the header
    #[arg(long, default_value = "30")]
    scan_rows: usize,

    /// Recognized columns required for a header row
    #[arg(long, default_value = "2")]
    min_matches: usize,

    /// Fully blank data row handling
    #[arg(long, value_enum, default_value = "truncate")]
    blank_rows: BlankRowPolicy,
}

impl From<LoaderArgs> for LoaderOptions {
    fn from(args: LoaderArgs) -> Self {
        Self {
            scan_rows: args.scan_rows,
            min_matches: args.min_matches,
            blank_rows: args.blank_rows,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Merge roster files and write the consolidated report
    Merge {
        /// Roster files (xlsx, xls, xlsb, ods, csv), in priority order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Report path (default: next to the first file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Reference tables JSON (default: built-in)
        #[arg(long, env = "LOCALTRIP_TABLES")]
        tables: Option<PathBuf>,

        /// Write a JSON run summary
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Don't print progress
        #[arg(short, long)]
        quiet: bool,

        #[command(flatten)]
        loader: LoaderArgs,
    },

    /// Show header row, column mapping and row counts per sheet
    Inspect {
        /// Roster file
        file: PathBuf,

        /// Reference tables JSON (default: built-in)
        #[arg(long, env = "LOCALTRIP_TABLES")]
        tables: Option<PathBuf>,

        #[command(flatten)]
        loader: LoaderArgs,
    },

    /// Print or validate reference tables
    Tables {
        /// Tables file to validate against the schema
        #[arg(long)]
        check: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Merge {
            files,
            output,
            tables,
            summary,
            quiet,
            loader,
        } => cmd_merge(files, output, tables.as_deref(), summary.as_deref(), quiet, loader.into()),

        Commands::Inspect { file, tables, loader } => cmd_inspect(&file, tables.as_deref(), &loader.into()),

        Commands::Tables { check, output } => cmd_tables(check.as_deref(), output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn load_tables(path: Option<&Path>) -> Result<ReferenceTables, Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            eprintln!("📋 Tables: {}", p.display());
            Ok(ReferenceTables::from_file(p)?)
        }
        None => Ok(ReferenceTables::default()),
    }
}

fn cmd_merge(
    files: Vec<PathBuf>,
    output: Option<PathBuf>,
    tables: Option<&Path>,
    summary: Option<&Path>,
    quiet: bool,
    loader: LoaderOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    LOG_SINK.set_quiet(quiet);
    let tables = load_tables(tables)?;

    let options = RunOptions {
        loader,
        policy: DedupPolicy::default(),
        output,
    };

    let result = run(&files, &tables, &options)?;

    if let Some(summary_path) = summary {
        localtrip::report::write_json(summary_path, &result)?;
        eprintln!("💾 Summary written to: {}", summary_path.display());
    }

    match &result.output {
        Some(path) => eprintln!("\n✨ Done! {}", path.display()),
        None => eprintln!("\n⚠️  Nothing to merge, no report written"),
    }
    Ok(())
}

fn cmd_inspect(
    file: &Path,
    tables: Option<&Path>,
    options: &LoaderOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let tables = load_tables(tables)?;
    let tag = SourceTag::from_path(file);

    eprintln!("🔍 Inspecting: {}", file.display());
    println!("Semester: {}", tag.semester);
    println!("School:   {}", tag.school);

    let workbook = read_workbook(file)?;
    for sheet in workbook.sheets {
        let raw = match sheet {
            Ok(raw) => raw,
            Err(e) => {
                println!("\n[{}] ❌ {}", e.sheet(), e);
                continue;
            }
        };

        let load = load_sheet(&raw, &tag, &tables, options);
        println!("\n[{}]", raw.name);

        let Some(header_row) = load.report.header_row else {
            println!("   no header row in the first {} rows", options.scan_rows);
            continue;
        };
        println!("   Header row: {}", header_row + 1);

        let columns = map_columns(&raw.rows[header_row], &tables.columns);
        for &(field, col) in columns.bindings() {
            println!("   {:<12} ← column {}", field.label(), column_letter(col));
        }
        println!(
            "   Rows: {} kept, {} excluded, {} records",
            load.report.data_rows,
            load.report.excluded_rows,
            load.records.len()
        );
    }
    Ok(())
}

fn cmd_tables(check: Option<&Path>, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = check {
        eprintln!("✔️  Validating: {}", path.display());
        let content = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)?;

        if let Err(errors) = validate_reference_tables(&value) {
            for err in errors.iter().take(10) {
                eprintln!("   - {}", err);
            }
            return Err(format!("{} schema error(s)", errors.len()).into());
        }
        let tables = ReferenceTables::from_value(&value)?;
        eprintln!(
            "✅ Valid: {} columns, {} nationality aliases, {} regions",
            tables.columns.len(),
            tables.nationalities.len(),
            tables.regions.len()
        );
        return Ok(());
    }

    let json = ReferenceTables::default().to_json()?;
    match output {
        Some(p) => {
            fs::write(p, json)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Spreadsheet column name for a zero-based index: 0 -> A, 27 -> AB.
fn column_letter(mut col: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}
