use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use company_enrichment::{init_tracing, run_enrichment, AppConfig, RunOptions};

#[derive(Parser, Debug)]
#[command(name = "company-enrichment")]
#[command(about = "Fill empty company columns from Google Places, Wikidata and company websites")]
#[command(version)]
struct Cli {
    /// Input CSV with input_company_name / input_main_country_code columns
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the enriched CSV (must differ from the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Optional JSON run report
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Skip Google Places lookups
    #[arg(long)]
    no_google: bool,

    /// Skip Wikidata lookups
    #[arg(long)]
    no_wikidata: bool,

    /// Skip website scraping
    #[arg(long)]
    no_website: bool,

    /// Delay after each provider call in milliseconds (overrides API_SLEEP_MS)
    #[arg(long, value_name = "MS")]
    sleep_ms: Option<u64>,

    /// Verbose logging (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let stem = self
                .input
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "output".into());
            self.input.with_file_name(format!("{stem}_enriched.csv"))
        })
    }

    fn apply(&self, config: &mut AppConfig) {
        if self.no_google {
            config.enable_google = false;
        }
        if self.no_wikidata {
            config.enable_wikidata = false;
        }
        if self.no_website {
            config.enable_website_scraping = false;
        }
        if let Some(ms) = self.sleep_ms {
            config.api_sleep_ms = ms;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(match cli.verbose {
        0 => "info",
        1 => "info,company_enrichment=debug",
        _ => "info,company_enrichment=trace",
    });

    let mut config = AppConfig::from_env();
    cli.apply(&mut config);

    let options = RunOptions {
        input: cli.input.clone(),
        output: cli.output_path(),
        report: cli.report.clone(),
    };
    let stats = run_enrichment(&config, &options)
        .await
        .with_context(|| format!("enrichment of {} failed", options.input.display()))?;

    println!(
        "{} rows ({} skipped), {} cells filled -> {}",
        stats.total_rows,
        stats.skipped_rows,
        stats.cells_filled,
        options.output.display()
    );
    Ok(())
}
