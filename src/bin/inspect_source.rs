use clap::Parser;
use rainfall_ingest::fetcher::SheetFetcher;
use rainfall_ingest::importers::classifier::{classify, SourceKind};
use rainfall_ingest::importers::schema::{day_columns, MapColumns, StationColumns, StationField};
use rainfall_ingest::importers::RawSource;

#[derive(Parser)]
#[command(name = "inspect-source")]
#[command(about = "Show how a rainfall or map sheet is detected, without loading it", long_about = None)]
struct Cli {
    /// Source URL or file path
    source: String,

    /// Number of data rows to print
    #[arg(long, default_value = "5")]
    rows: usize,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    println!("Fetching: {}", cli.source);
    let fetcher = SheetFetcher::new(30, 0)?;
    let grid = fetcher.fetch(&cli.source).await?;
    println!("Raw rows: {}", grid.len());

    let source = RawSource::from_grid(cli.source.clone(), grid);
    let kind = classify(&source);

    println!("Header row: {}", source.header_row + 1);
    println!("Detected kind: {kind:?}");
    println!("\nColumns:");
    for (i, name) in source.columns.iter().enumerate() {
        println!("  {i:3}: {name}");
    }

    match kind {
        SourceKind::RainfallTable => {
            let days = day_columns(&source);
            let listed: Vec<String> = days.iter().map(|(day, _)| day.to_string()).collect();
            println!("\nDay columns ({}): {}", days.len(), listed.join(", "));
            if !StationColumns::resolve(&source).has(StationField::StationName) {
                println!("Missing Nama Pos/Nama_Pos column, sheet would be skipped");
            }
        }
        SourceKind::MapReferenceTable => match MapColumns::resolve(&source) {
            Some(cols) => println!(
                "\nDate column: {}, URL column: {}",
                source.columns[cols.date], source.columns[cols.url]
            ),
            None => println!("\nMissing date or url_peta/link_peta column"),
        },
        SourceKind::Unknown => println!("\nSheet would be skipped"),
    }

    println!("\nFirst {} data rows (of {}):", cli.rows, source.rows.len());
    println!("{}", "=".repeat(100));
    for (i, row) in source.rows.iter().take(cli.rows).enumerate() {
        let cells: Vec<String> = row
            .iter()
            .take(12)
            .map(|c| if c.is_empty() { "[empty]".to_string() } else { format!("[{c}]") })
            .collect();
        println!("Row {:3}: {}", i + 1, cells.join(" "));
    }

    Ok(())
}
