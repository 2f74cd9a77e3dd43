use retail_data::{observe::NoopObserver, Loader, LoaderConfig};
use std::{env, path::Path, process::exit};

fn main() {
    // Expect exactly one CLI argument: path to a cache (or any indexed) CSV.
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <CACHE_CSV>", args[0]);
        exit(1);
    }
    if let Err(e) = inspect_cache(Path::new(&args[1])) {
        eprintln!("Error: {:#}", e);
        exit(1);
    }
}

/// Load the file through the `.csv` path of the loader and print its shape.
fn inspect_cache(path: &Path) -> anyhow::Result<()> {
    let loader = Loader::new(LoaderConfig::default())?.with_observer(NoopObserver);
    let source = path.to_string_lossy();
    let dataset = loader.load(&source, &loader.config().sheet_name)?;

    println!("=== Cache File: {} ===", path.display());
    println!("File-size on disk:    {} bytes", std::fs::metadata(path)?.len());
    println!("Total rows:           {}", dataset.num_rows());
    println!("Number of columns:    {}", dataset.num_columns());
    println!();

    println!("=== Schema ===");
    for field in dataset.schema().fields() {
        println!(
            "  {:<14} {:?}{}",
            field.name(),
            field.data_type(),
            if field.is_nullable() { " (nullable)" } else { "" }
        );
    }
    Ok(())
}
