use std::env;
use std::path::Path;

use ingest::load_path;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("usage: ingest_cli <path>");
        std::process::exit(2);
    }

    let batch = match load_path(Path::new(&args[1])) {
        Ok(batch) => batch,
        Err(err) => {
            eprintln!("failed to load {}: {}", args[1], err);
            std::process::exit(1);
        }
    };

    let stats = &batch.stats;
    println!("files_scanned {}", stats.files_scanned);
    println!("documents_seen {}", stats.documents_seen);
    println!("records_normalized {}", stats.records_normalized);
    println!("dropped {}", stats.dropped);
    for issue in &stats.issues {
        match issue.line {
            Some(line) => println!("issue {}:{} {}", issue.source, line, issue.message),
            None => println!("issue {} {}", issue.source, issue.message),
        }
    }
    let total: f64 = batch.records.iter().map(|record| record.measures.cpu_hours).sum();
    println!("cpu_hours {:.1}", total);
}
