use erdscan::ddl::SchemaExtractor;
use erdscan::dot::{DotRenderer, DotView};
use erdscan::graph::{GroupingPolicy, Resolver};
use std::env;
use std::fs;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <schema.sql> [options]", args[0]);
        eprintln!();
        eprintln!("Options:");
        eprintln!("  -o, --output <file>    Output file (default: stdout)");
        eprintln!("  -v, --view <name>      View: detailed, simplified (default: detailed)");
        eprintln!("  -m, --master <prefix>  Table-name prefix of the master group (default: master_)");
        process::exit(1);
    }

    let input_path = &args[1];
    let mut output_path: Option<String> = None;
    let mut view = DotView::Detailed;
    let mut master_prefix = String::from("master_");

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--output" => {
                i += 1;
                if i < args.len() {
                    output_path = Some(args[i].clone());
                }
            }
            "-v" | "--view" => {
                i += 1;
                if i < args.len() {
                    view = DotView::from_str(&args[i]).unwrap_or_else(|| {
                        eprintln!("Invalid view: {}", args[i]);
                        process::exit(1);
                    });
                }
            }
            "-m" | "--master" => {
                i += 1;
                if i < args.len() {
                    master_prefix = args[i].clone();
                }
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let input = match fs::read_to_string(input_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {}: {}", input_path, e);
            process::exit(1);
        }
    };

    let extraction = SchemaExtractor::new().extract(&input);
    if extraction.model.is_empty() {
        eprintln!("warning: no table definitions found in {}", input_path);
    }

    let policy = GroupingPolicy::master_detail(&master_prefix);
    let mut diagnostics = extraction.diagnostics;
    let graph = match Resolver::new(&extraction.model, &policy)
        .resolve(&extraction.references, &mut diagnostics)
    {
        Ok(graph) => graph,
        Err(e) => {
            for diag in &diagnostics {
                eprintln!("{}", diag);
            }
            eprintln!("Resolve error: {}", e);
            process::exit(1);
        }
    };

    for diag in &diagnostics {
        eprintln!("{}", diag);
    }

    let dot = DotRenderer::default().render(view, &extraction.model, &graph);

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &dot) {
                eprintln!("Failed to write {}: {}", path, e);
                process::exit(1);
            }
        }
        None => print!("{}", dot),
    }
}
