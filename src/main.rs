use erdstudio::diagram::DiagramStore;
use erdstudio::glossary::{ALL_CATEGORIES, ALL_DATASETS, GlossaryStore};
use erdstudio::measure::CanvasMetrics;
use erdstudio::svg::SvgRenderer;
use std::env;
use std::fs;
use std::process;
use tracing_subscriber::EnvFilter;

fn usage(program: &str) {
    eprintln!("Usage: {} [options]", program);
    eprintln!();
    eprintln!("Renders the sample diagram to SVG, or with --glossary prints the sample glossary as JSON.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --output <file>     Output file (default: stdout)");
    eprintln!("      --width <px>        Minimum canvas width (default: 2000)");
    eprintln!("      --height <px>       Minimum canvas height (default: 1500)");
    eprintln!("  -g, --glossary          Print grouped glossary terms instead of SVG");
    eprintln!("  -q, --query <text>      Glossary search text");
    eprintln!("  -c, --category <name>   Glossary category (default: All)");
    eprintln!("      --dataset <name>    Glossary dataset (default: All Datasets)");
}

fn parse_px(flag: &str, value: &str) -> f64 {
    match value.parse::<f64>() {
        Ok(v) if v > 0.0 => v,
        _ => {
            eprintln!("Invalid value for {}: {}", flag, value);
            process::exit(1);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("erdstudio");

    let mut output_path: Option<String> = None;
    let mut metrics = CanvasMetrics::default();
    let mut glossary = false;
    let mut query = String::new();
    let mut category = ALL_CATEGORIES.to_string();
    let mut dataset = ALL_DATASETS.to_string();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let takes_value = matches!(
            flag,
            "-o" | "--output" | "--width" | "--height" | "-q" | "--query" | "-c" | "--category" | "--dataset"
        );
        let value = if takes_value {
            i += 1;
            match args.get(i) {
                Some(v) => v.clone(),
                None => {
                    eprintln!("Missing value for {}", flag);
                    process::exit(1);
                }
            }
        } else {
            String::new()
        };

        match flag {
            "-h" | "--help" => {
                usage(program);
                return;
            }
            "-o" | "--output" => output_path = Some(value),
            "--width" => metrics.canvas_width = parse_px(flag, &value),
            "--height" => metrics.canvas_height = parse_px(flag, &value),
            "-g" | "--glossary" => glossary = true,
            "-q" | "--query" => query = value,
            "-c" | "--category" => category = value,
            "--dataset" => dataset = value,
            _ => {
                eprintln!("Unknown option: {}", flag);
                usage(program);
                process::exit(1);
            }
        }
        i += 1;
    }

    let output = if glossary {
        let mut store = GlossaryStore::with_sample_terms();
        store.set_search_query(&query);
        store.set_selected_category(&category);
        store.set_selected_dataset(&dataset);
        let groups = store.grouped_terms();
        match serde_json::to_string_pretty(&groups.sorted()) {
            Ok(json) => json + "\n",
            Err(e) => {
                eprintln!("Failed to encode glossary: {}", e);
                process::exit(1);
            }
        }
    } else {
        let mut store = DiagramStore::new();
        store.load_sample();
        SvgRenderer::new(metrics).render(&store.snapshot())
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &output) {
                eprintln!("Failed to write {}: {}", path, e);
                process::exit(1);
            }
        }
        None => print!("{}", output),
    }
}
