use clap::Parser;
use defang_lib::{Sanitizer, SanitizerConfig};
use log::{error, info};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

const DEFANG_INTRO: &str = r#"
        ___       ____
       / _ \___  / __/__ ____  ___ _
      / // / -_)/ _// _ `/ _ \/ _ `/
     /____/\__//_/  \_,_/_//_/\_, /
                             /___/

    defang - scoped, script-free email HTML
"#;

#[derive(Parser)]
#[command(name = "defang")]
#[command(about = "Sanitize email HTML into isolated, scoped fragments")]
struct Args {
    /// Input HTML files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Write `<name>.html` fragments here instead of printing them.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// TOML file overriding the default sanitizer configuration.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn load_config(path: Option<&Path>) -> Result<SanitizerConfig, String> {
    let Some(path) = path else {
        return Ok(SanitizerConfig::default());
    };
    let text = fs::read_to_string(path)
        .map_err(|e| format!("reading config {}: {}", path.display(), e))?;
    toml::from_str(&text).map_err(|e| format!("parsing config {}: {}", path.display(), e))
}

fn sanitize_file(sanitizer: &Sanitizer, input: &Path) -> Result<String, String> {
    let html_content = fs::read_to_string(input)
        .map_err(|e| format!("reading {}: {}", input.display(), e))?;
    let fragment = sanitizer.sanitize(&html_content);
    info!("{} -> {}", input.display(), fragment.scope_id());
    Ok(fragment.to_html())
}

fn write_fragment(output_dir: &Path, input: &Path, html: &str) -> Result<(), String> {
    let name = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "fragment".to_string());
    let target = output_dir.join(format!("{name}.html"));
    fs::write(&target, html).map_err(|e| format!("writing {}: {}", target.display(), e))
}

fn main() {
    env_logger::init();
    eprintln!("{}", DEFANG_INTRO);

    // parse the args given in terminal
    let args: Args = Args::parse();

    let sanitizer = match load_config(args.config.as_deref()).and_then(|config| {
        Sanitizer::new(config).map_err(|e| format!("invalid configuration: {}", e))
    }) {
        Ok(sanitizer) => sanitizer,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    if let Some(dir) = &args.output_dir {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("Error creating {}: {}", dir.display(), e);
            std::process::exit(2);
        }
    }

    // one shared sanitizer: every file gets its own scope from the same counter
    let results: Vec<Result<String, String>> = args
        .inputs
        .par_iter()
        .map(|input| {
            let html = sanitize_file(&sanitizer, input)?;
            match &args.output_dir {
                Some(dir) => write_fragment(dir, input, &html).map(|_| String::new()),
                None => Ok(html),
            }
        })
        .collect();

    let mut failures = 0;
    for result in results {
        match result {
            Ok(html) if args.output_dir.is_none() => println!("{}", html),
            Ok(_) => {}
            Err(e) => {
                error!("{}", e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        eprintln!("{} of {} file(s) failed.", failures, args.inputs.len());
        std::process::exit(1);
    }
}
