//! fpscout - search-file generator CLI
use fpscout::{parse_module, FilterLists, FilterPolicy, RunConfig, SearchFilePass, SearchOptions};
use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_usage() {
    eprintln!("fpscout v{}", VERSION);
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    fpscout [OPTIONS] <INPUT>");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -h, --help                  Print this help message");
    eprintln!("    -v, --version               Print version information");
    eprintln!("    -o, --output <FILE>         Write the search file to FILE (default: search.json)");
    eprintln!("    -c, --config <FILE>         Load run configuration from a TOML file");
    eprintln!("    --exclude-functions <FILE>  Functions to exclude (required unless configured)");
    eprintln!("    --include-functions <FILE>  Functions to include (required unless configured)");
    eprintln!("    --include-globals <FILE>    Globals to include (required unless configured)");
    eprintln!("    --exclude-locals <FILE>     Locals to exclude (missing file = empty list)");
    eprintln!("    --original-type             Restrict candidates to narrowings of declared types");
    eprintln!("    --no-operators              Skip the operator scan");
    eprintln!("    --no-calls                  Skip the call scan");
    eprintln!();
    eprintln!("ARGUMENTS:");
    eprintln!("    <INPUT>                     Textual IR module (use '-' for stdin)");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("    fpscout -c fpscout.toml sim.fpir");
    eprintln!("    fpscout --include-functions fns.txt --exclude-functions none.txt \\");
    eprintln!("            --include-globals globals.txt --exclude-locals locals.txt sim.fpir");
}

fn print_version() {
    println!("fpscout {}", VERSION);
}

struct Options {
    input: Option<String>,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    exclude_functions: Option<PathBuf>,
    include_functions: Option<PathBuf>,
    include_globals: Option<PathBuf>,
    exclude_locals: Option<PathBuf>,
    original_type: bool,
    no_operators: bool,
    no_calls: bool,
}

fn parse_args() -> Result<Options, String> {
    let args: Vec<String> = env::args().collect();

    let mut options = Options {
        input: None,
        output: None,
        config: None,
        exclude_functions: None,
        include_functions: None,
        include_globals: None,
        exclude_locals: None,
        original_type: false,
        no_operators: false,
        no_calls: false,
    };
    let mut i = 1;

    fn value(args: &[String], i: &mut usize, flag: &str) -> Result<PathBuf, String> {
        *i += 1;
        args.get(*i)
            .map(PathBuf::from)
            .ok_or_else(|| format!("Missing value after {}", flag))
    }

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                process::exit(0);
            }
            "-o" | "--output" => options.output = Some(value(&args, &mut i, "-o")?),
            "-c" | "--config" => options.config = Some(value(&args, &mut i, "-c")?),
            "--exclude-functions" => {
                options.exclude_functions = Some(value(&args, &mut i, "--exclude-functions")?)
            }
            "--include-functions" => {
                options.include_functions = Some(value(&args, &mut i, "--include-functions")?)
            }
            "--include-globals" => {
                options.include_globals = Some(value(&args, &mut i, "--include-globals")?)
            }
            "--exclude-locals" => {
                options.exclude_locals = Some(value(&args, &mut i, "--exclude-locals")?)
            }
            "--original-type" => options.original_type = true,
            "--no-operators" => options.no_operators = true,
            "--no-calls" => options.no_calls = true,
            arg if arg.starts_with('-') && arg != "-" => {
                return Err(format!("Unknown option: {}", arg));
            }
            arg => {
                if options.input.is_some() {
                    return Err("Multiple input files specified".to_string());
                }
                options.input = Some(arg.to_string());
            }
        }
        i += 1;
    }

    Ok(options)
}

fn read_input(input: &str) -> Result<String, String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        Ok(buffer)
    } else {
        let path = Path::new(input);
        if !path.exists() {
            return Err(format!("Input file not found: {}", input));
        }
        fs::read_to_string(path).map_err(|e| format!("Failed to read file '{}': {}", input, e))
    }
}

/// Merge the optional config file and the command-line flags into the final
/// run parameters. Flags win over config values.
fn resolve_run(options: &Options) -> Result<(FilterLists, SearchOptions, PathBuf), String> {
    let config = match &options.config {
        Some(path) => Some(RunConfig::load(path).map_err(|e| e.to_string())?),
        None => None,
    };

    let pick = |flag: &Option<PathBuf>, configured: Option<PathBuf>, name: &str| {
        flag.clone()
            .or(configured)
            .ok_or_else(|| format!("Missing required filter list: {}", name))
    };

    let configured = config.as_ref().map(|c| c.filter_lists());
    let lists = FilterLists {
        excluded_functions: pick(
            &options.exclude_functions,
            configured.as_ref().map(|l| l.excluded_functions.clone()),
            "--exclude-functions",
        )?,
        included_functions: pick(
            &options.include_functions,
            configured.as_ref().map(|l| l.included_functions.clone()),
            "--include-functions",
        )?,
        included_globals: pick(
            &options.include_globals,
            configured.as_ref().map(|l| l.included_globals.clone()),
            "--include-globals",
        )?,
        excluded_locals: pick(
            &options.exclude_locals,
            configured.as_ref().map(|l| l.excluded_locals.clone()),
            "--exclude-locals",
        )?,
    };

    let mut search = config
        .as_ref()
        .map(|c| c.search_options())
        .unwrap_or_default();
    if options.original_type {
        search.original_type = true;
    }
    if options.no_operators {
        search.list_operators = false;
    }
    if options.no_calls {
        search.list_calls = false;
    }

    let output = options
        .output
        .clone()
        .or_else(|| config.as_ref().map(|c| c.output.clone()))
        .unwrap_or_else(|| PathBuf::from("search.json"));

    Ok((lists, search, output))
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(true)
        .init();

    let options = match parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if options.input.is_none() {
        eprintln!("Error: Missing input file");
        eprintln!();
        print_usage();
        process::exit(1);
    }

    let (lists, search, output) = match resolve_run(&options) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    // The catalog is meaningless without its filter configuration; a missing
    // required list terminates the run before any output is written.
    let policy = match FilterPolicy::load(&lists) {
        Ok(policy) => policy,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let source = match read_input(options.input.as_ref().unwrap()) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let module = match parse_module(&source) {
        Ok(module) => module,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let outfile = match fs::File::create(&output) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Error: Failed to create output file '{}': {}", output.display(), e);
            process::exit(1);
        }
    };

    let pass = SearchFilePass::new(&policy, search);
    if let Err(e) = pass.run(&module, io::BufWriter::new(outfile)) {
        eprintln!("Error: Failed to write '{}': {}", output.display(), e);
        process::exit(1);
    }
}
