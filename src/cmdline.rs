use std::env;
use std::path::PathBuf;
use std::process::exit;

pub struct Cli {
    /// Print size and alignment for every record
    pub verbose: bool,

    /// Dump records as JSON
    pub json: bool,

    /// Output file name
    pub output: Option<PathBuf>,

    /// Input file name
    input: Option<PathBuf>,
}

impl Cli {
    pub fn parse() -> Self {
        let mut args = env::args();
        let prog_name = args.next().unwrap();

        let mut result = Self::new();
        loop {
            let arg = if let Some(arg) = args.next() {
                arg
            } else {
                break;
            };
            match arg.as_str() {
                "-h" | "-help" | "--help" => {
                    print_help(&prog_name);
                    exit(0);
                }

                "-v" => result.verbose = true,

                "--json" => result.json = true,

                "-o" => {
                    let path = if let Some(path) = args.next() {
                        path
                    } else {
                        die("Expected filename after '-o'");
                    };
                    result.set_output(&path);
                }
                s if s.starts_with("-o") => {
                    let path = &s[2..];
                    result.set_output(path);
                }

                s if s.starts_with("-") => die(&format!("Unrecognized parameter: {}", s)),

                s => result.set_input(s),
            }
        }

        if result.input.is_none() {
            die("No input files");
        }

        result
    }

    pub fn get_input(&self) -> &PathBuf {
        self.input.as_ref().unwrap()
    }

    fn new() -> Self {
        Self {
            verbose: false,
            json: false,
            output: None,
            input: None,
        }
    }

    fn set_output(&mut self, output: &str) {
        if self.output.is_some() {
            die("Output file must not be specified more than once");
        }
        self.output = Some(PathBuf::from(output));
    }

    fn set_input(&mut self, input: &str) {
        if self.input.is_some() {
            die("Only one input file is supported");
        }
        self.input = Some(PathBuf::from(input));
    }
}

fn die(msg: &str) -> ! {
    println!("{}", msg);
    exit(1);
}

fn print_help(prog_name: &str) {
    print!(
        "Usage: {} [OPTIONS] <INPUT>

Arguments:
  <INPUT>  Input file name, already preprocessed

Options:
  -v                       Print size and alignment for every record
  --json                   Dump records as JSON
  -o <OUTPUT>              Output file name
  -h, --help               Print help",
        prog_name
    );
}
