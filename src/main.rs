mod cmdline;

use std::fs::File;
use std::io::Write;
use std::{fs, io, process::exit};

use lang_c::driver::{parse_preprocessed, Config, Flavor};
use serde::Serialize;

use cdecl_core::declarations::{self, DeclRecord};
use cdecl_core::env::Env;
use cdecl_core::error::ErrorCollector;

use crate::cmdline::Cli;

#[derive(Debug, Serialize)]
struct JsonRecord {
    name: String,
    #[serde(rename = "storageClass")]
    storage_class: String,
    #[serde(rename = "type")]
    type_name: String,
    size: u32,
    align: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<i64>,
}

impl JsonRecord {
    fn new(record: &DeclRecord) -> Self {
        Self {
            name: record.name.clone(),
            storage_class: record.storage_class.to_string(),
            type_name: record.t.to_string(),
            size: record.t.t.sizeof(),
            align: record.t.t.alignof(),
            value: record.initializer.as_ref().map(|value| value.v as i64),
        }
    }
}

fn write_records(f: &mut dyn Write, records: &[DeclRecord], cli: &Cli) -> io::Result<()> {
    if cli.json {
        let json_records: Vec<JsonRecord> = records.iter().map(JsonRecord::new).collect();
        let json = serde_json::to_string_pretty(&json_records)?;
        writeln!(f, "{}", json)
    } else {
        for record in records {
            if cli.verbose {
                writeln!(
                    f,
                    "{}; size {}, align {}",
                    record,
                    record.t.t.sizeof(),
                    record.t.t.alignof()
                )?;
            } else {
                writeln!(f, "{}", record)?;
            }
        }
        Ok(())
    }
}

fn main() {
    let cli = Cli::parse();

    let source = match fs::read_to_string(cli.get_input()) {
        Ok(source) => source,
        Err(e) => {
            println!("Cannot read {}: {}", cli.get_input().display(), e);
            exit(1);
        }
    };

    let mut cfg = Config::default();
    cfg.flavor = Flavor::StdC11;
    let p = match parse_preprocessed(&cfg, source) {
        Ok(p) => p,
        Err(e) => {
            println!("{}", e);
            exit(1);
        }
    };

    let mut ec = ErrorCollector::new();
    let r = declarations::process_translation_unit(Env::new(), p.unit, &mut ec);
    ec.print_issues();
    if let Ok((_, records)) = r {
        match cli.output {
            Some(ref output_path) => {
                let written =
                    File::create(output_path).and_then(|mut f| write_records(&mut f, &records, &cli));
                if let Err(e) = written {
                    println!("Cannot open {} for writing: {}", output_path.display(), e);
                    exit(1);
                }
            }
            None => {
                if let Err(e) = write_records(&mut io::stdout(), &records, &cli) {
                    println!("{}", e);
                    exit(1);
                }
            }
        }
    } else {
        exit(1);
    }
}
