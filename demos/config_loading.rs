//! Testing config-loading code without touching disk.
//!
//! `load_config` only knows about filesystems. In production it would be
//! handed a directory on disk; here it gets a `MarshalFs` holding the value
//! we expect it to parse.
//!
//! Run with: `cargo run --example config_loading --features serde`

use marshalfs::{FileSpec, FsError, FsExt, FsExtJson, MarshalFs, marshal};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct AppConfig {
    name: String,
    workers: u32,
    verbose: bool,
}

/// The code under test.
fn load_config<F: FsExt>(fs: &F) -> Result<AppConfig, FsError> {
    fs.read_json("config.json")
}

fn main() -> Result<(), FsError> {
    let input = AppConfig {
        name: "demo".to_string(),
        workers: 3,
        verbose: true,
    };

    let fs = MarshalFs::new(marshal::json_pretty)
        .with_file("config.json", FileSpec::object(input.clone()))?;

    println!("config.json as the loader sees it:");
    println!("{}", fs.read_to_string("config.json")?);

    let output = load_config(&fs)?;
    assert_eq!(input, output, "load_config did not parse the file as expected");
    println!("parsed: {output:?}");

    // A missing file surfaces as a standard not-found error.
    let err = fs.read_json::<AppConfig>("missing.json").unwrap_err();
    println!("missing.json: {err}");
    assert!(err.is_not_found());

    Ok(())
}
