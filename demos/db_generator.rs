//! Serving database rows as files.
//!
//! A generator registered for `*.json` looks up each requested name in a
//! "database" when it is opened. Nothing is listed or stored ahead of time.
//!
//! Run with: `cargo run --example db_generator --features serde`

use std::collections::HashMap;
use std::io;

use marshalfs::{FsError, FsExt, MarshalFs, OpenFs, marshal, path};

fn query(db: &HashMap<&'static str, &'static str>, id: &str) -> io::Result<String> {
    db.get(id)
        .map(|v| v.to_string())
        .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
}

fn main() -> Result<(), FsError> {
    let db: HashMap<&'static str, &'static str> =
        [("a", "apples"), ("b", "bananas")].into_iter().collect();

    let fs = MarshalFs::new(marshal::json).with_generator("*.json", move |filename: &str| {
        let base = path::base_name(filename);
        let id = base.strip_suffix(".json").unwrap_or(base);
        Ok(Some(query(&db, id)?))
    })?;

    // A row that isn't there is reported as not-found.
    let err = fs.open("z.json").unwrap_err();
    println!("z.json: {err}");
    assert!(err.is_not_found());

    // One that is comes back marshalled.
    println!("{}", fs.read_to_string("b.json")?);
    assert_eq!(fs.read_to_string("a.json")?, r#""apples""#);

    // Generated files are resolved on demand and never listed.
    assert!(fs.read_dir(".")?.is_empty());

    Ok(())
}
