//! Copies a file, raising on every failure and resolving the error once at
//! the top.
//!
//! ```text
//! cargo run --example copy -- <from> <to>
//! RESCUE_TRACE=stderr cargo run --example copy -- missing.txt out.txt
//! ```

use std::env;
use std::fs;
use std::path::Path;

use anyhow::anyhow;
use rescue::{config, handler, raise, OrRaise, Recovery};

fn read(path: &Path) -> Vec<u8> {
    fs::read(path).or_raise_with(|| format!("reading {}", path.display()))
}

fn write(path: &Path, bytes: &[u8]) {
    if path.exists() {
        raise!("{} already exists", path.display());
    }
    fs::write(path, bytes).or_raise_with(|| format!("writing {}", path.display()));
}

fn copy(from: &Path, to: &Path) -> Result<usize, rescue::BoxError> {
    Recovery::new()
        .on_error(handler::log("copy"))
        .on_error(handler::annotate("copy failed"))
        .run(|| {
            let bytes = read(from);
            rescue::assert_that!(!bytes.is_empty(), "{} is empty", from.display());
            write(to, &bytes);
            Ok(bytes.len())
        })
}

fn main() -> anyhow::Result<()> {
    config::init_from_env()?;

    let mut args = env::args_os().skip(1);
    let (from, to) = match (args.next(), args.next()) {
        (Some(from), Some(to)) => (from, to),
        _ => return Err(anyhow!("usage: copy <from> <to>")),
    };

    let copied = copy(Path::new(&from), Path::new(&to)).map_err(|err| anyhow!(err))?;
    println!("copied {} bytes", copied);
    Ok(())
}
