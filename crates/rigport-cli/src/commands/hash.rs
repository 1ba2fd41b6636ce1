//! Hash command

use anyhow::Result;
use rigport_core::PathHash;

pub fn run(paths: &[String]) -> Result<()> {
    for path in paths {
        let hash = PathHash::of(path);
        println!("{}  {:>10}  {}", hash.to_hex(), hash, path);
    }
    Ok(())
}
