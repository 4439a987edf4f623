//! Puts `memory.x` on the linker search path and adds the cortex-m-rt and
//! defmt linker scripts.

use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

fn main() {
    let out = PathBuf::from(env::var_os("OUT_DIR").expect("OUT_DIR is set by cargo"));
    File::create(out.join("memory.x"))
        .and_then(|mut f| f.write_all(include_bytes!("memory.x")))
        .expect("write memory.x to OUT_DIR");
    println!("cargo:rustc-link-search={}", out.display());
    println!("cargo:rerun-if-changed=memory.x");

    // Skip args already supplied through RUSTFLAGS to avoid duplicate scripts.
    let rustflags = env::var("CARGO_ENCODED_RUSTFLAGS").unwrap_or_default();
    if !rustflags.contains("link.x") {
        println!("cargo:rustc-link-arg-bins=-Tlink.x");
    }
    if !rustflags.contains("link-rp.x") {
        println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    }
    if !rustflags.contains("defmt.x") {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }
    if !rustflags.contains("--nmagic") {
        println!("cargo:rustc-link-arg-bins=--nmagic");
    }
}
