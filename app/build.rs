use std::env;
use std::path::PathBuf;

fn main() {
    // Put memory.x on the linker search path so cortex-m-rt's link.x can INCLUDE it
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    println!("cargo:rustc-link-search={}", manifest_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
}
