use std::env;

fn main() {
    // ESP-IDF link arguments are only needed for the firmware binary. Host builds
    // of the library (and its tests) skip them.
    if env::var_os("CARGO_FEATURE_ESP").is_some() {
        embuild::espidf::sysenv::output();
    }

    println!("cargo:rerun-if-changed=build.rs");
}
