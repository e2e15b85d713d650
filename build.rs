//! Build script for keepalive
//!
//! The release pipeline stamps the binary through environment variables.
//! Their values are opaque here; this only makes cargo rebuild when they change.

fn main() {
    for var in [
        "KEEPALIVE_VERSION",
        "KEEPALIVE_BUILD_TIME",
        "KEEPALIVE_ENVIRONMENT",
    ] {
        println!("cargo:rerun-if-env-changed={}", var);
    }
    println!("cargo:rerun-if-changed=build.rs");
}
