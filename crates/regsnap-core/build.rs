//! Build script for regsnap-core
//!
//! This script checks build requirements before compilation:
//! - Minimum Rust version (`core::mem::offset_of!` = Rust 1.77.0+)
//! - Target architecture support (ARM, ARM64, x86, x86-64)
//!
//! An unsupported architecture still fails in `lib.rs` via `compile_error!`;
//! the warning here just makes the reason visible earlier in the build log.

use std::env;

const SUPPORTED_ARCHES: &[&str] = &["arm", "aarch64", "x86", "x86_64"];

fn main()
{
    println!("cargo:rerun-if-changed=build.rs");

    // offset_of! is used for the golden layout tables
    if let Ok(rustc_version) = rustc_version::version() {
        let min_rust_version = rustc_version::Version::new(1, 77, 0);

        if rustc_version < min_rust_version {
            panic!(
                "regsnap-core requires Rust {} or newer (core::mem::offset_of!), found {}",
                min_rust_version, rustc_version
            );
        }
    } else {
        // If we can't get version (e.g., in some build environments), just warn
        println!("cargo:warning=could not verify Rust version");
    }

    // Cargo exposes the *target* architecture to build scripts through the environment,
    // cfg!(target_arch) here would describe the host instead.
    let target_arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();
    if !SUPPORTED_ARCHES.contains(&target_arch.as_str()) {
        println!(
            "cargo:warning=regsnap-core has no register snapshot layout for target architecture `{target_arch}`"
        );
    }
}
