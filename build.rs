//! Build script for detecting system dependencies and providing installation guidance.
//!
//! X11 is always needed for input injection. OpenCV is only checked when the
//! `vision` feature is enabled.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Check for pkg-config
    let have_pkg_config = check_pkg_config();

    // Check for X11 (required for input injection on Linux)
    if have_pkg_config {
        check_x11();
    }

    // Check for OpenCV only when camera support is built
    if env::var_os("CARGO_FEATURE_VISION").is_some() && have_pkg_config {
        check_opencv();
    }

    // Print detected environment
    println!(
        "cargo:rustc-env=BUILD_TARGET={}",
        env::var("TARGET").unwrap_or_default()
    );
    println!("cargo:rustc-env=BUILD_HOST={}", env::var("HOST").unwrap_or_default());
}

fn check_opencv() {
    println!("cargo:rerun-if-env-changed=PKG_CONFIG_PATH");
    println!("cargo:rerun-if-env-changed=OPENCV_LINK_PATHS");
    println!("cargo:rerun-if-env-changed=OPENCV_INCLUDE_PATHS");

    let found = ["opencv4", "opencv"].iter().find_map(|name| {
        Command::new("pkg-config")
            .args(["--modversion", name])
            .output()
            .ok()
            .filter(|output| output.status.success())
            .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
    });

    match found {
        Some(version) => println!("cargo:warning=Found OpenCV version: {version}"),
        None => {
            println!("cargo:warning=OpenCV not found via pkg-config. The `vision` feature needs it.");
            println!("cargo:warning=On Ubuntu: sudo apt-get install libopencv-dev");
            println!("cargo:warning=On macOS: brew install opencv");
        }
    }
}

fn check_x11() {
    // Only check on Linux
    if env::var("TARGET").unwrap_or_default().contains("linux") {
        let output = Command::new("pkg-config").args(["--exists", "x11"]).output();

        match output {
            Ok(output) if output.status.success() => {}
            _ => {
                println!("cargo:warning=X11 libraries not found. Input injection will not work.");
                println!("cargo:warning=On Ubuntu: sudo apt-get install libx11-dev libxtst-dev");
            }
        }
    }
}

fn check_pkg_config() -> bool {
    let output = Command::new("pkg-config").arg("--version").output();

    match output {
        Ok(output) if output.status.success() => true,
        _ => {
            println!("cargo:warning=pkg-config not found. This is required to find system libraries.");
            println!("cargo:warning=On Ubuntu: sudo apt-get install pkg-config");
            println!("cargo:warning=On macOS: brew install pkg-config");
            false
        }
    }
}
