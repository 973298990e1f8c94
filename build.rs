use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");

    // Git hash is unavailable outside a checkout (e.g. crates.io, Docker builds)
    let version = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_default();

    let dirty = !version.is_empty()
        && Command::new("git")
            .args(["diff", "--quiet", "HEAD"])
            .status()
            .map(|s| !s.success())
            .unwrap_or(false);

    if dirty {
        println!("cargo:rustc-env=BUILD_VERSION={}-dirty", version);
    } else {
        println!("cargo:rustc-env=BUILD_VERSION={}", version);
    }
}
