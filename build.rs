// build.rs
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let version = std::env::var("CARGO_PKG_VERSION")?;
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    let local_hash = std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| {
            let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if hash.len() >= 8 {
                hash[..8].to_string()
            } else {
                hash
            }
        })
        .unwrap_or_else(|| "unknown".to_string());

    let local_dirty = std::process::Command::new("git")
        .args(["diff", "--quiet"])
        .status()
        .map(|status| if status.success() { "" } else { "-dirty" })
        .unwrap_or("");

    let full_version = format!("{} {}{}-{}", version, local_hash, local_dirty, profile);

    println!("cargo:rustc-env=GRIDCUT_VERSION={}", full_version);
    println!("cargo:rerun-if-changed=.git/HEAD");

    Ok(())
}
