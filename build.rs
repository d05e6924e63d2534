use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    // Askama reads templates at compile time; tell cargo about them so a
    // template edit rebuilds the binary. The template tree is flat.
    if let Ok(entries) = fs::read_dir(Path::new("templates")) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("html") {
                println!("cargo:rerun-if-changed={}", path.display());
            }
        }
    }

    // Marker for telling apart stale binaries during development.
    let build_id = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "dev".to_string());
    println!("cargo:rustc-env=CONGRESO_BUILD_ID={}", build_id);
}
