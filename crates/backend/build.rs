use std::env;
use std::fs;
use std::path::{Path, PathBuf};

// Кладёт config.toml рядом со скомпилированным бинарником, чтобы сервис
// нашёл его при exe-относительном поиске (см. shared/config.rs).
fn main() {
    println!("cargo:rerun-if-changed=../../config.toml");

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let source = manifest_dir.join("../../config.toml");

    let profile_dir = match profile_dir() {
        Some(dir) => dir,
        None => {
            println!("cargo:warning=Target profile dir not found, config.toml not copied");
            return;
        }
    };

    if source.exists() {
        let dest = profile_dir.join("config.toml");
        fs::copy(&source, &dest)
            .unwrap_or_else(|e| panic!("Failed to copy config.toml to {:?}: {}", dest, e));
    } else {
        println!(
            "cargo:warning=config.toml not found at {:?}, embedded defaults will be used",
            source
        );
    }
}

// OUT_DIR имеет вид target/<profile>/build/backend-<hash>/out
fn profile_dir() -> Option<PathBuf> {
    let out_dir = env::var("OUT_DIR").ok()?;
    let profile = env::var("PROFILE").ok()?;
    Path::new(&out_dir)
        .ancestors()
        .find(|p| p.ends_with(&profile))
        .map(Path::to_path_buf)
}
