use std::env;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("songs.rs");

    let songs_dir = Path::new("songs");
    let mut songs: Vec<(String, String)> = Vec::new();

    if songs_dir.exists() {
        for entry in WalkDir::new(songs_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "yaml"))
        {
            let path = entry.path();
            let name = path
                .strip_prefix(songs_dir)
                .unwrap()
                .with_extension("")
                .to_string_lossy()
                .replace('\\', "/");

            if let Ok(content) = fs::read_to_string(path) {
                songs.push((name, content));
            }
        }
    }

    let mut code = String::new();
    code.push_str("/// Embedded song documents: (name, YAML source)\n");
    code.push_str("pub static SONGS: &[(&str, &str)] = &[\n");
    for (name, content) in &songs {
        // Debug formatting yields a valid Rust string literal
        code.push_str(&format!("    ({:?}, {:?}),\n", name, content));
    }
    code.push_str("];\n");

    fs::write(&dest_path, code).unwrap();

    println!("cargo:rerun-if-changed=songs");
}
