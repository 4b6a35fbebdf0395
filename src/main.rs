use gallery_rs::config::{self, Config};
use gallery_rs::manifest;
use std::env;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        eprintln!("Usage: gallery-rs [root_dir]");
        process::exit(1);
    }
    let root = args
        .get(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let config_path = config::default_config_path(&root);
    let config = if config_path.is_file() {
        match Config::load(&config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let photos_dir = root.join(&config.photos_dir);
    let output = root.join(&config.output);

    let t0 = Instant::now();
    let items = match manifest::build(&root, &photos_dir, config.jpeg_quality) {
        Ok(items) => items,
        Err(e) => {
            eprintln!("failed to build manifest: {}", e);
            process::exit(1);
        }
    };
    if let Err(e) = manifest::write(&items, &output) {
        eprintln!("failed to write {}: {}", output.display(), e);
        process::exit(1);
    }
    println!(
        "[manifest] wrote {} images to {} in {:?}",
        items.len(),
        output.display(),
        t0.elapsed()
    );
}
