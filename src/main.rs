use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use ctra::device_api::AudioDevice;
use ctra::{Module, builder, device, load_module};

const USAGE: &str = "usage:
  ctra play <file.ctra> [volume]     play a module (enter stops)
  ctra info <file.ctra>              print module metadata
  ctra pack <song.json> <out.ctra>   build a module from a manifest";

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("play") => {
            let path = args.get(1).context(USAGE)?;
            let volume = match args.get(2) {
                Some(v) => v.parse().context("volume must be a number")?,
                None => 1.0,
            };
            cmd_play(Path::new(path), volume)
        }
        Some("info") => cmd_info(Path::new(args.get(1).context(USAGE)?)),
        Some("pack") => {
            let manifest = args.get(1).context(USAGE)?;
            let out = args.get(2).context(USAGE)?;
            cmd_pack(Path::new(manifest), Path::new(out))
        }
        _ => {
            eprintln!("{USAGE}");
            Ok(())
        }
    }
}

fn cmd_play(path: &Path, volume: f32) -> anyhow::Result<()> {
    let output: Arc<dyn AudioDevice> = Arc::new(device::start()?);
    let track = load_module(output, path, volume)?;

    let title = if track.title().is_empty() { "(untitled)" } else { track.title() };
    println!(
        "playing {} at {} bpm, speed {} (enter stops)",
        title,
        track.tempo(),
        track.speed()
    );
    track.play();

    let mut line = String::new();
    let _ = std::io::stdin().read_line(&mut line);
    track.stop();
    Ok(())
}

fn cmd_info(path: &Path) -> anyhow::Result<()> {
    let module = Module::load(path)?;
    println!("title:    {}", module.title);
    println!("author:   {}", module.author);
    println!("tempo:    {} bpm", module.tempo);
    println!("speed:    {} ticks/row", module.speed);
    println!("interval: {} ms", module.interval_ms());
    println!("samples:  {}", module.samples.len());
    for (i, s) in module.samples.iter().enumerate() {
        let looped = match s.loop_region {
            Some(r) => format!(", loop [{}, {})", r.start, r.end),
            None => String::new(),
        };
        println!(
            "  [{i}] {} Hz, {}-bit, {} ch, {} frames{looped}",
            s.sample_rate,
            s.bits_per_sample,
            s.channels,
            s.frames()
        );
    }
    println!("patterns: {}", module.patterns.len());
    for (i, p) in module.patterns.iter().enumerate() {
        println!("  [{i}] {} channels x {} rows", p.channels(), p.rows());
    }
    Ok(())
}

fn cmd_pack(manifest_path: &Path, out: &Path) -> anyhow::Result<()> {
    let song = builder::load_manifest(manifest_path)?;
    let base_dir = manifest_path.parent().unwrap_or(Path::new("."));
    let module = builder::build(base_dir, &song)?;
    module.save(out)?;
    println!(
        "packed {} ({} samples, {} patterns) -> {}",
        if module.title.is_empty() { "(untitled)" } else { &module.title },
        module.samples.len(),
        module.patterns.len(),
        out.display()
    );
    Ok(())
}
