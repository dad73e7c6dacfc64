//! Load an OBJ mesh and report its normalized geometry and internal depth.
//!
//! Run: `cargo run -p objdepth-cli -- <mesh.obj> [--strict] [--corner-indices] [--json <out.json>]`
//!
//! Logging goes through `RUST_LOG`, e.g. `RUST_LOG=objdepth=debug`.

use std::env;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use objdepth::{IndexMode, InternalDepth, LoadOptions, MeshGeometry, ObjLoader};
use tracing_subscriber::EnvFilter;

/// Corners and indices included in the JSON summary.
const JSON_PREVIEW: usize = 12;

const USAGE: &str =
    "usage: objdepth <mesh.obj> [--strict] [--corner-indices] [--json <out.json>]";

struct Args {
    path: PathBuf,
    options: LoadOptions,
    json: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut path = None;
    let mut options = LoadOptions::default();
    let mut json = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--strict" => {
                options = LoadOptions::strict().index_mode(options.index_mode);
            }
            "--corner-indices" => options = options.index_mode(IndexMode::Corner),
            "--json" => {
                let out = args.next().ok_or("--json needs an output path")?;
                json = Some(PathBuf::from(out));
            }
            "-h" | "--help" => return Err(USAGE.to_owned()),
            flag if flag.starts_with("--") => return Err(format!("unknown flag {flag}\n{USAGE}")),
            _ if path.is_none() => path = Some(PathBuf::from(arg)),
            _ => return Err(format!("unexpected argument {arg}\n{USAGE}")),
        }
    }

    Ok(Args {
        path: path.ok_or(USAGE)?,
        options,
        json,
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    tracing::debug!(path = %args.path.display(), options = ?args.options, "Loading mesh");
    let geometry = match ObjLoader::new(args.options).load_mesh(&args.path) {
        Ok(geometry) => geometry,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", args.path.display());
            std::process::exit(1);
        }
    };

    if geometry.is_empty() {
        eprintln!("{}: no geometry loaded", args.path.display());
        std::process::exit(1);
    }

    print_summary(&args.path, &geometry);

    if let Some(out) = &args.json {
        if let Err(e) = write_json(out, &geometry) {
            eprintln!("Failed to write {}: {e}", out.display());
            std::process::exit(1);
        }
        tracing::info!(path = %out.display(), "Wrote JSON summary");
    }
}

fn print_summary(path: &Path, geometry: &MeshGeometry) {
    let counts = &geometry.counts;
    println!("=== {} ===", path.display());
    println!(
        "Records: {} vertices, {} normals, {} texture coordinates, {} triangles",
        counts.vertices, counts.normals, counts.tex_coords, counts.triangles
    );
    println!("Scale: {}", geometry.scale);
    if let Some(vertices) = &geometry.vertices {
        println!("Packed corners: {}", vertices.vertex_count());
    }

    let depth = &geometry.internal_depth;
    println!("Depth hits: {}/{}", depth.hit_count(), depth.len());
    if let Some((min, max)) = depth.hit_range() {
        println!("Depth range: {min:.6} .. {max:.6}");
    }
}

fn write_json(out: &Path, geometry: &MeshGeometry) -> Result<(), Box<dyn std::error::Error>> {
    let (Some(vertices), Some(indices)) = (&geometry.vertices, &geometry.indices) else {
        return Err("geometry has no buffers".into());
    };
    let counts = &geometry.counts;

    let corners: Vec<_> = (0..vertices.vertex_count().min(JSON_PREVIEW))
        .map(|corner| vertices.vertex(corner).to_vec())
        .collect();
    let depth: Vec<_> = geometry
        .internal_depth
        .as_slice()
        .iter()
        .map(|&d| InternalDepth::is_hit(d).then_some(d))
        .collect();

    let summary = serde_json::json!({
        "counts": {
            "vertices": counts.vertices,
            "normals": counts.normals,
            "tex_coords": counts.tex_coords,
            "triangles": counts.triangles,
        },
        "scale": geometry.scale,
        "stride": vertices.stride(),
        "corner_count": vertices.vertex_count(),
        "first_corners": corners,
        "first_indices": &indices.as_slice()[..indices.len().min(JSON_PREVIEW)],
        "internal_depth": depth,
    });
    File::create(out)?.write_all(serde_json::to_string_pretty(&summary)?.as_bytes())?;
    Ok(())
}
