//! Decode captured rocktree buffers into JSON summaries.
//!
//! Reads `bulk_root.pb` and every `node_*.pb` in the given directory and
//! writes `bulk_root.json` / `node_*.json` next to them. The layout matches
//! the reference decoder's output so that `compare_test_vectors` can check
//! the two value-for-value.
//!
//! Run: `cargo run -p rocktree --features test-tools --bin decode_test_vectors -- <test_vectors_dir>`
//!
//! Set `RUST_LOG=rocktree=debug` to see per-buffer decode logs.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rocktree::{BulkMetadata, Mesh, Node};
use serde_json::{Value, json};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Number of leading vertices written per mesh.
const SAMPLE_VERTICES: usize = 5;
/// Number of leading strip indices written per mesh.
const SAMPLE_INDICES: usize = 20;
/// Detail layer whose bound is reported as the drawn index count.
const REPORTED_LAYER: usize = 3;

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let test_vectors_dir = PathBuf::from(args.get(1).map_or("test_vectors", String::as_str));

    println!("Decoding test vectors from: {}\n", test_vectors_dir.display());

    let mut all_passed = true;

    println!("--- Bulk Metadata ---");
    if let Err(e) = decode_bulk_file(&test_vectors_dir.join("bulk_root.pb")) {
        println!("FAILED: {e}");
        all_passed = false;
    }

    let node_files = match find_node_files(&test_vectors_dir) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    for input in &node_files {
        println!("--- {} ---", input.display());
        if let Err(e) = decode_node_file(input) {
            println!("FAILED: {e}");
            all_passed = false;
        }
    }

    if !all_passed {
        println!("\nSome buffers failed to decode!");
        std::process::exit(1);
    }
    println!("\nDone! Compare the *.json files against *_ref.json with compare_test_vectors.");
}

fn find_node_files(dir: &Path) -> Result<Vec<PathBuf>, String> {
    let entries =
        fs::read_dir(dir).map_err(|e| format!("failed to list {}: {e}", dir.display()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("node_") && name.ends_with(".pb"))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn decode_bulk_file(input: &Path) -> Result<(), String> {
    let data = read_bytes(input)?;
    let bulk = rocktree::decode_bulk_metadata(&data)
        .map_err(|e| format!("{}: {e}", input.display()))?;
    write_json(&input.with_extension("json"), &bulk_to_json(&bulk))
}

fn decode_node_file(input: &Path) -> Result<(), String> {
    let data = read_bytes(input)?;
    let node =
        rocktree::decode_node_data(&data).map_err(|e| format!("{}: {e}", input.display()))?;
    write_json(&input.with_extension("json"), &node_to_json(&node))
}

fn bulk_to_json(bulk: &BulkMetadata) -> Value {
    let node_paths: Vec<Value> = bulk
        .nodes
        .iter()
        .map(|node| {
            let path = bulk.relative_path(node);
            json!({
                "path": path,
                "level": path.len(),
                "flags": node.flags.bits(),
            })
        })
        .collect();

    json!({
        "head_node_center": bulk.head_node_center.to_array(),
        "meters_per_texel": bulk.meters_per_texel,
        "epoch": bulk.epoch(),
        "node_count": bulk.nodes.len(),
        "node_paths": node_paths,
    })
}

fn node_to_json(node: &Node) -> Value {
    let meshes: Vec<Value> = node
        .meshes
        .iter()
        .enumerate()
        .map(|(index, mesh)| mesh_to_json(index, mesh))
        .collect();

    json!({
        "mesh_count": node.meshes.len(),
        "meshes": meshes,
    })
}

fn mesh_to_json(index: usize, mesh: &Mesh) -> Value {
    let (texture_width, texture_height) = mesh.texture_size();

    let first_vertices: Vec<Value> = mesh
        .vertices
        .iter()
        .take(SAMPLE_VERTICES)
        .map(|v| json!({ "x": v.x, "y": v.y, "z": v.z, "w": v.w, "u": v.u, "v": v.v }))
        .collect();

    json!({
        "index": index,
        "vertex_count": mesh.vertices.len(),
        "original_index_count": mesh.indices.len(),
        "index_count": mesh.layer_bounds()[REPORTED_LAYER],
        "texture_width": texture_width,
        "texture_height": texture_height,
        "uv_offset": mesh.uv_transform.offset.to_array(),
        "uv_scale": mesh.uv_transform.scale.to_array(),
        "layer_bounds": mesh.layer_bounds(),
        "first_vertices": first_vertices,
        "first_indices": &mesh.indices[..mesh.indices.len().min(SAMPLE_INDICES)],
    })
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, String> {
    fs::read(path).map_err(|e| format!("failed to read {}: {e}", path.display()))
}

fn write_json(path: &Path, value: &Value) -> Result<(), String> {
    let content = serde_json::to_string_pretty(value)
        .map_err(|e| format!("failed to serialize {}: {e}", path.display()))?;
    fs::write(path, content).map_err(|e| format!("failed to write {}: {e}", path.display()))?;
    println!("  wrote {}", path.display());
    Ok(())
}
