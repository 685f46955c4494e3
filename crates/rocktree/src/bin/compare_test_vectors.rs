//! Compare decoded test vectors against reference output.
//!
//! For every `X_ref.json` in the directory, loads the matching `X.json`
//! written by `decode_test_vectors` and compares the two value-for-value:
//! integers exactly, floats within a per-field tolerance.
//!
//! Run: `cargo run -p rocktree --features test-tools --bin compare_test_vectors -- <test_vectors_dir>`
//!
//! Prerequisites:
//! - Reference JSON files (`*_ref.json`) from an independent decoder
//! - Decoded JSON files (`*.json`) from `decode_test_vectors`

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

const REF_SUFFIX: &str = "_ref.json";

fn main() {
    let args: Vec<String> = env::args().collect();
    let test_vectors_dir = PathBuf::from(args.get(1).map_or("test_vectors", String::as_str));

    println!("Test vectors: {}\n", test_vectors_dir.display());

    let pairs = match find_pairs(&test_vectors_dir) {
        Ok(pairs) if !pairs.is_empty() => pairs,
        Ok(_) => {
            eprintln!("No *{REF_SUFFIX} files found");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let mut all_passed = true;

    for (name, ours, reference) in &pairs {
        println!("--- {name} ---");
        let result = if name.starts_with("bulk") {
            compare_bulk_metadata(ours, reference)
        } else {
            compare_node_data(ours, reference)
        };
        if let Err(e) = result {
            println!("FAILED: {e}\n");
            all_passed = false;
        } else {
            println!("PASSED\n");
        }
    }

    if all_passed {
        println!("All comparisons PASSED!");
    } else {
        println!("Some comparisons FAILED!");
        std::process::exit(1);
    }
}

/// `(stem, decoded path, reference path)` for every reference file in `dir`.
fn find_pairs(dir: &Path) -> Result<Vec<(String, PathBuf, PathBuf)>, String> {
    let entries =
        fs::read_dir(dir).map_err(|e| format!("failed to list {}: {e}", dir.display()))?;

    let mut pairs: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter_map(|reference| {
            let stem = reference
                .file_name()?
                .to_str()?
                .strip_suffix(REF_SUFFIX)?
                .to_string();
            let ours = dir.join(format!("{stem}.json"));
            Some((stem, ours, reference))
        })
        .collect();
    pairs.sort();
    Ok(pairs)
}

fn compare_bulk_metadata(ours_path: &Path, ref_path: &Path) -> Result<(), String> {
    let ours = read_json(ours_path)?;
    let reference = read_json(ref_path)?;

    compare_i64_field("epoch", &ours, &reference)?;
    compare_i64_field("node_count", &ours, &reference)?;
    compare_f64_field("head_node_center", &ours, &reference, 1.0)?;
    compare_f64_field("meters_per_texel", &ours, &reference, 1e-3)?;

    let ours_paths = array_field("node_paths", &ours)?;
    let ref_paths = array_field("node_paths", &reference)?;
    compare_len("node_paths", ours_paths, ref_paths)?;

    for (i, (ours_node, ref_node)) in ours_paths.iter().zip(ref_paths).enumerate() {
        let ours_node_path = ours_node["path"].as_str();
        let ref_node_path = ref_node["path"].as_str();
        if ours_node_path != ref_node_path {
            return Err(format!(
                "node_paths[{i}].path: mismatch: ours={ours_node_path:?}, reference={ref_node_path:?}"
            ));
        }
        compare_i64_field("level", ours_node, ref_node)
            .and_then(|()| compare_i64_field("flags", ours_node, ref_node))
            .map_err(|e| format!("node_paths[{i}].{e}"))?;
    }
    println!("  node_paths: {} entries match", ours_paths.len());

    Ok(())
}

fn compare_node_data(ours_path: &Path, ref_path: &Path) -> Result<(), String> {
    let ours = read_json(ours_path)?;
    let reference = read_json(ref_path)?;

    compare_i64_field("mesh_count", &ours, &reference)?;

    let ours_meshes = array_field("meshes", &ours)?;
    let ref_meshes = array_field("meshes", &reference)?;
    compare_len("meshes", ours_meshes, ref_meshes)?;

    for (i, (ours_mesh, ref_mesh)) in ours_meshes.iter().zip(ref_meshes).enumerate() {
        compare_mesh(i, ours_mesh, ref_mesh)?;
    }

    Ok(())
}

fn compare_mesh(idx: usize, ours: &Value, reference: &Value) -> Result<(), String> {
    let prefix = format!("mesh[{idx}]");
    let with_prefix = |e: String| format!("{prefix}.{e}");

    for field in [
        "vertex_count",
        "original_index_count",
        "index_count",
        "texture_width",
        "texture_height",
    ] {
        compare_i64_field(field, ours, reference).map_err(with_prefix)?;
    }

    compare_f64_field("uv_offset", ours, reference, 1e-3).map_err(with_prefix)?;
    compare_f64_field("uv_scale", ours, reference, 1e-9).map_err(with_prefix)?;
    compare_i64_array_field("layer_bounds", ours, reference).map_err(with_prefix)?;

    compare_vertices(
        array_field("first_vertices", ours).map_err(with_prefix)?,
        array_field("first_vertices", reference).map_err(with_prefix)?,
    )
    .map_err(with_prefix)?;

    compare_i64_array_field("first_indices", ours, reference).map_err(with_prefix)?;

    Ok(())
}

fn compare_vertices(ours: &[Value], reference: &[Value]) -> Result<(), String> {
    compare_len("first_vertices", ours, reference)?;

    for (i, (ours_vertex, ref_vertex)) in ours.iter().zip(reference).enumerate() {
        for field in ["x", "y", "z", "w", "u", "v"] {
            compare_i64_field(field, ours_vertex, ref_vertex)
                .map_err(|e| format!("first_vertices[{i}].{e}"))?;
        }
    }

    println!("  first_vertices: {} vertices match", ours.len());
    Ok(())
}

fn compare_i64_field(name: &str, ours: &Value, reference: &Value) -> Result<(), String> {
    let ours_val = ours[name]
        .as_i64()
        .ok_or(format!("{name}: missing decoded value"))?;
    let ref_val = reference[name]
        .as_i64()
        .ok_or(format!("{name}: missing reference value"))?;
    if ours_val != ref_val {
        return Err(format!(
            "{name}: mismatch: ours={ours_val}, reference={ref_val}"
        ));
    }
    Ok(())
}

fn compare_i64_array_field(name: &str, ours: &Value, reference: &Value) -> Result<(), String> {
    let ours = array_field(name, ours)?;
    let reference = array_field(name, reference)?;
    compare_len(name, ours, reference)?;

    for (i, (ours_val, ref_val)) in ours.iter().zip(reference).enumerate() {
        let ours_num = ours_val
            .as_i64()
            .ok_or(format!("{name}[{i}]: invalid decoded value"))?;
        let ref_num = ref_val
            .as_i64()
            .ok_or(format!("{name}[{i}]: invalid reference value"))?;
        if ours_num != ref_num {
            return Err(format!(
                "{name}[{i}]: mismatch: ours={ours_num}, reference={ref_num}"
            ));
        }
    }

    println!("  {name}: {len} values match", len = ours.len());
    Ok(())
}

fn compare_f64_field(
    name: &str,
    ours: &Value,
    reference: &Value,
    tolerance: f64,
) -> Result<(), String> {
    let ours = array_field(name, ours)?;
    let reference = array_field(name, reference)?;
    compare_len(name, ours, reference)?;

    for (i, (ours_val, ref_val)) in ours.iter().zip(reference).enumerate() {
        let ours_num = ours_val
            .as_f64()
            .ok_or(format!("{name}[{i}]: invalid decoded value"))?;
        let ref_num = ref_val
            .as_f64()
            .ok_or(format!("{name}[{i}]: invalid reference value"))?;
        let diff = (ours_num - ref_num).abs();
        if diff > tolerance {
            return Err(format!(
                "{name}[{i}]: mismatch: ours={ours_num}, reference={ref_num}, diff={diff}"
            ));
        }
    }

    println!(
        "  {name}: {len} values match (tolerance={tolerance})",
        len = ours.len()
    );
    Ok(())
}

fn compare_len(name: &str, ours: &[Value], reference: &[Value]) -> Result<(), String> {
    if ours.len() != reference.len() {
        return Err(format!(
            "{name}: length mismatch: ours={}, reference={}",
            ours.len(),
            reference.len()
        ));
    }
    Ok(())
}

fn array_field<'a>(name: &str, value: &'a Value) -> Result<&'a [Value], String> {
    value[name]
        .as_array()
        .map(Vec::as_slice)
        .ok_or(format!("{name}: missing array"))
}

fn read_json(path: &Path) -> Result<Value, String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&content).map_err(|e| format!("failed to parse {}: {e}", path.display()))
}
