//! meshcast CLI - mesh intersection checks
//!
//! Meshes are JSON documents with a flat `vertices` array and optional
//! `indices` and `groups`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use meshcast::primitives::{make_cube, make_sphere};
use meshcast::{intersects_brute_force, BvhSettings, Mesh, Transform, TriangleMesh};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "meshcast")]
#[command(about = "BVH-accelerated mesh intersection checks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether two meshes intersect
    Check {
        /// Mesh that gets the hierarchy
        a: PathBuf,
        /// Mesh placed into A's frame
        b: PathBuf,
        /// Translation of B, applied after rotation
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
        translate: Option<Vec<f64>>,
        /// Rotation of B as roll, pitch, yaw in degrees
        #[arg(long, num_args = 3, value_names = ["ROLL", "PITCH", "YAW"], allow_negative_numbers = true)]
        rotate: Option<Vec<f64>>,
        /// Hierarchy settings (TOML)
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Do not build a hierarchy for B
        #[arg(long)]
        no_tree: bool,
        /// Test every triangle pair instead
        #[arg(long, conflicts_with = "no_tree")]
        brute_force: bool,
        /// Print traversal counters as JSON
        #[arg(long, conflicts_with = "brute_force")]
        stats: bool,
    },
    /// Display information about a mesh and its hierarchy
    Info {
        /// Mesh file
        mesh: PathBuf,
        /// Hierarchy settings (TOML)
        #[arg(long)]
        settings: Option<PathBuf>,
    },
    /// Write a primitive mesh to a JSON file
    Generate {
        /// Shape to generate
        shape: Shape,
        /// Output file
        output: PathBuf,
        /// Edge length (cube) or radius (sphere)
        #[arg(long, default_value_t = 1.0)]
        size: f64,
        /// Latitude bands (sphere)
        #[arg(long, default_value_t = 16)]
        rings: u32,
        /// Longitude slices (sphere)
        #[arg(long, default_value_t = 32)]
        segments: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Shape {
    Cube,
    Sphere,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            a,
            b,
            translate,
            rotate,
            settings,
            no_tree,
            brute_force,
            stats,
        } => {
            let transform = placement(translate.as_deref(), rotate.as_deref());
            let settings = load_settings(settings.as_deref())?;
            let a = load_mesh(&a)?;
            let b = load_mesh(&b)?;

            if brute_force {
                println!("{}", intersects_brute_force(&a, &b, &transform));
                return Ok(());
            }

            let a = Mesh::with_bounds_tree(a, &settings).context("failed to build hierarchy for A")?;
            let b = if no_tree {
                Mesh::new(b)?
            } else {
                Mesh::with_bounds_tree(b, &settings).context("failed to build hierarchy for B")?
            };

            let (hit, counters) = a.intersects_geometry_with_stats(&b, &transform)?;
            println!("{hit}");
            if stats {
                println!("{}", serde_json::to_string_pretty(&counters)?);
            }
        }
        Commands::Info { mesh, settings } => {
            let settings = load_settings(settings.as_deref())?;
            show_info(&mesh, &settings)?;
        }
        Commands::Generate {
            shape,
            output,
            size,
            rings,
            segments,
        } => {
            let mesh = match shape {
                Shape::Cube => make_cube(size),
                Shape::Sphere => make_sphere(size, rings, segments),
            };
            let json = serde_json::to_string(&mesh)?;
            fs::write(&output, json)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!(
                "Wrote {} triangles to {}",
                mesh.num_triangles(),
                output.display()
            );
        }
    }

    Ok(())
}

/// Rotation first, then translation.
fn placement(translate: Option<&[f64]>, rotate: Option<&[f64]>) -> Transform {
    let rotation = match rotate {
        Some([roll, pitch, yaw]) => {
            Transform::rotation_euler(roll.to_radians(), pitch.to_radians(), yaw.to_radians())
        }
        _ => Transform::identity(),
    };
    let translation = match translate {
        Some([x, y, z]) => Transform::translation(*x, *y, *z),
        _ => Transform::identity(),
    };
    translation.then(&rotation)
}

fn load_mesh(path: &Path) -> Result<TriangleMesh> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mesh: TriangleMesh = serde_json::from_str(&json)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    mesh.validate()
        .with_context(|| format!("invalid mesh in {}", path.display()))?;
    Ok(mesh)
}

fn load_settings(path: Option<&Path>) -> Result<BvhSettings> {
    let Some(path) = path else {
        return Ok(BvhSettings::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    BvhSettings::from_toml_str(&text)
        .with_context(|| format!("invalid settings in {}", path.display()))
}

fn show_info(path: &Path, settings: &BvhSettings) -> Result<()> {
    let geometry = load_mesh(path)?;
    let mesh = Mesh::with_bounds_tree(geometry, settings)?;
    let geometry = mesh.geometry();
    let bounds = mesh.bounding_box();

    println!("File: {}", path.display());
    println!("Vertices: {}", geometry.num_vertices());
    println!("Triangles: {}", geometry.num_triangles());
    if bounds.is_empty() {
        println!("Bounds: empty");
    } else {
        println!(
            "Bounds: ({:.4}, {:.4}, {:.4}) - ({:.4}, {:.4}, {:.4})",
            bounds.min.x, bounds.min.y, bounds.min.z, bounds.max.x, bounds.max.y, bounds.max.z
        );
    }
    if let Some(tree) = mesh.bounds_tree() {
        println!("Roots: {}", tree.root_count());
        println!("Nodes: {}", tree.node_count());
        let [x, y, z] = tree.split_axis_counts();
        println!("Splits: x {x}, y {y}, z {z}");
    }

    Ok(())
}
