//! foamport CLI - OpenFOAM polyMesh export tool.
//!
//! Usage: foamport <COMMAND> [OPTIONS] <INPUT> [OUTPUT_DIR]
//!
//! Run `foamport --help` for available commands.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};

use foamport::export::{self, ExportOptions, SetZoneExport, SideBcMode};
use foamport::io;
use foamport::mesh::{BlockId, Dimension, MeshModel, UnstructuredMesh};
use foamport::progress::Progress;

#[derive(Parser)]
#[command(name = "foamport")]
#[command(author, version, about = "OpenFOAM polyMesh exporter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input mesh file (.json, .ply, .stl)
        input: PathBuf,
    },

    /// Export a mesh to a polyMesh directory
    Export {
        /// Input mesh file (.json, .ply, .stl)
        input: PathBuf,

        /// Output polyMesh directory, created if missing
        output: PathBuf,

        /// Cell sets and zones to write
        #[arg(long, value_enum)]
        cell_export: Option<SetZoneChoice>,

        /// Face sets and zones to write
        #[arg(long, value_enum)]
        face_export: Option<SetZoneChoice>,

        /// Significant digits of point coordinates (4 to 16)
        #[arg(short, long)]
        precision: Option<usize>,

        /// 2-D extrusion thickness (0: average edge length)
        #[arg(short, long)]
        thickness: Option<f64>,

        /// Patches for the base and top faces of a 2-D grid
        #[arg(long, value_enum)]
        side_bc: Option<SideBcChoice>,

        /// Planarity tolerance of a 2-D grid
        #[arg(long)]
        tolerance: Option<f64>,

        /// Do not show a progress bar
        #[arg(short, long)]
        quiet: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum SetZoneChoice {
    /// Neither sets nor zones
    None,
    /// Set files only
    Sets,
    /// Zone file only
    Zones,
    /// Set files and zone file
    SetsAndZones,
}

impl From<SetZoneChoice> for SetZoneExport {
    fn from(choice: SetZoneChoice) -> Self {
        match choice {
            SetZoneChoice::None => SetZoneExport::NONE,
            SetZoneChoice::Sets => SetZoneExport::SETS,
            SetZoneChoice::Zones => SetZoneExport::ZONES,
            SetZoneChoice::SetsAndZones => SetZoneExport::SETS_AND_ZONES,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum SideBcChoice {
    /// Leave base and top faces unspecified
    Unspecified,
    /// One BaseAndTop patch
    Single,
    /// Separate Base and Top patches
    BaseTop,
    /// Base and top patches per volume condition
    Multiple,
}

impl From<SideBcChoice> for SideBcMode {
    fn from(choice: SideBcChoice) -> Self {
        match choice {
            SideBcChoice::Unspecified => SideBcMode::Unspecified,
            SideBcChoice::Single => SideBcMode::Single,
            SideBcChoice::BaseTop => SideBcMode::BaseTop,
            SideBcChoice::Multiple => SideBcMode::Multiple,
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input } => {
            cmd_info(&input)?;
        }

        Commands::Export {
            input,
            output,
            cell_export,
            face_export,
            precision,
            thickness,
            side_bc,
            tolerance,
            quiet,
        } => {
            let mesh = io::load(&input)?;
            let mut options = ExportOptions::from_model(&mesh)?;
            if let Some(choice) = cell_export {
                options = options.with_cell_export(choice.into());
            }
            if let Some(choice) = face_export {
                options = options.with_face_export(choice.into());
            }
            if let Some(precision) = precision {
                options = options.with_point_precision(precision);
            }
            if let Some(thickness) = thickness {
                options = options.with_thickness(thickness);
            }
            if let Some(choice) = side_bc {
                options = options.with_side_bc_mode(choice.into());
            }
            if let Some(tolerance) = tolerance {
                options = options.with_grid_point_tolerance(tolerance);
            }
            cmd_export(&mesh, &output, &options, quiet)?;
        }
    }

    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::reporting(move |current, total, message| {
        if total == 0 {
            return;
        }

        let raw_percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // monotonic: step boundaries may report a lower sub-position
        let previous = max_percent.fetch_max(raw_percent, Ordering::Relaxed);
        let percent = previous.max(raw_percent);
        if percent == previous && percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);
        eprint!("\r[{}{}] {:3}% {:<24}", bar, space, percent, message);
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;

    println!("File: {}", input.display());
    println!(
        "Dimension: {}",
        match mesh.dimension() {
            Dimension::Two => "2-D",
            Dimension::Three => "3-D",
        }
    );
    println!("Vertices: {}", mesh.vertex_count());
    println!("Cells: {}", mesh.cell_count());

    println!("Blocks:");
    for (b, block) in mesh.blocks().iter().enumerate() {
        let vc = mesh
            .block_condition(BlockId::new(b))
            .map_or("-".to_string(), |c| format!("{} ({})", c.name, c.type_name));
        println!("  {}: {} cells, VC {}", block.name, block.cells().len(), vc);
    }

    if !mesh.domains().is_empty() {
        println!("Domains:");
        for domain in mesh.domains() {
            let bc = domain
                .condition
                .as_ref()
                .map_or("-".to_string(), |c| format!("{} ({})", c.name, c.type_name));
            println!("  {}: {} faces, BC {}", domain.name, domain.faces().len(), bc);
        }
    }

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }

    if mesh.is_2d() {
        let options = ExportOptions::from_model(&mesh)?;
        let grid = export::inspect(&mesh, options.grid_point_tolerance)?;
        println!("Plane: z = {}", grid.plane_z);
        println!("Orientation: {:?}", grid.orientation);
        match grid.off_plane {
            None => println!("Planar: yes"),
            Some((vertex, offset)) => println!("Planar: no (vertex {} is {:e} off)", vertex, offset),
        }
        match grid.mismatched_block {
            None => println!("Consistent normals: yes"),
            Some(block) => println!("Consistent normals: no (block {})", block),
        }
    }

    Ok(())
}

fn cmd_export(
    mesh: &UnstructuredMesh,
    output: &Path,
    options: &ExportOptions,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(output)?;
    let progress = if quiet {
        Progress::none()
    } else {
        create_progress()
    };

    let start = Instant::now();
    let summary = export::export(mesh, output, options, &progress)?;
    let elapsed = start.elapsed();

    println!("Exported to {} in {:.2?}", output.display(), elapsed);
    println!("  Points: {}", summary.points);
    println!(
        "  Faces: {} ({} internal)",
        summary.faces, summary.internal_faces
    );
    println!("  Cells: {}", summary.cells);
    println!("  Boundary patches: {}", summary.patches);
    if let Some(zones) = summary.face_zones {
        println!("  Face zones: {}", zones);
    }
    if let Some(zones) = summary.cell_zones {
        println!("  Cell zones: {}", zones);
    }
    if let Some(thickness) = summary.thickness {
        println!("  2-D thickness: {}", thickness);
    }

    Ok(())
}
