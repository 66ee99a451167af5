//! Command-line front end for the wavemesh pipeline
//!
//! Loads a mesh document, applies the configured geometry transforms,
//! compiles render batches, reports what a renderer would execute, and
//! optionally re-serializes the document.

use std::path::PathBuf;
use std::process::ExitCode;

use wavemesh::prelude::*;

const USAGE: &str = "\
usage: objtool <input.obj> [options]

options:
  --config <file.toml|file.ron>  load pipeline settings from a file
  --scale <factor>               uniform scale after loading
  --unitize                      center and normalize the largest extent to 2
  --reverse-winding              flip triangle winding and negate normals
  --texgen <linear|spherical>    regenerate texture coordinates
  --materials                    emit material state blocks when batching
  --textures                     load textures and emit texture binds
  --write <out.obj>              re-serialize the document
  --write-texcoords              include texture coordinates when writing
  --write-materials              include material references when writing
";

struct Options {
    input: PathBuf,
    output: Option<PathBuf>,
    pipeline: PipelineConfig,
}

fn parse_args() -> Result<Options, String> {
    let mut args = std::env::args().skip(1);
    let mut input = None;
    let mut output = None;
    let mut pipeline = PipelineConfig::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or("--config needs a file argument")?;
                pipeline = PipelineConfig::load_from_file(&path)
                    .map_err(|e| format!("config {path}: {e}"))?;
            }
            "--scale" => {
                let value = args.next().ok_or("--scale needs a factor argument")?;
                let factor = value
                    .parse::<f32>()
                    .map_err(|_| format!("invalid scale factor `{value}`"))?;
                pipeline.scale = Some(factor);
            }
            "--unitize" => pipeline.unitize = true,
            "--reverse-winding" => pipeline.reverse_winding = true,
            "--texgen" => {
                let value = args.next().ok_or("--texgen needs a mode argument")?;
                pipeline.texgen = match value.as_str() {
                    "linear" => TexGenMode::Linear,
                    "spherical" => TexGenMode::Spherical,
                    other => return Err(format!("unknown texgen mode `{other}`")),
                };
            }
            "--materials" => pipeline.batch_materials = true,
            "--textures" => pipeline.batch_textures = true,
            "--write" => {
                let path = args.next().ok_or("--write needs a file argument")?;
                output = Some(PathBuf::from(path));
            }
            "--write-texcoords" => pipeline.write_texcoords = true,
            "--write-materials" => pipeline.write_materials = true,
            "--help" | "-h" => return Err(USAGE.to_string()),
            other if input.is_none() && !other.starts_with('-') => {
                input = Some(PathBuf::from(other));
            }
            other => return Err(format!("unexpected argument `{other}`\n\n{USAGE}")),
        }
    }

    Ok(Options {
        input: input.ok_or_else(|| USAGE.to_string())?,
        output,
        pipeline,
    })
}

fn run(options: &Options) -> Result<(), MeshError> {
    let pipeline = &options.pipeline;

    // Dry runs resolve texture names without touching pixels; texture
    // batching wants the real provider.
    let mut registry = TextureRegistry::new();
    let mut images = ImageTextureProvider::new();
    let provider: &mut dyn TextureProvider = if pipeline.batch_textures {
        &mut images
    } else {
        &mut registry
    };

    let mut mesh = Mesh::new();
    read_obj(&mut mesh, &options.input, provider)?;
    log::info!(
        "loaded {}: {} vertices, {} normals, {} uvs, {} triangles, {} groups, {} materials",
        options.input.display(),
        mesh.vertex_count(),
        mesh.normal_count(),
        mesh.uv_count(),
        mesh.triangle_count(),
        mesh.groups.len(),
        mesh.materials.len(),
    );

    if let Some(factor) = pipeline.scale {
        mesh.scale(factor);
    }
    if pipeline.unitize {
        let factor = mesh.unitize();
        log::info!("unitized with scale factor {factor}");
    }
    if pipeline.reverse_winding {
        mesh.reverse_winding();
    }
    match pipeline.texgen {
        TexGenMode::None => {}
        TexGenMode::Linear => mesh.generate_linear_texcoords(),
        TexGenMode::Spherical => mesh.generate_spherical_texcoords(),
    }

    let batches = compile(&mesh, pipeline.batch_options());
    log::info!(
        "compiled {} buffer entries into {} draw commands with {} state changes",
        batches.positions.len(),
        batches.draw_count(),
        batches.state_change_count(),
    );

    if let Some(output) = &options.output {
        write_obj(&mesh, output, pipeline.write_mode())?;
        log::info!("wrote {}", output.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    wavemesh::foundation::logging::init();

    let options = match parse_args() {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
