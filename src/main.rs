use std::path::PathBuf;

use anyhow::{ Context, Result };
use clap::{ Parser, Subcommand };
use log::info;

use cull_trace::consts::{ NUM_THREADS, OUT_FILE };
use cull_trace::parallel;
use cull_trace::scene::{ CullingScene, Scene };

/// Frustum culling and ray casting demos.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ray trace a scene and save it as a PPM image.
    Render {
        /// JSON scene description (built-in demo scene when absent).
        #[clap(short, long)]
        scene: Option<PathBuf>,

        /// Where to write the image.
        #[clap(short, long, default_value = OUT_FILE)]
        output: PathBuf,

        /// Number of worker threads; 1 renders on the main thread.
        #[clap(short, long, default_value_t = NUM_THREADS)]
        threads: usize,

        /// Override the viewport width, in pixels.
        #[clap(long)]
        width: Option<u32>,

        /// Override the viewport height, in pixels.
        #[clap(long)]
        height: Option<u32>,
    },

    /// Build a quadtree over a scene's entities and report what the camera
    /// can see.
    Cull {
        /// JSON culling scene (built-in crate demo when absent).
        #[clap(short, long)]
        scene: Option<PathBuf>,
    },
}

fn render(scene: Option<PathBuf>, output: PathBuf, threads: usize,
    width: Option<u32>, height: Option<u32>) -> Result<()> {
    let mut scene = match scene {
        Some(path) => Scene::load(&path)
            .with_context(|| format!("failed to load scene {}", path.display()))?,
        None => Scene::demo(),
    };

    if let Some(width) = width {
        scene.camera.frustum.width = width as f32;
    }
    if let Some(height) = height {
        scene.camera.frustum.height = height as f32;
    }
    scene.camera.frustum.validate().context("invalid viewport")?;

    let canvas = parallel::render(&scene, threads).context("render failed")?;
    canvas.save(&output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!("done");
    Ok(())
}

fn cull(scene: Option<PathBuf>) -> Result<()> {
    let scene = match scene {
        Some(path) => CullingScene::load(&path)
            .with_context(|| format!("failed to load scene {}", path.display()))?,
        None => CullingScene::demo(),
    };

    let visible = scene.visible_nodes();
    println!("{} leaves intersect the frustum:", visible.len());
    for node in visible.iter() {
        println!("  ({:.3}, {:.3}) {}x{} depth {}", node.origin.x,
            node.origin.y, node.width, node.height, node.depth());
    }

    let culled = scene.culled_nodes();
    println!("{} nodes are outside the frustum:", culled.len());
    for node in culled.iter() {
        println!("  ({:.3}, {:.3}) {}x{} depth {}", node.origin.x,
            node.origin.y, node.width, node.height, node.depth());
    }

    println!("visible entities: {:?}", scene.visible_entities());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    match Args::parse().command {
        Command::Render { scene, output, threads, width, height } =>
            render(scene, output, threads, width, height),
        Command::Cull { scene } => cull(scene),
    }
}
