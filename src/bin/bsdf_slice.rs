use millefeuille::core::bsdf::BxDF;
use millefeuille::io::exr_utils::write_exr_to_file;
use millefeuille::io::material_loader::load_material_library;
use millefeuille::math::bitmap::Bitmap;
use millefeuille::math::constants::{Float, PI, Vector2f, Vector3f};
use millefeuille::math::warp::sample_uniform_disk_concentric;

fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <library.xml> <bsdf-id> <output.exr> [--theta DEG] [--size N]", args[0]);
        std::process::exit(1);
    }

    let mut theta_deg: Float = 45.0;
    let mut size: usize = 256;
    let mut i = 4;
    while i < args.len() {
        match args[i].as_str() {
            "--theta" => {
                i += 1;
                theta_deg = args.get(i).and_then(|v| v.parse::<Float>().ok()).unwrap_or(theta_deg);
            }
            "--size" => {
                i += 1;
                size = args.get(i).and_then(|v| v.parse::<usize>().ok()).unwrap_or(size).max(1);
            }
            other => {
                log::warn!("Ignoring unknown argument: {}.", other);
            }
        }
        i += 1;
    }

    let library = match load_material_library(&args[1]) {
        Ok(library) => library,
        Err(e) => {
            log::error!("Failed to load {}: {}.", args[1], e);
            std::process::exit(1);
        }
    };
    let bsdf = match library.setup(&args[2]) {
        Some(bsdf) => bsdf,
        None => {
            log::error!("No bsdf named {} in {}.", args[2], args[1]);
            std::process::exit(1);
        }
    };

    let theta = theta_deg * PI / 180.0;
    let wo = Vector3f::new(theta.sin(), 0.0, theta.cos());

    // Each pixel is a point of the unit disk; wi is its lift onto the
    // hemisphere. Values are eval(wo, wi), cosine included.
    let mut image = Bitmap::new(size, size);
    for y in 0..size {
        for x in 0..size {
            let u = Vector2f::new((x as Float + 0.5) / size as Float, 1.0 - (y as Float + 0.5) / size as Float);
            let p = sample_uniform_disk_concentric(&u);
            let z = (1.0 - p.x * p.x - p.y * p.y).max(0.0).sqrt();
            image[(x, y)] = bsdf.eval(&wo, &Vector3f::new(p.x, p.y, z));
        }
    }

    if let Err(e) = write_exr_to_file(&image, &args[3]) {
        log::error!("Failed to write {}: {}.", args[3], e);
        std::process::exit(1);
    }
}
